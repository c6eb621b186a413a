//! 公共参数：从配置文件或命令行参数得到 `ManipulatorConfig`

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use manip_sdk::{
    GroupShutdown, Manipulator, ManipulatorConfig, TimerCleanupPolicy, TimerShutdown,
};
use std::path::PathBuf;

/// 无夹爪时的清理策略
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CleanupArg {
    /// 没有夹爪时不做任何任务操作
    GripperGated,
    /// 没有夹爪时仍然清理手臂组
    AllGroups,
}

impl From<CleanupArg> for TimerCleanupPolicy {
    fn from(arg: CleanupArg) -> Self {
        match arg {
            CleanupArg::GripperGated => TimerCleanupPolicy::GripperGated,
            CleanupArg::AllGroups => TimerCleanupPolicy::AllGroups,
        }
    }
}

/// 组装参数
///
/// `--config` 与逐项参数互斥，同时给出时报错。
#[derive(Args, Debug, Clone)]
pub struct SetupArgs {
    /// TOML 配置文件
    #[arg(
        short,
        long,
        conflicts_with_all = [
            "model",
            "robot_name",
            "group_name",
            "gripper_name",
            "moving_time",
            "accel_time",
            "pressure",
            "pressure_lower_limit",
            "pressure_upper_limit",
            "no_init_node",
            "timer_cleanup",
        ]
    )]
    pub config: Option<PathBuf>,

    /// 机械臂型号（如 wx200、mobile_wx250s）
    #[arg(short, long, required_unless_present = "config")]
    pub model: Option<String>,

    /// 机器人名称，默认与型号相同
    #[arg(long, default_value = "")]
    pub robot_name: String,

    /// 手臂关节组名
    #[arg(long, default_value = "arm")]
    pub group_name: String,

    /// 夹爪名，空字符串表示没有夹爪
    #[arg(long, default_value = "gripper")]
    pub gripper_name: String,

    /// 运动总时长（秒）
    #[arg(long, default_value_t = 2.0)]
    pub moving_time: f64,

    /// 加减速时长（秒）
    #[arg(long, default_value_t = 0.3)]
    pub accel_time: f64,

    /// 夹爪压力（0~1）
    #[arg(long, default_value_t = 0.5)]
    pub pressure: f64,

    /// 压力 0 对应的力矩
    #[arg(long, default_value_t = 150.0)]
    pub pressure_lower_limit: f64,

    /// 压力 1 对应的力矩
    #[arg(long, default_value_t = 350.0)]
    pub pressure_upper_limit: f64,

    /// 跳过进程级传输初始化
    #[arg(long)]
    pub no_init_node: bool,

    /// 无夹爪时的清理策略
    #[arg(long, value_enum, default_value_t = CleanupArg::GripperGated)]
    pub timer_cleanup: CleanupArg,
}

impl SetupArgs {
    /// 生成已校验的配置
    pub fn config(&self) -> Result<ManipulatorConfig> {
        if let Some(path) = &self.config {
            return ManipulatorConfig::load_from_file(path)
                .with_context(|| format!("loading {}", path.display()));
        }

        // clap 保证二者至少有一个
        let model = self.model.as_deref().unwrap_or_default();
        ManipulatorConfig::builder(model)
            .robot_name(self.robot_name.as_str())
            .group_name(self.group_name.as_str())
            .gripper_name(self.gripper_name.as_str())
            .moving_time(self.moving_time)
            .accel_time(self.accel_time)
            .gripper_pressure(self.pressure)
            .gripper_pressure_limits(self.pressure_lower_limit, self.pressure_upper_limit)
            .init_node(!self.no_init_node)
            .timer_cleanup(self.timer_cleanup.into())
            .build()
            .context("invalid manipulator parameters")
    }

    /// 组装机械臂
    pub fn compose(&self) -> Result<Manipulator> {
        let config = self.config()?;
        Manipulator::new(config).context("failed to compose manipulator")
    }
}

/// 打印周期任务处理结果，失败时返回错误
pub fn report(shutdown: TimerShutdown) -> Result<()> {
    if shutdown.is_skipped() {
        println!("No gripper configured; periodic tasks left untouched");
    }
    for group in &shutdown.groups {
        print_group(group);
    }

    let groups = shutdown.into_result().context("timer shutdown failed")?;
    println!("Timer shutdown succeeded ({} group(s))", groups.len());
    Ok(())
}

fn print_group(group: &GroupShutdown) {
    println!(
        "  {} '{}': found {}, stopped {}, destroyed {}",
        group.stage,
        group.tag,
        group.found.len(),
        group.stopped,
        group.destroyed
    );
}
