//! Manipulator - 组合后的机械臂
//!
//! # 构造顺序（固定，不可调整）
//!
//! 1. `CommCore::new(robot_model, robot_name 或 robot_model, init_node)`
//! 2. `ArmInterface::new(core, robot_model, group_name, moving_time, accel_time)`
//! 3. 配置了夹爪时 `GripperInterface::new(core, gripper_name, pressure, lower, upper)`
//!
//! 任一步失败时，之前构造的部分随栈帧一起释放（接口在 Drop 中释放自己的周期任务），
//! 调用方只会拿到错误。
//!
//! # 所有权
//!
//! ```text
//! Manipulator
//! ├── gripper: Option<GripperInterface> ──┐
//! ├── arm: ArmInterface ──────────────────┤ Arc<CommCore>
//! └── core: Arc<CommCore> ◄───────────────┘
//! ```
//!
//! 字段按声明顺序析构：夹爪、手臂、通信核心，与构造顺序相反。

use crate::config::{ManipulatorConfig, TimerCleanupPolicy};
use crate::error::{ConstructionError, TimerStage};
use crate::timers::{self, TimerShutdown};
use manip_client::{ArmInterface, GripperInterface};
use manip_comm::{CommCore, CommError, Transport};
use manip_timer::TaskRegistry;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// 组合后的机械臂
pub struct Manipulator {
    gripper: Option<GripperInterface>,
    arm: ArmInterface,
    core: Arc<CommCore>,
    group_name: String,
    gripper_name: String,
    timer_cleanup: TimerCleanupPolicy,
}

impl Manipulator {
    /// 使用默认回环总线和独立任务注册表构造
    ///
    /// # Errors
    /// 原样返回 CommCore、ArmInterface 或 GripperInterface 的构造错误。
    pub fn new(config: ManipulatorConfig) -> Result<Self, ConstructionError> {
        Self::compose(config, CommCore::new)
    }

    /// 使用指定的传输后端和任务注册表构造
    pub fn with_parts(
        config: ManipulatorConfig,
        transport: Box<dyn Transport>,
        timers: Arc<dyn TaskRegistry>,
    ) -> Result<Self, ConstructionError> {
        Self::compose(config, move |model, name, init_node| {
            CommCore::with_parts(model, name, init_node, transport, timers)
        })
    }

    fn compose<F>(config: ManipulatorConfig, build_core: F) -> Result<Self, ConstructionError>
    where
        F: FnOnce(&str, &str, bool) -> Result<CommCore, CommError>,
    {
        let core = build_core(
            config.robot_model(),
            config.resolved_robot_name(),
            config.init_node(),
        )
        .map(Arc::new)
        .map_err(ConstructionError::Comm)?;

        let arm = ArmInterface::new(
            core.clone(),
            config.robot_model(),
            config.group_name(),
            config.moving_time(),
            config.accel_time(),
        )
        .map_err(ConstructionError::Arm)?;

        let gripper = config
            .gripper()
            .map(|gripper| {
                GripperInterface::new(
                    core.clone(),
                    &gripper.name,
                    gripper.pressure,
                    gripper.lower_limit,
                    gripper.upper_limit,
                )
            })
            .transpose()
            .map_err(ConstructionError::Gripper)?;

        info!(
            "Manipulator '{}' composed (arm group '{}', gripper: {})",
            core.robot_name(),
            config.group_name(),
            gripper.as_ref().map_or("none", |g| g.gripper_name())
        );

        Ok(Self {
            gripper_name: gripper
                .as_ref()
                .map(|g| g.gripper_name().to_string())
                .unwrap_or_default(),
            gripper,
            arm,
            core,
            group_name: config.group_name().to_string(),
            timer_cleanup: config.timer_cleanup(),
        })
    }

    /// 停止并销毁本机械臂的周期任务
    ///
    /// - 没有夹爪且策略为 `GripperGated`：不做任何注册表操作，直接成功
    /// - 否则先处理 tag 为 `group_name` 的任务，再处理 tag 为 `gripper_name` 的任务
    ///   （`AllGroups` 策略下没有夹爪时只处理手臂组）
    ///
    /// 连续调用是安全的：第二次调用找不到任何任务，直接成功。
    pub fn stop_timers(&self) -> TimerShutdown {
        let registry = self.core.timers().as_ref();

        match (&self.gripper, self.timer_cleanup) {
            (None, TimerCleanupPolicy::GripperGated) => {
                info!("No gripper configured, timer shutdown skipped");
                TimerShutdown::skipped()
            },
            (None, TimerCleanupPolicy::AllGroups) => {
                timers::shutdown_groups(registry, &[(TimerStage::Arm, self.group_name.as_str())])
            },
            (Some(_), _) => timers::shutdown_groups(
                registry,
                &[
                    (TimerStage::Arm, self.group_name.as_str()),
                    (TimerStage::Gripper, self.gripper_name.as_str()),
                ],
            ),
        }
    }

    /// 停止周期任务后按构造的逆序释放全部协作者
    pub fn shutdown(self) -> TimerShutdown {
        let result = self.stop_timers();
        drop(self);
        result
    }

    pub fn arm(&self) -> &ArmInterface {
        &self.arm
    }

    pub fn arm_mut(&mut self) -> &mut ArmInterface {
        &mut self.arm
    }

    pub fn gripper(&self) -> Option<&GripperInterface> {
        self.gripper.as_ref()
    }

    pub fn gripper_mut(&mut self) -> Option<&mut GripperInterface> {
        self.gripper.as_mut()
    }

    pub fn has_gripper(&self) -> bool {
        self.gripper.is_some()
    }

    /// 共享的通信核心
    pub fn core(&self) -> &Arc<CommCore> {
        &self.core
    }

    pub fn robot_name(&self) -> &str {
        self.core.robot_name()
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    /// 夹爪 tag，没有夹爪时为空
    pub fn gripper_name(&self) -> &str {
        &self.gripper_name
    }

    pub fn timer_cleanup(&self) -> TimerCleanupPolicy {
        self.timer_cleanup
    }
}

impl fmt::Debug for Manipulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manipulator")
            .field("core", &self.core)
            .field("group_name", &self.group_name)
            .field("gripper_name", &self.gripper_name)
            .field("timer_cleanup", &self.timer_cleanup)
            .finish_non_exhaustive()
    }
}
