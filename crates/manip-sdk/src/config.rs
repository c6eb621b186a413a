//! # 机械臂配置
//!
//! [`ManipulatorConfig`] 只能通过 [`ManipulatorConfigBuilder`] 或 TOML 解析得到，
//! 二者都会执行同一套校验，因此组合层拿到的配置一定是合法的。
//!
//! # 默认值
//!
//! | 字段 | 默认值 |
//! |---|---|
//! | `group_name` | `"arm"` |
//! | `gripper_name` | `"gripper"`（空字符串表示没有夹爪） |
//! | `robot_name` | 空，构造时取 `robot_model` |
//! | `moving_time` | 2.0 s |
//! | `accel_time` | 0.3 s |
//! | `gripper_pressure` | 0.5 |
//! | `gripper_pressure_lower_limit` / `upper_limit` | 150 / 350 |
//! | `init_node` | `true` |
//! | `timer_cleanup` | `gripper_gated` |
//!
//! # TOML 示例
//!
//! ```toml
//! robot_model = "wx200"
//! robot_name = "left_arm"
//! gripper_pressure = 0.8
//! timer_cleanup = "all_groups"
//! ```
//!
//! 未知字段会被拒绝，不会被静默忽略。

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_GROUP_NAME: &str = "arm";
pub const DEFAULT_GRIPPER_NAME: &str = "gripper";
pub const DEFAULT_MOVING_TIME: f64 = 2.0;
pub const DEFAULT_ACCEL_TIME: f64 = 0.3;
pub const DEFAULT_GRIPPER_PRESSURE: f64 = 0.5;
pub const DEFAULT_PRESSURE_LOWER_LIMIT: f64 = 150.0;
pub const DEFAULT_PRESSURE_UPPER_LIMIT: f64 = 350.0;

/// 无夹爪时的周期任务清理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerCleanupPolicy {
    /// 没有夹爪时不做任何任务操作（连手臂组也不检查）
    #[default]
    GripperGated,
    /// 没有夹爪时仍然清理手臂组任务
    AllGroups,
}

/// 夹爪配置
#[derive(Debug, Clone, PartialEq)]
pub struct GripperConfig {
    pub name: String,
    /// 归一化压力，超出 [0, 1] 的值在映射时截断
    pub pressure: f64,
    pub lower_limit: f64,
    pub upper_limit: f64,
}

/// 已校验的机械臂配置
#[derive(Debug, Clone, PartialEq)]
pub struct ManipulatorConfig {
    robot_model: String,
    robot_name: String,
    group_name: String,
    moving_time: f64,
    accel_time: f64,
    gripper: Option<GripperConfig>,
    init_node: bool,
    timer_cleanup: TimerCleanupPolicy,
}

impl ManipulatorConfig {
    /// 以型号创建 Builder，其余字段取默认值
    pub fn builder(robot_model: impl Into<String>) -> ManipulatorConfigBuilder {
        ManipulatorConfigBuilder::new(robot_model)
    }

    pub fn robot_model(&self) -> &str {
        &self.robot_model
    }

    /// 调用方给出的机器人名称（可能为空）
    pub fn robot_name(&self) -> &str {
        &self.robot_name
    }

    /// 生效的机器人名称：为空时取 `robot_model`
    pub fn resolved_robot_name(&self) -> &str {
        if self.robot_name.is_empty() {
            &self.robot_model
        } else {
            &self.robot_name
        }
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub fn moving_time(&self) -> f64 {
        self.moving_time
    }

    pub fn accel_time(&self) -> f64 {
        self.accel_time
    }

    pub fn gripper(&self) -> Option<&GripperConfig> {
        self.gripper.as_ref()
    }

    pub fn init_node(&self) -> bool {
        self.init_node
    }

    pub fn timer_cleanup(&self) -> TimerCleanupPolicy {
        self.timer_cleanup
    }

    /// 从 TOML 文本解析
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        file.into_builder().build()
    }

    /// 从 TOML 文件加载
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// 序列化为 TOML 文本
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(&ConfigFile::from(self))?)
    }

    /// 保存为 TOML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// 配置 Builder
///
/// # Example
///
/// ```
/// use manip_sdk::{ManipulatorConfig, TimerCleanupPolicy};
///
/// let config = ManipulatorConfig::builder("wx250s")
///     .robot_name("right_arm")
///     .gripper_name("")
///     .timer_cleanup(TimerCleanupPolicy::AllGroups)
///     .build()
///     .unwrap();
///
/// assert!(config.gripper().is_none());
/// assert_eq!(config.resolved_robot_name(), "right_arm");
/// ```
#[derive(Debug, Clone)]
pub struct ManipulatorConfigBuilder {
    robot_model: String,
    robot_name: String,
    group_name: String,
    gripper_name: String,
    moving_time: f64,
    accel_time: f64,
    gripper_pressure: f64,
    gripper_pressure_lower_limit: f64,
    gripper_pressure_upper_limit: f64,
    init_node: bool,
    timer_cleanup: TimerCleanupPolicy,
}

impl ManipulatorConfigBuilder {
    pub fn new(robot_model: impl Into<String>) -> Self {
        Self {
            robot_model: robot_model.into(),
            robot_name: String::new(),
            group_name: DEFAULT_GROUP_NAME.to_string(),
            gripper_name: DEFAULT_GRIPPER_NAME.to_string(),
            moving_time: DEFAULT_MOVING_TIME,
            accel_time: DEFAULT_ACCEL_TIME,
            gripper_pressure: DEFAULT_GRIPPER_PRESSURE,
            gripper_pressure_lower_limit: DEFAULT_PRESSURE_LOWER_LIMIT,
            gripper_pressure_upper_limit: DEFAULT_PRESSURE_UPPER_LIMIT,
            init_node: true,
            timer_cleanup: TimerCleanupPolicy::default(),
        }
    }

    /// 机器人名称（命名空间），为空时构造阶段取 `robot_model`
    pub fn robot_name(mut self, robot_name: impl Into<String>) -> Self {
        self.robot_name = robot_name.into();
        self
    }

    pub fn group_name(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = group_name.into();
        self
    }

    /// 夹爪名，空字符串表示没有夹爪
    pub fn gripper_name(mut self, gripper_name: impl Into<String>) -> Self {
        self.gripper_name = gripper_name.into();
        self
    }

    /// 运动总时长（秒）
    pub fn moving_time(mut self, moving_time: f64) -> Self {
        self.moving_time = moving_time;
        self
    }

    /// 加减速时长（秒）
    ///
    /// 不超过 `moving_time` 一半的约束由手臂接口检查。
    pub fn accel_time(mut self, accel_time: f64) -> Self {
        self.accel_time = accel_time;
        self
    }

    pub fn gripper_pressure(mut self, pressure: f64) -> Self {
        self.gripper_pressure = pressure;
        self
    }

    pub fn gripper_pressure_limits(mut self, lower: f64, upper: f64) -> Self {
        self.gripper_pressure_lower_limit = lower;
        self.gripper_pressure_upper_limit = upper;
        self
    }

    /// 是否执行进程级传输初始化
    pub fn init_node(mut self, init_node: bool) -> Self {
        self.init_node = init_node;
        self
    }

    pub fn timer_cleanup(mut self, policy: TimerCleanupPolicy) -> Self {
        self.timer_cleanup = policy;
        self
    }

    /// 校验并生成配置
    ///
    /// # Errors
    /// - `ConfigError::EmptyField`: `robot_model` 或 `group_name` 为空
    /// - `ConfigError::DuplicateTag`: `gripper_name` 与 `group_name` 相同
    /// - `ConfigError::InvalidValue`: 时间、压力或力矩上下限无效
    pub fn build(self) -> Result<ManipulatorConfig, ConfigError> {
        if self.robot_model.is_empty() {
            return Err(ConfigError::EmptyField {
                field: "robot_model",
            });
        }
        if self.group_name.is_empty() {
            return Err(ConfigError::EmptyField {
                field: "group_name",
            });
        }
        if self.gripper_name == self.group_name {
            return Err(ConfigError::DuplicateTag {
                name: self.gripper_name,
            });
        }

        require(
            "moving_time",
            self.moving_time,
            self.moving_time.is_finite() && self.moving_time > 0.0,
            "must be a positive number of seconds",
        )?;
        require(
            "accel_time",
            self.accel_time,
            self.accel_time.is_finite() && self.accel_time >= 0.0,
            "must be a non-negative number of seconds",
        )?;
        require(
            "gripper_pressure",
            self.gripper_pressure,
            self.gripper_pressure.is_finite(),
            "must be finite",
        )?;
        require(
            "gripper_pressure_lower_limit",
            self.gripper_pressure_lower_limit,
            self.gripper_pressure_lower_limit.is_finite(),
            "must be finite",
        )?;
        require(
            "gripper_pressure_upper_limit",
            self.gripper_pressure_upper_limit,
            self.gripper_pressure_upper_limit.is_finite()
                && self.gripper_pressure_upper_limit >= self.gripper_pressure_lower_limit,
            "must be finite and not below the lower limit",
        )?;

        let gripper = (!self.gripper_name.is_empty()).then(|| GripperConfig {
            name: self.gripper_name,
            pressure: self.gripper_pressure,
            lower_limit: self.gripper_pressure_lower_limit,
            upper_limit: self.gripper_pressure_upper_limit,
        });

        Ok(ManipulatorConfig {
            robot_model: self.robot_model,
            robot_name: self.robot_name,
            group_name: self.group_name,
            moving_time: self.moving_time,
            accel_time: self.accel_time,
            gripper,
            init_node: self.init_node,
            timer_cleanup: self.timer_cleanup,
        })
    }
}

fn require(
    field: &'static str,
    value: f64,
    ok: bool,
    reason: &'static str,
) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            value,
            reason,
        })
    }
}

/// TOML 文件格式（字段名与构造参数一一对应）
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    robot_model: String,
    #[serde(default)]
    robot_name: String,
    #[serde(default = "default_group_name")]
    group_name: String,
    #[serde(default = "default_gripper_name")]
    gripper_name: String,
    #[serde(default = "default_moving_time")]
    moving_time: f64,
    #[serde(default = "default_accel_time")]
    accel_time: f64,
    #[serde(default = "default_gripper_pressure")]
    gripper_pressure: f64,
    #[serde(default = "default_lower_limit")]
    gripper_pressure_lower_limit: f64,
    #[serde(default = "default_upper_limit")]
    gripper_pressure_upper_limit: f64,
    #[serde(default = "default_init_node")]
    init_node: bool,
    #[serde(default)]
    timer_cleanup: TimerCleanupPolicy,
}

fn default_group_name() -> String {
    DEFAULT_GROUP_NAME.to_string()
}

fn default_gripper_name() -> String {
    DEFAULT_GRIPPER_NAME.to_string()
}

fn default_moving_time() -> f64 {
    DEFAULT_MOVING_TIME
}

fn default_accel_time() -> f64 {
    DEFAULT_ACCEL_TIME
}

fn default_gripper_pressure() -> f64 {
    DEFAULT_GRIPPER_PRESSURE
}

fn default_lower_limit() -> f64 {
    DEFAULT_PRESSURE_LOWER_LIMIT
}

fn default_upper_limit() -> f64 {
    DEFAULT_PRESSURE_UPPER_LIMIT
}

fn default_init_node() -> bool {
    true
}

impl ConfigFile {
    fn into_builder(self) -> ManipulatorConfigBuilder {
        ManipulatorConfigBuilder::new(self.robot_model)
            .robot_name(self.robot_name)
            .group_name(self.group_name)
            .gripper_name(self.gripper_name)
            .moving_time(self.moving_time)
            .accel_time(self.accel_time)
            .gripper_pressure(self.gripper_pressure)
            .gripper_pressure_limits(
                self.gripper_pressure_lower_limit,
                self.gripper_pressure_upper_limit,
            )
            .init_node(self.init_node)
            .timer_cleanup(self.timer_cleanup)
    }
}

impl From<&ManipulatorConfig> for ConfigFile {
    fn from(config: &ManipulatorConfig) -> Self {
        // 无夹爪时写出空名称，其余夹爪字段取默认值
        let (gripper_name, pressure, lower, upper) = match &config.gripper {
            Some(gripper) => (
                gripper.name.clone(),
                gripper.pressure,
                gripper.lower_limit,
                gripper.upper_limit,
            ),
            None => (
                String::new(),
                DEFAULT_GRIPPER_PRESSURE,
                DEFAULT_PRESSURE_LOWER_LIMIT,
                DEFAULT_PRESSURE_UPPER_LIMIT,
            ),
        };

        Self {
            robot_model: config.robot_model.clone(),
            robot_name: config.robot_name.clone(),
            group_name: config.group_name.clone(),
            gripper_name,
            moving_time: config.moving_time,
            accel_time: config.accel_time,
            gripper_pressure: pressure,
            gripper_pressure_lower_limit: lower,
            gripper_pressure_upper_limit: upper,
            init_node: config.init_node,
            timer_cleanup: config.timer_cleanup,
        }
    }
}
