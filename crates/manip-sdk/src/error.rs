//! 组合层错误类型
//!
//! - [`ConfigError`]: 配置校验/解析失败，发生在构造之前
//! - [`ConstructionError`]: 任一协作者构造失败，原样携带下层错误
//! - [`TimerShutdownError`]: 停止或销毁周期任务失败，标明所在阶段

use manip_client::InterfaceError;
use manip_comm::CommError;
use manip_timer::TimerError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 必填字段为空
    #[error("Configuration field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    /// 数值字段无效
    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidValue {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// 手臂组名与夹爪名相同，两组任务无法按 tag 区分
    #[error("group_name and gripper_name must differ (both '{name}')")]
    DuplicateTag { name: String },

    /// TOML 解析失败（包括未知字段）
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML 序列化失败
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// 配置文件读写失败
    #[error("Configuration file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 构造错误
///
/// 构造按 CommCore → Arm → Gripper 顺序进行，任一步失败即中止，
/// 已构造的部分被丢弃，调用方拿不到半成品。
#[derive(Error, Debug)]
pub enum ConstructionError {
    #[error("Communication core construction failed: {0}")]
    Comm(#[source] CommError),

    #[error("Arm interface construction failed: {0}")]
    Arm(#[source] InterfaceError),

    #[error("Gripper interface construction failed: {0}")]
    Gripper(#[source] InterfaceError),
}

/// 周期任务所属阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStage {
    Arm,
    Gripper,
}

impl fmt::Display for TimerStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arm => write!(f, "arm"),
            Self::Gripper => write!(f, "gripper"),
        }
    }
}

/// 失败的注册表操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOperation {
    Stop,
    Destroy,
}

impl fmt::Display for TimerOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stop => write!(f, "stop"),
            Self::Destroy => write!(f, "destroy"),
        }
    }
}

/// 周期任务停止失败
#[derive(Error, Debug)]
#[error("Failed to {operation} timer '{task}' in {stage} group '{tag}': {source}")]
pub struct TimerShutdownError {
    pub stage: TimerStage,
    pub operation: TimerOperation,
    pub tag: String,
    pub task: String,
    #[source]
    pub source: TimerError,
}
