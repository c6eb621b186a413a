//! 通信核心错误类型定义

use thiserror::Error;

/// 通信核心错误类型
#[derive(Error, Debug)]
pub enum CommError {
    /// 未知的机械臂型号
    #[error("Unknown robot model '{model}'")]
    UnknownModel { model: String },

    /// 机器人名称无效（空字符串或包含空白）
    #[error("Invalid robot name '{name}'")]
    InvalidRobotName { name: String },

    /// 总线上不存在该关节组
    #[error("Unknown joint group '{group}'")]
    UnknownGroup { group: String },

    /// 传输层错误
    #[error("Transport error: {0}")]
    Transport(String),

    /// 传输通道已关闭
    #[error("Transport disconnected")]
    Disconnected,
}
