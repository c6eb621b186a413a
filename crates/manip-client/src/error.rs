//! 客户端层错误类型定义

use manip_comm::CommError;
use manip_timer::TimerError;
use thiserror::Error;

/// Arm/Gripper 接口错误类型
#[derive(Error, Debug)]
pub enum InterfaceError {
    /// 通信核心错误
    #[error("Communication error: {0}")]
    Comm(#[from] CommError),

    /// 周期任务错误
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// 名称为空
    #[error("{what} must not be empty")]
    EmptyName { what: &'static str },

    /// 接口型号与通信核心型号不一致
    #[error("Robot model mismatch: interface '{requested}', core '{core}'")]
    ModelMismatch { requested: String, core: String },

    /// 梯形曲线参数无效
    #[error("Invalid motion profile (moving_time {moving_time}s, accel_time {accel_time}s): {reason}")]
    InvalidProfile {
        moving_time: f64,
        accel_time: f64,
        reason: &'static str,
    },

    /// 关节数量不匹配
    #[error("Expected {expected} joint positions, got {actual}")]
    JointCount { expected: usize, actual: usize },

    /// 未知关节名
    #[error("Unknown joint '{name}'")]
    UnknownJoint { name: String },

    /// 关节限位超出
    #[error("Joint {joint} position {value:.3} outside limits [{lower:.3}, {upper:.3}]")]
    JointLimit {
        joint: String,
        value: f64,
        lower: f64,
        upper: f64,
    },

    /// 夹爪压力无效（NaN 或无穷）
    #[error("Invalid gripper pressure: {0}")]
    InvalidPressure(f64),

    /// 夹爪力矩上下限无效
    #[error("Invalid gripper effort limits: lower {lower}, upper {upper}")]
    InvalidEffortLimits { lower: f64, upper: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_error_display() {
        let err = InterfaceError::InvalidProfile {
            moving_time: 2.0,
            accel_time: 1.5,
            reason: "accel_time must not exceed half of moving_time",
        };
        let msg = err.to_string();
        assert!(msg.contains("moving_time 2s") && msg.contains("half"), "{}", msg);

        let err = InterfaceError::JointCount {
            expected: 5,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Expected 5 joint positions, got 3");

        let err = InterfaceError::EmptyName { what: "group_name" };
        assert_eq!(err.to_string(), "group_name must not be empty");
    }

    #[test]
    fn test_from_comm_error() {
        let err: InterfaceError = CommError::Disconnected.into();
        assert!(matches!(err, InterfaceError::Comm(CommError::Disconnected)));
    }
}
