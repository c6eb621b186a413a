//! 周期任务错误类型定义

use thiserror::Error;

/// 周期任务层错误类型
#[derive(Error, Debug)]
pub enum TimerError {
    /// 注册表中找不到任务（已被销毁或从未注册）
    #[error("Timer '{name}' (tag '{tag}') not found")]
    NotFound {
        /// 任务标签
        tag: String,
        /// 任务名称
        name: String,
    },

    /// 后台线程创建失败
    #[error("Failed to spawn timer '{name}': {source}")]
    Spawn {
        /// 任务名称
        name: String,
        /// 底层 IO 错误
        #[source]
        source: std::io::Error,
    },

    /// 任务线程在执行 tick 时 panic
    #[error("Timer '{name}' panicked")]
    TaskPanicked {
        /// 任务名称
        name: String,
    },

    /// 周期无效（必须大于 0）
    #[error("Invalid timer period for '{name}': period must be non-zero")]
    InvalidPeriod {
        /// 任务名称
        name: String,
    },

    /// 注册表不可用
    #[error("Task registry unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::TimerError;

    #[test]
    fn test_timer_error_display() {
        let err = TimerError::NotFound {
            tag: "arm".to_string(),
            name: "joint_states".to_string(),
        };
        assert_eq!(err.to_string(), "Timer 'joint_states' (tag 'arm') not found");

        let err = TimerError::TaskPanicked {
            name: "gripper_state".to_string(),
        };
        assert!(err.to_string().contains("panicked"));

        let err = TimerError::Unavailable("registry poisoned".to_string());
        assert!(err.to_string().contains("registry poisoned"));
    }
}
