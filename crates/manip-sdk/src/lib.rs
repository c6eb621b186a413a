//! Manipulator SDK - 机械臂组合层
//!
//! 将三个底层协作者组装为一个机械臂控制入口：
//!
//! - **通信核心** ([`CommCore`]): 总线通道唯一持有者
//! - **手臂接口** ([`ArmInterface`]): 必需，恰好一个
//! - **夹爪接口** ([`GripperInterface`]): 可选，零个或一个
//!
//! 组合层本身不下发任何运动命令，只负责按固定顺序构造协作者，
//! 以及停止和销毁它们创建的周期任务。
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use manip_sdk::prelude::*;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let config = ManipulatorConfig::builder("wx200")
//!     .moving_time(2.0)
//!     .accel_time(0.3)
//!     .build()?;
//!
//! let bot = Manipulator::new(config)?;
//! bot.arm().go_to_home_pose()?;
//!
//! let shutdown = bot.stop_timers();
//! assert!(shutdown.success());
//! # Ok(())
//! # }
//! ```

pub mod config;
mod error;
mod logging;
mod manipulator;
pub mod prelude;
pub mod timers;

pub use config::{GripperConfig, ManipulatorConfig, ManipulatorConfigBuilder, TimerCleanupPolicy};
pub use error::{ConfigError, ConstructionError, TimerOperation, TimerShutdownError, TimerStage};
pub use logging::{DEFAULT_LOG_DIRECTIVE, init_logging, init_logging_with};
pub use manipulator::Manipulator;
pub use timers::{GroupShutdown, TimerShutdown};

// 下层常用类型
pub use manip_client::{ArmInterface, GripperInterface, InterfaceError, pressure_to_effort};
pub use manip_comm::{BusCommand, CommCore, CommError, LoopbackBus, Transport};
pub use manip_timer::{TaskInfo, TaskRegistry, TimerError, TimerRegistry};
