//! 常用类型
//!
//! ```rust
//! use manip_sdk::prelude::*;
//! ```

pub use crate::config::{
    GripperConfig, ManipulatorConfig, ManipulatorConfigBuilder, TimerCleanupPolicy,
};
pub use crate::error::{ConfigError, ConstructionError, TimerShutdownError, TimerStage};
pub use crate::manipulator::Manipulator;
pub use crate::timers::{GroupShutdown, TimerShutdown};

pub use manip_client::{ArmInterface, GripperInterface, InterfaceError};
pub use manip_comm::{CommCore, CommError};
pub use manip_timer::{TaskRegistry, TimerRegistry};
