//! # Manipulator Communication Core
//!
//! 通信核心层：每个机械臂实例唯一的总线通道持有者。
//!
//! - **型号档案** (`profile`): 已知 X 系列型号的关节列表、限位和睡眠位姿
//! - **传输抽象** (`transport`): [`Transport`] trait、回环总线、进程级初始化
//! - **通信核心** ([`CommCore`]): 按关节组名收发，供 Arm/Gripper 接口共享

mod comm_core;
mod error;
pub mod profile;
pub mod transport;

pub use comm_core::CommCore;
pub use error::CommError;
pub use profile::{JointSpec, RobotProfile};
pub use transport::{BusCommand, GroupState, LoopbackBus, LoopbackMonitor, Transport};
