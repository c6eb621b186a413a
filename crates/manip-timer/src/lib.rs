//! # Manipulator Timer Layer
//!
//! 周期任务（"timer"）层，提供：
//! - [`PeriodicTask`]：独立线程上按固定周期执行的后台任务
//! - [`TaskRegistry`]：按 tag 查找、停止、销毁任务的抽象接口
//! - [`TimerRegistry`]：每个机械臂实例独享的任务表（不使用进程级全局状态）
//!
//! Arm/Gripper 接口通过通信核心拿到同一个注册表来创建任务，
//! 上层的生命周期管理器再按 tag 统一停止和销毁。

mod error;
mod registry;
mod task;

pub use error::TimerError;
pub use registry::{TaskRegistry, TickFn, TimerRegistry};
pub use task::{PeriodicTask, PendingStop, TaskId, TaskInfo, TaskState};
