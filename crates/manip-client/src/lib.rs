//! # Manipulator Client Layer
//!
//! 建立在 [`CommCore`](manip_comm::CommCore) 之上的命令接口：
//!
//! - [`ArmInterface`]：关节组运动命令，使用 `moving_time`/`accel_time` 梯形曲线
//! - [`GripperInterface`]：夹爪开合，压力（0~1）映射为原始力矩
//!
//! 两个接口都持有同一个 `Arc<CommCore>`，因此不会比通信核心活得更久。
//! 它们创建的周期任务登记在通信核心的任务注册表中，tag 分别为关节组名和夹爪名。

mod arm;
mod error;
mod gripper;

pub use arm::{ArmInterface, JOINT_STATES_PERIOD, JOINT_STATES_TIMER};
pub use error::InterfaceError;
pub use gripper::{GRIPPER_STATE_PERIOD, GRIPPER_STATE_TIMER, GripperInterface, pressure_to_effort};

/// 客户端层 Result 类型别名
pub type Result<T> = std::result::Result<T, InterfaceError>;
