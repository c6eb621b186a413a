//! CommCore - 通信核心
//!
//! 每个机械臂实例唯一的总线通道持有者。Arm 和 Gripper 接口通过
//! `Arc<CommCore>` 共享同一个实例，通道本身由互斥锁保护，
//! 两者的命令可以任意交错。
//!
//! 通信核心同时持有该实例的任务注册表，上层接口创建的周期任务
//! 都登记在这里，而不是进程级全局表中。

use crate::error::CommError;
use crate::profile::{self, RobotProfile};
use crate::transport::{self, BusCommand, GroupState, LoopbackBus, Transport};
use manip_timer::{TaskRegistry, TimerRegistry};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// 通信核心
pub struct CommCore {
    robot_model: String,
    robot_name: String,
    profile: &'static RobotProfile,
    channel: Mutex<Box<dyn Transport>>,
    timers: Arc<dyn TaskRegistry>,
}

impl CommCore {
    /// 使用默认回环总线和独立任务注册表创建通信核心
    ///
    /// # Errors
    /// - `CommError::UnknownModel`: 型号不在已知档案中
    /// - `CommError::InvalidRobotName`: 名称为空或包含空白
    pub fn new(robot_model: &str, robot_name: &str, init_node: bool) -> Result<Self, CommError> {
        Self::with_parts(
            robot_model,
            robot_name,
            init_node,
            Box::new(LoopbackBus::new()),
            Arc::new(TimerRegistry::new()),
        )
    }

    /// 使用指定的传输后端和任务注册表创建通信核心
    pub fn with_parts(
        robot_model: &str,
        robot_name: &str,
        init_node: bool,
        transport: Box<dyn Transport>,
        timers: Arc<dyn TaskRegistry>,
    ) -> Result<Self, CommError> {
        let profile = Self::resolve_profile(robot_model)?;
        if robot_name.is_empty() || robot_name.chars().any(char::is_whitespace) {
            return Err(CommError::InvalidRobotName {
                name: robot_name.to_string(),
            });
        }

        if init_node {
            transport::init_process();
        } else {
            debug!("Skipping process-level transport initialization");
        }

        info!(
            "Communication core ready: model '{}', robot '{}' ({} DOF)",
            robot_model,
            robot_name,
            profile.dof()
        );

        Ok(Self {
            robot_model: robot_model.to_string(),
            robot_name: robot_name.to_string(),
            profile,
            channel: Mutex::new(transport),
            timers,
        })
    }

    fn resolve_profile(robot_model: &str) -> Result<&'static RobotProfile, CommError> {
        profile::lookup(robot_model).ok_or_else(|| CommError::UnknownModel {
            model: robot_model.to_string(),
        })
    }

    pub fn robot_model(&self) -> &str {
        &self.robot_model
    }

    pub fn robot_name(&self) -> &str {
        &self.robot_name
    }

    pub fn profile(&self) -> &'static RobotProfile {
        self.profile
    }

    /// 该实例的任务注册表
    pub fn timers(&self) -> &Arc<dyn TaskRegistry> {
        &self.timers
    }

    /// 发送一条总线命令
    pub fn send(&self, command: &BusCommand) -> Result<(), CommError> {
        self.channel.lock().send(command)
    }

    /// 读取关节组状态
    pub fn read_state(&self, group: &str) -> Result<GroupState, CommError> {
        self.channel.lock().read_state(group)
    }
}

impl fmt::Debug for CommCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommCore")
            .field("robot_model", &self.robot_model)
            .field("robot_name", &self.robot_name)
            .field("dof", &self.profile.dof())
            .finish_non_exhaustive()
    }
}
