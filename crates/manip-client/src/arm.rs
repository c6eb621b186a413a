//! ArmInterface - 手臂关节组命令接口
//!
//! # 运动曲线
//!
//! 每条位置命令都按梯形速度曲线执行：总时长 `moving_time`，
//! 加速和减速段各 `accel_time`。因此 `accel_time` 不能超过
//! `moving_time` 的一半，否则匀速段长度为负。
//!
//! # 关节状态
//!
//! 构造时启动 `joint_states` 周期任务（tag 为关节组名），
//! 每 20ms 从通信核心读取一次关节组状态并缓存在 `ArcSwap` 中，读取无锁。

use crate::Result;
use crate::error::InterfaceError;
use arc_swap::ArcSwap;
use manip_comm::{BusCommand, CommCore, GroupState, RobotProfile};
use manip_timer::{TaskId, TaskInfo, TimerError};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 关节状态刷新任务名
pub const JOINT_STATES_TIMER: &str = "joint_states";

/// 关节状态刷新周期
pub const JOINT_STATES_PERIOD: Duration = Duration::from_millis(20);

/// 手臂命令接口
pub struct ArmInterface {
    group_name: String,
    moving_time: f64,
    accel_time: f64,
    joint_states: Arc<ArcSwap<GroupState>>,
    state_timer: TaskId,
    core: Arc<CommCore>,
}

impl ArmInterface {
    /// 创建手臂接口
    ///
    /// 依次：校验参数 → 下发运动曲线 → 读取初始状态 → 启动 `joint_states` 任务。
    ///
    /// # Errors
    /// - `InterfaceError::EmptyName`: 关节组名为空
    /// - `InterfaceError::ModelMismatch`: 型号与通信核心不一致
    /// - `InterfaceError::InvalidProfile`: 运动曲线参数无效
    /// - `InterfaceError::Comm` / `InterfaceError::Timer`: 下层失败
    pub fn new(
        core: Arc<CommCore>,
        robot_model: &str,
        group_name: &str,
        moving_time: f64,
        accel_time: f64,
    ) -> Result<Self> {
        if group_name.is_empty() {
            return Err(InterfaceError::EmptyName { what: "group_name" });
        }
        if robot_model != core.robot_model() {
            return Err(InterfaceError::ModelMismatch {
                requested: robot_model.to_string(),
                core: core.robot_model().to_string(),
            });
        }
        validate_profile(moving_time, accel_time)?;

        core.send(&BusCommand::SetProfile {
            group: group_name.to_string(),
            moving_time,
            accel_time,
        })?;

        let initial = core.read_state(group_name)?;
        let joint_states = Arc::new(ArcSwap::from_pointee(initial));
        let state_timer = Self::start_state_timer(&core, group_name, joint_states.clone())?;

        info!(
            "Arm group '{}' ready ({} joints, moving_time {}s, accel_time {}s)",
            group_name,
            core.profile().dof(),
            moving_time,
            accel_time
        );

        Ok(Self {
            group_name: group_name.to_string(),
            moving_time,
            accel_time,
            joint_states,
            state_timer,
            core,
        })
    }

    fn start_state_timer(
        core: &Arc<CommCore>,
        group_name: &str,
        joint_states: Arc<ArcSwap<GroupState>>,
    ) -> Result<TaskId> {
        // 注册表归通信核心所有，tick 只能持有弱引用，否则形成引用环
        let weak: Weak<CommCore> = Arc::downgrade(core);
        let group = group_name.to_string();
        let id = core.timers().schedule(
            group_name,
            JOINT_STATES_TIMER,
            JOINT_STATES_PERIOD,
            Box::new(move || {
                let Some(core) = weak.upgrade() else {
                    return;
                };
                match core.read_state(&group) {
                    Ok(state) => joint_states.store(Arc::new(state)),
                    Err(e) => debug!("joint_states refresh for '{}' failed: {}", group, e),
                }
            }),
        )?;
        Ok(id)
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub fn moving_time(&self) -> f64 {
        self.moving_time
    }

    pub fn accel_time(&self) -> f64 {
        self.accel_time
    }

    /// 共享的通信核心
    pub fn core(&self) -> &Arc<CommCore> {
        &self.core
    }

    pub fn profile(&self) -> &'static RobotProfile {
        self.core.profile()
    }

    /// 本接口创建的周期任务
    pub fn timer_ids(&self) -> Vec<TaskId> {
        vec![self.state_timer]
    }

    /// 修改运动曲线时间
    pub fn set_trajectory_time(&mut self, moving_time: f64, accel_time: f64) -> Result<()> {
        validate_profile(moving_time, accel_time)?;
        self.core.send(&BusCommand::SetProfile {
            group: self.group_name.clone(),
            moving_time,
            accel_time,
        })?;
        self.moving_time = moving_time;
        self.accel_time = accel_time;
        debug!(
            "Arm group '{}' profile set to {}s/{}s",
            self.group_name, moving_time, accel_time
        );
        Ok(())
    }

    /// 关节组位置命令（rad，总线顺序）
    pub fn set_joint_positions(&self, positions: &[f64]) -> Result<()> {
        let profile = self.profile();
        if positions.len() != profile.dof() {
            return Err(InterfaceError::JointCount {
                expected: profile.dof(),
                actual: positions.len(),
            });
        }
        for (joint, &value) in profile.arm_joints.iter().zip(positions) {
            if !joint.contains(value) {
                return Err(InterfaceError::JointLimit {
                    joint: joint.name.to_string(),
                    value,
                    lower: joint.lower,
                    upper: joint.upper,
                });
            }
        }

        self.core.send(&BusCommand::GroupPositions {
            group: self.group_name.clone(),
            positions: positions.to_vec(),
        })?;
        Ok(())
    }

    /// 单关节位置命令
    pub fn set_single_joint_position(&self, joint_name: &str, position: f64) -> Result<()> {
        let (index, joint) =
            self.profile()
                .joint(joint_name)
                .ok_or_else(|| InterfaceError::UnknownJoint {
                    name: joint_name.to_string(),
                })?;
        if !joint.contains(position) {
            return Err(InterfaceError::JointLimit {
                joint: joint.name.to_string(),
                value: position,
                lower: joint.lower,
                upper: joint.upper,
            });
        }

        self.core.send(&BusCommand::SinglePosition {
            group: self.group_name.clone(),
            joint: index,
            position,
        })?;
        Ok(())
    }

    /// 回到零位
    pub fn go_to_home_pose(&self) -> Result<()> {
        self.set_joint_positions(&self.profile().home_pose())
    }

    /// 回到睡眠位姿
    pub fn go_to_sleep_pose(&self) -> Result<()> {
        self.set_joint_positions(&self.profile().sleep_pose())
    }

    /// 最近一次缓存的关节位置
    ///
    /// 在总线反馈任何位置之前为空。
    pub fn joint_positions(&self) -> Vec<f64> {
        self.joint_states.load().positions.clone()
    }

    /// 立即从总线读取关节组状态并刷新缓存
    pub fn refresh_joint_states(&self) -> Result<GroupState> {
        let state = self.core.read_state(&self.group_name)?;
        self.joint_states.store(Arc::new(state.clone()));
        Ok(state)
    }
}

impl Drop for ArmInterface {
    fn drop(&mut self) {
        let task = TaskInfo::new(self.state_timer, self.group_name.clone(), JOINT_STATES_TIMER);
        match self.core.timers().destroy(&task) {
            Ok(()) | Err(TimerError::NotFound { .. }) => {},
            Err(e) => warn!("Failed to release timer of arm group '{}': {}", self.group_name, e),
        }
    }
}

fn validate_profile(moving_time: f64, accel_time: f64) -> Result<()> {
    let reason = if !moving_time.is_finite() || moving_time <= 0.0 {
        Some("moving_time must be positive")
    } else if !accel_time.is_finite() || accel_time < 0.0 {
        Some("accel_time must not be negative")
    } else if accel_time > moving_time / 2.0 {
        Some("accel_time must not exceed half of moving_time")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(InterfaceError::InvalidProfile {
            moving_time,
            accel_time,
            reason,
        }),
        None => Ok(()),
    }
}
