//! GripperInterface - 夹爪命令接口
//!
//! 夹爪工作在力矩模式：`open()` 下发正力矩，`close()` 下发负力矩，
//! 力矩大小由压力（0~1）在 `[lower_limit, upper_limit]` 之间线性映射得到。
//!
//! `gripper_state` 周期任务（tag 为夹爪名）在夹爪运动时监视手指位置，
//! 一旦超过行程边界就下发零力矩，防止电机堵转过热。

use crate::Result;
use crate::error::InterfaceError;
use manip_comm::{BusCommand, CommCore};
use manip_timer::{TaskId, TaskInfo, TimerError};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 夹爪状态监视任务名
pub const GRIPPER_STATE_TIMER: &str = "gripper_state";

/// 夹爪状态监视周期
pub const GRIPPER_STATE_PERIOD: Duration = Duration::from_millis(20);

/// 压力 → 力矩映射
///
/// `effort = lower + pressure * (upper - lower)`，压力先被截断到 `[0, 1]`。
pub fn pressure_to_effort(pressure: f64, lower_limit: f64, upper_limit: f64) -> f64 {
    let pressure = pressure.clamp(0.0, 1.0);
    lower_limit + pressure * (upper_limit - lower_limit)
}

/// 当前力矩命令（与监视任务共享）
#[derive(Debug, Default)]
struct GripperCommand {
    effort: f64,
    moving: bool,
}

/// 夹爪命令接口
pub struct GripperInterface {
    gripper_name: String,
    pressure: f64,
    lower_limit: f64,
    upper_limit: f64,
    /// 手指行程 (闭合, 张开)，单位 m
    finger_limits: (f64, f64),
    command: Arc<Mutex<GripperCommand>>,
    state_timer: TaskId,
    core: Arc<CommCore>,
}

impl GripperInterface {
    /// 创建夹爪接口
    ///
    /// 依次：校验参数 → 下发零力矩 → 启动 `gripper_state` 任务。
    ///
    /// # Errors
    /// - `InterfaceError::EmptyName`: 夹爪名为空
    /// - `InterfaceError::InvalidPressure`: 压力不是有限值
    /// - `InterfaceError::InvalidEffortLimits`: 上下限非有限值、为负或 `lower > upper`
    /// - `InterfaceError::Comm` / `InterfaceError::Timer`: 下层失败
    pub fn new(
        core: Arc<CommCore>,
        gripper_name: &str,
        pressure: f64,
        lower_limit: f64,
        upper_limit: f64,
    ) -> Result<Self> {
        if gripper_name.is_empty() {
            return Err(InterfaceError::EmptyName {
                what: "gripper_name",
            });
        }
        if !pressure.is_finite() {
            return Err(InterfaceError::InvalidPressure(pressure));
        }
        if !lower_limit.is_finite()
            || !upper_limit.is_finite()
            || lower_limit < 0.0
            || lower_limit > upper_limit
        {
            return Err(InterfaceError::InvalidEffortLimits {
                lower: lower_limit,
                upper: upper_limit,
            });
        }

        core.send(&BusCommand::SingleEffort {
            joint: gripper_name.to_string(),
            effort: 0.0,
        })?;

        let finger_limits = core.profile().finger_limits;
        let command = Arc::new(Mutex::new(GripperCommand::default()));
        let state_timer =
            Self::start_state_timer(&core, gripper_name, finger_limits, command.clone())?;

        info!(
            "Gripper '{}' ready (pressure {:.2}, effort {:.1} in [{}, {}])",
            gripper_name,
            pressure,
            pressure_to_effort(pressure, lower_limit, upper_limit),
            lower_limit,
            upper_limit
        );

        Ok(Self {
            gripper_name: gripper_name.to_string(),
            pressure,
            lower_limit,
            upper_limit,
            finger_limits,
            command,
            state_timer,
            core,
        })
    }

    fn start_state_timer(
        core: &Arc<CommCore>,
        gripper_name: &str,
        finger_limits: (f64, f64),
        command: Arc<Mutex<GripperCommand>>,
    ) -> Result<TaskId> {
        let weak: Weak<CommCore> = Arc::downgrade(core);
        let joint = gripper_name.to_string();
        let id = core.timers().schedule(
            gripper_name,
            GRIPPER_STATE_TIMER,
            GRIPPER_STATE_PERIOD,
            Box::new(move || {
                let Some(core) = weak.upgrade() else {
                    return;
                };
                if let Err(e) = Self::check_finger_limits(&core, &joint, finger_limits, &command) {
                    debug!("gripper_state check for '{}' failed: {}", joint, e);
                }
            }),
        )?;
        Ok(id)
    }

    /// 运动中越过行程边界时下发零力矩
    fn check_finger_limits(
        core: &CommCore,
        joint: &str,
        (closed, open): (f64, f64),
        command: &Mutex<GripperCommand>,
    ) -> Result<()> {
        let mut command = command.lock();
        if !command.moving {
            return Ok(());
        }

        let position = core.read_state(joint)?.positions.first().copied().unwrap_or(0.0);
        let past_limit = (command.effort > 0.0 && position >= open)
            || (command.effort < 0.0 && position <= closed);
        if past_limit {
            core.send(&BusCommand::SingleEffort {
                joint: joint.to_string(),
                effort: 0.0,
            })?;
            command.effort = 0.0;
            command.moving = false;
            debug!("Gripper '{}' reached limit at {:.4} m", joint, position);
        }
        Ok(())
    }

    pub fn gripper_name(&self) -> &str {
        &self.gripper_name
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn effort_limits(&self) -> (f64, f64) {
        (self.lower_limit, self.upper_limit)
    }

    /// 当前压力对应的力矩大小
    pub fn effort(&self) -> f64 {
        pressure_to_effort(self.pressure, self.lower_limit, self.upper_limit)
    }

    /// 共享的通信核心
    pub fn core(&self) -> &Arc<CommCore> {
        &self.core
    }

    /// 本接口创建的周期任务
    pub fn timer_ids(&self) -> Vec<TaskId> {
        vec![self.state_timer]
    }

    /// 是否正在运动（尚未到达行程边界）
    pub fn is_moving(&self) -> bool {
        self.command.lock().moving
    }

    /// 设置压力（0~1，超出范围的值按边界处理）
    pub fn set_pressure(&mut self, pressure: f64) -> Result<()> {
        if !pressure.is_finite() {
            return Err(InterfaceError::InvalidPressure(pressure));
        }
        self.pressure = pressure;
        Ok(())
    }

    /// 张开夹爪，下发命令后阻塞 `delay`
    pub fn open(&self, delay: Duration) -> Result<()> {
        self.actuate(self.effort(), delay)
    }

    /// 闭合夹爪，下发命令后阻塞 `delay`
    pub fn close(&self, delay: Duration) -> Result<()> {
        self.actuate(-self.effort(), delay)
    }

    fn actuate(&self, effort: f64, delay: Duration) -> Result<()> {
        {
            let mut command = self.command.lock();
            let position = self
                .core
                .read_state(&self.gripper_name)?
                .positions
                .first()
                .copied()
                .unwrap_or(0.0);
            let (closed, open) = self.finger_limits;
            let can_move = (effort > 0.0 && position < open) || (effort < 0.0 && position > closed);
            if !can_move {
                debug!(
                    "Gripper '{}' already at limit ({:.4} m), command skipped",
                    self.gripper_name, position
                );
                return Ok(());
            }

            self.core.send(&BusCommand::SingleEffort {
                joint: self.gripper_name.clone(),
                effort,
            })?;
            command.effort = effort;
            command.moving = true;
        }

        if !delay.is_zero() {
            thread::sleep(delay);
        }
        Ok(())
    }
}

impl Drop for GripperInterface {
    fn drop(&mut self) {
        let task = TaskInfo::new(self.state_timer, self.gripper_name.clone(), GRIPPER_STATE_TIMER);
        match self.core.timers().destroy(&task) {
            Ok(()) | Err(TimerError::NotFound { .. }) => {},
            Err(e) => warn!("Failed to release timer of gripper '{}': {}", self.gripper_name, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manip_comm::{LoopbackBus, LoopbackMonitor};
    use manip_timer::{TaskRegistry, TimerRegistry};

    fn core_with_gripper() -> (Arc<CommCore>, LoopbackMonitor, Arc<TimerRegistry>) {
        let bus = LoopbackBus::new().with_single_joint("gripper", (0.015, 0.037));
        let monitor = bus.monitor();
        let timers = Arc::new(TimerRegistry::new());
        let core =
            CommCore::with_parts("wx200", "wx200", false, Box::new(bus), timers.clone()).unwrap();
        (Arc::new(core), monitor, timers)
    }

    #[test]
    fn test_pressure_mapping_reference_points() {
        assert_eq!(pressure_to_effort(0.0, 150.0, 350.0), 150.0);
        assert_eq!(pressure_to_effort(1.0, 150.0, 350.0), 350.0);
        assert_eq!(pressure_to_effort(0.5, 150.0, 350.0), 250.0);
        assert_eq!(pressure_to_effort(-2.0, 150.0, 350.0), 150.0);
        assert_eq!(pressure_to_effort(7.0, 150.0, 350.0), 350.0);
    }

    #[test]
    fn test_construction_validates_and_starts_timer() {
        let (core, monitor, timers) = core_with_gripper();
        assert!(matches!(
            GripperInterface::new(core.clone(), "", 0.5, 150.0, 350.0),
            Err(InterfaceError::EmptyName { .. })
        ));
        assert!(matches!(
            GripperInterface::new(core.clone(), "gripper", 0.5, 350.0, 150.0),
            Err(InterfaceError::InvalidEffortLimits { .. })
        ));
        assert!(matches!(
            GripperInterface::new(core.clone(), "gripper", f64::NAN, 150.0, 350.0),
            Err(InterfaceError::InvalidPressure(_))
        ));
        assert!(monitor.sent().is_empty());

        let gripper = GripperInterface::new(core, "gripper", 0.5, 150.0, 350.0).unwrap();
        assert_eq!(gripper.effort(), 250.0);
        let tasks = timers.find_by_tag("gripper");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, GRIPPER_STATE_TIMER);
        assert_eq!(gripper.timer_ids(), vec![tasks[0].id]);
    }

    #[test]
    fn test_open_and_close_send_signed_effort() {
        let (core, monitor, _) = core_with_gripper();
        let gripper = GripperInterface::new(core, "gripper", 1.0, 150.0, 350.0).unwrap();

        gripper.open(Duration::ZERO).unwrap();
        assert!(gripper.is_moving());
        gripper.close(Duration::ZERO).unwrap();

        let efforts: Vec<f64> = monitor
            .sent()
            .into_iter()
            .filter_map(|cmd| match cmd {
                BusCommand::SingleEffort { effort, .. } => Some(effort),
                _ => None,
            })
            .collect();
        assert_eq!(efforts[..3], [0.0, 350.0, -350.0]);
    }

    #[test]
    fn test_state_timer_stops_at_open_limit() {
        let (core, monitor, _) = core_with_gripper();
        let gripper = GripperInterface::new(core, "gripper", 0.5, 150.0, 350.0).unwrap();

        gripper.open(Duration::ZERO).unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while gripper.is_moving() && std::time::Instant::now() < deadline {
            thread::sleep(GRIPPER_STATE_PERIOD);
        }

        assert!(!gripper.is_moving());
        let last = monitor.sent().pop().unwrap();
        assert_eq!(
            last,
            BusCommand::SingleEffort {
                joint: "gripper".to_string(),
                effort: 0.0,
            }
        );
        let position = monitor.group_state("gripper").unwrap().positions[0];
        assert!(position >= 0.037);
    }

    #[test]
    fn test_command_skipped_at_limit() {
        let (core, monitor, _) = core_with_gripper();
        let gripper = GripperInterface::new(core, "gripper", 0.5, 150.0, 350.0).unwrap();
        monitor.set_group_state(
            "gripper",
            manip_comm::GroupState {
                positions: vec![0.040],
                efforts: vec![0.0],
            },
        );

        let before = monitor.sent().len();
        gripper.open(Duration::ZERO).unwrap();
        assert_eq!(monitor.sent().len(), before);
        assert!(!gripper.is_moving());
    }

    #[test]
    fn test_set_pressure() {
        let (core, _, _) = core_with_gripper();
        let mut gripper = GripperInterface::new(core, "gripper", 0.5, 150.0, 350.0).unwrap();
        gripper.set_pressure(0.0).unwrap();
        assert_eq!(gripper.effort(), 150.0);
        assert!(gripper.set_pressure(f64::INFINITY).is_err());
        assert_eq!(gripper.pressure(), 0.0);
    }
}
