//! 传输层抽象
//!
//! [`Transport`] 是总线通道的最小接口，真实硬件后端和测试后端都实现它。
//! 帧格式与电机协议由具体后端负责，这里只传递按关节组寻址的命令。
//!
//! 默认后端 [`LoopbackBus`] 是纯内存总线：位置命令立即生效，
//! 单关节力矩命令让该关节在每次读取时按力矩方向移动一步，直到行程边界。

use crate::error::CommError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// 总线命令（按关节组或单关节寻址）
#[derive(Debug, Clone, PartialEq)]
pub enum BusCommand {
    /// 设置关节组的梯形速度曲线时间（秒）
    SetProfile {
        group: String,
        moving_time: f64,
        accel_time: f64,
    },
    /// 关节组位置命令（rad）
    GroupPositions { group: String, positions: Vec<f64> },
    /// 单关节位置命令（rad）
    SinglePosition {
        group: String,
        joint: usize,
        position: f64,
    },
    /// 单关节力矩命令（原始 effort 单位）
    SingleEffort { joint: String, effort: f64 },
}

impl BusCommand {
    /// 命令寻址的关节组名
    pub fn group(&self) -> &str {
        match self {
            Self::SetProfile { group, .. }
            | Self::GroupPositions { group, .. }
            | Self::SinglePosition { group, .. } => group,
            Self::SingleEffort { joint, .. } => joint,
        }
    }
}

/// 关节组状态快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupState {
    pub positions: Vec<f64>,
    pub efforts: Vec<f64>,
}

/// 总线通道接口
pub trait Transport: Send {
    fn send(&mut self, command: &BusCommand) -> Result<(), CommError>;
    fn read_state(&mut self, group: &str) -> Result<GroupState, CommError>;
}

static PROCESS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// 进程级传输初始化（幂等）
///
/// 返回 `true` 表示本次调用完成了初始化，`false` 表示此前已初始化。
pub fn init_process() -> bool {
    let first = PROCESS_INITIALIZED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_ok();
    if first {
        info!("Process-level transport initialized");
    }
    first
}

/// 进程级传输是否已初始化
pub fn is_process_initialized() -> bool {
    PROCESS_INITIALIZED.load(Ordering::Acquire)
}

/// 单关节力矩每单位 effort 每次读取移动的距离（m）
const EFFORT_STEP_GAIN: f64 = 1e-5;

#[derive(Debug, Default)]
struct LoopbackState {
    sent: Vec<BusCommand>,
    groups: HashMap<String, GroupState>,
    /// 单关节行程范围
    travel: HashMap<String, (f64, f64)>,
    fail_sends: bool,
}

/// 回环总线观察句柄（测试与诊断用）
#[derive(Debug, Clone)]
pub struct LoopbackMonitor {
    state: Arc<Mutex<LoopbackState>>,
}

impl LoopbackMonitor {
    /// 已发送的全部命令（按顺序）
    pub fn sent(&self) -> Vec<BusCommand> {
        self.state.lock().sent.clone()
    }

    /// 发往某关节组（或单关节）的命令
    pub fn sent_to(&self, group: &str) -> Vec<BusCommand> {
        self.state
            .lock()
            .sent
            .iter()
            .filter(|command| command.group() == group)
            .cloned()
            .collect()
    }

    /// 某关节组的当前状态
    pub fn group_state(&self, group: &str) -> Option<GroupState> {
        self.state.lock().groups.get(group).cloned()
    }

    /// 直接设置某关节组状态（模拟外部扰动）
    pub fn set_group_state(&self, group: &str, state: GroupState) {
        self.state.lock().groups.insert(group.to_string(), state);
    }

    /// 让后续所有发送失败
    pub fn set_fail_sends(&self, fail: bool) {
        self.state.lock().fail_sends = fail;
    }
}

/// 内存回环总线
#[derive(Debug, Default)]
pub struct LoopbackBus {
    state: Arc<Mutex<LoopbackState>>,
}

impl LoopbackBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明一个单关节（如夹爪）及其行程范围，初始位置在行程中点
    pub fn with_single_joint(self, joint: &str, travel: (f64, f64)) -> Self {
        {
            let mut state = self.state.lock();
            state.travel.insert(joint.to_string(), travel);
            state.groups.insert(
                joint.to_string(),
                GroupState {
                    positions: vec![(travel.0 + travel.1) / 2.0],
                    efforts: vec![0.0],
                },
            );
        }
        self
    }

    pub fn monitor(&self) -> LoopbackMonitor {
        LoopbackMonitor {
            state: self.state.clone(),
        }
    }
}

impl Transport for LoopbackBus {
    fn send(&mut self, command: &BusCommand) -> Result<(), CommError> {
        let mut state = self.state.lock();
        if state.fail_sends {
            return Err(CommError::Transport(format!(
                "loopback send to '{}' failed (injected)",
                command.group()
            )));
        }
        state.sent.push(command.clone());

        match command {
            BusCommand::SetProfile { group, .. } => {
                state.groups.entry(group.clone()).or_default();
            },
            BusCommand::GroupPositions { group, positions } => {
                let entry = state.groups.entry(group.clone()).or_default();
                entry.positions = positions.clone();
                entry.efforts = vec![0.0; positions.len()];
            },
            BusCommand::SinglePosition {
                group,
                joint,
                position,
            } => {
                let entry = state
                    .groups
                    .get_mut(group)
                    .ok_or_else(|| CommError::UnknownGroup {
                        group: group.clone(),
                    })?;
                let slot = entry.positions.get_mut(*joint).ok_or_else(|| {
                    CommError::Transport(format!("joint index {} out of range", joint))
                })?;
                *slot = *position;
            },
            BusCommand::SingleEffort { joint, effort } => {
                let entry = state.groups.entry(joint.clone()).or_default();
                if entry.positions.is_empty() {
                    entry.positions.push(0.0);
                }
                entry.efforts = vec![*effort];
            },
        }
        Ok(())
    }

    fn read_state(&mut self, group: &str) -> Result<GroupState, CommError> {
        let mut state = self.state.lock();
        let travel = state.travel.get(group).copied();
        let entry = state
            .groups
            .get_mut(group)
            .ok_or_else(|| CommError::UnknownGroup {
                group: group.to_string(),
            })?;

        // 只有单关节（力矩控制）组会随读取移动
        let single_effort = match entry.efforts.as_slice() {
            [effort] => Some(*effort),
            _ => None,
        };
        if let (Some(effort), Some(position)) = (single_effort, entry.positions.first_mut()) {
            *position += effort * EFFORT_STEP_GAIN;
            if let Some((low, high)) = travel {
                // 行程边界比夹爪停止阈值略宽，保证越限可以被观测到
                let margin = (high - low) * 0.1;
                *position = position.clamp(low - margin, high + margin);
            }
        }
        Ok(entry.clone())
    }
}
