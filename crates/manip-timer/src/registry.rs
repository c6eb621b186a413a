//! 任务注册表
//!
//! [`TaskRegistry`] 是生命周期管理器依赖的抽象接口，测试时可以替换为
//! 记录调用顺序或注入故障的实现。
//!
//! [`TimerRegistry`] 是默认实现：每个机械臂实例一个，由通信核心持有，
//! 因此多个同型号机械臂即使使用相同的 tag 也不会互相干扰。

use crate::error::TimerError;
use crate::task::{PeriodicTask, TaskId, TaskInfo, TaskState};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// 周期任务的 tick 闭包
pub type TickFn = Box<dyn FnMut() + Send + 'static>;

/// 任务注册表接口
pub trait TaskRegistry: Send + Sync {
    /// 创建并启动一个带 tag 的周期任务
    fn schedule(
        &self,
        tag: &str,
        name: &str,
        period: Duration,
        tick: TickFn,
    ) -> Result<TaskId, TimerError>;

    /// 查找所有 tag 完全相等的任务（按创建顺序）
    fn find_by_tag(&self, tag: &str) -> Vec<TaskInfo>;

    /// 停止任务，阻塞到其当前 tick 结束
    fn stop(&self, task: &TaskInfo) -> Result<(), TimerError>;

    /// 从注册表中移除任务（仍在运行的任务会先被停止）
    fn destroy(&self, task: &TaskInfo) -> Result<(), TimerError>;
}

/// 默认任务注册表
#[derive(Debug, Default)]
pub struct TimerRegistry {
    tasks: Mutex<BTreeMap<TaskId, PeriodicTask>>,
    next_id: AtomicU64,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已注册任务数（包括已停止、尚未销毁的任务）
    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }

    /// 查询任务状态，任务不存在时返回 `None`
    pub fn state(&self, id: TaskId) -> Option<TaskState> {
        self.tasks.lock().get(&id).map(PeriodicTask::state)
    }

    fn not_found(task: &TaskInfo) -> TimerError {
        TimerError::NotFound {
            tag: task.tag.clone(),
            name: task.name.clone(),
        }
    }
}

impl TaskRegistry for TimerRegistry {
    fn schedule(
        &self,
        tag: &str,
        name: &str,
        period: Duration,
        tick: TickFn,
    ) -> Result<TaskId, TimerError> {
        let id = TaskId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let task = PeriodicTask::spawn(TaskInfo::new(id, tag, name), period, tick)?;
        self.tasks.lock().insert(id, task);
        Ok(id)
    }

    fn find_by_tag(&self, tag: &str) -> Vec<TaskInfo> {
        self.tasks
            .lock()
            .values()
            .filter(|task| task.info().tag == tag)
            .map(|task| task.info().clone())
            .collect()
    }

    fn stop(&self, task: &TaskInfo) -> Result<(), TimerError> {
        // join 在锁外进行，避免阻塞其他注册表操作
        let pending = {
            let mut tasks = self.tasks.lock();
            let entry = tasks.get_mut(&task.id).ok_or_else(|| Self::not_found(task))?;
            entry.signal_stop()
        };

        match pending {
            Some(pending) => pending.join(),
            None => {
                debug!("Timer '{}' already stopped", task.name);
                Ok(())
            },
        }
    }

    fn destroy(&self, task: &TaskInfo) -> Result<(), TimerError> {
        let removed = self.tasks.lock().remove(&task.id);
        let mut removed = removed.ok_or_else(|| Self::not_found(task))?;
        removed.stop()
    }
}
