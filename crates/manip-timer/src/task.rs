//! PeriodicTask - 后台周期任务
//!
//! 每个任务独占一个线程，按固定周期调用 tick 闭包，直到被停止。
//!
//! # 停止语义
//!
//! - 停止信号通过 channel 发送，等待中的任务立即被唤醒
//! - `stop()` 会 join 线程，因此会阻塞到当前 tick 执行完成
//! - 没有超时：如果 tick 本身卡死，`stop()` 也会一直阻塞

use crate::error::TimerError;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// 任务 ID（在所属注册表内唯一）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 任务描述（查找结果，可自由克隆）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    pub id: TaskId,
    /// 所属关节组标签（如 "arm"、"gripper"）
    pub tag: String,
    pub name: String,
}

impl TaskInfo {
    pub fn new(id: TaskId, tag: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            tag: tag.into(),
            name: name.into(),
        }
    }
}

/// 任务运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Running,
    Stopped,
}

/// 后台周期任务
pub struct PeriodicTask {
    info: TaskInfo,
    period: Duration,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl PeriodicTask {
    /// 启动周期任务
    ///
    /// 第一次 tick 在一个周期之后执行。
    ///
    /// # Errors
    /// - `TimerError::InvalidPeriod`: 周期为 0
    /// - `TimerError::Spawn`: 线程创建失败
    pub fn spawn<F>(info: TaskInfo, period: Duration, tick: F) -> Result<Self, TimerError>
    where
        F: FnMut() + Send + 'static,
    {
        if period.is_zero() {
            return Err(TimerError::InvalidPeriod { name: info.name });
        }

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = thread::Builder::new()
            .name(format!("timer-{}", info.name))
            .spawn(move || {
                // tick panic 时同样复位
                let _running = RunningGuard(running_clone);
                Self::tick_loop(stop_rx, period, tick);
            })
            .map_err(|source| TimerError::Spawn {
                name: info.name.clone(),
                source,
            })?;

        debug!(
            "Timer '{}' (tag '{}') started, period {:?}",
            info.name, info.tag, period
        );

        Ok(Self {
            info,
            period,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
            running,
        })
    }

    /// 周期循环：等待超时即 tick，收到停止信号或发送端被丢弃即退出
    fn tick_loop<F>(stop_rx: Receiver<()>, period: Duration, mut tick: F)
    where
        F: FnMut(),
    {
        loop {
            match stop_rx.recv_timeout(period) {
                Err(RecvTimeoutError::Timeout) => tick(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    pub fn info(&self) -> &TaskInfo {
        &self.info
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// 当前状态
    ///
    /// 已发出停止信号但线程尚未退出时仍报告 `Running`。
    pub fn state(&self) -> TaskState {
        if self.handle.is_some() && self.running.load(Ordering::Acquire) {
            TaskState::Running
        } else {
            TaskState::Stopped
        }
    }

    /// 发出停止信号，返回待 join 的线程
    ///
    /// 已经停止过的任务返回 `None`。调用方可以在释放锁之后再 join。
    pub fn signal_stop(&mut self) -> Option<PendingStop> {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.try_send(());
        }
        self.handle.take().map(|handle| PendingStop {
            name: self.info.name.clone(),
            handle,
        })
    }

    /// 停止任务并等待线程退出（幂等）
    pub fn stop(&mut self) -> Result<(), TimerError> {
        match self.signal_stop() {
            Some(pending) => pending.join(),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for PeriodicTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeriodicTask")
            .field("info", &self.info)
            .field("period", &self.period)
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Timer '{}' did not stop cleanly: {}", self.info.name, e);
        }
    }
}

/// 线程退出（包括 panic 展开）时清除运行标志
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// 已发出停止信号、尚未 join 的任务线程
pub struct PendingStop {
    name: String,
    handle: JoinHandle<()>,
}

impl PendingStop {
    /// 等待线程退出（阻塞到当前 tick 结束）
    pub fn join(self) -> Result<(), TimerError> {
        self.handle
            .join()
            .map_err(|_| TimerError::TaskPanicked {
                name: self.name.clone(),
            })?;
        debug!("Timer '{}' stopped", self.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    fn info(name: &str) -> TaskInfo {
        TaskInfo::new(TaskId(1), "arm", name)
    }

    #[test]
    fn test_task_ticks_until_stopped() {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();
        let mut task = PeriodicTask::spawn(info("ticker"), Duration::from_millis(5), move || {
            hits_clone.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();

        assert_eq!(task.state(), TaskState::Running);
        thread::sleep(Duration::from_millis(60));
        task.stop().unwrap();
        assert_eq!(task.state(), TaskState::Stopped);

        let after_stop = hits.load(Ordering::Relaxed);
        assert!(after_stop >= 3, "Expected several ticks, got {}", after_stop);

        thread::sleep(Duration::from_millis(30));
        assert_eq!(hits.load(Ordering::Relaxed), after_stop);
    }

    #[test]
    fn test_stop_wakes_long_period_immediately() {
        let mut task = PeriodicTask::spawn(info("slow"), Duration::from_secs(60), || {}).unwrap();

        let start = Instant::now();
        task.stop().unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut task =
            PeriodicTask::spawn(info("twice"), Duration::from_millis(10), || {}).unwrap();
        task.stop().unwrap();
        task.stop().unwrap();
        assert!(task.signal_stop().is_none());
    }

    #[test]
    fn test_zero_period_rejected() {
        let result = PeriodicTask::spawn(info("zero"), Duration::ZERO, || {});
        assert!(matches!(result, Err(TimerError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_panicking_tick_reported_on_stop() {
        let mut task =
            PeriodicTask::spawn(info("boom"), Duration::from_millis(1), || panic!("tick failed"))
                .unwrap();
        thread::sleep(Duration::from_millis(30));

        match task.stop() {
            Err(TimerError::TaskPanicked { name }) => assert_eq!(name, "boom"),
            other => panic!("Expected TaskPanicked, got {:?}", other),
        }
    }

    #[test]
    fn test_panicked_task_reports_stopped() {
        let mut task =
            PeriodicTask::spawn(info("crashed"), Duration::from_millis(1), || panic!("tick failed"))
                .unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while task.state() == TaskState::Running && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(task.state(), TaskState::Stopped);
        assert!(matches!(task.stop(), Err(TimerError::TaskPanicked { .. })));
    }

    #[test]
    fn test_drop_stops_thread() {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();
        let task = PeriodicTask::spawn(info("dropped"), Duration::from_millis(2), move || {
            hits_clone.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();
        thread::sleep(Duration::from_millis(20));
        drop(task);

        let after_drop = hits.load(Ordering::Relaxed);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(hits.load(Ordering::Relaxed), after_drop);
    }
}
