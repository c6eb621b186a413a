//! 测试辅助
//!
//! [`RecordingRegistry`] 包装真实的 [`TimerRegistry`]，记录生命周期调用
//! 并可以按 tag 注入 stop/destroy 失败。

#![allow(dead_code)]

use manip_sdk::{
    LoopbackBus, Manipulator, ManipulatorConfig, TaskInfo, TaskRegistry, TimerError, TimerRegistry,
};
use manip_timer::{TaskId, TickFn};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// 记录的注册表调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Find(String),
    Stop { tag: String, name: String },
    Destroy { tag: String, name: String },
}

impl Call {
    pub fn find(tag: &str) -> Self {
        Call::Find(tag.to_string())
    }

    pub fn stop(tag: &str, name: &str) -> Self {
        Call::Stop {
            tag: tag.to_string(),
            name: name.to_string(),
        }
    }

    pub fn destroy(tag: &str, name: &str) -> Self {
        Call::Destroy {
            tag: tag.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingRegistry {
    inner: TimerRegistry,
    calls: Mutex<Vec<Call>>,
    fail_stop: Mutex<HashSet<String>>,
    fail_destroy: Mutex<HashSet<String>>,
}

impl RecordingRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 预先登记一个空任务
    pub fn seed(&self, tag: &str, name: &str) -> TaskId {
        self.inner
            .schedule(tag, name, Duration::from_millis(10), Box::new(|| {}))
            .unwrap()
    }

    /// 该 tag 下的 stop 调用失败
    pub fn fail_stop_for(&self, tag: &str) {
        self.fail_stop.lock().insert(tag.to_string());
    }

    /// 该 tag 下的 destroy 调用失败
    pub fn fail_destroy_for(&self, tag: &str) {
        self.fail_destroy.lock().insert(tag.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl TaskRegistry for RecordingRegistry {
    fn schedule(
        &self,
        tag: &str,
        name: &str,
        period: Duration,
        tick: TickFn,
    ) -> Result<TaskId, TimerError> {
        self.inner.schedule(tag, name, period, tick)
    }

    fn find_by_tag(&self, tag: &str) -> Vec<TaskInfo> {
        self.record(Call::find(tag));
        self.inner.find_by_tag(tag)
    }

    fn stop(&self, task: &TaskInfo) -> Result<(), TimerError> {
        self.record(Call::stop(&task.tag, &task.name));
        if self.fail_stop.lock().contains(&task.tag) {
            return Err(TimerError::Unavailable("stop failure injected".to_string()));
        }
        self.inner.stop(task)
    }

    fn destroy(&self, task: &TaskInfo) -> Result<(), TimerError> {
        self.record(Call::destroy(&task.tag, &task.name));
        if self.fail_destroy.lock().contains(&task.tag) {
            return Err(TimerError::Unavailable("destroy failure injected".to_string()));
        }
        self.inner.destroy(task)
    }
}

/// 以回环总线和记录注册表构造机械臂
pub fn compose(config: ManipulatorConfig, registry: &Arc<RecordingRegistry>) -> Manipulator {
    let timers: Arc<dyn TaskRegistry> = registry.clone();
    Manipulator::with_parts(config, Box::new(LoopbackBus::new()), timers).unwrap()
}

/// wx200，不初始化进程级传输
pub fn wx200() -> manip_sdk::ManipulatorConfigBuilder {
    ManipulatorConfig::builder("wx200").init_node(false)
}
