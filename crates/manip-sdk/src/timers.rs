//! 周期任务生命周期管理
//!
//! 按关节组 tag 查找任务，先全部停止，再全部销毁。手臂组处理完毕之后
//! 才开始查找夹爪组。任一 stop/destroy 失败立即中止，后续不再做任何
//! 注册表操作。
//!
//! 结果以单一的 [`TimerShutdown`] 返回：既能直接读取布尔结果，
//! 也能通过 [`TimerShutdown::into_result`] 转成 `Result` 继续用 `?` 传播。
//!
//! # 并发限制
//!
//! 查找与停止之间新创建的任务不会被本次调用处理，调用方需要
//! 自行保证 `stop_timers` 不与任务创建并发。停止会等待任务当前 tick
//! 结束，没有超时。

use crate::error::{TimerOperation, TimerShutdownError, TimerStage};
use manip_timer::{TaskInfo, TaskRegistry};
use tracing::{error, info};

/// 单个关节组的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupShutdown {
    pub stage: TimerStage,
    pub tag: String,
    /// 查找到的任务
    pub found: Vec<TaskInfo>,
    /// 成功停止的数量
    pub stopped: usize,
    /// 成功销毁的数量
    pub destroyed: usize,
}

impl GroupShutdown {
    fn new(stage: TimerStage, tag: &str) -> Self {
        Self {
            stage,
            tag: tag.to_string(),
            found: Vec::new(),
            stopped: 0,
            destroyed: 0,
        }
    }
}

/// `stop_timers` 的结果
#[derive(Debug)]
pub struct TimerShutdown {
    /// 已处理的关节组（按处理顺序，失败的组也在其中）
    pub groups: Vec<GroupShutdown>,
    /// 第一个失败；`None` 表示全部成功
    pub error: Option<TimerShutdownError>,
}

impl TimerShutdown {
    /// 未执行任何任务操作的成功结果
    pub fn skipped() -> Self {
        Self {
            groups: Vec::new(),
            error: None,
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// 是否完全没有处理任何关节组
    pub fn is_skipped(&self) -> bool {
        self.groups.is_empty() && self.error.is_none()
    }

    /// 成功执行的 stop + destroy 总次数
    pub fn operations(&self) -> usize {
        self.groups.iter().map(|group| group.stopped + group.destroyed).sum()
    }

    pub fn group(&self, stage: TimerStage) -> Option<&GroupShutdown> {
        self.groups.iter().find(|group| group.stage == stage)
    }

    /// 转为 `Result`，失败时丢弃已完成部分的报告
    pub fn into_result(self) -> Result<Vec<GroupShutdown>, TimerShutdownError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.groups),
        }
    }
}

/// 依次处理各关节组的任务
pub(crate) fn shutdown_groups(
    registry: &dyn TaskRegistry,
    groups: &[(TimerStage, &str)],
) -> TimerShutdown {
    let mut shutdown = TimerShutdown::skipped();

    for &(stage, tag) in groups {
        let mut report = GroupShutdown::new(stage, tag);
        let result = shutdown_group(registry, stage, tag, &mut report);
        shutdown.groups.push(report);

        if let Err(e) = result {
            error!("Timer shutdown aborted at {} stage: {}", stage, e);
            shutdown.error = Some(e);
            return shutdown;
        }
    }

    info!(
        "Timer shutdown complete: {} group(s), {} operation(s)",
        shutdown.groups.len(),
        shutdown.operations()
    );
    shutdown
}

fn shutdown_group(
    registry: &dyn TaskRegistry,
    stage: TimerStage,
    tag: &str,
    report: &mut GroupShutdown,
) -> Result<(), TimerShutdownError> {
    report.found = registry.find_by_tag(tag);
    if report.found.is_empty() {
        info!("No {} timers tagged '{}'", stage, tag);
        return Ok(());
    }
    info!("Found {} {} timer(s) tagged '{}'", report.found.len(), stage, tag);

    let fail = |operation, task: &TaskInfo, source| TimerShutdownError {
        stage,
        operation,
        tag: tag.to_string(),
        task: task.name.clone(),
        source,
    };

    for task in &report.found {
        registry
            .stop(task)
            .map_err(|e| fail(TimerOperation::Stop, task, e))?;
        report.stopped += 1;
        info!("Stopped {} timer '{}'", stage, task.name);
    }

    for task in &report.found {
        registry
            .destroy(task)
            .map_err(|e| fail(TimerOperation::Destroy, task, e))?;
        report.destroyed += 1;
        info!("Deleted {} timer '{}'", stage, task.name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use manip_timer::{TimerError, TimerRegistry};
    use std::time::Duration;

    fn registry_with(tasks: &[(&str, &str)]) -> TimerRegistry {
        let registry = TimerRegistry::new();
        for (tag, name) in tasks {
            registry
                .schedule(tag, name, Duration::from_millis(10), Box::new(|| {}))
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_shutdown_all_groups() {
        let registry = registry_with(&[
            ("arm", "a1"),
            ("arm", "a2"),
            ("gripper", "g1"),
            ("base", "b1"),
        ]);
        let shutdown = shutdown_groups(
            &registry,
            &[(TimerStage::Arm, "arm"), (TimerStage::Gripper, "gripper")],
        );

        assert!(shutdown.success());
        assert_eq!(shutdown.operations(), 6);
        let arm = shutdown.group(TimerStage::Arm).unwrap();
        assert_eq!((arm.found.len(), arm.stopped, arm.destroyed), (2, 2, 2));

        // 不属于这两个 tag 的任务保持不动
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find_by_tag("base").len(), 1);
    }

    #[test]
    fn test_empty_groups_succeed() {
        let registry = TimerRegistry::new();
        let shutdown = shutdown_groups(&registry, &[(TimerStage::Arm, "arm")]);
        assert!(shutdown.success());
        assert!(!shutdown.is_skipped());
        assert_eq!(shutdown.operations(), 0);
    }

    #[test]
    fn test_into_result() {
        let ok = TimerShutdown::skipped().into_result().unwrap();
        assert!(ok.is_empty());

        let failed = TimerShutdown {
            groups: vec![GroupShutdown::new(TimerStage::Arm, "arm")],
            error: Some(TimerShutdownError {
                stage: TimerStage::Arm,
                operation: TimerOperation::Stop,
                tag: "arm".to_string(),
                task: "joint_states".to_string(),
                source: TimerError::Unavailable("down".to_string()),
            }),
        };
        assert!(!failed.success());
        let err = failed.into_result().unwrap_err();
        assert_eq!(err.stage, TimerStage::Arm);
    }
}
