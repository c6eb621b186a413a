//! 运行机械臂直到 Ctrl-C 或超时
//!
//! 启动后回到零位，定期打印缓存的关节位置；退出前回到睡眠位姿并停止周期任务。

use super::setup::{SetupArgs, report};
use anyhow::{Context, Result, anyhow};
use clap::Args;
use crossbeam_channel::{RecvTimeoutError, bounded};
use std::time::{Duration, Instant};
use tracing::info;

/// run 命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    #[command(flatten)]
    pub setup: SetupArgs,

    /// 运行时长（秒），不指定时运行到 Ctrl-C
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// 状态打印间隔（毫秒）
    #[arg(long, default_value_t = 500)]
    pub interval_ms: u64,
}

impl RunCommand {
    pub fn execute(&self) -> Result<()> {
        let deadline = deadline_after(Instant::now(), self.duration)?;

        let (stop_tx, stop_rx) = bounded::<()>(1);
        ctrlc::set_handler(move || {
            let _ = stop_tx.try_send(());
        })
        .context("failed to set Ctrl-C handler")?;

        let bot = self.setup.compose()?;
        bot.arm().go_to_home_pose().context("failed to reach home pose")?;
        info!("Running '{}', press Ctrl-C to stop", bot.robot_name());

        let interval = Duration::from_millis(self.interval_ms.max(1));

        loop {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                info!("Run duration elapsed");
                break;
            }
            match stop_rx.recv_timeout(interval) {
                Ok(()) => {
                    info!("Interrupt received");
                    break;
                },
                Err(RecvTimeoutError::Timeout) => {
                    println!("{}: {:?}", bot.group_name(), bot.arm().joint_positions());
                },
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        bot.arm().go_to_sleep_pose().context("failed to reach sleep pose")?;
        report(bot.shutdown())
    }
}

/// 运行截止时刻；时长为负、非有限或超出可表示范围时报错
fn deadline_after(start: Instant, duration: Option<f64>) -> Result<Option<Instant>> {
    let Some(secs) = duration else {
        return Ok(None);
    };
    let span = Duration::try_from_secs_f64(secs)
        .map_err(|e| anyhow!("invalid --duration {}: {}", secs, e))?;
    start
        .checked_add(span)
        .map(Some)
        .ok_or_else(|| anyhow!("--duration {} is too large", secs))
}
