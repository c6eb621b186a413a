//! 组装后立即停止并销毁周期任务

use super::setup::{SetupArgs, report};
use anyhow::Result;
use clap::Args;

/// stop-timers 命令参数
#[derive(Args, Debug)]
pub struct StopTimersCommand {
    #[command(flatten)]
    pub setup: SetupArgs,

    /// 连续执行的次数（用于检查重复调用）
    #[arg(long, default_value_t = 1)]
    pub repeat: u32,
}

impl StopTimersCommand {
    pub fn execute(&self) -> Result<()> {
        let bot = self.setup.compose()?;

        for round in 1..=self.repeat.max(1) {
            println!("Round {}:", round);
            report(bot.stop_timers())?;
        }
        Ok(())
    }
}
