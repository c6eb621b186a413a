//! # Manipulator CLI
//!
//! 按 TOML 文件或命令行参数组装机械臂，并管理其周期任务。
//!
//! ```bash
//! # 打印组装结果
//! manip-cli info --model wx200
//!
//! # 运行到 Ctrl-C 或超时，然后停止周期任务
//! manip-cli run --config left_arm.toml --duration 10
//!
//! # 组装后立即停止并销毁周期任务
//! manip-cli stop-timers --model wx250s --gripper-name ""
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{InfoCommand, RunCommand, StopTimersCommand};

/// Manipulator CLI
#[derive(Parser, Debug)]
#[command(name = "manip-cli")]
#[command(about = "Compose a manipulator and manage its periodic tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 打印组装结果
    Info {
        #[command(flatten)]
        args: InfoCommand,
    },

    /// 运行到 Ctrl-C 或超时
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 停止并销毁周期任务
    StopTimers {
        #[command(flatten)]
        args: StopTimersCommand,
    },
}

fn main() -> Result<()> {
    manip_sdk::init_logging_with("manip=info,manip_cli=info");

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { args } => args.execute(),
        Commands::Run { args } => args.execute(),
        Commands::StopTimers { args } => args.execute(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_stop_timers() {
        let cli = Cli::try_parse_from(["manip-cli", "stop-timers", "--model", "wx200"]).unwrap();
        assert!(matches!(cli.command, Commands::StopTimers { .. }));
    }

    #[test]
    fn test_model_or_config_required() {
        assert!(Cli::try_parse_from(["manip-cli", "info"]).is_err());
    }
}
