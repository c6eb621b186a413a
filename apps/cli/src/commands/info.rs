//! 打印组装结果

use super::setup::{SetupArgs, report};
use anyhow::Result;
use clap::Args;

/// info 命令参数
#[derive(Args, Debug)]
pub struct InfoCommand {
    #[command(flatten)]
    pub setup: SetupArgs,
}

impl InfoCommand {
    pub fn execute(&self) -> Result<()> {
        let bot = self.setup.compose()?;
        let profile = bot.core().profile();

        println!("Robot:     {} ({})", bot.robot_name(), bot.core().robot_model());
        println!("Arm group: {} ({} joints)", bot.group_name(), profile.dof());
        for joint in profile.arm_joints {
            println!(
                "  {:<14} [{:>7.3}, {:>7.3}] sleep {:>6.3}",
                joint.name, joint.lower, joint.upper, joint.sleep
            );
        }
        match bot.gripper() {
            Some(gripper) => {
                let (lower, upper) = gripper.effort_limits();
                println!(
                    "Gripper:   {} (pressure {:.2}, effort {:.1} in [{}, {}])",
                    gripper.gripper_name(),
                    gripper.pressure(),
                    gripper.effort(),
                    lower,
                    upper
                );
            },
            None => println!("Gripper:   none"),
        }
        println!("Cleanup:   {:?}", bot.timer_cleanup());

        report(bot.shutdown())
    }
}
