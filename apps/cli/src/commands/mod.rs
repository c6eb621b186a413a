//! 命令定义和实现

pub mod info;
pub mod run;
pub mod setup;
pub mod stop_timers;

pub use info::InfoCommand;
pub use run::RunCommand;
pub use stop_timers::StopTimersCommand;
