// Terminal front-end

mod app;
mod cli;
mod console;

pub use app::run;
pub use cli::{Cli, Commands, TargetArgs};
pub use console::{Console, InquireConfirm, Report};
