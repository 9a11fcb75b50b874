//! CLI module

mod commands;
mod progress;

pub use commands::{Cli, Commands, ScanArgs};
pub use progress::ProgressReporter;
