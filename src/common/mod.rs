pub mod command_utils;

pub use command_utils::{CommandOutput, CommandRunner, ProcessRunner, display_command};
