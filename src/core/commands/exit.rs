use super::{Command, CommandError};

/// Leaves the shell with status 0. Arguments are ignored.
#[derive(Clone)]
pub struct ExitCommand;

impl Default for ExitCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl ExitCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for ExitCommand {
    fn execute(&self, _args: &[String]) -> Result<(), CommandError> {
        std::process::exit(0);
    }
}
