use super::{Command, CommandError};
use std::env;
use std::path::PathBuf;

#[derive(Clone, Default)]
pub struct PwdCommand;

impl PwdCommand {
    pub fn new() -> Self {
        Self
    }

    pub fn current(&self) -> Result<PathBuf, CommandError> {
        env::current_dir().map_err(|e| {
            CommandError::ExecutionError(format!("pwd: cannot read working directory: {}", e))
        })
    }
}

impl Command for PwdCommand {
    fn execute(&self, _args: &[String]) -> Result<(), CommandError> {
        println!("{}", self.current()?.display());
        Ok(())
    }
}
