use super::{Command, CommandError};
use crate::path::PathExpander;
use std::env;

#[derive(Clone)]
pub struct CdCommand {
    path_expander: PathExpander,
}

impl Default for CdCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl CdCommand {
    pub fn new() -> Self {
        Self {
            path_expander: PathExpander::new(),
        }
    }

    pub fn with_expander(path_expander: PathExpander) -> Self {
        Self { path_expander }
    }
}

impl Command for CdCommand {
    fn execute(&self, args: &[String]) -> Result<(), CommandError> {
        let [target] = args else {
            return Err(CommandError::Usage(
                "cd takes exactly one argument (the target directory)".to_string(),
            ));
        };

        let expanded_path = self
            .path_expander
            .expand(target)
            .map_err(|e| CommandError::ExecutionError(e.to_string()))?;

        env::set_current_dir(&expanded_path)
            .map_err(|e| CommandError::ExecutionError(format!("cd: {}: {}", target, e)))
    }
}
