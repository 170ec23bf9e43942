use crate::core::commands::Dispatch;
use crate::input::tokenize;

pub(crate) trait CommandHandler {
    /// Runs one input line and returns 0 on success, 1 on error.
    fn execute_line(&mut self, line: &str) -> i32;
}

impl CommandHandler for super::Shell {
    fn execute_line(&mut self, line: &str) -> i32 {
        let tokens = tokenize(line);
        let quiet = self.flags.is_set("quiet");

        match self.executor.execute(tokens.as_slice(), &self.terminal) {
            Ok(Dispatch::External(outcome)) => {
                if !outcome.success() && !quiet {
                    let message = format!("Process exited with status: {}", outcome);
                    eprintln!("{}", self.highlighter.highlight_hint(&message));
                }
                0
            }
            Ok(Dispatch::Builtin) | Ok(Dispatch::Empty) => 0,
            Err(e) => {
                if !quiet {
                    let message = format!("tsh: {}", e);
                    eprintln!("{}", self.highlighter.highlight_error(&message));
                }
                tracing::debug!("command failed: {:?}", e);
                1
            }
        }
    }
}
