use super::{Command, CommandError};

/// Lists the builtin table, one `name - description` line each.
#[derive(Clone)]
pub struct HelpCommand {
    entries: Vec<(&'static str, &'static str)>,
}

impl HelpCommand {
    pub fn new(entries: &[(&'static str, &'static str)]) -> Self {
        Self {
            entries: entries.to_vec(),
        }
    }

    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(name, doc)| format!("{} - {}\n", name, doc))
            .collect()
    }
}

impl Command for HelpCommand {
    fn execute(&self, _args: &[String]) -> Result<(), CommandError> {
        print!("{}", self.render());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_keeps_order() {
        let help = HelpCommand::new(&[("?", "show help"), ("exit", "leave")]);
        assert_eq!(help.render(), "? - show help\nexit - leave\n");
    }
}
