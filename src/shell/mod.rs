mod executor;

use crate::{
    core::{
        commands::CommandExecutor,
        config::{Config, ConfigError},
    },
    error::ShellError,
    flags::Flags,
    highlight::Highlighter,
    input::{LineReader, ReadOutcome},
    process::signal,
    terminal::TerminalController,
};

use executor::CommandHandler;

pub struct Shell {
    pub(crate) terminal: TerminalController,
    pub(crate) executor: CommandExecutor,
    pub(crate) reader: LineReader,
    pub(crate) flags: Flags,
    pub(crate) highlighter: Highlighter,
}

impl Shell {
    pub fn new(flags: Flags) -> Result<Self, ShellError> {
        signal::setup_shell_dispositions()?;
        let terminal = TerminalController::init();

        load_startup_file(&flags)?;

        let reader = LineReader::new(terminal.is_interactive())?;
        let highlighter = if terminal.is_interactive() {
            Highlighter::new()
        } else {
            Highlighter::plain()
        };

        Ok(Self::with_parts(flags, terminal, reader, highlighter))
    }

    pub fn with_parts(
        flags: Flags,
        terminal: TerminalController,
        reader: LineReader,
        highlighter: Highlighter,
    ) -> Self {
        Shell {
            terminal,
            executor: CommandExecutor::new(),
            reader,
            flags,
            highlighter,
        }
    }

    pub fn terminal(&self) -> &TerminalController {
        &self.terminal
    }

    pub fn run(&mut self) -> Result<(), ShellError> {
        loop {
            match self.reader.read_line()? {
                ReadOutcome::Line(line) => {
                    let status = self.execute_line(&line);
                    tracing::debug!("line {} -> status {}", self.reader.line_number(), status);
                }
                ReadOutcome::Interrupted => {
                    if !self.flags.is_set("quiet") {
                        println!("CTRL-C");
                    }
                    continue;
                }
                ReadOutcome::Eof => break,
            }
        }
        Ok(())
    }
}

fn load_startup_file(flags: &Flags) -> Result<(), ShellError> {
    let config = match Config::new(flags) {
        Ok(config) => config,
        Err(ConfigError::HomeDirNotFound) => {
            tracing::debug!("HOME unset, skipping startup file");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if let Err(e) = config.load() {
        // An unreadable startup file should not keep the shell from starting.
        tracing::warn!("{}: {}", config.rc_path().display(), e);
    }
    Ok(())
}
