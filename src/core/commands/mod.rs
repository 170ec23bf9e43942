mod cd;
mod exit;
mod help;
mod pwd;

pub use cd::CdCommand;
pub use exit::ExitCommand;
pub use help::HelpCommand;
pub use pwd::PwdCommand;

use crate::path::{PathResolver, ResolutionError};
use crate::process::{
    CommandRequest, ExitOutcome, ProcessError, ProcessLauncher, Redirection, RedirectionError,
};
use crate::terminal::ForegroundControl;

#[derive(Debug)]
pub enum CommandError {
    Resolution(ResolutionError),
    Redirection(RedirectionError),
    Process(ProcessError),
    Usage(String),
    ExecutionError(String),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Resolution(err) => write!(f, "{}", err),
            CommandError::Redirection(err) => write!(f, "redirection: {}", err),
            CommandError::Process(err) => write!(f, "{}", err),
            CommandError::Usage(msg) => write!(f, "usage: {}", msg),
            CommandError::ExecutionError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<ResolutionError> for CommandError {
    fn from(err: ResolutionError) -> Self {
        CommandError::Resolution(err)
    }
}

impl From<RedirectionError> for CommandError {
    fn from(err: RedirectionError) -> Self {
        CommandError::Redirection(err)
    }
}

impl From<ProcessError> for CommandError {
    fn from(err: ProcessError) -> Self {
        CommandError::Process(err)
    }
}

pub trait Command {
    fn execute(&self, args: &[String]) -> Result<(), CommandError>;
}

#[derive(Clone)]
enum CommandType {
    Help(HelpCommand),
    Exit(ExitCommand),
    Pwd(PwdCommand),
    Cd(CdCommand),
}

impl Command for CommandType {
    fn execute(&self, args: &[String]) -> Result<(), CommandError> {
        match self {
            CommandType::Help(cmd) => cmd.execute(args),
            CommandType::Exit(cmd) => cmd.execute(args),
            CommandType::Pwd(cmd) => cmd.execute(args),
            CommandType::Cd(cmd) => cmd.execute(args),
        }
    }
}

#[derive(Clone)]
struct Builtin {
    name: &'static str,
    command: CommandType,
}

/// What a dispatched line turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Empty,
    Builtin,
    External(ExitOutcome),
}

const HELP: (&str, &str) = ("?", "show this help menu");
const EXIT: (&str, &str) = ("exit", "exit the command shell");
const PWD: (&str, &str) = ("pwd", "print the current working directory");
const CD: (&str, &str) = ("cd", "change the current working directory to the given directory");

#[derive(Clone)]
pub struct CommandExecutor {
    builtins: Vec<Builtin>,
    resolver: PathResolver,
    launcher: ProcessLauncher,
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self::with_resolver(PathResolver::new())
    }

    pub fn with_resolver(resolver: PathResolver) -> Self {
        let mut executor = Self {
            builtins: Vec::new(),
            resolver,
            launcher: ProcessLauncher::new(),
        };

        let table = [HELP, EXIT, PWD, CD];
        executor.register(HELP.0, CommandType::Help(HelpCommand::new(&table)));
        executor.register(EXIT.0, CommandType::Exit(ExitCommand::new()));
        executor.register(PWD.0, CommandType::Pwd(PwdCommand::new()));
        executor.register(CD.0, CommandType::Cd(CdCommand::new()));

        executor
    }

    fn register(&mut self, name: &'static str, command: CommandType) {
        self.builtins.push(Builtin { name, command });
    }

    // First registration wins on a name collision.
    fn lookup(&self, name: &str) -> Option<&Builtin> {
        self.builtins.iter().find(|b| b.name == name)
    }

    pub fn is_builtin(&self, command: &str) -> bool {
        self.lookup(command).is_some()
    }

    pub fn builtin_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.builtins.iter().map(|b| b.name)
    }

    pub fn execute(
        &self,
        tokens: &[String],
        terminal: &dyn ForegroundControl,
    ) -> Result<Dispatch, CommandError> {
        let Some(name) = tokens.first() else {
            return Ok(Dispatch::Empty);
        };

        if let Some(builtin) = self.lookup(name) {
            builtin.command.execute(&tokens[1..])?;
            return Ok(Dispatch::Builtin);
        }

        self.run_external(tokens, terminal).map(Dispatch::External)
    }

    /// Resolve, open the redirection target, then launch. Anything that can
    /// fail before fork does, so a bad command never spawns a process.
    fn run_external(
        &self,
        tokens: &[String],
        terminal: &dyn ForegroundControl,
    ) -> Result<ExitOutcome, CommandError> {
        let path = self.resolver.resolve(&tokens[0])?;
        tracing::debug!("resolved {} to {}", tokens[0], path.display());

        let (argv, redirection) = Redirection::split(tokens)?;
        let prepared = redirection.prepare()?;
        if let Some(r) = &prepared {
            tracing::debug!("fd {} -> {}", r.target_fd(), r.path().display());
        }

        let request = CommandRequest::new(path, argv.to_vec()).with_redirection(prepared);
        Ok(self.launcher.launch(request, terminal)?)
    }
}
