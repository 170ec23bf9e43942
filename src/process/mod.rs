use std::fmt;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::ExitStatus;

pub mod launcher;
pub mod redirect;
pub mod signal;

pub use launcher::{CommandRequest, ProcessLauncher};
pub use redirect::{PreparedRedirection, Redirection, RedirectionError};

#[derive(Debug)]
pub enum ForkError {
    ResourceExhausted(io::Error),
}

impl fmt::Display for ForkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForkError::ResourceExhausted(e) => write!(f, "cannot create child process: {}", e),
        }
    }
}

impl std::error::Error for ForkError {}

/// Only ever observed inside the child; the parent sees an opaque status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    InvalidExecutable(PathBuf),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::InvalidExecutable(path) => {
                write!(f, "cannot execute {}", path.display())
            }
        }
    }
}

impl std::error::Error for ExecError {}

#[derive(Debug)]
pub enum ProcessError {
    Fork(ForkError),
    Wait(io::Error),
    InvalidArgument(String),
}

impl From<ForkError> for ProcessError {
    fn from(e: ForkError) -> Self {
        ProcessError::Fork(e)
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Fork(e) => write!(f, "{}", e),
            ProcessError::Wait(e) => write!(f, "wait failed: {}", e),
            ProcessError::InvalidArgument(arg) => {
                write!(f, "argument contains a NUL byte: {:?}", arg)
            }
        }
    }
}

impl std::error::Error for ProcessError {}

/// Raw wait status of a foreground child. Not decoded into error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome(ExitStatus);

impl ExitOutcome {
    pub fn from_raw(raw: i32) -> Self {
        Self(ExitStatus::from_raw(raw))
    }

    pub fn success(&self) -> bool {
        self.0.success()
    }

    pub fn status(&self) -> ExitStatus {
        self.0
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
