use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum RedirectionError {
    MissingArg(String),
    MissingFile(PathBuf, io::Error),
    OpenFailed(PathBuf, io::Error),
}

impl fmt::Display for RedirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectionError::MissingArg(op) => write!(f, "missing file name after '{}'", op),
            RedirectionError::MissingFile(path, e) => {
                write!(f, "cannot read {}: {}", path.display(), e)
            }
            RedirectionError::OpenFailed(path, e) => {
                write!(f, "cannot write {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for RedirectionError {}

/// Trailing `> file` or `< file` clause of an external command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Redirection {
    OutputTo(PathBuf),
    InputFrom(PathBuf),
    #[default]
    None,
}

impl Redirection {
    /// Splits a trailing redirection off `tokens`, returning the argument
    /// vector that remains and the clause found.
    pub fn split<S: AsRef<str>>(tokens: &[S]) -> Result<(&[S], Redirection), RedirectionError> {
        let len = tokens.len();

        if len >= 2 {
            let last = tokens[len - 1].as_ref();
            if last == ">" || last == "<" {
                return Err(RedirectionError::MissingArg(last.to_string()));
            }
        }

        if len >= 3 {
            let path = PathBuf::from(tokens[len - 1].as_ref());
            let redirection = match tokens[len - 2].as_ref() {
                ">" => Some(Redirection::OutputTo(path)),
                "<" => Some(Redirection::InputFrom(path)),
                _ => None,
            };
            if let Some(redirection) = redirection {
                return Ok((&tokens[..len - 2], redirection));
            }
        }

        Ok((tokens, Redirection::None))
    }

    /// Opens the target file. Nothing is bound yet; the child does that.
    pub fn prepare(&self) -> Result<Option<PreparedRedirection>, RedirectionError> {
        match self {
            Redirection::OutputTo(path) => {
                let file = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)
                    .map_err(|e| RedirectionError::OpenFailed(path.clone(), e))?;
                Ok(Some(PreparedRedirection::new(file, libc::STDOUT_FILENO, path)))
            }
            Redirection::InputFrom(path) => {
                let file =
                    File::open(path).map_err(|e| RedirectionError::MissingFile(path.clone(), e))?;
                Ok(Some(PreparedRedirection::new(file, libc::STDIN_FILENO, path)))
            }
            Redirection::None => Ok(None),
        }
    }
}

/// An opened redirection target waiting to be duplicated onto a child's
/// stdin or stdout. The file closes when this is dropped, so it lives no
/// longer than the launch that consumes it.
#[derive(Debug)]
pub struct PreparedRedirection {
    file: File,
    target: RawFd,
    path: PathBuf,
}

impl PreparedRedirection {
    fn new(file: File, target: RawFd, path: &Path) -> Self {
        Self {
            file,
            target,
            path: path.to_path_buf(),
        }
    }

    pub fn source_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    pub fn target_fd(&self) -> RawFd {
        self.target
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
