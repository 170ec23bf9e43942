use crate::error::ShellError;
use std::path::{Path, PathBuf};

/// Expands a leading `~` or `~/` against the home directory.
#[derive(Debug, Clone, Default)]
pub struct PathExpander {
    home: Option<PathBuf>,
}

impl PathExpander {
    pub fn new() -> Self {
        Self { home: None }
    }

    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }

    pub fn expand(&self, path: &str) -> Result<PathBuf, ShellError> {
        match path.strip_prefix('~') {
            Some("") => self.home_dir(),
            Some(rest) => match rest.strip_prefix('/') {
                Some(stripped) => {
                    let mut home_path = self.home_dir()?;
                    for part in stripped.split('/').filter(|p| !p.is_empty()) {
                        home_path.push(part);
                    }
                    Ok(home_path)
                }
                // "~user" is left alone
                None => Ok(Path::new(path).to_path_buf()),
            },
            None => Ok(Path::new(path).to_path_buf()),
        }
    }

    fn home_dir(&self) -> Result<PathBuf, ShellError> {
        match &self.home {
            Some(home) => Ok(home.clone()),
            None => dirs::home_dir().ok_or(ShellError::HomeDirNotFound),
        }
    }
}
