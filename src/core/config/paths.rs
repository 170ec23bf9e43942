use super::ConfigError;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub rc_path: PathBuf,
}

impl ConfigPaths {
    pub fn new() -> Result<Self, ConfigError> {
        let home = env::var("HOME").map_err(|_| ConfigError::HomeDirNotFound)?;
        Ok(Self::with_rc(PathBuf::from(home).join(".tshrc")))
    }

    pub fn with_rc(rc_path: impl Into<PathBuf>) -> Self {
        ConfigPaths {
            rc_path: rc_path.into(),
        }
    }
}
