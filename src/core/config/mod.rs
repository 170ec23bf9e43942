use std::fmt;

mod loader;
mod paths;

use crate::flags::Flags;
use loader::ConfigLoader;
pub use paths::ConfigPaths;

/// Startup file handling. The file only ever touches the environment, so a
/// `PATH=` line shapes command resolution for the rest of the session.
pub struct Config {
    paths: ConfigPaths,
}

impl Config {
    pub fn new(flags: &Flags) -> Result<Self, ConfigError> {
        let paths = match flags.get_value("config") {
            Some(path) => ConfigPaths::with_rc(path),
            None => ConfigPaths::new()?,
        };
        Ok(Config { paths })
    }

    pub fn rc_path(&self) -> &std::path::Path {
        &self.paths.rc_path
    }

    /// Returns whether a startup file was found and read.
    pub fn load(&self) -> Result<bool, ConfigError> {
        ConfigLoader::new(&self.paths).load_configs()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    HomeDirNotFound,
    IoError(std::io::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::HomeDirNotFound => write!(f, "Home directory not found"),
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
