use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    NotFound(String),
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionError::NotFound(name) => write!(f, "command not found: {}", name),
        }
    }
}

impl std::error::Error for ResolutionError {}

/// Turns a command name into the path of a file that exists.
///
/// Names starting with `/` are only checked for existence. Anything else is
/// looked up in the directories of a search path, left to right, and the
/// first existing candidate wins. Only existence is checked, not the
/// executable bit; exec reports the rest.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    search_path: Option<OsString>,
}

impl PathResolver {
    /// Resolver that reads `PATH` at every call.
    pub fn new() -> Self {
        Self { search_path: None }
    }

    /// Resolver pinned to an explicit colon-separated search path.
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    pub fn resolve(&self, name: &str) -> Result<PathBuf, ResolutionError> {
        let not_found = || ResolutionError::NotFound(name.to_string());

        if name.is_empty() {
            return Err(not_found());
        }

        if name.starts_with('/') {
            let path = Path::new(name);
            return if path.exists() {
                Ok(path.to_path_buf())
            } else {
                Err(not_found())
            };
        }

        let search_path = match &self.search_path {
            Some(p) => p.clone(),
            None => env::var_os("PATH").ok_or_else(not_found)?,
        };

        let found = self
            .candidates(&search_path, name)
            .find(|candidate| candidate.exists());
        found.ok_or_else(not_found)
    }

    fn candidates<'a>(
        &self,
        search_path: &'a OsString,
        name: &'a str,
    ) -> impl Iterator<Item = PathBuf> + 'a {
        // Relative entries are anchored at the cwd so results start with '/'.
        let cwd = env::current_dir().ok();
        env::split_paths(search_path)
            .filter(|dir| !dir.as_os_str().is_empty())
            .filter_map(move |dir| {
                if dir.is_absolute() {
                    Some(dir)
                } else {
                    cwd.as_ref().map(|cwd| cwd.join(dir))
                }
            })
            .map(move |dir| dir.join(name))
    }
}
