use std::borrow::Cow;
use std::env;
use std::fs;
use std::path::Path;

use super::{ConfigError, ConfigPaths};

pub struct ConfigLoader<'a> {
    paths: &'a ConfigPaths,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(paths: &'a ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn load_configs(&self) -> Result<bool, ConfigError> {
        self.source_if_exists(&self.paths.rc_path)
    }

    fn source_if_exists(&self, path: &Path) -> Result<bool, ConfigError> {
        if !path.exists() {
            tracing::debug!("no startup file at {}", path.display());
            return Ok(false);
        }

        let content = fs::read_to_string(path)?;
        for line in content.lines() {
            self.process_line(line);
        }
        tracing::debug!("loaded startup file {}", path.display());
        Ok(true)
    }

    fn process_line(&self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }

        if let Some(def) = line.strip_prefix("export ") {
            self.process_env_var(def);
        } else if let Some(value) = line.strip_prefix("PATH=") {
            self.set_var("PATH", value);
        } else {
            tracing::debug!("ignoring startup line: {}", line);
        }
    }

    fn process_env_var(&self, var_def: &str) {
        if let Some((name, value)) = var_def.split_once('=') {
            let name = name.trim();
            if name.is_empty() {
                return;
            }
            self.set_var(name, value);
        }
    }

    fn set_var(&self, name: &str, value: &str) {
        let value = strip_quotes(value.trim());
        let expanded = expand_value(value);
        env::set_var(name, expanded.as_ref());
    }
}

fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn expand_value(value: &str) -> Cow<'_, str> {
    let mut result = Cow::Borrowed(value);

    for var in ["HOME", "PATH"] {
        let pattern = format!("${}", var);
        if result.contains(&pattern) {
            let replacement = env::var(var).unwrap_or_default();
            result = Cow::Owned(result.replace(&pattern, &replacement));
        }
    }

    result
}
