use crate::error::ShellError;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct Flags {
    flags: BTreeMap<&'static str, Flag>,
}

#[derive(Debug, Clone)]
pub struct Flag {
    pub short: &'static str,
    pub long: &'static str,
    pub description: &'static str,
    pub takes_value: bool,
    pub value: Option<String>,
}

impl Flag {
    fn switch(short: &'static str, long: &'static str, description: &'static str) -> Self {
        Flag {
            short,
            long,
            description,
            takes_value: false,
            value: None,
        }
    }
}

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}

impl Flags {
    pub fn new() -> Self {
        let mut flags = BTreeMap::new();

        flags.insert("help", Flag::switch("-h", "--help", "Print this help message"));
        flags.insert(
            "version",
            Flag::switch("-v", "--version", "Show version information"),
        );
        flags.insert(
            "config",
            Flag {
                takes_value: true,
                ..Flag::switch("-c", "--config", "Read this startup file instead of ~/.tshrc")
            },
        );
        flags.insert(
            "quiet",
            Flag::switch("-q", "--quiet", "Suppress error reports and exit statuses"),
        );
        flags.insert("debug", Flag::switch("-d", "--debug", "Enable debug logging"));

        Flags { flags }
    }

    pub fn parse(&mut self, args: &[String]) -> Result<(), ShellError> {
        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];

            if let Some(flag) = self
                .flags
                .values_mut()
                .find(|f| arg == f.short || arg == f.long)
            {
                if flag.takes_value {
                    let value = args.get(i + 1).ok_or_else(|| {
                        ShellError::FlagError(format!("Flag {} requires a value", arg))
                    })?;
                    flag.value = Some(value.clone());
                    i += 1;
                } else {
                    flag.value = Some("true".to_string());
                }
            }
            i += 1;
        }
        Ok(())
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.flags
            .get(name)
            .and_then(|f| f.value.as_ref())
            .is_some()
    }

    pub fn get_value(&self, name: &str) -> Option<&String> {
        self.flags.get(name).and_then(|f| f.value.as_ref())
    }

    pub fn print_help(&self) {
        println!("Usage: tsh [OPTIONS]");
        println!("\nOptions:");
        for flag in self.flags.values() {
            let long = if flag.takes_value {
                format!("{} <file>", flag.long)
            } else {
                flag.long.to_string()
            };
            println!("  {}, {:<18} {}", flag.short, long, flag.description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_switches() {
        let mut flags = Flags::new();
        flags.parse(&args(&["-q", "--debug"])).unwrap();

        assert!(flags.is_set("quiet"));
        assert!(flags.is_set("debug"));
        assert!(!flags.is_set("help"));
    }

    #[test]
    fn test_config_value() {
        let mut flags = Flags::new();
        flags.parse(&args(&["-c", "/tmp/rc", "-q"])).unwrap();

        assert_eq!(flags.get_value("config").map(String::as_str), Some("/tmp/rc"));
        assert!(flags.is_set("quiet"));
    }

    #[test]
    fn test_config_requires_value() {
        let mut flags = Flags::new();
        assert!(matches!(
            flags.parse(&args(&["--config"])),
            Err(ShellError::FlagError(_))
        ));
    }

    #[test]
    fn test_unknown_flag_ignored() {
        let mut flags = Flags::new();
        flags.parse(&args(&["--frobnicate"])).unwrap();
        assert!(!flags.is_set("frobnicate"));
    }
}
