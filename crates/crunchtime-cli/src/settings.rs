//! Configuration file and log level handling
//!
//! Settings come from an optional TOML file:
//!
//! ```toml
//! log_level = "verbose"   # off | errors | normal | verbose
//! seed = 42               # random tie-breaking; omit for deterministic order
//! ```
//!
//! Command-line flags override the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// File read when `--config` is not given, if present
pub const DEFAULT_CONFIG_FILE: &str = "crunchtime.toml";

/// How much the tool logs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Errors,
    #[default]
    Normal,
    Verbose,
}

/// Filter directives from quietest to noisiest
const LADDER: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

impl LogLevel {
    fn rung(self) -> usize {
        match self {
            LogLevel::Off => 0,
            LogLevel::Errors => 1,
            LogLevel::Normal => 3,
            LogLevel::Verbose => 4,
        }
    }

    /// `EnvFilter` directive, raised one rung per `-v`
    pub fn directive(self, verbosity: u8) -> &'static str {
        let rung = (self.rung() + usize::from(verbosity)).min(LADDER.len() - 1);
        LADDER[rung]
    }
}

/// Contents of the configuration file
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub log_level: LogLevel,
    pub seed: Option<u64>,
}

impl Settings {
    pub fn parse(input: &str) -> Result<Self> {
        toml::from_str(input).context("Invalid configuration")
    }

    /// Load `explicit`, or the default file when it exists, or defaults.
    ///
    /// An explicit path that cannot be read is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path: PathBuf = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read configuration {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("In {}", path.display()))
    }
}
