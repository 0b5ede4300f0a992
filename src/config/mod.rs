//! `owsc.toml` output configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::CompileOptions;

/// Name of the configuration file searched for next to the input.
pub const CONFIG_FILE: &str = "owsc.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("indent_size must be between 1 and 16, got {0}")]
    IndentSize(usize),
}

/// Contents of an `owsc.toml` file. Every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output: OutputConfig,
}

/// `[output]` section.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Spaces per nesting level.
    pub indent_size: usize,
    /// Emit the generator preamble rule.
    pub preamble: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let defaults = CompileOptions::default();
        Self {
            indent_size: defaults.indent_size,
            preamble: defaults.preamble,
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn parse(content: &str, path: &Path) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if !(1..=16).contains(&config.output.indent_size) {
            return Err(ConfigError::IndentSize(config.output.indent_size));
        }
        Ok(config)
    }

    /// Load configuration from an `owsc.toml` file.
    pub fn load(toml_path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(toml_path).map_err(|source| ConfigError::Io {
            path: toml_path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, toml_path)
    }

    /// Try to find an `owsc.toml` in the given directory or its ancestors.
    pub fn find(start_dir: &Path) -> Option<PathBuf> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.exists() {
                return Some(candidate);
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            indent_size: self.output.indent_size,
            preamble: self.output.preamble,
        }
    }
}
