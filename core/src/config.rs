//! Resolver configuration.
//!
//! Controls help rendering and unknown-command suggestions. Every field has a
//! default, so a YAML file only needs the keys it changes.
//!
//! # Example YAML
//!
//! ```yaml
//! help:
//!   wrap_width: 100
//!   help_tokens: ["-h", "--help"]
//! suggest:
//!   limit: 5
//!   max_distance: 3
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Help detection and layout settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpConfig {
    /// Column at which subcommand descriptions wrap.
    pub wrap_width: usize,
    /// Tokens that request help when they appear anywhere before `--`.
    ///
    /// This list only adds exact-match tokens. An undeclared `-h`, `-help`,
    /// `--h` or `--help` flag (including `--help=x`) still requests help
    /// through the flag parser whatever the list holds; declare a flag named
    /// `h` or `help` to take those names over.
    pub help_tokens: Vec<String>,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            wrap_width: 80,
            help_tokens: ["-h", "--h", "-help", "--help"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl HelpConfig {
    /// Returns `true` if `token` is one of the configured help tokens.
    pub fn is_help_token(&self, token: &str) -> bool {
        self.help_tokens.iter().any(|t| t == token)
    }
}

/// Unknown-command suggestion settings.
///
/// # Examples
///
/// ```
/// # use cmdtree_core::SuggestConfig;
/// let suggest = SuggestConfig::default();
/// assert_eq!(suggest.limit, 3);
/// assert_eq!(suggest.max_distance, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    /// Maximum number of suggestions offered.
    pub limit: usize,
    /// Largest edit distance still considered similar.
    pub max_distance: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            limit: 3,
            max_distance: 2,
        }
    }
}

/// Top-level configuration carried by a [`Resolver`](crate::Resolver).
///
/// # Examples
///
/// ```
/// use cmdtree_core::Config;
///
/// let config = Config::from_yaml_str("suggest:\n  limit: 1\n").unwrap();
/// assert_eq!(config.suggest.limit, 1);
/// assert_eq!(config.suggest.max_distance, 2);
/// assert_eq!(config.help.wrap_width, 80);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Help settings.
    pub help: HelpConfig,
    /// Suggestion settings.
    pub suggest: SuggestConfig,
}

impl Config {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or [`Error::Config`]
    /// if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader).map_err(|err| Error::Config(err.to_string()))
    }

    /// Parses configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|err| Error::Config(err.to_string()))
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self).map_err(|err| Error::Config(err.to_string()))
    }
}
