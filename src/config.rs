//! Application configuration.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. `config.toml` in the platform config directory, or the file given
//!    with `--config`
//! 3. Environment variables prefixed `DUPEMARK_` (e.g. `DUPEMARK_JOBS=4`)
//! 4. Command-line flags (applied by the caller)
//!
//! ```toml
//! marker_suffix = ".dupe"
//! tag_digest = true
//! jobs = 4
//! follow_symlinks = false
//! skip_hidden = true
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actions::MarkConfig;
use crate::scanner::{WalkerConfig, DEFAULT_MARKER_SUFFIX};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "DUPEMARK_";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer could not be read or did not match the schema.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// The marker suffix is empty.
    #[error("Marker suffix must not be empty")]
    EmptySuffix,

    /// The marker suffix would move files into another directory.
    #[error("Marker suffix must not contain a path separator: {0:?}")]
    SuffixHasSeparator(String),

    /// Zero jobs requested.
    #[error("Number of jobs must be at least 1")]
    ZeroJobs,
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        Self::Load(Box::new(error))
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Suffix appended to marked duplicates.
    pub marker_suffix: String,
    /// Embed the first 8 digest bytes (hex) in marked names.
    pub tag_digest: bool,
    /// Directories processed concurrently.
    pub jobs: usize,
    /// Follow symbolic links while walking.
    pub follow_symlinks: bool,
    /// Skip entries whose name starts with a dot.
    pub skip_hidden: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            marker_suffix: DEFAULT_MARKER_SUFFIX.to_string(),
            tag_digest: true,
            jobs: 1,
            follow_symlinks: false,
            skip_hidden: false,
        }
    }
}

impl Config {
    /// Load with an explicit config file, falling back to the default path.
    ///
    /// A missing file at the default path is not an error; a missing file
    /// given explicitly is. The result is not validated: command-line flags
    /// are applied on top first, then [`Config::validate`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if a layer is malformed.
    pub fn load_from_path(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match path {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                figment = figment.merge(Toml::file_exact(path));
            }
            None => {
                if let Some(default_path) = Self::config_path() {
                    log::debug!("Checking for configuration at {}", default_path.display());
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(config)
    }

    /// Check the settings for values that cannot work.
    ///
    /// # Errors
    ///
    /// Empty suffix, suffix with a path separator, or zero jobs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.marker_suffix.is_empty() {
            return Err(ConfigError::EmptySuffix);
        }
        if self.marker_suffix.contains(std::path::is_separator) {
            return Err(ConfigError::SuffixHasSeparator(self.marker_suffix.clone()));
        }
        if self.jobs == 0 {
            return Err(ConfigError::ZeroJobs);
        }
        Ok(())
    }

    /// Default platform-specific config file path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "dupemark", "dupemark")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Walker settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::default()
            .with_marker_suffix(self.marker_suffix.clone())
            .with_follow_symlinks(self.follow_symlinks)
            .with_skip_hidden(self.skip_hidden)
    }

    /// Rename settings derived from this configuration.
    #[must_use]
    pub fn mark_config(&self) -> MarkConfig {
        MarkConfig::default()
            .with_marker_suffix(self.marker_suffix.clone())
            .with_tag_digest(self.tag_digest)
    }
}
