//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use serde::Deserialize;

use crate::backend::mesh::Viewer;
use crate::error::ConfigError;

/// Log levels accepted in `logging.level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Viewer settings.
    #[serde(default)]
    pub viewer: ViewerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        if let Some(ref command) = self.viewer.command {
            if command.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: "viewer.command must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// External viewer configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewerConfig {
    /// Program that displays shape files. Display is skipped when unset.
    #[serde(default)]
    pub command: Option<String>,

    /// Arguments passed before the shape file paths.
    #[serde(default)]
    pub args: Vec<String>,
}

impl ViewerConfig {
    /// Builds the viewer described by this configuration, if any.
    #[must_use]
    pub fn to_viewer(&self) -> Option<Viewer> {
        self.command
            .as_ref()
            .map(|command| Viewer::new(command.clone(), self.args.clone()))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
