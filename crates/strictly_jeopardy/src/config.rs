//! Game configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use serde_with::DurationSecondsWithFrac;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Tunables for a trivia game.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// How long to wait for a category choice before the game ends.
    /// Written in seconds, fractions allowed.
    #[getter(skip)]
    #[serde(
        rename = "selection_timeout_secs",
        default = "default_selection_timeout",
        with = "serde_with::As::<DurationSecondsWithFrac<f64>>"
    )]
    selection_timeout: Duration,

    /// Number of categories drawn for a generated board.
    #[serde(default = "default_categories")]
    categories: usize,

    /// Only consider guesses phrased as questions ("what is ...").
    #[serde(default = "default_require_question_form")]
    require_question_form: bool,
}

#[instrument]
fn default_selection_timeout() -> Duration {
    Duration::from_secs(120)
}

#[instrument]
fn default_categories() -> usize {
    2
}

#[instrument]
fn default_require_question_form() -> bool {
    true
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            selection_timeout: default_selection_timeout(),
            categories: default_categories(),
            require_question_form: default_require_question_form(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        if config.categories == 0 {
            return Err(ConfigError::new("categories must be at least 1".to_string()));
        }
        if config.selection_timeout.is_zero() {
            return Err(ConfigError::new(
                "selection_timeout_secs must be positive".to_string(),
            ));
        }

        info!(
            selection_timeout = ?config.selection_timeout,
            categories = config.categories,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// How long the selection window stays open.
    pub fn selection_timeout(&self) -> Duration {
        self.selection_timeout
    }

    /// Returns a copy with a different selection timeout.
    pub fn with_selection_timeout(mut self, timeout: Duration) -> Self {
        self.selection_timeout = timeout;
        self
    }

    /// Returns a copy with the question-form filter switched on or off.
    pub fn with_question_form(mut self, required: bool) -> Self {
        self.require_question_form = required;
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
