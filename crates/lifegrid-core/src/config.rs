//! Configuration loading and typed config structures for Lifegrid.
//!
//! The configuration lives in `lifegrid-config.yaml` at the project root.
//! Every field has a default, so a missing file, an empty file or a file
//! that sets a single key are all valid.

use std::path::Path;

use lifegrid_types::{PatternName, UnknownPatternError};
use serde::Deserialize;

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::scheduler::{DEFAULT_INTERVAL_MS, Speed};

/// Environment variable overriding `timer.default_interval_ms`.
pub const SPEED_ENV_VAR: &str = "LIFEGRID_SPEED";

/// Environment variable overriding `grid.initial_pattern`.
pub const PATTERN_ENV_VAR: &str = "LIFEGRID_PATTERN";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A pattern override names no known pattern.
    #[error("invalid LIFEGRID_PATTERN: {source}")]
    Pattern {
        /// The underlying parse error.
        #[from]
        source: UnknownPatternError,
    },

    /// The values parsed but cannot be used.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration, mirroring `lifegrid-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LifegridConfig {
    /// Grid dimensions and seeding.
    #[serde(default)]
    pub grid: GridConfig,

    /// Population history window.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Periodic stepping.
    #[serde(default)]
    pub timer: TimerConfig,

    /// Engine mode and session bounds.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LifegridConfig {
    /// Load configuration from a YAML file, then apply environment overrides
    /// and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML,
    /// [`ConfigError::Pattern`] if `LIFEGRID_PATTERN` is unknown, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `LIFEGRID_SPEED` and `LIFEGRID_PATTERN` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pattern`] if `LIFEGRID_PATTERN` is unknown.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.timer
            .apply_speed_override(std::env::var(SPEED_ENV_VAR).ok().as_deref());
        self.grid
            .apply_pattern_override(std::env::var(PATTERN_ENV_VAR).ok().as_deref())
    }

    /// Reject values the simulation cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| Err(ConfigError::Invalid { reason });

        if self.grid.rows == 0 || self.grid.cols == 0 {
            return invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid.rows, self.grid.cols
            ));
        }
        if !(0.0..=1.0).contains(&self.grid.random_density) {
            return invalid(format!(
                "grid.random_density must be within [0, 1], got {}",
                self.grid.random_density
            ));
        }
        if self.history.capacity == 0 {
            return invalid("history.capacity must be at least 1".to_owned());
        }
        Ok(())
    }
}

/// Grid dimensions and seeding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GridConfig {
    /// Number of rows.
    #[serde(default = "default_rows")]
    pub rows: usize,

    /// Number of columns.
    #[serde(default = "default_cols")]
    pub cols: usize,

    /// Probability that a cell is live after a random seed.
    #[serde(default = "default_random_density")]
    pub random_density: f64,

    /// Seed for the random pattern source. Unset means seed from the OS.
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Pattern applied at startup.
    #[serde(default)]
    pub initial_pattern: PatternName,
}

impl GridConfig {
    /// Replace the initial pattern with `raw` when present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pattern`] if `raw` names no known pattern; the
    /// configured pattern is left as it was.
    pub fn apply_pattern_override(&mut self, raw: Option<&str>) -> Result<(), ConfigError> {
        if let Some(raw) = raw {
            self.initial_pattern = raw.parse()?;
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            random_density: default_random_density(),
            random_seed: None,
            initial_pattern: PatternName::Blank,
        }
    }
}

/// Population history window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryConfig {
    /// Number of generations kept for the chart.
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

/// Periodic stepping configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimerConfig {
    /// Interval used when a start request carries no speed. Clamped to the
    /// 10 ms floor when converted to a [`Speed`].
    #[serde(default = "default_interval_ms")]
    pub default_interval_ms: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_interval_ms: default_interval_ms(),
        }
    }
}

impl TimerConfig {
    /// Override the default interval with `raw` when present.
    ///
    /// The value goes through [`Speed::parse`], so junk falls back to the
    /// 200 ms default rather than failing.
    pub fn apply_speed_override(&mut self, raw: Option<&str>) {
        if let Some(raw) = raw {
            self.default_interval_ms = Speed::parse(raw).as_millis();
        }
    }

    /// The configured default as a clamped [`Speed`].
    pub fn default_speed(&self) -> Speed {
        Speed::from_millis(self.default_interval_ms)
    }
}

/// How the engine presents the simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    /// Interactive terminal board.
    #[default]
    Terminal,
    /// JSON lines on stdout, no input.
    Headless,
}

/// Engine mode and session bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Presentation mode.
    #[serde(default)]
    pub mode: EngineMode,

    /// Stop the session after this many generations (0 = unlimited).
    #[serde(default)]
    pub max_generations: u64,

    /// Start the timer immediately. Headless mode always starts it.
    #[serde(default)]
    pub autostart: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: EngineMode::Terminal,
            max_generations: 0,
            autostart: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error) used when
    /// `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file used in terminal mode, where stderr would corrupt the board.
    #[serde(default = "default_log_file")]
    pub file: String,

    /// Emit JSON log records instead of human-readable lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_rows() -> usize {
    40
}

const fn default_cols() -> usize {
    50
}

const fn default_random_density() -> f64 {
    0.33
}

const fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

const fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_file() -> String {
    "lifegrid.log".to_owned()
}
