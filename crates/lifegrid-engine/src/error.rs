//! Error types for the Lifegrid binary.
//!
//! [`EngineError`] wraps every failure that can stop the engine during
//! startup or while a session runs.

/// Top-level error for the Lifegrid binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: lifegrid_core::config::ConfigError,
    },

    /// The grid could not be built from the configured dimensions.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: lifegrid_core::grid::GridError,
    },

    /// The session loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: lifegrid_core::runner::RunnerError,
    },

    /// Terminal setup or the log file failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The tracing subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
