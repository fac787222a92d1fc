//! Lifegrid binary.
//!
//! Loads `lifegrid-config.yaml`, builds the simulation and hands it to one
//! of two front ends:
//!
//! - **terminal**: an interactive crossterm board with a population chart;
//! - **headless**: one JSON frame per line on stdout, timer started at once.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (`LIFEGRID_CONFIG` overrides the path;
//!    `LIFEGRID_SPEED` and `LIFEGRID_PATTERN` override single values)
//! 2. Initialize structured logging (tracing)
//! 3. Build the simulation and seed the initial pattern
//! 4. Run the session for the configured mode
//! 5. Log the result

mod error;
mod headless;
mod input;
mod terminal;

use std::ffi::OsString;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use lifegrid_core::config::{EngineMode, LifegridConfig, LoggingConfig};
use lifegrid_core::control::Controller;
use lifegrid_core::generation::Simulation;
use lifegrid_core::runner;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Environment variable overriding the config file path.
const CONFIG_ENV_VAR: &str = "LIFEGRID_CONFIG";

/// Default config file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "lifegrid-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, logging, terminal setup or the
/// session itself fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is configured from it, so it comes first.
    let (config, config_found) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging, config.engine.mode)?;
    info!("lifegrid-engine starting");
    if !config_found {
        info!("Config file not found, using defaults");
    }
    info!(
        rows = config.grid.rows,
        cols = config.grid.cols,
        history_capacity = config.history.capacity,
        interval_ms = config.timer.default_speed().as_millis(),
        mode = ?config.engine.mode,
        "Configuration loaded"
    );

    // 3. Build the simulation.
    let mut simulation = Simulation::new(&config.grid, &config.history)?;
    simulation.seed(config.grid.initial_pattern);
    let mut controller = Controller::new(simulation, config.timer.default_speed());

    // 4. Run the session.
    let result = match config.engine.mode {
        EngineMode::Terminal => terminal::run(&mut controller, &config.engine).await?,
        EngineMode::Headless => headless::run(&mut controller, &config.engine).await?,
    };

    // 5. Log the result.
    runner::log_session_end(&result);
    Ok(())
}

/// Load configuration, falling back to defaults when the file is absent.
///
/// The second value reports whether a file was read.
fn load_config() -> Result<(LifegridConfig, bool), EngineError> {
    let path = config_path(std::env::var_os(CONFIG_ENV_VAR));
    if path.exists() {
        Ok((LifegridConfig::from_file(&path)?, true))
    } else {
        let mut config = LifegridConfig::default();
        config.apply_env_overrides()?;
        Ok((config, false))
    }
}

/// Config file path: the `LIFEGRID_CONFIG` value when set, else the default.
fn config_path(raw: Option<OsString>) -> PathBuf {
    raw.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `logging.level`. The terminal board owns stdout
/// and stderr, so terminal mode logs to `logging.file`; headless mode keeps
/// stdout for frames and logs to stderr.
fn init_logging(config: &LoggingConfig, mode: EngineMode) -> Result<(), EngineError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match mode {
        EngineMode::Terminal => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(&config.file)?;
            let writer = Mutex::new(file);
            if config.json {
                builder.json().with_writer(writer).try_init()
            } else {
                builder.with_ansi(false).with_writer(writer).try_init()
            }
        }
        EngineMode::Headless => {
            if config.json {
                builder.json().with_writer(std::io::stderr).try_init()
            } else {
                builder.with_writer(std::io::stderr).try_init()
            }
        }
    };

    installed.map_err(|e| EngineError::Logging {
        message: format!("{e}"),
    })
}
