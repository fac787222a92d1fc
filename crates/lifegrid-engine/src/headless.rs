//! Headless front end: one JSON frame per line.
//!
//! The timer is started before the first frame and the session runs until
//! `engine.max_generations` is reached or the process receives Ctrl-C.
//! Each line is a serialized [`FrameSnapshot`](lifegrid_types::FrameSnapshot).

use std::io::{self, Write};

use lifegrid_core::config::EngineConfig;
use lifegrid_core::control::{Command, Controller};
use lifegrid_core::frame::FrameView;
use lifegrid_core::runner::{self, FrameCallback, SessionResult};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::EngineError;

/// Writes each frame as a JSON line.
pub struct JsonLinesRenderer<W> {
    out: W,
    frames: u64,
}

impl<W: Write + Send> JsonLinesRenderer<W> {
    /// Create a renderer writing to `out`.
    pub const fn new(out: W) -> Self {
        Self { out, frames: 0 }
    }

    /// Number of frames written so far.
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}

impl<W: Write + Send> FrameCallback for JsonLinesRenderer<W> {
    fn on_frame(&mut self, frame: &FrameView<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, &frame.to_snapshot())?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        self.frames = self.frames.saturating_add(1);
        Ok(())
    }
}

/// Run the timer-driven session, writing frames to stdout.
///
/// # Errors
///
/// Returns [`EngineError::Runner`] if the session fails or stdout is closed.
pub async fn run(
    controller: &mut Controller,
    engine: &EngineConfig,
) -> Result<SessionResult, EngineError> {
    let (tx, mut rx) = mpsc::channel(1);
    let signal = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received");
                forward_quit(&tx).await;
            }
            Err(e) => {
                // Holding the sender keeps the session from seeing closed input.
                warn!(error = %e, "Cannot listen for interrupts");
                std::future::pending::<()>().await;
            }
        }
    });

    if engine.max_generations == 0 {
        info!("No generation limit set, running until interrupted");
    }
    controller.start(None);

    let mut renderer = JsonLinesRenderer::new(io::stdout());
    let result =
        runner::run_session(controller, &mut rx, &mut renderer, engine.max_generations).await;
    signal.abort();

    info!(frames = renderer.frames(), "Headless session finished");
    Ok(result?)
}

/// Ask the session to quit. Returns whether the session was still listening.
async fn forward_quit(tx: &mpsc::Sender<Command>) -> bool {
    if tx.send(Command::Quit).await.is_err() {
        debug!("Session already finished, interrupt ignored");
        return false;
    }
    true
}
