//! Session loop: timer ticks and user commands, one at a time.
//!
//! [`run_session`] waits on two sources with `tokio::select!`:
//!
//! - the [`Scheduler`](crate::scheduler::Scheduler) tick, which only fires
//!   while the timer is armed;
//! - the command channel fed by the input side of the engine.
//!
//! Whichever wins is applied to the [`Controller`] to completion, then the
//! frame callback is invoked. Generation steps never overlap and a renderer
//! always sees a consistent frame.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::info;

use crate::control::{Command, CommandOutcome, ControlError, Controller};
use crate::frame::FrameView;
use crate::generation::GenerationSummary;

/// Errors that end a session abnormally.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A control operation failed unrecoverably.
    #[error("control error: {source}")]
    Control {
        /// The underlying control error.
        #[from]
        source: ControlError,
    },

    /// The frame callback could not draw.
    #[error("render error: {source}")]
    Render {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEndReason {
    /// A quit command was received.
    Quit,
    /// The configured generation limit was reached.
    GenerationLimit,
    /// Every command sender was dropped.
    InputClosed,
}

/// Outcome of a finished session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResult {
    /// Why the session ended.
    pub end_reason: SessionEndReason,
    /// Generations advanced during the session, timer and manual combined.
    pub generations_run: u64,
    /// Generation counter when the session ended.
    pub final_generation: u64,
    /// Live cells when the session ended.
    pub final_population: u32,
    /// When the session loop started.
    pub started_at: DateTime<Utc>,
    /// When the session loop returned.
    pub finished_at: DateTime<Utc>,
}

impl SessionResult {
    /// Wall-clock length of the session in milliseconds.
    pub fn elapsed_ms(&self) -> i64 {
        self.finished_at
            .signed_duration_since(self.started_at)
            .num_milliseconds()
    }
}

/// Receives every frame the session produces.
///
/// Called once before the first command and again after every change, with
/// a read-only view of the grid.
pub trait FrameCallback: Send {
    /// Draw or record one frame.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the frame cannot be written; this ends the
    /// session.
    fn on_frame(&mut self, frame: &FrameView<'_>) -> std::io::Result<()>;
}

/// A frame callback that draws nothing.
pub struct NoOpCallback;

impl FrameCallback for NoOpCallback {
    fn on_frame(&mut self, _frame: &FrameView<'_>) -> std::io::Result<()> {
        Ok(())
    }
}

/// Running totals kept by the loop.
struct Progress {
    started_at: DateTime<Utc>,
    generations_run: u64,
    max_generations: u64,
}

impl Progress {
    fn record(&mut self, summary: &GenerationSummary) -> bool {
        self.generations_run = self.generations_run.saturating_add(1);
        if self.max_generations > 0 && self.generations_run >= self.max_generations {
            info!(
                generation = summary.generation,
                max_generations = self.max_generations,
                "Generation limit reached"
            );
            return true;
        }
        false
    }

    fn finish(&self, controller: &Controller, end_reason: SessionEndReason) -> SessionResult {
        let grid = controller.simulation().grid();
        SessionResult {
            end_reason,
            generations_run: self.generations_run,
            final_generation: grid.generation(),
            final_population: grid.count_alive(),
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Run the session until quit, the generation limit, or input closes.
///
/// `max_generations` of 0 means unlimited. Rejected commands (a manual step
/// while running, a toggle outside the grid) are logged and skipped. The
/// timer is disarmed when the session ends.
///
/// # Errors
///
/// Returns [`RunnerError`] if a step fails unrecoverably or the callback
/// cannot draw.
pub async fn run_session(
    controller: &mut Controller,
    commands: &mut mpsc::Receiver<Command>,
    callback: &mut dyn FrameCallback,
    max_generations: u64,
) -> Result<SessionResult, RunnerError> {
    let mut progress = Progress {
        started_at: Utc::now(),
        generations_run: 0,
        max_generations,
    };

    info!(
        rows = controller.simulation().grid().rows(),
        cols = controller.simulation().grid().cols(),
        pattern = %controller.simulation().pattern(),
        interval_ms = controller.speed().as_millis(),
        max_generations,
        "Session starting"
    );

    callback.on_frame(&controller.view())?;

    let end_reason = loop {
        tokio::select! {
            () = controller.scheduler_mut().tick() => {
                let summary = controller.tick()?;
                callback.on_frame(&controller.view())?;
                if progress.record(&summary) {
                    break SessionEndReason::GenerationLimit;
                }
            }
            received = commands.recv() => {
                let Some(command) = received else {
                    break SessionEndReason::InputClosed;
                };
                match controller.apply_or_warn(command)? {
                    CommandOutcome::Quit => break SessionEndReason::Quit,
                    CommandOutcome::Advanced(summary) => {
                        callback.on_frame(&controller.view())?;
                        if progress.record(&summary) {
                            break SessionEndReason::GenerationLimit;
                        }
                    }
                    CommandOutcome::Changed => callback.on_frame(&controller.view())?,
                    CommandOutcome::Unchanged => {}
                }
            }
        }
    };

    controller.stop();
    Ok(progress.finish(controller, end_reason))
}

/// Log the end of a session.
pub fn log_session_end(result: &SessionResult) {
    info!(
        reason = ?result.end_reason,
        generations_run = result.generations_run,
        final_generation = result.final_generation,
        final_population = result.final_population,
        elapsed_ms = result.elapsed_ms(),
        "Session ended"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lifegrid_types::{CellCoord, PatternName};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::config::{GridConfig, HistoryConfig};
    use crate::generation::Simulation;
    use crate::scheduler::Speed;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<(u64, bool, u32)>,
    }

    impl FrameCallback for Recorder {
        fn on_frame(&mut self, frame: &FrameView<'_>) -> std::io::Result<()> {
            self.frames
                .push((frame.generation(), frame.running(), frame.population()));
            Ok(())
        }
    }

    fn controller(pattern: PatternName) -> Controller {
        let mut sim = Simulation::with_rng(
            &GridConfig::default(),
            &HistoryConfig::default(),
            StdRng::seed_from_u64(17),
        )
        .unwrap();
        sim.seed(pattern);
        Controller::new(sim, Speed::from_millis(50))
    }

    #[tokio::test(start_paused = true)]
    async fn quit_ends_session() {
        let mut ctl = controller(PatternName::Blank);
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(Command::Quit).await.unwrap();

        let mut recorder = Recorder::default();
        let result = run_session(&mut ctl, &mut rx, &mut recorder, 0).await.unwrap();

        assert_eq!(result.end_reason, SessionEndReason::Quit);
        assert_eq!(result.generations_run, 0);
        assert_eq!(recorder.frames, vec![(0, false, 0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_ends_session() {
        let mut ctl = controller(PatternName::Blank);
        let (tx, mut rx) = mpsc::channel::<Command>(1);
        drop(tx);

        let result = run_session(&mut ctl, &mut rx, &mut NoOpCallback, 0)
            .await
            .unwrap();
        assert_eq!(result.end_reason, SessionEndReason::InputClosed);
    }

    #[tokio::test(start_paused = true)]
    async fn timer_runs_until_generation_limit() {
        let mut ctl = controller(PatternName::GliderGun);
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(Command::Start { speed: None }).await.unwrap();

        let mut recorder = Recorder::default();
        let result = run_session(&mut ctl, &mut rx, &mut recorder, 5).await.unwrap();

        assert_eq!(result.end_reason, SessionEndReason::GenerationLimit);
        assert_eq!(result.generations_run, 5);
        assert_eq!(result.final_generation, 5);
        assert!(!ctl.is_running());
        assert_eq!(ctl.simulation().history().len(), 5);

        let generations: Vec<u64> = recorder.frames.iter().map(|f| f.0).collect();
        assert_eq!(generations, vec![0, 0, 1, 2, 3, 4, 5]);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn step_while_running_is_skipped() {
        let mut ctl = controller(PatternName::Nebula);
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(Command::Start { speed: None }).await.unwrap();
        tx.send(Command::Step).await.unwrap();

        let result = run_session(&mut ctl, &mut rx, &mut NoOpCallback, 3)
            .await
            .unwrap();

        assert_eq!(result.end_reason, SessionEndReason::GenerationLimit);
        assert_eq!(result.final_generation, 3);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_steps_count_toward_limit() {
        let mut ctl = controller(PatternName::Blank);
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(Command::Toggle(CellCoord::new(0, 0))).await.unwrap();
        tx.send(Command::Step).await.unwrap();
        tx.send(Command::Step).await.unwrap();

        let mut recorder = Recorder::default();
        let result = run_session(&mut ctl, &mut rx, &mut recorder, 2).await.unwrap();

        assert_eq!(result.end_reason, SessionEndReason::GenerationLimit);
        assert_eq!(result.final_generation, 2);
        assert_eq!(result.final_population, 0);
        assert_eq!(
            recorder.frames,
            vec![(0, false, 0), (0, false, 1), (1, false, 0), (2, false, 0)]
        );
        drop(tx);
    }
}
