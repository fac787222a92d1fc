//! Control layer: maps user commands onto the simulation and the timer.
//!
//! The [`Controller`] owns the [`Simulation`] and the [`Scheduler`] and is
//! the only thing that mutates either. Every command runs to completion
//! before the next one is looked at, so a renderer never sees a half-applied
//! step.
//!
//! Rules enforced here rather than in the core:
//!
//! - at most one armed timer (start while running is ignored);
//! - manual single-step is rejected while the timer is armed;
//! - reset and pattern selection disarm the timer before seeding;
//! - cell coordinates are range-checked before reaching the grid.

use lifegrid_types::{CellCoord, PatternName};
use tracing::{info, warn};

use crate::frame::FrameView;
use crate::generation::{GenerationSummary, Simulation};
use crate::grid::GridError;
use crate::scheduler::{Scheduler, Speed};

/// A request from the input side of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Arm the timer. `None` uses the controller's current speed.
    Start {
        /// Interval for this run.
        speed: Option<Speed>,
    },
    /// Disarm the timer.
    Stop,
    /// Start if stopped, stop if running.
    ToggleRunning,
    /// Advance one generation by hand (paused only).
    Step,
    /// Re-seed the selected pattern.
    Reset,
    /// Select a pattern and seed it.
    SelectPattern(PatternName),
    /// Flip one cell.
    Toggle(CellCoord),
    /// Halve the interval.
    Faster,
    /// Double the interval.
    Slower,
    /// End the session.
    Quit,
}

/// Errors raised by control operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    /// A manual step was requested while the timer is armed.
    #[error("cannot single-step while the simulation is running")]
    StepWhileRunning,

    /// The grid rejected the operation.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: GridError,
    },
}

impl ControlError {
    /// Whether the command was refused but the session can carry on.
    pub const fn is_rejection(&self) -> bool {
        match self {
            Self::StepWhileRunning => true,
            Self::Grid { source } => matches!(
                source,
                GridError::CoordinateOutOfRange { .. } | GridError::IndexOutOfRange { .. }
            ),
        }
    }
}

/// What a command did, for the session loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// State changed and should be redrawn.
    Changed,
    /// The command produced a new generation.
    Advanced(GenerationSummary),
    /// Nothing changed.
    Unchanged,
    /// The session should end.
    Quit,
}

/// Owner of the simulation and its timer.
#[derive(Debug)]
pub struct Controller {
    simulation: Simulation,
    scheduler: Scheduler,
    speed: Speed,
    selected: PatternName,
}

impl Controller {
    /// Wrap a simulation. The timer starts disarmed.
    pub const fn new(simulation: Simulation, speed: Speed) -> Self {
        let selected = simulation.pattern();
        Self {
            simulation,
            scheduler: Scheduler::new(),
            speed,
            selected,
        }
    }

    /// Arm the timer at `speed`, or the current speed if `None`.
    ///
    /// Returns `false` if it was already armed; the running timer and its
    /// speed are kept.
    pub fn start(&mut self, speed: Option<Speed>) -> bool {
        if self.scheduler.is_running() {
            return false;
        }
        if let Some(speed) = speed {
            self.speed = speed;
        }
        self.scheduler.start(self.speed);
        info!(interval_ms = self.speed.as_millis(), "Timer started");
        true
    }

    /// Disarm the timer. Returns whether it was armed.
    pub fn stop(&mut self) -> bool {
        let stopped = self.scheduler.stop();
        if stopped {
            info!(
                generation = self.simulation.grid().generation(),
                "Timer stopped"
            );
        }
        stopped
    }

    /// Whether the timer is armed.
    pub const fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Speed the next start will use.
    pub const fn speed(&self) -> Speed {
        self.speed
    }

    /// Change the interval. A running timer is re-armed at the new speed.
    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
        if self.scheduler.stop() {
            self.scheduler.start(speed);
        }
        info!(interval_ms = speed.as_millis(), "Speed changed");
    }

    /// Manual single step. Only allowed while paused.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::StepWhileRunning`] if the timer is armed, or
    /// [`ControlError::Grid`] if the generation counter is exhausted.
    pub fn step(&mut self) -> Result<GenerationSummary, ControlError> {
        if self.scheduler.is_running() {
            return Err(ControlError::StepWhileRunning);
        }
        Ok(self.simulation.advance()?)
    }

    /// Timer-driven step.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Grid`] if the generation counter is exhausted.
    pub fn tick(&mut self) -> Result<GenerationSummary, ControlError> {
        Ok(self.simulation.advance()?)
    }

    /// Stop the timer and re-seed the selected pattern.
    pub fn reset(&mut self) {
        self.stop();
        self.simulation.seed(self.selected);
        info!(pattern = %self.selected, "Simulation reset");
    }

    /// Stop the timer, select `pattern` and seed it.
    pub fn select_pattern(&mut self, pattern: PatternName) {
        self.selected = pattern;
        self.reset();
    }

    /// The pattern a reset will seed.
    pub const fn selected(&self) -> PatternName {
        self.selected
    }

    /// Flip the cell at `coord`. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Grid`] if `coord` lies outside the grid.
    pub fn toggle(&mut self, coord: CellCoord) -> Result<bool, ControlError> {
        Ok(self.simulation.toggle(coord.row, coord.col)?)
    }

    /// Apply one command.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying operation. Rejections (see
    /// [`ControlError::is_rejection`]) leave all state unchanged.
    pub fn apply(&mut self, command: Command) -> Result<CommandOutcome, ControlError> {
        let outcome = match command {
            Command::Start { speed } => {
                if self.start(speed) {
                    CommandOutcome::Changed
                } else {
                    CommandOutcome::Unchanged
                }
            }
            Command::Stop => {
                if self.stop() {
                    CommandOutcome::Changed
                } else {
                    CommandOutcome::Unchanged
                }
            }
            Command::ToggleRunning => {
                if !self.stop() {
                    self.start(None);
                }
                CommandOutcome::Changed
            }
            Command::Step => CommandOutcome::Advanced(self.step()?),
            Command::Reset => {
                self.reset();
                CommandOutcome::Changed
            }
            Command::SelectPattern(pattern) => {
                self.select_pattern(pattern);
                CommandOutcome::Changed
            }
            Command::Toggle(coord) => {
                self.toggle(coord)?;
                CommandOutcome::Changed
            }
            Command::Faster => {
                self.set_speed(self.speed.faster());
                CommandOutcome::Changed
            }
            Command::Slower => {
                self.set_speed(self.speed.slower());
                CommandOutcome::Changed
            }
            Command::Quit => CommandOutcome::Quit,
        };
        Ok(outcome)
    }

    /// Apply a command, logging and swallowing rejections.
    ///
    /// # Errors
    ///
    /// Returns only errors that are not rejections.
    pub fn apply_or_warn(&mut self, command: Command) -> Result<CommandOutcome, ControlError> {
        match self.apply(command) {
            Err(err) if err.is_rejection() => {
                warn!(?command, error = %err, "Command rejected");
                Ok(CommandOutcome::Unchanged)
            }
            other => other,
        }
    }

    /// The simulation.
    pub const fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// The scheduler, for awaiting the next tick.
    pub const fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// Borrow the current frame for rendering.
    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            grid: self.simulation.grid(),
            history: self.simulation.history(),
            pattern: self.simulation.pattern(),
            interval: self.scheduler.speed().map(Speed::as_duration),
            speed: self.speed.as_duration(),
        }
    }
}
