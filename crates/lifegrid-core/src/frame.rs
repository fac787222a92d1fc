//! Read-only view handed to renderers after every state change.

use std::time::Duration;

use lifegrid_types::{FrameSnapshot, PatternName};

use crate::grid::GridState;
use crate::history::HistoryTracker;

/// Borrowed view of everything a renderer may draw.
///
/// Renderers receive it by shared reference, so they cannot mutate the
/// grid, the generation or the history.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    /// The grid, including its generation counter.
    pub grid: &'a GridState,
    /// Population history, oldest first.
    pub history: &'a HistoryTracker,
    /// The pattern most recently seeded.
    pub pattern: PatternName,
    /// Interval of the armed timer, if running.
    pub interval: Option<Duration>,
    /// Interval a start request would use.
    pub speed: Duration,
}

impl FrameView<'_> {
    /// Whether the periodic timer is armed.
    pub const fn running(&self) -> bool {
        self.interval.is_some()
    }

    /// Current generation.
    pub const fn generation(&self) -> u64 {
        self.grid.generation()
    }

    /// Current live cell count.
    pub fn population(&self) -> u32 {
        self.grid.count_alive()
    }

    /// Owned, serializable copy of the frame.
    pub fn to_snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            generation: self.grid.generation(),
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            population: self.grid.count_alive(),
            live_cells: self.grid.live_cells(),
            history: self.history.values().iter().copied().collect(),
            running: self.running(),
            interval_ms: self
                .interval
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            pattern: self.pattern,
        }
    }
}
