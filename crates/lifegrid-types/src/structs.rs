//! Plain data structs shared between the core and the renderers.

use serde::{Deserialize, Serialize};

use crate::enums::PatternName;

/// A cell position on the grid, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column.
    pub col: usize,
}

impl CellCoord {
    /// Create a coordinate.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Owned summary of one rendered frame, emitted by the headless renderer.
///
/// The full cell array is omitted; `live_cells` lists only live positions
/// so a 2000-cell board stays compact on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Generation counter at the time of the frame.
    pub generation: u64,
    /// Number of grid rows.
    pub rows: usize,
    /// Number of grid columns.
    pub cols: usize,
    /// Number of live cells.
    pub population: u32,
    /// Live cell positions in row-major order.
    pub live_cells: Vec<CellCoord>,
    /// Population history, oldest first.
    pub history: Vec<u32>,
    /// Whether the periodic timer is armed.
    pub running: bool,
    /// Timer interval in milliseconds while running.
    pub interval_ms: Option<u64>,
    /// The last pattern seeded.
    pub pattern: PatternName,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_pattern_and_cells() {
        let snapshot = FrameSnapshot {
            generation: 3,
            rows: 2,
            cols: 2,
            population: 1,
            live_cells: vec![CellCoord::new(1, 0)],
            history: vec![0, 1],
            running: false,
            interval_ms: None,
            pattern: PatternName::Nebula,
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["pattern"], "nebula");
        assert_eq!(value["live_cells"][0]["row"], 1);
        assert_eq!(value["interval_ms"], serde_json::Value::Null);
    }
}
