//! Population chart layout.
//!
//! Turns the history window into bars a renderer can draw without knowing
//! the scaling rules. Heights are fractions of the larger of the board size
//! and the history peak, so a full board reaches the top of the chart.
//! Colors fade from blue (oldest) to red (newest).

use crate::history::HistoryTracker;

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

/// One bar of the population chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Position in the history window, oldest first.
    pub index: usize,
    /// Population recorded at that position.
    pub value: u32,
    /// Height as a fraction of the chart, in `(0, 1]`.
    pub height: f64,
    /// Fill color.
    pub color: Rgb,
}

impl Bar {
    /// Height in whole rows of a chart `rows` tall. Never zero.
    // Clamped to [1, rows] before the cast.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn scaled_rows(&self, rows: u16) -> u16 {
        let top = f64::from(rows.max(1));
        (self.height * top).ceil().clamp(1.0, top) as u16
    }
}

/// Lay out bars for `history` on a board of `cell_count` cells.
///
/// Zero entries get no bar but keep their index, so the gradient stays tied
/// to position in the window.
pub fn bars(history: &HistoryTracker, cell_count: u32) -> Vec<Bar> {
    let peak = history.peak().unwrap_or(0);
    let scale = f64::from(peak.max(cell_count).max(1));
    let last = history.len().saturating_sub(1).max(1);

    history
        .values()
        .iter()
        .enumerate()
        .filter(|&(_, &value)| value > 0)
        .map(|(index, &value)| Bar {
            index,
            value,
            height: f64::from(value) / scale,
            color: gradient(index, last),
        })
        .collect()
}

/// Blue-to-red ramp: red = `floor(255 * index / last)`, blue = `255 - red`.
fn gradient(index: usize, last: usize) -> Rgb {
    let red = index
        .saturating_mul(255)
        .checked_div(last)
        .map_or(u8::MAX, |v| u8::try_from(v).unwrap_or(u8::MAX));
    Rgb {
        r: red,
        g: 0,
        b: u8::MAX.saturating_sub(red),
    }
}
