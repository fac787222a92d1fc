//! Literal offset tables for the structural patterns and their placement.
//!
//! Tables are `(row, col)` offsets. A [`Placement`] turns them into grid
//! coordinates; anything that lands outside the grid is dropped rather than
//! wrapped, so a pattern larger than the board is clipped.

use lifegrid_types::{CellCoord, PatternName};

/// Gosper glider gun.
#[rustfmt::skip]
const GLIDER_GUN: &[(i64, i64)] = &[
    (1, 25),
    (2, 23), (2, 25),
    (3, 13), (3, 14), (3, 21), (3, 22), (3, 35), (3, 36),
    (4, 12), (4, 16), (4, 21), (4, 22), (4, 35), (4, 36),
    (5, 1), (5, 2), (5, 11), (5, 17), (5, 21), (5, 22),
    (6, 1), (6, 2), (6, 11), (6, 15), (6, 17), (6, 18), (6, 23), (6, 25),
    (7, 11), (7, 17), (7, 25),
    (8, 12), (8, 16),
    (9, 13), (9, 14),
];

/// 9x9 nebula figure with a hollow center.
#[rustfmt::skip]
const NEBULA: &[(i64, i64)] = &[
    (0, 0), (0, 1), (0, 3), (0, 4), (0, 5), (0, 6), (0, 7), (0, 8),
    (1, 0), (1, 1), (1, 3), (1, 4), (1, 5), (1, 6), (1, 7), (1, 8),
    (2, 0), (2, 1),
    (3, 0), (3, 1), (3, 7), (3, 8),
    (4, 0), (4, 1), (4, 7), (4, 8),
    (5, 0), (5, 1), (5, 7), (5, 8),
    (6, 7), (6, 8),
    (7, 0), (7, 1), (7, 2), (7, 3), (7, 4), (7, 5), (7, 7), (7, 8),
    (8, 0), (8, 1), (8, 2), (8, 3), (8, 4), (8, 5), (8, 7), (8, 8),
];

/// How a table's offsets map onto the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Add a fixed origin to every offset.
    Anchored {
        /// Row added to each offset.
        row: i64,
        /// Column added to each offset.
        col: i64,
    },
    /// Center the table's bounding box on the grid (rounding toward the
    /// top-left when the slack is odd).
    Centered,
}

/// A structural pattern: its offsets and how to place them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternLayout {
    /// `(row, col)` offsets of the live cells.
    pub cells: &'static [(i64, i64)],
    /// Placement policy.
    pub placement: Placement,
}

/// Layout for a structural pattern, or `None` for `Blank` and `Random`.
pub const fn layout(pattern: PatternName) -> Option<PatternLayout> {
    match pattern {
        PatternName::Blank | PatternName::Random => None,
        PatternName::GliderGun => Some(PatternLayout {
            cells: GLIDER_GUN,
            placement: Placement::Anchored { row: 0, col: 0 },
        }),
        PatternName::Nebula => Some(PatternLayout {
            cells: NEBULA,
            placement: Placement::Centered,
        }),
    }
}

/// Resolve a layout to in-bounds grid coordinates on a `rows x cols` grid.
pub fn place(layout: &PatternLayout, rows: usize, cols: usize) -> Vec<CellCoord> {
    let Some((row_offset, col_offset)) = origin(layout, rows, cols) else {
        return Vec::new();
    };

    layout
        .cells
        .iter()
        .filter_map(|&(r, c)| {
            let row = usize::try_from(r.checked_add(row_offset)?).ok()?;
            let col = usize::try_from(c.checked_add(col_offset)?).ok()?;
            (row < rows && col < cols).then_some(CellCoord::new(row, col))
        })
        .collect()
}

/// Offset added to every table entry.
fn origin(layout: &PatternLayout, rows: usize, cols: usize) -> Option<(i64, i64)> {
    match layout.placement {
        Placement::Anchored { row, col } => Some((row, col)),
        Placement::Centered => {
            let min_row = layout.cells.iter().map(|&(r, _)| r).min()?;
            let max_row = layout.cells.iter().map(|&(r, _)| r).max()?;
            let min_col = layout.cells.iter().map(|&(_, c)| c).min()?;
            let max_col = layout.cells.iter().map(|&(_, c)| c).max()?;
            Some((
                center_offset(rows, min_row, max_row)?,
                center_offset(cols, min_col, max_col)?,
            ))
        }
    }
}

/// `floor((extent - span) / 2) - min`, in signed arithmetic.
fn center_offset(extent: usize, min: i64, max: i64) -> Option<i64> {
    let span = max.checked_sub(min)?.checked_add(1)?;
    let extent = i64::try_from(extent).ok()?;
    extent
        .checked_sub(span)?
        .checked_div_euclid(2)?
        .checked_sub(min)
}
