//! Toroidal cell grid and the Life step function.
//!
//! The grid is a flat row-major array of booleans (`k = row * cols + col`)
//! with a parallel scratch array of neighbor counts. Neighbor indices wrap
//! modulo the grid dimensions, so the board has no edges.
//!
//! # Step
//!
//! A step runs in two passes. The first zeroes the scratch counts and, for
//! every live cell, increments the count of each of its eight toroidal
//! neighbors. The second applies the rule to every cell using only those
//! counts. No cell is written until counting is complete, so the result is
//! a pure function of the previous generation.

use lifegrid_types::{CellCoord, PatternName};
use rand::Rng;

use crate::patterns;

/// Errors that can occur during grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The requested dimensions cannot form a grid.
    #[error("invalid grid dimensions {rows}x{cols}: {reason}")]
    InvalidDimensions {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
        /// Explanation of what is wrong with the dimensions.
        reason: String,
    },

    /// A flat cell index is past the end of the grid.
    #[error("cell index {index} out of range (grid has {len} cells)")]
    IndexOutOfRange {
        /// The rejected index.
        index: usize,
        /// Number of cells in the grid.
        len: usize,
    },

    /// A row/column pair lies outside the grid.
    #[error("cell ({row}, {col}) out of range for a {rows}x{cols} grid")]
    CoordinateOutOfRange {
        /// The rejected row.
        row: usize,
        /// The rejected column.
        col: usize,
        /// Number of grid rows.
        rows: usize,
        /// Number of grid columns.
        cols: usize,
    },

    /// The generation counter would overflow.
    #[error("generation counter overflow: cannot advance beyond u64::MAX")]
    GenerationOverflow,
}

/// Cell transitions produced by one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Dead cells that became live.
    pub births: u32,
    /// Live cells that died.
    pub deaths: u32,
}

/// The Life rule: birth on exactly 3 neighbors, survival on 2 or 3.
pub const fn next_state(alive: bool, neighbors: u8) -> bool {
    neighbors == 3 || (alive && neighbors == 2)
}

/// The automaton's cell array, neighbor scratch space and generation counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
    /// Live-neighbor counts for the generation being computed. Never exposed.
    neighbors: Vec<u8>,
    generation: u64,
}

impl GridState {
    /// Create an all-dead grid at generation 0.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] if either dimension is zero
    /// or the cell count does not fit the population counter.
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        let invalid = |reason: &str| GridError::InvalidDimensions {
            rows,
            cols,
            reason: reason.to_owned(),
        };
        if rows == 0 || cols == 0 {
            return Err(invalid("both dimensions must be at least 1"));
        }
        let len = rows
            .checked_mul(cols)
            .ok_or_else(|| invalid("cell count overflows usize"))?;
        if u32::try_from(len).is_err() {
            return Err(invalid("cell count exceeds u32 range"));
        }

        Ok(Self {
            rows,
            cols,
            cells: vec![false; len],
            neighbors: vec![0; len],
            generation: 0,
        })
    }

    /// Number of rows.
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells (`rows * cols`).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: construction rejects empty grids.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Current generation.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The full cell array, row-major.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Flat index of `(row, col)`, or `None` if it lies outside the grid.
    pub fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        row.checked_mul(self.cols)?.checked_add(col)
    }

    /// Whether the cell at `(row, col)` is live. Out-of-range cells read as dead.
    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.index_of(row, col)
            .and_then(|k| self.cells.get(k))
            .copied()
            .unwrap_or(false)
    }

    /// Live cell positions in row-major order.
    pub fn live_cells(&self) -> Vec<CellCoord> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &alive)| alive)
            .filter_map(|(k, _)| {
                let row = k.checked_div(self.cols)?;
                let col = k.checked_rem(self.cols)?;
                Some(CellCoord::new(row, col))
            })
            .collect()
    }

    /// Number of live cells.
    pub fn count_alive(&self) -> u32 {
        let live = self.cells.iter().filter(|&&alive| alive).count();
        // Construction guarantees len fits in u32.
        u32::try_from(live).unwrap_or(u32::MAX)
    }

    /// Flip the cell at flat index `index`. Returns the new state.
    ///
    /// Generation and history are unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::IndexOutOfRange`] if `index >= rows * cols`;
    /// the grid is left untouched.
    pub fn toggle(&mut self, index: usize) -> Result<bool, GridError> {
        let len = self.cells.len();
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(GridError::IndexOutOfRange { index, len })?;
        *cell = !*cell;
        Ok(*cell)
    }

    /// Flip the cell at `(row, col)`. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::CoordinateOutOfRange`] if the coordinate lies
    /// outside the grid.
    pub fn toggle_at(&mut self, row: usize, col: usize) -> Result<bool, GridError> {
        let index = self
            .index_of(row, col)
            .ok_or(GridError::CoordinateOutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })?;
        self.toggle(index)
    }

    /// Kill every cell and reset the generation to 0.
    pub fn clear(&mut self) {
        self.cells.fill(false);
        self.generation = 0;
    }

    /// Clear the grid and apply `pattern`.
    ///
    /// `Random` makes each cell live with probability `density`, drawn from
    /// `rng`. Structural patterns are placed from their offset tables;
    /// coordinates that land outside the grid are dropped, not wrapped.
    pub fn seed<R: Rng>(&mut self, pattern: PatternName, density: f64, rng: &mut R) {
        self.clear();
        match pattern {
            PatternName::Blank => {}
            PatternName::Random => {
                for cell in &mut self.cells {
                    *cell = rng.random::<f64>() < density;
                }
            }
            PatternName::GliderGun | PatternName::Nebula => {
                let Some(layout) = patterns::layout(pattern) else {
                    return;
                };
                for coord in patterns::place(&layout, self.rows, self.cols) {
                    if let Some(cell) = self
                        .index_of(coord.row, coord.col)
                        .and_then(|k| self.cells.get_mut(k))
                    {
                        *cell = true;
                    }
                }
            }
        }
    }

    /// Advance exactly one generation.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::GenerationOverflow`] if the counter is already at
    /// `u64::MAX`; the grid is left at its pre-step state.
    pub fn step(&mut self) -> Result<StepOutcome, GridError> {
        let next_generation = self
            .generation
            .checked_add(1)
            .ok_or(GridError::GenerationOverflow)?;

        self.count_neighbors();

        let mut outcome = StepOutcome::default();
        for (cell, &count) in self.cells.iter_mut().zip(&self.neighbors) {
            let next = next_state(*cell, count);
            match (*cell, next) {
                (false, true) => outcome.births = outcome.births.saturating_add(1),
                (true, false) => outcome.deaths = outcome.deaths.saturating_add(1),
                _ => {}
            }
            *cell = next;
        }

        self.generation = next_generation;
        Ok(outcome)
    }

    /// Recompute the scratch counts from the current cells.
    fn count_neighbors(&mut self) {
        self.neighbors.fill(0);

        let (rows, cols) = (self.rows, self.cols);
        let cells = &self.cells;
        let neighbors = &mut self.neighbors;
        let mut bump = |row: usize, col: usize| {
            let slot = row
                .checked_mul(cols)
                .and_then(|base| base.checked_add(col))
                .and_then(|k| neighbors.get_mut(k));
            if let Some(count) = slot {
                *count = count.saturating_add(1);
            }
        };

        for row in 0..rows {
            let up = wrap_prev(row, rows);
            let down = wrap_next(row, rows);
            for col in 0..cols {
                let alive = row
                    .checked_mul(cols)
                    .and_then(|base| base.checked_add(col))
                    .and_then(|k| cells.get(k))
                    .copied()
                    .unwrap_or(false);
                if !alive {
                    continue;
                }
                let left = wrap_prev(col, cols);
                let right = wrap_next(col, cols);

                bump(up, left);
                bump(up, col);
                bump(up, right);
                bump(row, left);
                bump(row, right);
                bump(down, left);
                bump(down, col);
                bump(down, right);
            }
        }
    }
}

/// Previous index on a ring of `n` slots.
fn wrap_prev(i: usize, n: usize) -> usize {
    i.checked_sub(1).unwrap_or_else(|| n.saturating_sub(1))
}

/// Next index on a ring of `n` slots.
fn wrap_next(i: usize, n: usize) -> usize {
    let next = i.saturating_add(1);
    if next >= n { 0 } else { next }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn grid_with(rows: usize, cols: usize, live: &[(usize, usize)]) -> GridState {
        let mut grid = GridState::new(rows, cols).unwrap();
        for &(r, c) in live {
            grid.toggle_at(r, c).unwrap();
        }
        grid
    }

    /// Per-cell lookup of the eight wrapped neighbors, independent of the
    /// accumulation pass.
    fn lookup_count(grid: &GridState, row: usize, col: usize) -> u8 {
        let mut count = 0;
        for dr in [grid.rows() - 1, 0, 1] {
            for dc in [grid.cols() - 1, 0, 1] {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let r = (row + dr) % grid.rows();
                let c = (col + dc) % grid.cols();
                if grid.is_alive(r, c) {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert!(matches!(
            GridState::new(0, 50),
            Err(GridError::InvalidDimensions { .. })
        ));
        assert!(GridState::new(40, 0).is_err());
    }

    #[test]
    fn new_grid_is_blank_at_generation_zero() {
        let grid = GridState::new(40, 50).unwrap();
        assert_eq!(grid.len(), 2000);
        assert_eq!(grid.generation(), 0);
        assert_eq!(grid.count_alive(), 0);
    }

    #[test]
    fn dead_grid_stays_dead() {
        let mut grid = GridState::new(40, 50).unwrap();
        let outcome = grid.step().unwrap();
        assert_eq!(grid.count_alive(), 0);
        assert_eq!(outcome, StepOutcome::default());
        assert_eq!(grid.generation(), 1);
    }

    #[test]
    fn rule_table() {
        for count in 0..=8u8 {
            assert_eq!(next_state(true, count), count == 2 || count == 3);
            assert_eq!(next_state(false, count), count == 3);
        }
    }

    #[test]
    fn live_cell_survival_depends_on_neighbor_count() {
        // Center (5, 5) plus n neighbors drawn from its ring.
        let ring = [(4, 4), (4, 5), (4, 6), (5, 4), (5, 6), (6, 4), (6, 5), (6, 6)];
        for n in 0..=8 {
            let mut live = vec![(5, 5)];
            live.extend_from_slice(&ring[..n]);
            let mut grid = grid_with(10, 10, &live);
            assert_eq!(usize::from(lookup_count(&grid, 5, 5)), n);
            grid.step().unwrap();
            assert_eq!(grid.is_alive(5, 5), n == 2 || n == 3, "n = {n}");
        }
    }

    #[test]
    fn dead_cell_birth_requires_exactly_three() {
        let ring = [(4, 4), (4, 5), (4, 6), (5, 4), (5, 6), (6, 4), (6, 5), (6, 6)];
        for n in 0..=8 {
            let mut grid = grid_with(10, 10, &ring[..n]);
            grid.step().unwrap();
            assert_eq!(grid.is_alive(5, 5), n == 3, "n = {n}");
        }
    }

    #[test]
    fn row_zero_contributes_to_last_row() {
        // Horizontal blinker on row 0 becomes vertical through rows 39, 0, 1.
        let mut grid = grid_with(40, 50, &[(0, 9), (0, 10), (0, 11)]);
        grid.step().unwrap();
        assert!(grid.is_alive(39, 10));
        assert!(grid.is_alive(0, 10));
        assert!(grid.is_alive(1, 10));
        assert_eq!(grid.count_alive(), 3);
    }

    #[test]
    fn column_zero_contributes_to_last_column() {
        let mut grid = grid_with(40, 50, &[(19, 0), (20, 0), (21, 0)]);
        grid.step().unwrap();
        assert!(grid.is_alive(20, 49));
        assert!(grid.is_alive(20, 0));
        assert!(grid.is_alive(20, 1));
        assert_eq!(grid.count_alive(), 3);
    }

    #[test]
    fn corner_block_wraps_on_both_axes() {
        // A 2x2 block split across all four corners is a still life.
        let corners = [(0, 0), (0, 49), (39, 0), (39, 49)];
        let mut grid = grid_with(40, 50, &corners);
        grid.step().unwrap();
        for (r, c) in corners {
            assert!(grid.is_alive(r, c));
        }
        assert_eq!(grid.count_alive(), 4);
    }

    #[test]
    fn step_matches_per_cell_lookup() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut grid = GridState::new(40, 50).unwrap();
        grid.seed(PatternName::Random, 0.33, &mut rng);
        let before = grid.clone();

        grid.step().unwrap();

        let mut expected_alive = 0u32;
        for r in 0..40 {
            for c in 0..50 {
                let expected = next_state(before.is_alive(r, c), lookup_count(&before, r, c));
                assert_eq!(grid.is_alive(r, c), expected, "cell ({r}, {c})");
                if expected {
                    expected_alive += 1;
                }
            }
        }
        assert_eq!(grid.count_alive(), expected_alive);
    }

    #[test]
    fn births_and_deaths_are_reported() {
        let mut grid = grid_with(10, 10, &[(5, 4), (5, 5), (5, 6)]);
        let outcome = grid.step().unwrap();
        assert_eq!(outcome, StepOutcome { births: 2, deaths: 2 });
    }

    #[test]
    fn step_is_deterministic() {
        let l_shape = [(10, 10), (11, 10), (11, 11)];
        let mut a = grid_with(40, 50, &l_shape);
        let mut b = grid_with(40, 50, &l_shape);
        a.step().unwrap();
        b.step().unwrap();
        assert_eq!(a.cells(), b.cells());
        // Three cells in an L complete to a block.
        assert_eq!(a.count_alive(), 4);
        assert!(a.is_alive(10, 11));
    }

    #[test]
    fn double_toggle_restores_only_that_cell() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut grid = GridState::new(40, 50).unwrap();
        grid.seed(PatternName::Random, 0.33, &mut rng);
        let before = grid.cells().to_vec();

        let first = grid.toggle(123).unwrap();
        assert_eq!(first, !before[123]);
        for (k, (&now, &was)) in grid.cells().iter().zip(&before).enumerate() {
            if k != 123 {
                assert_eq!(now, was);
            }
        }
        grid.toggle(123).unwrap();
        assert_eq!(grid.cells(), before.as_slice());
        assert_eq!(grid.generation(), 0);
    }

    #[test]
    fn toggle_out_of_range_is_rejected() {
        let mut grid = GridState::new(40, 50).unwrap();
        assert_eq!(
            grid.toggle(2000),
            Err(GridError::IndexOutOfRange { index: 2000, len: 2000 })
        );
        assert!(matches!(
            grid.toggle_at(40, 0),
            Err(GridError::CoordinateOutOfRange { row: 40, .. })
        ));
        assert_eq!(grid.count_alive(), 0);
    }

    #[test]
    fn seed_resets_generation() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = grid_with(40, 50, &[(1, 1), (1, 2), (1, 3)]);
        grid.step().unwrap();
        grid.step().unwrap();
        grid.seed(PatternName::Blank, 0.33, &mut rng);
        assert_eq!(grid.generation(), 0);
        assert_eq!(grid.count_alive(), 0);
    }

    #[test]
    fn random_seed_differs_between_draws() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut grid = GridState::new(40, 50).unwrap();
        grid.seed(PatternName::Random, 0.33, &mut rng);
        let first = grid.cells().to_vec();
        grid.seed(PatternName::Random, 0.33, &mut rng);
        assert_ne!(grid.cells(), first.as_slice());
        // Roughly a third of 2000 cells.
        let alive = grid.count_alive();
        assert!((450..=900).contains(&alive), "alive = {alive}");
    }

    #[test]
    fn random_density_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut grid = GridState::new(10, 10).unwrap();
        grid.seed(PatternName::Random, 0.0, &mut rng);
        assert_eq!(grid.count_alive(), 0);
        grid.seed(PatternName::Random, 1.0, &mut rng);
        assert_eq!(grid.count_alive(), 100);
    }

    #[test]
    fn generation_overflow_leaves_grid_untouched() {
        let mut grid = grid_with(10, 10, &[(5, 4), (5, 5), (5, 6)]);
        grid.generation = u64::MAX;
        let before = grid.cells().to_vec();
        assert_eq!(grid.step(), Err(GridError::GenerationOverflow));
        assert_eq!(grid.cells(), before.as_slice());
        assert_eq!(grid.generation(), u64::MAX);
    }

    #[test]
    fn live_cells_are_row_major() {
        let grid = grid_with(4, 5, &[(3, 1), (0, 4), (0, 2)]);
        assert_eq!(
            grid.live_cells(),
            vec![CellCoord::new(0, 2), CellCoord::new(0, 4), CellCoord::new(3, 1)]
        );
    }

    #[test]
    fn single_row_grid_counts_each_wrapped_slot() {
        // On a 1-row ring every cell is its own up/down neighbor, so a lone
        // live cell counts itself twice and its row-mates three times each.
        let mut grid = grid_with(1, 5, &[(0, 2)]);
        grid.count_neighbors();
        assert_eq!(grid.neighbors, vec![0, 3, 2, 3, 0]);
        grid.step().unwrap();
        assert_eq!(grid.cells(), &[false, true, true, true, false]);
    }
}
