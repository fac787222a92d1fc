//! The simulation aggregate: one grid, one history, one random source.
//!
//! A generation is a grid step followed by recording the new population in
//! the history. Seeding resets both together, which keeps the history
//! aligned with the generation counter.

use lifegrid_types::PatternName;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::config::{GridConfig, HistoryConfig};
use crate::grid::{GridError, GridState};
use crate::history::HistoryTracker;

/// Summary of one completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSummary {
    /// The generation number just reached.
    pub generation: u64,
    /// Live cells after the step.
    pub population: u32,
    /// Dead cells that became live.
    pub births: u32,
    /// Live cells that died.
    pub deaths: u32,
}

/// Grid, history and random source, advanced and reset as a unit.
#[derive(Debug, Clone)]
pub struct Simulation {
    grid: GridState,
    history: HistoryTracker,
    rng: StdRng,
    random_density: f64,
    pattern: PatternName,
}

impl Simulation {
    /// Build a blank simulation from configuration.
    ///
    /// The random source is seeded from `grid.random_seed` when set, from the
    /// OS otherwise. The initial pattern is not applied; call [`seed`].
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] for unusable dimensions.
    ///
    /// [`seed`]: Self::seed
    pub fn new(grid: &GridConfig, history: &HistoryConfig) -> Result<Self, GridError> {
        let rng = grid
            .random_seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self::with_rng(grid, history, rng)
    }

    /// Build a blank simulation with an explicit random source.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] for unusable dimensions.
    pub fn with_rng(
        grid: &GridConfig,
        history: &HistoryConfig,
        rng: StdRng,
    ) -> Result<Self, GridError> {
        Ok(Self {
            grid: GridState::new(grid.rows, grid.cols)?,
            history: HistoryTracker::new(history.capacity),
            rng,
            random_density: grid.random_density,
            pattern: PatternName::Blank,
        })
    }

    /// Advance one generation and record its population.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::GenerationOverflow`] if the counter is exhausted;
    /// neither grid nor history changes in that case.
    pub fn advance(&mut self) -> Result<GenerationSummary, GridError> {
        let outcome = self.grid.step()?;
        let population = self.grid.count_alive();
        self.history.push(population);

        let summary = GenerationSummary {
            generation: self.grid.generation(),
            population,
            births: outcome.births,
            deaths: outcome.deaths,
        };
        debug!(
            generation = summary.generation,
            population = summary.population,
            births = summary.births,
            deaths = summary.deaths,
            "Generation advanced"
        );
        Ok(summary)
    }

    /// Clear the grid and history, reset the generation and apply `pattern`.
    pub fn seed(&mut self, pattern: PatternName) {
        self.grid.seed(pattern, self.random_density, &mut self.rng);
        self.history.clear();
        self.pattern = pattern;
        debug!(
            pattern = %pattern,
            population = self.grid.count_alive(),
            "Grid seeded"
        );
    }

    /// Flip the cell at `(row, col)`. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::CoordinateOutOfRange`] outside the grid.
    pub fn toggle(&mut self, row: usize, col: usize) -> Result<bool, GridError> {
        self.grid.toggle_at(row, col)
    }

    /// The grid.
    pub const fn grid(&self) -> &GridState {
        &self.grid
    }

    /// The population history.
    pub const fn history(&self) -> &HistoryTracker {
        &self.history
    }

    /// The pattern most recently seeded.
    pub const fn pattern(&self) -> PatternName {
        self.pattern
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> Simulation {
        Simulation::with_rng(
            &GridConfig::default(),
            &HistoryConfig::default(),
            StdRng::seed_from_u64(seed),
        )
        .unwrap()
    }

    #[test]
    fn advance_records_population() {
        let mut sim = seeded(1);
        sim.seed(PatternName::GliderGun);
        let summary = sim.advance().unwrap();
        assert_eq!(summary.generation, 1);
        assert_eq!(summary.population, sim.grid().count_alive());
        assert_eq!(sim.history().latest(), Some(summary.population));
        assert_eq!(sim.history().len(), 1);
    }

    #[test]
    fn blank_seed_resets_everything() {
        let mut sim = seeded(2);
        sim.seed(PatternName::Random);
        for _ in 0..5 {
            sim.advance().unwrap();
        }
        sim.seed(PatternName::Blank);
        assert_eq!(sim.grid().count_alive(), 0);
        assert_eq!(sim.grid().generation(), 0);
        assert!(sim.history().is_empty());
        assert_eq!(sim.pattern(), PatternName::Blank);
    }

    #[test]
    fn random_seed_twice_differs() {
        let mut sim = seeded(3);
        sim.seed(PatternName::Random);
        let first = sim.grid().cells().to_vec();
        sim.seed(PatternName::Random);
        assert_ne!(sim.grid().cells(), first.as_slice());
    }

    #[test]
    fn same_seed_reproduces_random_pattern() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        a.seed(PatternName::Random);
        b.seed(PatternName::Random);
        assert_eq!(a.grid().cells(), b.grid().cells());
    }

    #[test]
    fn history_tracks_fifty_generations() {
        let mut sim = seeded(4);
        sim.seed(PatternName::Random);
        for _ in 0..60 {
            sim.advance().unwrap();
        }
        assert_eq!(sim.history().len(), 50);
        assert_eq!(sim.grid().generation(), 60);
        assert_eq!(sim.history().latest(), Some(sim.grid().count_alive()));
    }

    #[test]
    fn toggle_does_not_touch_history_or_generation() {
        let mut sim = seeded(5);
        sim.seed(PatternName::Blank);
        sim.advance().unwrap();
        assert!(sim.toggle(3, 4).unwrap());
        assert_eq!(sim.grid().generation(), 1);
        assert_eq!(sim.history().values().iter().copied().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn glider_gun_keeps_firing() {
        let mut sim = seeded(6);
        sim.seed(PatternName::GliderGun);
        let start = sim.grid().count_alive();
        for _ in 0..30 {
            sim.advance().unwrap();
        }
        // One period emits a 5-cell glider.
        assert!(sim.grid().count_alive() > start);
    }
}
