//! End-to-end tests for the simulation core.
//!
//! These drive the public API only: the grid rule against a naive
//! reference, known oscillators and spaceships on the torus, and a full
//! controller session with the timer under tokio's paused clock.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use lifegrid_core::config::{GridConfig, HistoryConfig, LifegridConfig};
use lifegrid_core::control::{Command, ControlError, Controller};
use lifegrid_core::generation::Simulation;
use lifegrid_core::grid::GridState;
use lifegrid_core::runner::{NoOpCallback, SessionEndReason, run_session};
use lifegrid_core::scheduler::Speed;
use lifegrid_types::{CellCoord, PatternName};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;

fn grid_with(rows: usize, cols: usize, live: &[(usize, usize)]) -> GridState {
    let mut grid = GridState::new(rows, cols).unwrap();
    for &(r, c) in live {
        grid.toggle_at(r, c).unwrap();
    }
    grid
}

fn live_set(grid: &GridState) -> Vec<CellCoord> {
    grid.live_cells()
}

/// Reference rule with explicit modular arithmetic per cell.
fn reference_step(grid: &GridState) -> Vec<bool> {
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut next = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let mut n = 0;
            for dr in [rows - 1, 0, 1] {
                for dc in [cols - 1, 0, 1] {
                    if dr == 0 && dc == 0 {
                        continue;
                    }
                    if grid.is_alive((r + dr) % rows, (c + dc) % cols) {
                        n += 1;
                    }
                }
            }
            let alive = grid.is_alive(r, c);
            next.push(n == 3 || (alive && n == 2));
        }
    }
    next
}

fn simulation(seed: u64) -> Simulation {
    Simulation::with_rng(
        &GridConfig::default(),
        &HistoryConfig::default(),
        StdRng::seed_from_u64(seed),
    )
    .unwrap()
}

#[test]
fn step_matches_reference_rule_on_random_boards() {
    for seed in 0..8 {
        let mut sim = simulation(seed);
        sim.seed(PatternName::Random);
        for _ in 0..10 {
            let expected = reference_step(sim.grid());
            let summary = sim.advance().unwrap();
            assert_eq!(sim.grid().cells(), expected.as_slice());
            let live = u32::try_from(expected.iter().filter(|&&a| a).count()).unwrap();
            assert_eq!(summary.population, live);
        }
    }
}

#[test]
fn blinker_oscillates_across_the_seam() {
    // Vertical blinker straddling the top/bottom edge.
    let mut grid = grid_with(6, 6, &[(5, 2), (0, 2), (1, 2)]);
    grid.step().unwrap();
    assert_eq!(
        live_set(&grid),
        vec![CellCoord::new(0, 1), CellCoord::new(0, 2), CellCoord::new(0, 3)]
    );
    grid.step().unwrap();
    assert_eq!(
        live_set(&grid),
        vec![CellCoord::new(0, 2), CellCoord::new(1, 2), CellCoord::new(5, 2)]
    );
}

#[test]
fn glider_returns_home_after_circling_the_torus() {
    let glider = [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)];
    let mut grid = grid_with(40, 50, &glider);
    let start = live_set(&grid);

    // A glider moves one cell diagonally every 4 generations; 200 cells of
    // travel is a whole number of laps on both a 40-row and a 50-column ring.
    for _ in 0..800 {
        grid.step().unwrap();
        assert_eq!(grid.count_alive(), 5);
    }
    assert_eq!(live_set(&grid), start);
    assert_eq!(grid.generation(), 800);
}

#[test]
fn full_board_dies_in_one_step() {
    let mut grid = GridState::new(5, 5).unwrap();
    for k in 0..grid.len() {
        grid.toggle(k).unwrap();
    }
    let outcome = grid.step().unwrap();
    assert_eq!(grid.count_alive(), 0);
    assert_eq!(outcome.deaths, 25);
}

#[test]
fn default_config_builds_a_forty_by_fifty_board() {
    let config = LifegridConfig::default();
    let sim = Simulation::new(&config.grid, &config.history).unwrap();
    assert_eq!(sim.grid().rows(), 40);
    assert_eq!(sim.grid().cols(), 50);
    assert_eq!(sim.grid().len(), 2000);
    assert_eq!(sim.history().capacity(), 50);
}

#[tokio::test(start_paused = true)]
async fn controller_session_follows_timer_rules() {
    let mut sim = simulation(21);
    sim.seed(PatternName::GliderGun);
    let mut ctl = Controller::new(sim, Speed::default());
    let (tx, mut rx) = mpsc::channel(16);

    tx.send(Command::Start { speed: Some(Speed::parse("25")) })
        .await
        .unwrap();
    tx.send(Command::Start { speed: Some(Speed::parse("500")) })
        .await
        .unwrap();
    tx.send(Command::Step).await.unwrap();

    let result = run_session(&mut ctl, &mut rx, &mut NoOpCallback, 60)
        .await
        .unwrap();

    assert_eq!(result.end_reason, SessionEndReason::GenerationLimit);
    assert_eq!(result.generations_run, 60);
    assert_eq!(ctl.simulation().history().len(), 50);
    assert!(!ctl.is_running());
    // The second start was ignored along with its speed.
    assert_eq!(ctl.speed(), Speed::from_millis(25));
    assert!(result.elapsed_ms() >= 0);

    ctl.reset();
    assert_eq!(ctl.simulation().grid().generation(), 0);
    assert!(ctl.simulation().history().is_empty());
    assert_eq!(ctl.simulation().grid().count_alive(), 36);
}

#[tokio::test(start_paused = true)]
async fn manual_step_rejected_while_running_then_allowed() {
    let mut ctl = Controller::new(simulation(5), Speed::default());
    ctl.start(None);
    assert_eq!(ctl.step().unwrap_err(), ControlError::StepWhileRunning);
    assert!(ctl.stop());
    assert!(!ctl.stop());
    assert_eq!(ctl.step().unwrap().generation, 1);
}
