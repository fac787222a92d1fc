//! Toroidal grid, population history, timer and session control for the
//! Lifegrid simulation.
//!
//! The grid advances by Conway's rule (B3/S23) with wraparound on every edge.
//! Each step records the new live-cell count in a bounded history that feeds
//! the population chart.
//!
//! # Modules
//!
//! - [`chart`] -- Bar layout and color ramp for the population chart.
//! - [`config`] -- Configuration loading from `lifegrid-config.yaml` into
//!   strongly-typed structs.
//! - [`control`] -- [`Controller`] and the [`Command`] set it accepts.
//! - [`frame`] -- Read-only [`FrameView`] handed to renderers.
//! - [`generation`] -- [`Simulation`]: grid, history and random source
//!   advanced as one unit.
//! - [`grid`] -- [`GridState`] with neighbor counting, stepping and toggling.
//! - [`history`] -- Fixed-capacity population history.
//! - [`patterns`] -- Offset tables and placement for the built-in patterns.
//! - [`runner`] -- The `select!` session loop over timer ticks and commands.
//! - [`scheduler`] -- The single periodic timer and [`Speed`] parsing.
//!
//! [`Controller`]: control::Controller
//! [`Command`]: control::Command
//! [`FrameView`]: frame::FrameView
//! [`Simulation`]: generation::Simulation
//! [`GridState`]: grid::GridState
//! [`Speed`]: scheduler::Speed

pub mod chart;
pub mod config;
pub mod control;
pub mod frame;
pub mod generation;
pub mod grid;
pub mod history;
pub mod patterns;
pub mod runner;
pub mod scheduler;
