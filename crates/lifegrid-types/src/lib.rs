//! Shared type definitions for the Lifegrid simulation.
//!
//! Types here are used by both the simulation core and the presentation
//! layers, so they carry no behavior beyond parsing and display.
//!
//! # Modules
//!
//! - [`enums`] -- Enumerated pattern names
//! - [`structs`] -- Cell coordinates and serializable frame snapshots

pub mod enums;
pub mod structs;

pub use enums::{PatternName, UnknownPatternError};
pub use structs::{CellCoord, FrameSnapshot};
