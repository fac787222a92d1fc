//! Enumeration types for the Lifegrid simulation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a pattern name does not match any known pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pattern: {name}")]
pub struct UnknownPatternError {
    /// The name that failed to parse.
    pub name: String,
}

/// A named initial configuration that can be seeded onto the grid.
///
/// The set is fixed: a fully dead board, a uniform random fill, and two
/// structural patterns placed from literal offset tables.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PatternName {
    /// Every cell dead.
    #[default]
    Blank,
    /// Each cell live with the configured probability.
    Random,
    /// Gosper glider gun anchored at the top-left corner.
    #[serde(alias = "gliderGun")]
    GliderGun,
    /// A 48-cell figure centered on the board.
    Nebula,
}

impl PatternName {
    /// Every pattern, in selection order.
    pub const ALL: [Self; 4] = [Self::Blank, Self::Random, Self::GliderGun, Self::Nebula];

    /// The canonical kebab-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::Random => "random",
            Self::GliderGun => "glider-gun",
            Self::Nebula => "nebula",
        }
    }

    /// Human-readable label for menus.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blank => "Blank",
            Self::Random => "Random",
            Self::GliderGun => "Glider gun",
            Self::Nebula => "Nebula",
        }
    }

    /// Look up a pattern by its 1-based position in [`Self::ALL`].
    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        ordinal
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(idx))
            .copied()
    }
}

impl fmt::Display for PatternName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternName {
    type Err = UnknownPatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blank" => Ok(Self::Blank),
            "random" => Ok(Self::Random),
            "glider-gun" | "glider_gun" | "glidergun" => Ok(Self::GliderGun),
            "nebula" => Ok(Self::Nebula),
            _ => Err(UnknownPatternError { name: s.to_owned() }),
        }
    }
}
