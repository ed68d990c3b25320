//! Captain, vice-captain and chip multipliers applied on top of raw points.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::FantasyError;

/// One-off lineup modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chip {
    #[default]
    None,
    TripleCaptain,
    BenchBoost,
}

impl Chip {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chip::None => "none",
            Chip::TripleCaptain => "triple_captain",
            Chip::BenchBoost => "bench_boost",
        }
    }

    fn captain_multiplier(&self) -> u8 {
        match self {
            Chip::TripleCaptain => 3,
            _ => 2,
        }
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chip {
    type Err = FantasyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Chip::None),
            "triple_captain" | "3xc" => Ok(Chip::TripleCaptain),
            "bench_boost" | "bboost" => Ok(Chip::BenchBoost),
            other => Err(FantasyError::validation(format!("unknown chip: {}", other))),
        }
    }
}

/// The lineup flags of one selected player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub is_starter: bool,
    pub is_captain: bool,
    pub is_vice_captain: bool,
}

/// Multiplier for one lineup slot.
///
/// `captain_played` is whether the lineup's captain recorded any minutes in
/// the gameweek; the vice-captain only inherits the armband when it is false.
pub fn multiplier(selection: Selection, chip: Chip, captain_played: bool) -> u8 {
    if !selection.is_starter {
        return if chip == Chip::BenchBoost { 1 } else { 0 };
    }
    if selection.is_captain && captain_played {
        return chip.captain_multiplier();
    }
    if selection.is_vice_captain && !captain_played {
        return chip.captain_multiplier();
    }
    1
}
