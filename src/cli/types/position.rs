//! Football position types and utilities.

use crate::error::FantasyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Playing positions used by the scoring rules.
///
/// FPL reports positions as an `element_type` number; the store keeps the
/// short string form (`GK`, `DEF`, `MID`, `FWD`).
///
/// # Examples
///
/// ```rust
/// use fantasy_rooms::Position;
///
/// let gk: Position = "gkp".parse().unwrap();
/// assert_eq!(gk, Position::GK);
/// assert_eq!(Position::FWD.to_string(), "FWD");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    GK,
    DEF,
    MID,
    FWD,
}

impl Position {
    pub const ALL: [Position; 4] = [Position::GK, Position::DEF, Position::MID, Position::FWD];

    /// Convert an FPL `element_type` (1..=4) to a Position.
    pub fn from_element_type(id: u8) -> Result<Self, FantasyError> {
        match id {
            1 => Ok(Position::GK),
            2 => Ok(Position::DEF),
            3 => Ok(Position::MID),
            4 => Ok(Position::FWD),
            _ => Err(FantasyError::InvalidPosition {
                position: id.to_string(),
            }),
        }
    }

    /// The FPL `element_type` for this position.
    pub fn element_type(&self) -> u8 {
        match self {
            Position::GK => 1,
            Position::DEF => 2,
            Position::MID => 3,
            Position::FWD => 4,
        }
    }

    /// Goalkeepers and defenders share the defensive scoring column.
    pub fn is_defensive(&self) -> bool {
        matches!(self, Position::GK | Position::DEF)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::GK => "GK",
            Position::DEF => "DEF",
            Position::MID => "MID",
            Position::FWD => "FWD",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Position {
    type Err = FantasyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GK" | "GKP" | "GOALKEEPER" => Ok(Position::GK),
            "DEF" | "DEFENDER" => Ok(Position::DEF),
            "MID" | "MIDFIELDER" => Ok(Position::MID),
            "FWD" | "FORWARD" => Ok(Position::FWD),
            _ => Err(FantasyError::InvalidPosition {
                position: s.to_string(),
            }),
        }
    }
}
