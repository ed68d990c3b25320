//! Gameweek numbering for a Premier League season.

use crate::error::{FantasyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of gameweeks in a Premier League season.
pub const GAMEWEEKS_PER_SEASON: u8 = 38;

/// Type-safe wrapper for gameweek numbers (1..=38).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gameweek(pub u8);

impl Gameweek {
    pub fn new(gameweek: u8) -> Self {
        Self(gameweek)
    }

    /// Construct a gameweek, rejecting numbers outside the season.
    pub fn checked(gameweek: i64) -> Result<Self> {
        if (1..=GAMEWEEKS_PER_SEASON as i64).contains(&gameweek) {
            Ok(Self(gameweek as u8))
        } else {
            Err(FantasyError::validation(format!(
                "gameweek must be between 1 and {}, got {}",
                GAMEWEEKS_PER_SEASON, gameweek
            )))
        }
    }

    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// The following gameweek, or `None` after the last one.
    pub fn next(&self) -> Option<Gameweek> {
        (self.0 < GAMEWEEKS_PER_SEASON).then(|| Gameweek(self.0 + 1))
    }

    /// Every gameweek of the season in order.
    pub fn season() -> impl Iterator<Item = Gameweek> {
        (1..=GAMEWEEKS_PER_SEASON).map(Gameweek)
    }
}

impl Default for Gameweek {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Gameweek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Gameweek {
    type Err = FantasyError;

    fn from_str(s: &str) -> Result<Self> {
        let raw: i64 = s.trim().parse()?;
        Self::checked(raw)
    }
}

impl rusqlite::ToSql for Gameweek {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        Ok(rusqlite::types::ToSqlOutput::from(self.0 as i64))
    }
}

impl rusqlite::types::FromSql for Gameweek {
    fn column_result(
        value: rusqlite::types::ValueRef<'_>,
    ) -> rusqlite::types::FromSqlResult<Self> {
        let raw = i64::column_result(value)?;
        u8::try_from(raw)
            .map(Gameweek)
            .map_err(|_| rusqlite::types::FromSqlError::OutOfRange(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gameweek_bounds() {
        assert!(Gameweek::checked(0).is_err());
        assert_eq!(Gameweek::checked(1).unwrap(), Gameweek::new(1));
        assert_eq!(Gameweek::checked(38).unwrap(), Gameweek::new(38));
        assert!(Gameweek::checked(39).is_err());
    }

    #[test]
    fn test_gameweek_from_str() {
        assert_eq!("12".parse::<Gameweek>().unwrap(), Gameweek::new(12));
        assert!("40".parse::<Gameweek>().is_err());
        assert!("twelve".parse::<Gameweek>().is_err());
    }

    #[test]
    fn test_season_iterates_all_gameweeks() {
        let all: Vec<Gameweek> = Gameweek::season().collect();
        assert_eq!(all.len(), 38);
        assert_eq!(all[0], Gameweek::new(1));
        assert_eq!(all[37], Gameweek::new(38));
    }
}
