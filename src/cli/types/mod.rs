//! Type-safe wrappers and enums for fantasy rooms data.

pub mod ids;
pub mod position;
pub mod time;

pub use ids::{FixtureId, LineupId, PlayerId, RoomId, TeamId, UserId};
pub use position::Position;
pub use time::{Gameweek, GAMEWEEKS_PER_SEASON};
