//! Data models for the storage layer

use crate::cli::types::{
    FixtureId, Gameweek, LineupId, PlayerId, Position, RoomId, TeamId, UserId,
};
use crate::scoring::Chip;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub short_name: String,
    pub color: Option<String>,
    pub logo_url: Option<String>,
}

/// Team row before it has an internal key
#[derive(Debug, Clone, PartialEq)]
pub struct NewTeam {
    pub name: String,
    pub short_name: String,
    pub color: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub team_id: Option<TeamId>,
    pub price: f64,
    pub goals: i64,
    pub assists: i64,
    pub total_points: i64,
}

/// Player fields owned by the statistics provider
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerUpdate {
    pub name: String,
    pub position: Position,
    pub team_id: Option<TeamId>,
    pub price: f64,
    pub goals: i64,
    pub assists: i64,
    pub total_points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    pub provider_id: Option<i64>,
    pub gameweek: Gameweek,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub finished: bool,
    pub minutes: i64,
    pub kickoff_time: Option<String>,
}

/// Fixture result as reported by a provider, already reconciled onto
/// internal team keys.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureResult {
    pub provider_id: Option<i64>,
    pub gameweek: Gameweek,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub finished: bool,
    pub minutes: i64,
    pub kickoff_time: Option<String>,
}

/// What an idempotent upsert did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerEvent {
    pub id: i64,
    pub fixture_id: FixtureId,
    pub player_id: PlayerId,
    pub event_type: String,
    pub minute: Option<i64>,
    pub value: Option<i64>,
}

/// Event row before insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlayerEvent {
    pub event_type: String,
    pub minute: Option<i64>,
    pub value: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub code: String,
    pub name: String,
    pub owner_id: UserId,
    pub capacity: i64,
    pub budget_limit: f64,
    pub active_gameweek: Gameweek,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRoom {
    pub code: String,
    pub name: String,
    pub owner_id: UserId,
    pub capacity: i64,
    pub budget_limit: f64,
    pub active_gameweek: Gameweek,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomMember {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub is_active: bool,
    pub joined_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    pub id: LineupId,
    pub user_id: UserId,
    pub room_id: RoomId,
    pub gameweek: Gameweek,
    pub formation: String,
    pub chip: Chip,
    pub submitted: bool,
    pub gameweek_points: i64,
    pub total_points: i64,
    pub settled_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupPlayer {
    pub lineup_id: LineupId,
    pub player_id: PlayerId,
    pub is_starter: bool,
    pub is_captain: bool,
    pub is_vice_captain: bool,
    pub multiplier: i64,
    pub points_scored: i64,
}

/// One slot in a submitted lineup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupSlot {
    pub player_id: PlayerId,
    pub is_starter: bool,
    #[serde(default)]
    pub is_captain: bool,
    #[serde(default)]
    pub is_vice_captain: bool,
}

/// Points computed for one lineup slot during settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotScore {
    pub player_id: PlayerId,
    pub multiplier: i64,
    pub points_scored: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: UserId,
    pub email: Option<String>,
    pub points: i64,
    pub joined_at: i64,
}
