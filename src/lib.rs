//! Fantasy rooms backend
//!
//! Private fantasy-football rooms on top of Premier League statistics:
//! users create or join rooms, submit one lineup per gameweek, and are
//! ranked on points derived from provider data.
//!
//! ## Layout
//!
//! - [`scoring`]: pure points table, appearance rules and multipliers
//! - [`reconcile`]: provider-to-internal identifier resolution and batched fetches
//! - [`providers`]: FPL and Football-Data.org clients
//! - [`storage`]: SQLite persistence
//! - [`commands`]: sync, settlement, rooms and lineups, shared by CLI and HTTP
//! - [`server`]: actix-web JSON API
//!
//! ## Environment Configuration
//!
//! ```bash
//! export FANTASY_DB_PATH=/var/lib/fantasy/fantasy.db
//! export AUTH_URL=https://auth.example.com
//! export ADMIN_USER_IDS=uuid-1,uuid-2
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod providers;
pub mod reconcile;
pub mod scoring;
pub mod server;
pub mod storage;
pub mod telemetry;

// Re-export commonly used types
pub use cli::types::{
    FixtureId, Gameweek, LineupId, PlayerId, Position, RoomId, TeamId, UserId,
    GAMEWEEKS_PER_SEASON,
};
pub use config::AppConfig;
pub use error::{FantasyError, Result};

/// Environment variable for the SQLite database path
pub const DB_PATH_ENV_VAR: &str = "FANTASY_DB_PATH";
/// Environment variable for the HTTP listen address
pub const BIND_ADDR_ENV_VAR: &str = "BIND_ADDR";
/// Environment variable naming the deployment (`development` relaxes cron auth)
pub const APP_ENV_ENV_VAR: &str = "APP_ENV";
pub const AUTH_URL_ENV_VAR: &str = "AUTH_URL";
pub const AUTH_API_KEY_ENV_VAR: &str = "AUTH_API_KEY";
/// Comma separated user ids allowed on admin endpoints
pub const ADMIN_USER_IDS_ENV_VAR: &str = "ADMIN_USER_IDS";
pub const CRON_SECRET_ENV_VAR: &str = "CRON_SECRET";
pub const FOOTBALL_DATA_API_KEY_ENV_VAR: &str = "FOOTBALL_DATA_API_KEY";
pub const FPL_BASE_URL_ENV_VAR: &str = "FPL_BASE_URL";
pub const FOOTBALL_DATA_BASE_URL_ENV_VAR: &str = "FOOTBALL_DATA_BASE_URL";
