//! Storage layer for the fantasy rooms backend
//!
//! This module wraps the SQLite store, organized into logical components:
//! - `models`: Data structures
//! - `schema`: Database connection and schema management
//! - `queries`: Users, teams, players and provider mappings
//! - `fixtures`: Fixtures and player match events
//! - `rooms`: Rooms and membership
//! - `lineups`: Lineups and settlement writes
//! - `analysis`: Leaderboards and diagnostics

pub mod analysis;
pub mod fixtures;
pub mod lineups;
pub mod models;
pub mod queries;
pub mod rooms;
pub mod schema;


pub use analysis::{Diagnostics, GameweekStatus};
pub use models::*;
pub use schema::Database;
