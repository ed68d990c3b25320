//! Command implementations shared by the CLI and the HTTP API

pub mod admin;
pub mod common;
pub mod lineups;
pub mod points;
pub mod rooms;
pub mod settle;
pub mod sync;
