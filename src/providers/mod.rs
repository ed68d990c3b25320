//! Upstream statistics providers
//!
//! - `fpl`: Fantasy Premier League public API
//! - `football_data`: Football-Data.org match results
//! - `cache`: on-disk cache of the FPL bootstrap payload
//! - `http`: shared client construction and headers
//! - `types`: wire types for both providers

pub mod cache;
pub mod football_data;
pub mod fpl;
pub mod http;
pub mod types;

pub use football_data::FootballDataClient;
pub use fpl::FplClient;
