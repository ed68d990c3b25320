//! Gameweek scoring
//!
//! - `rules`: per-event point table and per-player aggregation
//! - `captaincy`: captain/vice-captain/chip multipliers

pub mod captaincy;
pub mod rules;

pub use captaincy::{multiplier, Chip, Selection};
pub use rules::{
    aggregate_points, appearance_points, breakdown, point_delta, point_delta_for_tag, EventType,
    PointsLine, ScoringEvent,
};
