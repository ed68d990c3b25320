//! Per-player points for one gameweek, with the event breakdown.

use serde::Serialize;

use super::common::group_events;
use crate::{
    scoring::{aggregate_points, breakdown, PointsLine},
    storage::{Database, Player},
    FantasyError, FixtureId, Gameweek, PlayerId, Result,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixturePoints {
    pub fixture_id: FixtureId,
    pub minutes: u32,
    pub points: i32,
    pub breakdown: Vec<PointsLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerPoints {
    pub player: Player,
    pub gameweek: Gameweek,
    pub total: i32,
    pub fixtures: Vec<FixturePoints>,
}

pub fn player_points(db: &Database, player_id: PlayerId, gameweek: Gameweek) -> Result<PlayerPoints> {
    let player = db
        .get_player(player_id)?
        .ok_or_else(|| FantasyError::not_found("player", player_id))?;

    let events = db.player_events_for_gameweek(player_id, gameweek)?;
    let fixtures: Vec<FixturePoints> = group_events(&events)
        .remove(&player_id)
        .unwrap_or_default()
        .into_iter()
        .map(|(fixture_id, line)| FixturePoints {
            fixture_id,
            minutes: line.minutes,
            points: aggregate_points(player.position, line.minutes, &line.events),
            breakdown: breakdown(player.position, line.minutes, &line.events),
        })
        .collect();

    Ok(PlayerPoints {
        total: fixtures.iter().map(|f| f.points).sum(),
        player,
        gameweek,
        fixtures,
    })
}
