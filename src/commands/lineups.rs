//! Lineup submission rules and retrieval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use super::rooms::require_member;
use crate::{
    scoring::Chip,
    storage::{Database, Fixture, Lineup, LineupPlayer, LineupSlot, Player},
    FantasyError, Gameweek, PlayerId, Position, Result, RoomId, TeamId, UserId,
};

pub const SQUAD_SIZE: usize = 15;
pub const STARTERS: usize = 11;
pub const MAX_PER_CLUB: usize = 3;

/// Outfield shape of the starting eleven, written `D-M-F` (e.g. `4-4-2`).
/// The goalkeeper is implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formation {
    pub defenders: usize,
    pub midfielders: usize,
    pub forwards: usize,
}

impl Formation {
    fn count(&self, position: Position) -> usize {
        match position {
            Position::GK => 1,
            Position::DEF => self.defenders,
            Position::MID => self.midfielders,
            Position::FWD => self.forwards,
        }
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.defenders, self.midfielders, self.forwards)
    }
}

impl FromStr for Formation {
    type Err = FantasyError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('-').collect();
        let invalid = || FantasyError::validation(format!("invalid formation: {}", s));
        if parts.len() != 3 {
            return Err(invalid());
        }

        let mut counts = [0usize; 3];
        for (count, part) in counts.iter_mut().zip(&parts) {
            *count = part.trim().parse().map_err(|_| invalid())?;
        }
        let [defenders, midfielders, forwards] = counts;

        if !(3..=5).contains(&defenders)
            || !(2..=5).contains(&midfielders)
            || !(1..=3).contains(&forwards)
            || defenders + midfielders + forwards != STARTERS - 1
        {
            return Err(invalid());
        }

        Ok(Self {
            defenders,
            midfielders,
            forwards,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmitLineupRequest {
    /// Defaults to the room's active gameweek
    #[serde(default)]
    pub gameweek: Option<Gameweek>,
    pub formation: String,
    #[serde(default)]
    pub chip: Chip,
    pub players: Vec<LineupSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineupView {
    #[serde(flatten)]
    pub lineup: Lineup,
    pub players: Vec<LineupPlayer>,
}

/// Check a lineup against squad, formation, captaincy, budget and club rules.
///
/// `players` must hold every selected player; a missing one is reported as
/// unknown.
pub fn validate_lineup(
    formation: &Formation,
    slots: &[LineupSlot],
    players: &HashMap<PlayerId, Player>,
    budget_limit: f64,
) -> Result<()> {
    if slots.len() != SQUAD_SIZE {
        return Err(FantasyError::validation(format!(
            "a lineup needs exactly {} players, got {}",
            SQUAD_SIZE,
            slots.len()
        )));
    }

    let unique: HashSet<PlayerId> = slots.iter().map(|s| s.player_id).collect();
    if unique.len() != slots.len() {
        return Err(FantasyError::validation("a player is selected more than once"));
    }

    let mut selected = Vec::with_capacity(slots.len());
    for slot in slots {
        let player = players
            .get(&slot.player_id)
            .ok_or_else(|| FantasyError::validation(format!("unknown player {}", slot.player_id)))?;
        selected.push((slot, player));
    }

    let starters: Vec<&Player> = selected
        .iter()
        .filter(|(slot, _)| slot.is_starter)
        .map(|(_, player)| *player)
        .collect();
    if starters.len() != STARTERS {
        return Err(FantasyError::validation(format!(
            "a lineup needs exactly {} starters, got {}",
            STARTERS,
            starters.len()
        )));
    }
    for position in Position::ALL {
        let have = starters.iter().filter(|p| p.position == position).count();
        let want = formation.count(position);
        if have != want {
            return Err(FantasyError::validation(format!(
                "formation {} needs {} starting {}, got {}",
                formation, want, position, have
            )));
        }
    }

    let captains: Vec<&LineupSlot> = slots.iter().filter(|s| s.is_captain).collect();
    let vices: Vec<&LineupSlot> = slots.iter().filter(|s| s.is_vice_captain).collect();
    if captains.len() != 1 || vices.len() != 1 {
        return Err(FantasyError::validation(
            "a lineup needs exactly one captain and one vice-captain",
        ));
    }
    let (captain, vice) = (captains[0], vices[0]);
    if captain.player_id == vice.player_id {
        return Err(FantasyError::validation(
            "captain and vice-captain must be different players",
        ));
    }
    if !captain.is_starter || !vice.is_starter {
        return Err(FantasyError::validation(
            "captain and vice-captain must both be starters",
        ));
    }

    let cost: f64 = selected.iter().map(|(_, p)| p.price).sum();
    if cost > budget_limit + 1e-9 {
        return Err(FantasyError::validation(format!(
            "lineup costs {:.1}, over the room budget of {:.1}",
            cost, budget_limit
        )));
    }

    let mut per_club: HashMap<TeamId, usize> = HashMap::new();
    for (_, player) in &selected {
        if let Some(team_id) = player.team_id {
            *per_club.entry(team_id).or_default() += 1;
        }
    }
    if let Some((team_id, count)) = per_club.iter().find(|(_, count)| **count > MAX_PER_CLUB) {
        return Err(FantasyError::validation(format!(
            "at most {} players per club, got {} from team {}",
            MAX_PER_CLUB, count, team_id
        )));
    }

    Ok(())
}

/// A gameweek is locked once any of its fixtures has kicked off or finished.
pub fn gameweek_locked(fixtures: &[Fixture], now: DateTime<Utc>) -> bool {
    fixtures.iter().any(|fixture| {
        fixture.finished
            || fixture.minutes > 0
            || fixture
                .kickoff_time
                .as_deref()
                .and_then(|k| DateTime::parse_from_rfc3339(k).ok())
                .is_some_and(|kickoff| kickoff.with_timezone(&Utc) <= now)
    })
}

/// Validate and store the caller's lineup for a room and gameweek.
pub fn submit_lineup(
    db: &mut Database,
    user: &UserId,
    room_id: RoomId,
    request: &SubmitLineupRequest,
    now: DateTime<Utc>,
) -> Result<LineupView> {
    let room = require_member(db, room_id, user)?;
    let gameweek = match request.gameweek {
        Some(gameweek) => Gameweek::checked(gameweek.as_u8() as i64)?,
        None => room.active_gameweek,
    };

    if gameweek_locked(&db.list_fixtures(Some(gameweek))?, now) {
        return Err(FantasyError::validation(format!(
            "gameweek {} is locked",
            gameweek
        )));
    }

    let formation: Formation = request.formation.parse()?;
    let ids: Vec<PlayerId> = request.players.iter().map(|s| s.player_id).collect();
    let players: HashMap<PlayerId, Player> = db
        .get_players(&ids)?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    validate_lineup(&formation, &request.players, &players, room.budget_limit)?;

    let lineup_id = db.save_lineup(
        user,
        room_id,
        gameweek,
        &formation.to_string(),
        request.chip,
        &request.players,
    )?;
    info!(%lineup_id, %room_id, user = %user, %gameweek, "lineup saved");

    my_lineup(db, user, room_id, Some(gameweek))
}

/// The caller's lineup for a gameweek (default: the room's active one)
pub fn my_lineup(
    db: &Database,
    user: &UserId,
    room_id: RoomId,
    gameweek: Option<Gameweek>,
) -> Result<LineupView> {
    let room = require_member(db, room_id, user)?;
    let gameweek = gameweek.unwrap_or(room.active_gameweek);

    let lineup = db
        .get_lineup(user, room_id, gameweek)?
        .ok_or_else(|| FantasyError::not_found("lineup", format!("gameweek {}", gameweek)))?;
    let players = db.lineup_players(lineup.id)?;
    Ok(LineupView { lineup, players })
}
