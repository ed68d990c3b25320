//! Gameweek settlement: raw player points, captaincy multipliers, lineup
//! totals and running totals.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

use super::common::{group_events, CommandContext};
use crate::{
    scoring::{aggregate_points, multiplier, Chip, Selection},
    storage::{Database, Lineup, LineupPlayer, SlotScore},
    FantasyError, Gameweek, LineupId, PlayerId, Result,
};

/// Minutes and raw points of one player across a gameweek's fixtures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerGameweek {
    pub minutes: u32,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementReport {
    pub gameweek: Gameweek,
    pub lineups_settled: usize,
    pub players_scored: usize,
    pub forced: bool,
    /// Rooms moved on to the following gameweek
    pub rooms_advanced: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecalculateReport {
    pub gameweeks: usize,
    pub owners_recomputed: usize,
}

/// Raw points for every player with events in the gameweek.
///
/// Each fixture is aggregated on its own (a double gameweek scores two
/// appearances) and the results summed.
pub fn gameweek_player_points(db: &Database, gameweek: Gameweek) -> Result<HashMap<PlayerId, PlayerGameweek>> {
    let events = db.events_for_gameweek(gameweek)?;
    let grouped = group_events(&events);

    let ids: Vec<PlayerId> = grouped.keys().copied().collect();
    let positions: HashMap<PlayerId, _> = db
        .get_players(&ids)?
        .into_iter()
        .map(|p| (p.id, p.position))
        .collect();

    let mut points = HashMap::with_capacity(grouped.len());
    for (player_id, fixtures) in grouped {
        let Some(position) = positions.get(&player_id).copied() else {
            warn!(%player_id, "events for unknown player");
            continue;
        };

        let mut total = PlayerGameweek::default();
        for (_, line) in &fixtures {
            total.minutes += line.minutes;
            total.points += aggregate_points(position, line.minutes, &line.events);
        }
        points.insert(player_id, total);
    }

    Ok(points)
}

/// Slot scores and gameweek total for one lineup. Players without events
/// score 0 and count as not having played.
pub fn score_lineup(
    chip: Chip,
    slots: &[LineupPlayer],
    points: &HashMap<PlayerId, PlayerGameweek>,
) -> (Vec<SlotScore>, i64) {
    let captain_played = slots
        .iter()
        .find(|s| s.is_captain)
        .and_then(|s| points.get(&s.player_id))
        .is_some_and(|p| p.minutes > 0);

    let mut total = 0i64;
    let scores = slots
        .iter()
        .map(|slot| {
            let selection = Selection {
                is_starter: slot.is_starter,
                is_captain: slot.is_captain,
                is_vice_captain: slot.is_vice_captain,
            };
            let factor = multiplier(selection, chip, captain_played) as i64;
            let raw = points.get(&slot.player_id).map_or(0, |p| p.points) as i64;
            let scored = raw * factor;
            total += scored;
            SlotScore {
                player_id: slot.player_id,
                multiplier: factor,
                points_scored: scored,
            }
        })
        .collect();

    (scores, total)
}

/// Settle every submitted lineup of a gameweek.
///
/// Refuses while any fixture of the gameweek is unfinished unless `force`
/// is set. Settling again recomputes the same values. Rooms whose active
/// gameweek is at or before the settled one move on to the next gameweek.
pub fn settle_gameweek(db: &mut Database, gameweek: Gameweek, force: bool) -> Result<SettlementReport> {
    if !force && !db.gameweek_finished(gameweek)? {
        return Err(FantasyError::conflict(format!(
            "gameweek {} still has unfinished fixtures",
            gameweek
        )));
    }

    let points = gameweek_player_points(db, gameweek)?;

    let mut lineups: Vec<(Lineup, Vec<LineupPlayer>)> = Vec::new();
    for lineup in db.submitted_lineups(gameweek)? {
        let slots = db.lineup_players(lineup.id)?;
        lineups.push((lineup, slots));
    }

    let scored: Vec<(LineupId, Vec<SlotScore>, i64)> = lineups
        .par_iter()
        .map(|(lineup, slots)| {
            let (scores, total) = score_lineup(lineup.chip, slots, &points);
            (lineup.id, scores, total)
        })
        .collect();

    for (lineup_id, scores, total) in &scored {
        db.record_lineup_score(*lineup_id, scores, *total)?;
    }
    for (lineup, _) in &lineups {
        db.recompute_running_totals(&lineup.user_id, lineup.room_id)?;
    }

    let rooms_advanced = match gameweek.next() {
        Some(next) => db.advance_active_gameweek(next)?,
        None => 0,
    };

    info!(%gameweek, lineups = scored.len(), rooms_advanced, force, "gameweek settled");
    Ok(SettlementReport {
        gameweek,
        lineups_settled: scored.len(),
        players_scored: points.len(),
        forced: force,
        rooms_advanced,
    })
}

/// Settle every gameweek that is finished and still has unsettled lineups
pub fn auto_settle(db: &mut Database) -> Result<Vec<SettlementReport>> {
    let mut reports = Vec::new();
    for gameweek in db.gameweeks_pending_settlement()? {
        if !db.gameweek_finished(gameweek)? {
            continue;
        }
        reports.push(settle_gameweek(db, gameweek, false)?);
    }
    Ok(reports)
}

/// Recompute cumulative totals for every lineup owner, gameweek by gameweek
pub fn recalculate_totals(db: &mut Database) -> Result<RecalculateReport> {
    let mut report = RecalculateReport {
        gameweeks: 0,
        owners_recomputed: 0,
    };

    for gameweek in Gameweek::season() {
        let owners = db.lineup_owners(Some(gameweek))?;
        if owners.is_empty() {
            continue;
        }
        for (user_id, room_id) in &owners {
            db.recompute_running_totals(user_id, *room_id)?;
        }
        report.gameweeks += 1;
        report.owners_recomputed += owners.len();
    }

    info!(
        gameweeks = report.gameweeks,
        owners = report.owners_recomputed,
        "running totals recalculated"
    );
    Ok(report)
}

// ---------- CLI handlers ----------

pub fn handle_settle(
    ctx: &mut CommandContext,
    gameweek: Option<Gameweek>,
    force: bool,
    verbose: bool,
) -> Result<()> {
    let reports = match gameweek {
        Some(gameweek) => {
            if verbose {
                println!("Settling gameweek {} (force: {})...", gameweek, force);
            }
            vec![settle_gameweek(&mut ctx.db, gameweek, force)?]
        }
        None => {
            if verbose {
                println!("Settling every finished gameweek with pending lineups...");
            }
            auto_settle(&mut ctx.db)?
        }
    };

    if reports.is_empty() {
        println!("Nothing to settle");
    }
    for report in reports {
        println!(
            "✓ Gameweek {}: {} lineups settled ({} players scored), {} rooms advanced",
            report.gameweek, report.lineups_settled, report.players_scored, report.rooms_advanced
        );
    }
    Ok(())
}

pub fn handle_recalculate_totals(ctx: &mut CommandContext) -> Result<()> {
    let report = recalculate_totals(&mut ctx.db)?;
    println!(
        "✓ Recomputed totals for {} owners across {} gameweeks",
        report.owners_recomputed, report.gameweeks
    );
    Ok(())
}
