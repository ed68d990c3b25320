//! Operator commands: explicit mappings and diagnostics.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::common::CommandContext;
use crate::{
    reconcile::{PROVIDER_FOOTBALL_DATA, PROVIDER_FPL},
    storage::Database,
    FantasyError, Result, TeamId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMappingRequest {
    pub provider: String,
    pub external_id: String,
    pub team_id: TeamId,
}

/// Record an explicit provider-to-team mapping, replacing any earlier one.
pub fn set_team_mapping(db: &mut Database, request: &TeamMappingRequest) -> Result<()> {
    let provider = match request.provider.trim() {
        p if p.eq_ignore_ascii_case(PROVIDER_FPL) => PROVIDER_FPL,
        p if p.eq_ignore_ascii_case(PROVIDER_FOOTBALL_DATA) => PROVIDER_FOOTBALL_DATA,
        other => {
            return Err(FantasyError::validation(format!(
                "unknown provider: {}",
                other
            )))
        }
    };

    let external_id = request.external_id.trim();
    if external_id.is_empty() {
        return Err(FantasyError::validation("external_id is required"));
    }
    if !db.list_teams()?.iter().any(|t| t.id == request.team_id) {
        return Err(FantasyError::not_found("team", request.team_id));
    }

    db.set_team_mapping(provider, external_id, request.team_id)?;
    info!(provider, external_id, team_id = %request.team_id, "team mapping set");
    Ok(())
}

pub fn handle_diagnostics(ctx: &CommandContext, as_json: bool) -> Result<()> {
    let diagnostics = ctx.db.diagnostics()?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
        return Ok(());
    }

    println!(
        "Teams: {}  Players: {}  Fixtures: {} ({} finished)  Events: {}",
        diagnostics.teams,
        diagnostics.players,
        diagnostics.fixtures,
        diagnostics.finished_fixtures,
        diagnostics.player_events
    );
    println!(
        "Users: {}  Rooms: {}  Lineups: {} ({} unsettled)",
        diagnostics.users, diagnostics.rooms, diagnostics.lineups, diagnostics.unsettled_lineups
    );
    for name in &diagnostics.teams_without_fpl_mapping {
        println!("⚠ No FPL mapping: {}", name);
    }
    if diagnostics.players_without_team > 0 {
        println!("⚠ {} players without a team", diagnostics.players_without_team);
    }
    for gw in &diagnostics.gameweeks {
        println!("  GW{:>2}: {}/{} finished", gw.gameweek, gw.finished, gw.fixtures);
    }
    Ok(())
}
