//! Reconciliation of provider identifiers onto internal keys
//!
//! - `matcher`: name/short-code heuristics
//! - `batch`: rate-limited per-item fetches
//!
//! Resolution consults the explicit mapping table first. Heuristic matches
//! that are unique get written back to the table, so later runs resolve the
//! same identifier without guessing.

pub mod batch;
pub mod matcher;

pub use batch::{fetch_in_batches, BatchConfig};
pub use matcher::{match_by_name, match_with_rules, MatchOutcome, MatchRule, Reconcilable};

use tracing::{debug, info, warn};

use crate::storage::Database;
use crate::{PlayerId, Result, TeamId};

/// Name rules for players. First names are shared too widely for the
/// first-word rule.
const PLAYER_RULES: [MatchRule; 3] = [
    MatchRule::ExactName,
    MatchRule::ExternalContainsInternal,
    MatchRule::ShortCode,
];

pub const PROVIDER_FPL: &str = "fpl";
pub const PROVIDER_FOOTBALL_DATA: &str = "football-data";

/// A team as described by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTeam {
    pub provider: &'static str,
    pub external_id: String,
    pub name: String,
    pub short_code: Option<String>,
}

/// Resolve a provider team onto an internal team.
pub fn resolve_team(db: &mut Database, team: &ExternalTeam) -> Result<MatchOutcome<TeamId>> {
    if let Some(team_id) = db.team_mapping(team.provider, &team.external_id)? {
        return Ok(MatchOutcome::Matched {
            key: team_id,
            rule: MatchRule::Mapping,
        });
    }

    let teams = db.list_teams()?;
    let outcome = match_by_name(&team.name, team.short_code.as_deref(), &teams);

    match &outcome {
        MatchOutcome::Matched { key, rule } => {
            info!(
                provider = team.provider,
                external_id = %team.external_id,
                name = %team.name,
                team_id = %key,
                rule = %rule,
                "recording team mapping"
            );
            db.set_team_mapping(team.provider, &team.external_id, *key)?;
        }
        MatchOutcome::Ambiguous { rule, candidates } => {
            warn!(
                provider = team.provider,
                name = %team.name,
                rule = %rule,
                candidates = ?candidates,
                "ambiguous team match; add an explicit mapping"
            );
        }
        MatchOutcome::Unmatched => {
            debug!(provider = team.provider, name = %team.name, "no team match");
        }
    }

    Ok(outcome)
}

/// Resolve a provider player onto an internal player within the given team.
///
/// Name matching is restricted to that team's squad, since player names
/// collide across clubs far more often than team names do.
pub fn resolve_player(
    db: &mut Database,
    provider: &'static str,
    external_id: &str,
    name: &str,
    team_id: Option<TeamId>,
) -> Result<MatchOutcome<PlayerId>> {
    if let Some(player_id) = db.player_mapping(provider, external_id)? {
        return Ok(MatchOutcome::Matched {
            key: player_id,
            rule: MatchRule::Mapping,
        });
    }

    let Some(team_id) = team_id else {
        return Ok(MatchOutcome::Unmatched);
    };

    let squad = db.list_players(None, Some(team_id))?;
    let outcome = match_with_rules(name, None, &squad, &PLAYER_RULES);

    if let MatchOutcome::Matched { key, .. } = &outcome {
        db.set_player_mapping(provider, external_id, *key)?;
    }
    Ok(outcome)
}
