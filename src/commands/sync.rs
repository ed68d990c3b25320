//! Provider synchronisation: teams and players, fixtures, player statistics.
//!
//! Every sync is split into a network half (`fetch_*`) and a store half
//! (`apply_*`). The store half is synchronous and takes `&mut Database`, so
//! callers holding the database behind a lock never await while holding it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use super::common::CommandContext;
use crate::{
    providers::{
        cache::{bootstrap_cache_path, load_or_fetch_bootstrap},
        types::{Bootstrap, ElementSummary, FdMatch, FplFixture},
        FplClient,
    },
    reconcile::{
        fetch_in_batches, resolve_player, resolve_team, BatchConfig, ExternalTeam, MatchOutcome,
        PROVIDER_FOOTBALL_DATA, PROVIDER_FPL,
    },
    storage::{Database, FixtureResult, NewTeam, PlayerUpdate, UpsertOutcome},
    FantasyError, Gameweek, PlayerId, Position, Result, TeamId,
};

/// Where fixture results come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixtureSource {
    #[default]
    Fpl,
    FootballData,
}

impl FixtureSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixtureSource::Fpl => PROVIDER_FPL,
            FixtureSource::FootballData => PROVIDER_FOOTBALL_DATA,
        }
    }
}

impl fmt::Display for FixtureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FixtureSource {
    type Err = FantasyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fpl" => Ok(FixtureSource::Fpl),
            "football-data" | "football_data" | "footballdata" => Ok(FixtureSource::FootballData),
            other => Err(FantasyError::validation(format!(
                "unknown fixture source: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BootstrapReport {
    pub teams_mapped: usize,
    pub teams_created: usize,
    pub players_updated: usize,
    pub players_created: usize,
    /// Provider names that matched several internal rows
    pub ambiguous: Vec<String>,
    pub skipped: Vec<String>,
    /// Gameweek FPL reports as next open, if any
    pub next_gameweek: Option<Gameweek>,
    pub rooms_advanced: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureSyncReport {
    pub gameweek: Gameweek,
    pub source: FixtureSource,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Fixtures skipped because a team could not be resolved
    pub unresolved: Vec<String>,
}

impl FixtureSyncReport {
    fn new(gameweek: Gameweek, source: FixtureSource) -> Self {
        Self {
            gameweek,
            source,
            inserted: 0,
            updated: 0,
            unchanged: 0,
            unresolved: Vec::new(),
        }
    }

    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsReport {
    pub requested: usize,
    pub fetched: usize,
    pub players_written: usize,
    pub events_written: usize,
    /// History rows whose fixture is not in the store yet
    pub unknown_fixtures: usize,
}

// ---------- bootstrap ----------

/// Reconcile FPL teams and players into the store.
///
/// Teams that match nothing are created and mapped; players are matched
/// within their team's squad and created when unmatched. Players of a team
/// that could not be resolved are skipped. Rooms behind FPL's next open
/// gameweek are moved up to it.
pub fn apply_bootstrap(db: &mut Database, bootstrap: &Bootstrap) -> Result<BootstrapReport> {
    let mut report = BootstrapReport::default();
    let mut team_keys: HashMap<u32, TeamId> = HashMap::new();

    for team in &bootstrap.teams {
        let external = ExternalTeam {
            provider: PROVIDER_FPL,
            external_id: team.id.to_string(),
            name: team.name.clone(),
            short_code: Some(team.short_name.clone()),
        };

        match resolve_team(db, &external)? {
            MatchOutcome::Matched { key, .. } => {
                report.teams_mapped += 1;
                team_keys.insert(team.id, key);
            }
            MatchOutcome::Ambiguous { .. } => report.ambiguous.push(team.name.clone()),
            MatchOutcome::Unmatched => {
                let team_id = db.insert_team(&NewTeam {
                    name: team.name.clone(),
                    short_name: team.short_name.clone(),
                    color: None,
                    logo_url: None,
                })?;
                db.set_team_mapping(PROVIDER_FPL, &external.external_id, team_id)?;
                report.teams_created += 1;
                team_keys.insert(team.id, team_id);
            }
        }
    }

    for element in &bootstrap.elements {
        let position = match Position::from_element_type(element.element_type) {
            Ok(position) => position,
            Err(e) => {
                warn!(element = element.id, error = %e, "skipping player");
                report.skipped.push(element.web_name.clone());
                continue;
            }
        };

        let Some(team_id) = team_keys.get(&element.team).copied() else {
            warn!(element = element.id, team = element.team, "team unresolved; skipping player");
            report.skipped.push(element.web_name.clone());
            continue;
        };
        let update = PlayerUpdate {
            name: element.full_name(),
            position,
            team_id: Some(team_id),
            price: element.price(),
            goals: element.goals_scored,
            assists: element.assists,
            total_points: element.total_points,
        };

        let external_id = element.id.to_string();
        match resolve_player(db, PROVIDER_FPL, &external_id, &update.name, Some(team_id))? {
            MatchOutcome::Matched { key, .. } => {
                db.update_player(key, &update)?;
                report.players_updated += 1;
            }
            MatchOutcome::Ambiguous { .. } => report.ambiguous.push(update.name.clone()),
            MatchOutcome::Unmatched => {
                let player_id = db.insert_player(&update)?;
                db.set_player_mapping(PROVIDER_FPL, &external_id, player_id)?;
                report.players_created += 1;
            }
        }
    }

    report.next_gameweek = bootstrap.next_open_gameweek();
    if let Some(next) = report.next_gameweek {
        report.rooms_advanced = db.advance_active_gameweek(next)?;
    }

    info!(
        teams_mapped = report.teams_mapped,
        teams_created = report.teams_created,
        players_updated = report.players_updated,
        players_created = report.players_created,
        ambiguous = report.ambiguous.len(),
        rooms_advanced = report.rooms_advanced,
        "bootstrap applied"
    );
    Ok(report)
}

// ---------- fixtures ----------

/// Upsert FPL fixtures of one gameweek. The FPL fixture id becomes the
/// stored provider id.
pub fn apply_fpl_fixtures(
    db: &mut Database,
    gameweek: Gameweek,
    fixtures: &[FplFixture],
) -> Result<FixtureSyncReport> {
    let mut report = FixtureSyncReport::new(gameweek, FixtureSource::Fpl);

    for fixture in fixtures {
        if fixture.event.is_some_and(|event| event != gameweek.as_u8()) {
            continue;
        }

        let home = db.team_mapping(PROVIDER_FPL, &fixture.team_h.to_string())?;
        let away = db.team_mapping(PROVIDER_FPL, &fixture.team_a.to_string())?;
        let (Some(home), Some(away)) = (home, away) else {
            report
                .unresolved
                .push(format!("fpl fixture {}: team {} v {}", fixture.id, fixture.team_h, fixture.team_a));
            continue;
        };

        let outcome = db.upsert_fixture_result(&FixtureResult {
            provider_id: Some(fixture.id),
            gameweek,
            home_team_id: home,
            away_team_id: away,
            home_score: fixture.team_h_score,
            away_score: fixture.team_a_score,
            finished: fixture.finished,
            minutes: fixture.minutes,
            kickoff_time: fixture.kickoff_time.clone(),
        })?;
        report.record(outcome);
    }

    Ok(report)
}

/// Upsert Football-Data.org matches of one matchday.
///
/// Football-Data ids live in a different id space from FPL's, so these rows
/// are keyed on `(gameweek, home, away)` and never touch the provider id.
pub fn apply_football_data_matches(
    db: &mut Database,
    gameweek: Gameweek,
    matches: &[FdMatch],
) -> Result<FixtureSyncReport> {
    let mut report = FixtureSyncReport::new(gameweek, FixtureSource::FootballData);

    for m in matches {
        let home = resolve_fd_team(db, &m.home_team)?;
        let away = resolve_fd_team(db, &m.away_team)?;
        let (Some(home), Some(away)) = (home, away) else {
            report.unresolved.push(format!(
                "football-data match {}: {} v {}",
                m.id,
                m.home_team.name.as_deref().unwrap_or("?"),
                m.away_team.name.as_deref().unwrap_or("?")
            ));
            continue;
        };

        let finished = m.is_finished();
        let outcome = db.upsert_fixture_result(&FixtureResult {
            provider_id: None,
            gameweek,
            home_team_id: home,
            away_team_id: away,
            home_score: m.score.full_time.home,
            away_score: m.score.full_time.away,
            finished,
            minutes: if finished { 90 } else { 0 },
            kickoff_time: m.utc_date.clone(),
        })?;
        report.record(outcome);
    }

    Ok(report)
}

fn resolve_fd_team(
    db: &mut Database,
    team: &crate::providers::types::FdTeam,
) -> Result<Option<TeamId>> {
    let (Some(id), Some(name)) = (team.id, team.name.as_ref()) else {
        return Ok(None);
    };

    let external = ExternalTeam {
        provider: PROVIDER_FOOTBALL_DATA,
        external_id: id.to_string(),
        name: name.clone(),
        short_code: team.tla.clone(),
    };
    Ok(resolve_team(db, &external)?.key().copied())
}

// ---------- player statistics ----------

/// FPL element ids of every mapped player
pub fn stats_targets(db: &Database) -> Result<Vec<(PlayerId, u32)>> {
    let mut targets = Vec::new();
    for (player_id, external_id) in db.player_mappings_for(PROVIDER_FPL)? {
        match external_id.parse::<u32>() {
            Ok(element_id) => targets.push((player_id, element_id)),
            Err(_) => warn!(%player_id, %external_id, "non-numeric FPL element id"),
        }
    }
    Ok(targets)
}

/// Fetch element summaries in rate-limited batches. Failed ids are omitted.
pub async fn fetch_player_stats(
    fpl: &FplClient,
    element_ids: &[u32],
    config: BatchConfig,
) -> HashMap<u32, ElementSummary> {
    fetch_in_batches(element_ids, config, |id| fpl.element_summary(id)).await
}

/// Replace stored events for every (player, fixture) line of the gameweek.
pub fn apply_player_stats(
    db: &mut Database,
    gameweek: Gameweek,
    targets: &[(PlayerId, u32)],
    summaries: &HashMap<u32, ElementSummary>,
) -> Result<StatsReport> {
    let mut report = StatsReport {
        requested: targets.len(),
        fetched: summaries.len(),
        ..Default::default()
    };

    for (player_id, element_id) in targets {
        let Some(summary) = summaries.get(element_id) else {
            continue;
        };

        let mut wrote = false;
        for line in summary
            .history
            .iter()
            .filter(|h| h.round == gameweek.as_u8())
        {
            let Some(fixture) = db.fixture_by_provider_id(line.fixture)? else {
                report.unknown_fixtures += 1;
                continue;
            };
            report.events_written +=
                db.replace_player_events(fixture.id, *player_id, &line.to_events())?;
            wrote = true;
        }
        if wrote {
            report.players_written += 1;
        }
    }

    info!(
        %gameweek,
        requested = report.requested,
        fetched = report.fetched,
        events = report.events_written,
        "player stats applied"
    );
    Ok(report)
}

// ---------- CLI handlers ----------

/// Fetch (or read cached) bootstrap and reconcile it
pub async fn handle_sync_bootstrap(ctx: &mut CommandContext, refresh: bool, verbose: bool) -> Result<()> {
    if verbose {
        println!("Loading FPL bootstrap (refresh: {})...", refresh);
    }
    let bootstrap = load_or_fetch_bootstrap(&ctx.fpl, &bootstrap_cache_path(), refresh).await?;
    let report = apply_bootstrap(&mut ctx.db, &bootstrap)?;

    println!(
        "✓ Teams: {} mapped, {} created | Players: {} updated, {} created",
        report.teams_mapped, report.teams_created, report.players_updated, report.players_created
    );
    if let Some(next) = report.next_gameweek {
        println!("✓ Next gameweek {} ({} rooms advanced)", next, report.rooms_advanced);
    }
    for name in &report.ambiguous {
        println!("⚠ Ambiguous match: {}", name);
    }
    Ok(())
}

pub async fn handle_sync_fixtures(
    ctx: &mut CommandContext,
    gameweek: Gameweek,
    source: FixtureSource,
    verbose: bool,
) -> Result<()> {
    if verbose {
        println!("Fetching gameweek {} fixtures from {}...", gameweek, source);
    }

    let report = match source {
        FixtureSource::Fpl => {
            let fixtures = ctx.fpl.fixtures(gameweek).await?;
            apply_fpl_fixtures(&mut ctx.db, gameweek, &fixtures)?
        }
        FixtureSource::FootballData => {
            let matches = ctx.football_data()?.matches(gameweek).await?;
            apply_football_data_matches(&mut ctx.db, gameweek, &matches)?
        }
    };

    println!(
        "✓ Gameweek {}: {} inserted, {} updated, {} unchanged",
        gameweek, report.inserted, report.updated, report.unchanged
    );
    for line in &report.unresolved {
        println!("⚠ Unresolved: {}", line);
    }
    Ok(())
}

pub async fn handle_sync_player_stats(
    ctx: &mut CommandContext,
    gameweek: Gameweek,
    verbose: bool,
) -> Result<()> {
    let targets = stats_targets(&ctx.db)?;
    if verbose {
        println!("Fetching statistics for {} players...", targets.len());
    }

    let ids: Vec<u32> = targets.iter().map(|(_, id)| *id).collect();
    let summaries = fetch_player_stats(&ctx.fpl, &ids, BatchConfig::default()).await;
    let report = apply_player_stats(&mut ctx.db, gameweek, &targets, &summaries)?;

    println!(
        "✓ Gameweek {}: {}/{} players fetched, {} events written",
        gameweek, report.fetched, report.requested, report.events_written
    );
    if report.unknown_fixtures > 0 {
        println!(
            "⚠ {} lines reference fixtures not yet synced; run `sync fixtures` first",
            report.unknown_fixtures
        );
    }
    Ok(())
}
