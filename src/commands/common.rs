//! Resources and helpers shared across commands.

use std::collections::HashMap;

use reqwest::Client;

use crate::{
    config::AppConfig,
    providers::{http::build_client, FootballDataClient, FplClient},
    scoring::{EventType, ScoringEvent},
    storage::{Database, PlayerEvent},
    FixtureId, PlayerId, Result,
};

/// Context containing common resources needed by the CLI commands
pub struct CommandContext {
    pub config: AppConfig,
    pub db: Database,
    pub fpl: FplClient,
    http: Client,
}

impl CommandContext {
    /// Open the database and build provider clients from configuration
    pub fn new(config: AppConfig, verbose: bool) -> Result<Self> {
        if verbose {
            println!("Connecting to database at {}...", config.db_path.display());
        }
        let db = Database::open(&config.db_path)?;

        let client = build_client()?;
        let fpl = FplClient::new(client.clone(), config.fpl_base_url.clone());

        Ok(Self {
            config,
            db,
            fpl,
            http: client,
        })
    }

    /// Football-Data client; `MissingConfig` without an API key
    pub fn football_data(&self) -> Result<FootballDataClient> {
        let key = self.config.require_football_data_key()?;
        Ok(FootballDataClient::new(
            self.http.clone(),
            self.config.football_data_base_url.clone(),
            key,
        ))
    }
}

/// One player's stored events for one fixture, in scoring form
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FixtureLine {
    pub minutes: u32,
    pub events: Vec<ScoringEvent>,
}

/// Group stored events by player, then by fixture.
///
/// Minutes come from the appearance event's value. Rows whose type is not
/// a known scoring event are skipped.
pub fn group_events(events: &[PlayerEvent]) -> HashMap<PlayerId, Vec<(FixtureId, FixtureLine)>> {
    let mut grouped: HashMap<PlayerId, Vec<(FixtureId, FixtureLine)>> = HashMap::new();

    for event in events {
        let Ok(kind) = event.event_type.parse::<EventType>() else {
            continue;
        };

        let fixtures = grouped.entry(event.player_id).or_default();
        let index = match fixtures.iter().position(|(id, _)| *id == event.fixture_id) {
            Some(index) => index,
            None => {
                fixtures.push((event.fixture_id, FixtureLine::default()));
                fixtures.len() - 1
            }
        };
        let line = &mut fixtures[index].1;

        if kind == EventType::Appearance {
            line.minutes = event.value.unwrap_or(0).clamp(0, u32::MAX as i64) as u32;
        }
        line.events.push(ScoringEvent {
            kind,
            value: event.value.map(|v| v as i32),
        });
    }

    grouped
}
