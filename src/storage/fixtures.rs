//! Fixtures and the per-player match events attached to them

use super::{models::*, schema::Database};
use crate::{FixtureId, Gameweek, PlayerId, Result};
use rusqlite::{params, OptionalExtension, Row};

const FIXTURE_COLUMNS: &str = "id, provider_id, gameweek, home_team_id, away_team_id,
     home_score, away_score, finished, minutes, kickoff_time";

impl Database {
    /// Insert or update a fixture result.
    ///
    /// Rows are matched on `provider_id` when the provider supplies one, and
    /// otherwise on `(gameweek, home_team_id, away_team_id)`. Re-applying the
    /// same result is a no-op and reports [`UpsertOutcome::Unchanged`].
    pub fn upsert_fixture_result(&mut self, result: &FixtureResult) -> Result<UpsertOutcome> {
        let by_provider = match result.provider_id {
            Some(provider_id) => self
                .conn
                .query_row(
                    &format!("SELECT {FIXTURE_COLUMNS} FROM fixtures WHERE provider_id = ?"),
                    params![provider_id],
                    row_to_fixture,
                )
                .optional()?,
            None => None,
        };

        let existing = match by_provider {
            Some(fixture) => Some(fixture),
            None => self
                .conn
                .query_row(
                    &format!(
                        "SELECT {FIXTURE_COLUMNS} FROM fixtures
                         WHERE gameweek = ? AND home_team_id = ? AND away_team_id = ?"
                    ),
                    params![result.gameweek, result.home_team_id, result.away_team_id],
                    row_to_fixture,
                )
                .optional()?,
        };

        let Some(existing) = existing else {
            self.conn.execute(
                "INSERT INTO fixtures (provider_id, gameweek, home_team_id, away_team_id,
                     home_score, away_score, finished, minutes, kickoff_time)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    result.provider_id,
                    result.gameweek,
                    result.home_team_id,
                    result.away_team_id,
                    result.home_score,
                    result.away_score,
                    result.finished,
                    result.minutes,
                    result.kickoff_time
                ],
            )?;
            return Ok(UpsertOutcome::Inserted);
        };

        // A provider that omits its id must not wipe one recorded earlier.
        let provider_id = result.provider_id.or(existing.provider_id);
        let kickoff_time = result
            .kickoff_time
            .clone()
            .or_else(|| existing.kickoff_time.clone());

        let unchanged = existing.provider_id == provider_id
            && existing.gameweek == result.gameweek
            && existing.home_team_id == result.home_team_id
            && existing.away_team_id == result.away_team_id
            && existing.home_score == result.home_score
            && existing.away_score == result.away_score
            && existing.finished == result.finished
            && existing.minutes == result.minutes
            && existing.kickoff_time == kickoff_time;

        if unchanged {
            return Ok(UpsertOutcome::Unchanged);
        }

        self.conn.execute(
            "UPDATE fixtures SET provider_id = ?, gameweek = ?, home_team_id = ?,
                 away_team_id = ?, home_score = ?, away_score = ?, finished = ?,
                 minutes = ?, kickoff_time = ?
             WHERE id = ?",
            params![
                provider_id,
                result.gameweek,
                result.home_team_id,
                result.away_team_id,
                result.home_score,
                result.away_score,
                result.finished,
                result.minutes,
                kickoff_time,
                existing.id
            ],
        )?;
        Ok(UpsertOutcome::Updated)
    }

    pub fn fixture_by_provider_id(&self, provider_id: i64) -> Result<Option<Fixture>> {
        let fixture = self
            .conn
            .query_row(
                &format!("SELECT {FIXTURE_COLUMNS} FROM fixtures WHERE provider_id = ?"),
                params![provider_id],
                row_to_fixture,
            )
            .optional()?;
        Ok(fixture)
    }

    /// Fixtures for one gameweek, or the whole season when `gameweek` is None
    pub fn list_fixtures(&self, gameweek: Option<Gameweek>) -> Result<Vec<Fixture>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FIXTURE_COLUMNS} FROM fixtures
             WHERE (?1 IS NULL OR gameweek = ?1)
             ORDER BY gameweek, kickoff_time, id"
        ))?;
        let rows = stmt.query_map(params![gameweek], row_to_fixture)?;

        let mut fixtures = Vec::new();
        for row in rows {
            fixtures.push(row?);
        }
        Ok(fixtures)
    }

    pub fn count_fixtures(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM fixtures", [], |row| row.get(0))?;
        Ok(count)
    }

    /// True when the gameweek has fixtures and every one of them is finished
    pub fn gameweek_finished(&self, gameweek: Gameweek) -> Result<bool> {
        let (total, finished): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(finished), 0) FROM fixtures WHERE gameweek = ?",
            params![gameweek],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(total > 0 && total == finished)
    }

    /// Replace every event recorded for `player_id` in `fixture_id`.
    ///
    /// Runs in one transaction so a re-sync never leaves a half-written
    /// event set behind.
    pub fn replace_player_events(
        &mut self,
        fixture_id: FixtureId,
        player_id: PlayerId,
        events: &[NewPlayerEvent],
    ) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM player_events WHERE fixture_id = ? AND player_id = ?",
            params![fixture_id, player_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO player_events (fixture_id, player_id, event_type, minute, value)
                 VALUES (?, ?, ?, ?, ?)",
            )?;
            for event in events {
                stmt.execute(params![
                    fixture_id,
                    player_id,
                    event.event_type,
                    event.minute,
                    event.value
                ])?;
            }
        }
        tx.commit()?;
        Ok(events.len())
    }

    /// Events for one player across every fixture of a gameweek
    pub fn player_events_for_gameweek(
        &self,
        player_id: PlayerId,
        gameweek: Gameweek,
    ) -> Result<Vec<PlayerEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.id, e.fixture_id, e.player_id, e.event_type, e.minute, e.value
             FROM player_events e
             JOIN fixtures f ON f.id = e.fixture_id
             WHERE e.player_id = ? AND f.gameweek = ?
             ORDER BY e.fixture_id, e.id",
        )?;
        let rows = stmt.query_map(params![player_id, gameweek], row_to_event)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    /// Every event in a gameweek, used by settlement to score all players
    /// with one query
    pub fn events_for_gameweek(&self, gameweek: Gameweek) -> Result<Vec<PlayerEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.id, e.fixture_id, e.player_id, e.event_type, e.minute, e.value
             FROM player_events e
             JOIN fixtures f ON f.id = e.fixture_id
             WHERE f.gameweek = ?
             ORDER BY e.player_id, e.fixture_id, e.id",
        )?;
        let rows = stmt.query_map(params![gameweek], row_to_event)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    pub fn count_player_events(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM player_events", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn row_to_fixture(row: &Row) -> rusqlite::Result<Fixture> {
    Ok(Fixture {
        id: row.get(0)?,
        provider_id: row.get(1)?,
        gameweek: row.get(2)?,
        home_team_id: row.get(3)?,
        away_team_id: row.get(4)?,
        home_score: row.get(5)?,
        away_score: row.get(6)?,
        finished: row.get(7)?,
        minutes: row.get(8)?,
        kickoff_time: row.get(9)?,
    })
}

fn row_to_event(row: &Row) -> rusqlite::Result<PlayerEvent> {
    Ok(PlayerEvent {
        id: row.get(0)?,
        fixture_id: row.get(1)?,
        player_id: row.get(2)?,
        event_type: row.get(3)?,
        minute: row.get(4)?,
        value: row.get(5)?,
    })
}
