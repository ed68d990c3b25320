//! Users, teams, players and provider mappings

use super::{models::*, schema::now_secs, schema::Database};
use crate::{PlayerId, Position, Result, TeamId, UserId};
use rusqlite::{params, OptionalExtension, Row};

impl Database {
    /// Record a user the auth service vouched for; keeps the first
    /// `created_at` and refreshes the email.
    pub fn upsert_user(&mut self, id: &UserId, email: Option<&str>) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users (id, email, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET email = COALESCE(excluded.email, users.email)",
            params![id, email, now_secs()],
        )?;
        Ok(())
    }

    pub fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, email, created_at FROM users WHERE id = ?",
                params![id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    pub fn insert_team(&mut self, team: &NewTeam) -> Result<TeamId> {
        self.conn.execute(
            "INSERT INTO teams (name, short_name, color, logo_url) VALUES (?, ?, ?, ?)",
            params![team.name, team.short_name, team.color, team.logo_url],
        )?;
        Ok(TeamId::new(self.conn.last_insert_rowid()))
    }

    pub fn update_team(&mut self, id: TeamId, team: &NewTeam) -> Result<()> {
        self.conn.execute(
            "UPDATE teams SET name = ?, short_name = ?,
                 color = COALESCE(?, color), logo_url = COALESCE(?, logo_url)
             WHERE id = ?",
            params![team.name, team.short_name, team.color, team.logo_url, id],
        )?;
        Ok(())
    }

    /// All teams in insertion order
    pub fn list_teams(&self) -> Result<Vec<Team>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, short_name, color, logo_url FROM teams ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Team {
                id: row.get(0)?,
                name: row.get(1)?,
                short_name: row.get(2)?,
                color: row.get(3)?,
                logo_url: row.get(4)?,
            })
        })?;

        let mut teams = Vec::new();
        for row in rows {
            teams.push(row?);
        }
        Ok(teams)
    }

    pub fn team_mapping(&self, provider: &str, external_id: &str) -> Result<Option<TeamId>> {
        let id = self
            .conn
            .query_row(
                "SELECT team_id FROM team_mappings WHERE provider = ? AND external_id = ?",
                params![provider, external_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Point a provider's team identifier at an internal team, replacing any
    /// earlier mapping for the same identifier.
    pub fn set_team_mapping(
        &mut self,
        provider: &str,
        external_id: &str,
        team_id: TeamId,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO team_mappings (provider, external_id, team_id) VALUES (?, ?, ?)
             ON CONFLICT(provider, external_id) DO UPDATE SET team_id = excluded.team_id",
            params![provider, external_id, team_id],
        )?;
        Ok(())
    }

    pub fn player_mapping(&self, provider: &str, external_id: &str) -> Result<Option<PlayerId>> {
        let id = self
            .conn
            .query_row(
                "SELECT player_id FROM player_mappings WHERE provider = ? AND external_id = ?",
                params![provider, external_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    pub fn set_player_mapping(
        &mut self,
        provider: &str,
        external_id: &str,
        player_id: PlayerId,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO player_mappings (provider, external_id, player_id) VALUES (?, ?, ?)
             ON CONFLICT(provider, external_id) DO UPDATE SET player_id = excluded.player_id",
            params![provider, external_id, player_id],
        )?;
        Ok(())
    }

    /// External ids of every player mapped for `provider`, keyed by internal id
    pub fn player_mappings_for(&self, provider: &str) -> Result<Vec<(PlayerId, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT player_id, external_id FROM player_mappings
             WHERE provider = ? ORDER BY player_id",
        )?;
        let rows = stmt.query_map(params![provider], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut mappings = Vec::new();
        for row in rows {
            mappings.push(row?);
        }
        Ok(mappings)
    }

    pub fn insert_player(&mut self, player: &PlayerUpdate) -> Result<PlayerId> {
        self.conn.execute(
            "INSERT INTO players (name, position, team_id, price, goals, assists, total_points)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                player.name,
                player.position.as_str(),
                player.team_id,
                player.price,
                player.goals,
                player.assists,
                player.total_points
            ],
        )?;
        Ok(PlayerId::new(self.conn.last_insert_rowid()))
    }

    pub fn update_player(&mut self, id: PlayerId, player: &PlayerUpdate) -> Result<()> {
        self.conn.execute(
            "UPDATE players SET name = ?, position = ?, team_id = ?, price = ?,
                 goals = ?, assists = ?, total_points = ?
             WHERE id = ?",
            params![
                player.name,
                player.position.as_str(),
                player.team_id,
                player.price,
                player.goals,
                player.assists,
                player.total_points,
                id
            ],
        )?;
        Ok(())
    }

    pub fn get_player(&self, id: PlayerId) -> Result<Option<Player>> {
        let player = self
            .conn
            .query_row(
                "SELECT id, name, position, team_id, price, goals, assists, total_points
                 FROM players WHERE id = ?",
                params![id],
                row_to_player,
            )
            .optional()?;
        Ok(player)
    }

    /// Players, optionally narrowed to one position and/or one team
    pub fn list_players(
        &self,
        position: Option<Position>,
        team_id: Option<TeamId>,
    ) -> Result<Vec<Player>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, position, team_id, price, goals, assists, total_points
             FROM players
             WHERE (?1 IS NULL OR position = ?1) AND (?2 IS NULL OR team_id = ?2)
             ORDER BY total_points DESC, id",
        )?;
        let rows = stmt.query_map(params![position.map(|p| p.as_str()), team_id], row_to_player)?;

        let mut players = Vec::new();
        for row in rows {
            players.push(row?);
        }
        Ok(players)
    }

    /// Fetch several players at once; missing ids are simply absent
    pub fn get_players(&self, ids: &[PlayerId]) -> Result<Vec<Player>> {
        let mut players = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(player) = self.get_player(*id)? {
                players.push(player);
            }
        }
        Ok(players)
    }
}

fn row_to_player(row: &Row) -> rusqlite::Result<Player> {
    let position: String = row.get(2)?;
    let position = position.parse::<Position>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        position,
        team_id: row.get(3)?,
        price: row.get(4)?,
        goals: row.get(5)?,
        assists: row.get(6)?,
        total_points: row.get(7)?,
    })
}
