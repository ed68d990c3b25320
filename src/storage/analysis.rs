//! Read-side aggregates: leaderboards and operator diagnostics

use super::{models::*, schema::Database};
use crate::{Gameweek, Result, RoomId, UserId};
use rusqlite::params;
use serde::Serialize;

/// Row counts and data-quality signals for the admin diagnostics endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub teams: i64,
    pub players: i64,
    pub fixtures: i64,
    pub finished_fixtures: i64,
    pub player_events: i64,
    pub rooms: i64,
    pub users: i64,
    pub lineups: i64,
    pub unsettled_lineups: i64,
    pub teams_without_fpl_mapping: Vec<String>,
    pub players_without_team: i64,
    pub gameweeks: Vec<GameweekStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameweekStatus {
    pub gameweek: Gameweek,
    pub fixtures: i64,
    pub finished: i64,
}

impl Database {
    /// Active members ranked by points.
    ///
    /// With a gameweek, ranks by that gameweek's points; without one, by
    /// the sum of every settled gameweek. Ties keep join order.
    pub fn leaderboard(
        &self,
        room_id: RoomId,
        gameweek: Option<Gameweek>,
    ) -> Result<Vec<LeaderboardEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT m.user_id, u.email, m.joined_at,
                    COALESCE((SELECT SUM(l.gameweek_points) FROM lineups l
                              WHERE l.user_id = m.user_id AND l.room_id = m.room_id
                                AND l.settled_at IS NOT NULL
                                AND (?2 IS NULL OR l.gameweek = ?2)), 0) AS points
             FROM room_members m
             LEFT JOIN users u ON u.id = m.user_id
             WHERE m.room_id = ?1 AND m.is_active = 1
             ORDER BY points DESC, m.joined_at, m.user_id",
        )?;
        let rows = stmt.query_map(params![room_id, gameweek], |row| {
            Ok((
                row.get::<_, UserId>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut entries = Vec::new();
        for (index, row) in rows.enumerate() {
            let (user_id, email, joined_at, points) = row?;
            entries.push(LeaderboardEntry {
                rank: index + 1,
                user_id,
                email,
                points,
                joined_at,
            });
        }
        Ok(entries)
    }

    pub fn diagnostics(&self) -> Result<Diagnostics> {
        let count = |sql: &str| -> Result<i64> {
            Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
        };

        let mut stmt = self.conn.prepare(
            "SELECT t.name FROM teams t
             WHERE NOT EXISTS (SELECT 1 FROM team_mappings m
                               WHERE m.team_id = t.id AND m.provider = 'fpl')
             ORDER BY t.name",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut teams_without_fpl_mapping: Vec<String> = Vec::new();
        for row in rows {
            teams_without_fpl_mapping.push(row?);
        }

        let mut stmt = self.conn.prepare(
            "SELECT gameweek, COUNT(*), COALESCE(SUM(finished), 0) FROM fixtures
             GROUP BY gameweek ORDER BY gameweek",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(GameweekStatus {
                gameweek: row.get(0)?,
                fixtures: row.get(1)?,
                finished: row.get(2)?,
            })
        })?;
        let mut gameweeks = Vec::new();
        for row in rows {
            gameweeks.push(row?);
        }

        Ok(Diagnostics {
            teams: count("SELECT COUNT(*) FROM teams")?,
            players: count("SELECT COUNT(*) FROM players")?,
            fixtures: self.count_fixtures()?,
            finished_fixtures: count("SELECT COUNT(*) FROM fixtures WHERE finished = 1")?,
            player_events: self.count_player_events()?,
            rooms: count("SELECT COUNT(*) FROM rooms")?,
            users: count("SELECT COUNT(*) FROM users")?,
            lineups: self.count_lineups()?,
            unsettled_lineups: count(
                "SELECT COUNT(*) FROM lineups WHERE submitted = 1 AND settled_at IS NULL",
            )?,
            teams_without_fpl_mapping,
            players_without_team: count("SELECT COUNT(*) FROM players WHERE team_id IS NULL")?,
            gameweeks,
        })
    }
}
