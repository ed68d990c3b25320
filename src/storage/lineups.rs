//! Lineups, their player slots, and settlement writes

use super::{models::*, schema::now_secs, schema::Database};
use crate::scoring::Chip;
use crate::{Gameweek, LineupId, Result, RoomId, UserId};
use rusqlite::{params, OptionalExtension, Row};

const LINEUP_COLUMNS: &str = "id, user_id, room_id, gameweek, formation, chip, submitted,
     gameweek_points, total_points, settled_at";

impl Database {
    /// Create or replace the user's lineup for a room and gameweek.
    ///
    /// The previous player slots are removed and settlement fields reset,
    /// all inside one transaction.
    pub fn save_lineup(
        &mut self,
        user_id: &UserId,
        room_id: RoomId,
        gameweek: Gameweek,
        formation: &str,
        chip: Chip,
        slots: &[LineupSlot],
    ) -> Result<LineupId> {
        let now = now_secs();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO lineups (user_id, room_id, gameweek, formation, chip, submitted,
                 gameweek_points, total_points, settled_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, 0, 0, NULL, ?6, ?6)
             ON CONFLICT(user_id, room_id, gameweek) DO UPDATE SET
                 formation = excluded.formation,
                 chip = excluded.chip,
                 submitted = 1,
                 gameweek_points = 0,
                 settled_at = NULL,
                 updated_at = excluded.updated_at",
            params![user_id, room_id, gameweek, formation, chip.as_str(), now],
        )?;

        let lineup_id: LineupId = tx.query_row(
            "SELECT id FROM lineups WHERE user_id = ? AND room_id = ? AND gameweek = ?",
            params![user_id, room_id, gameweek],
            |row| row.get(0),
        )?;

        tx.execute(
            "DELETE FROM lineup_players WHERE lineup_id = ?",
            params![lineup_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO lineup_players (lineup_id, player_id, is_starter, is_captain,
                     is_vice_captain, multiplier, points_scored)
                 VALUES (?, ?, ?, ?, ?, ?, 0)",
            )?;
            for slot in slots {
                let multiplier = if slot.is_starter { 1 } else { 0 };
                stmt.execute(params![
                    lineup_id,
                    slot.player_id,
                    slot.is_starter,
                    slot.is_captain,
                    slot.is_vice_captain,
                    multiplier
                ])?;
            }
        }

        tx.commit()?;
        Ok(lineup_id)
    }

    pub fn get_lineup(
        &self,
        user_id: &UserId,
        room_id: RoomId,
        gameweek: Gameweek,
    ) -> Result<Option<Lineup>> {
        let lineup = self
            .conn
            .query_row(
                &format!(
                    "SELECT {LINEUP_COLUMNS} FROM lineups
                     WHERE user_id = ? AND room_id = ? AND gameweek = ?"
                ),
                params![user_id, room_id, gameweek],
                row_to_lineup,
            )
            .optional()?;
        Ok(lineup)
    }

    pub fn lineup_players(&self, lineup_id: LineupId) -> Result<Vec<LineupPlayer>> {
        let mut stmt = self.conn.prepare(
            "SELECT lineup_id, player_id, is_starter, is_captain, is_vice_captain,
                    multiplier, points_scored
             FROM lineup_players
             WHERE lineup_id = ?
             ORDER BY is_starter DESC, player_id",
        )?;
        let rows = stmt.query_map(params![lineup_id], |row| {
            Ok(LineupPlayer {
                lineup_id: row.get(0)?,
                player_id: row.get(1)?,
                is_starter: row.get(2)?,
                is_captain: row.get(3)?,
                is_vice_captain: row.get(4)?,
                multiplier: row.get(5)?,
                points_scored: row.get(6)?,
            })
        })?;

        let mut players = Vec::new();
        for row in rows {
            players.push(row?);
        }
        Ok(players)
    }

    /// Submitted lineups for a gameweek, across every room
    pub fn submitted_lineups(&self, gameweek: Gameweek) -> Result<Vec<Lineup>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LINEUP_COLUMNS} FROM lineups
             WHERE gameweek = ? AND submitted = 1
             ORDER BY room_id, id"
        ))?;
        let rows = stmt.query_map(params![gameweek], row_to_lineup)?;

        let mut lineups = Vec::new();
        for row in rows {
            lineups.push(row?);
        }
        Ok(lineups)
    }

    /// Gameweeks that still have submitted lineups without a settlement
    pub fn gameweeks_pending_settlement(&self) -> Result<Vec<Gameweek>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT gameweek FROM lineups
             WHERE submitted = 1 AND settled_at IS NULL
             ORDER BY gameweek",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut gameweeks = Vec::new();
        for row in rows {
            gameweeks.push(row?);
        }
        Ok(gameweeks)
    }

    /// Persist the computed points of one lineup and mark it settled
    pub fn record_lineup_score(
        &mut self,
        lineup_id: LineupId,
        slots: &[SlotScore],
        gameweek_points: i64,
    ) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "UPDATE lineup_players SET multiplier = ?, points_scored = ?
                 WHERE lineup_id = ? AND player_id = ?",
            )?;
            for slot in slots {
                stmt.execute(params![
                    slot.multiplier,
                    slot.points_scored,
                    lineup_id,
                    slot.player_id
                ])?;
            }
        }
        tx.execute(
            "UPDATE lineups SET gameweek_points = ?, settled_at = ?, updated_at = ?
             WHERE id = ?",
            params![gameweek_points, now_secs(), now_secs(), lineup_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Recompute running totals for one user in one room: each settled
    /// lineup's `total_points` becomes the sum of settled gameweek points up
    /// to and including its gameweek.
    pub fn recompute_running_totals(&mut self, user_id: &UserId, room_id: RoomId) -> Result<()> {
        self.conn.execute(
            "UPDATE lineups SET total_points = (
                 SELECT COALESCE(SUM(prev.gameweek_points), 0) FROM lineups prev
                 WHERE prev.user_id = lineups.user_id
                   AND prev.room_id = lineups.room_id
                   AND prev.settled_at IS NOT NULL
                   AND prev.gameweek <= lineups.gameweek)
             WHERE user_id = ? AND room_id = ?",
            params![user_id, room_id],
        )?;
        Ok(())
    }

    /// Distinct (user, room) pairs with lineups in a gameweek
    pub fn lineup_owners(&self, gameweek: Option<Gameweek>) -> Result<Vec<(UserId, RoomId)>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT user_id, room_id FROM lineups
             WHERE (?1 IS NULL OR gameweek = ?1)
             ORDER BY room_id, user_id",
        )?;
        let rows = stmt.query_map(params![gameweek], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut owners = Vec::new();
        for row in rows {
            owners.push(row?);
        }
        Ok(owners)
    }

    pub fn count_lineups(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM lineups", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn row_to_lineup(row: &Row) -> rusqlite::Result<Lineup> {
    let chip: String = row.get(5)?;
    let chip = chip.parse::<Chip>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Lineup {
        id: row.get(0)?,
        user_id: row.get(1)?,
        room_id: row.get(2)?,
        gameweek: row.get(3)?,
        formation: row.get(4)?,
        chip,
        submitted: row.get(6)?,
        gameweek_points: row.get(7)?,
        total_points: row.get(8)?,
        settled_at: row.get(9)?,
    })
}
