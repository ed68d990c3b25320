//! Rooms and their membership

use super::{models::*, schema::now_secs, schema::Database};
use crate::{Gameweek, Result, RoomId, UserId};
use rusqlite::{params, OptionalExtension, Row};

const ROOM_COLUMNS: &str =
    "id, code, name, owner_id, capacity, budget_limit, active_gameweek, created_at";

impl Database {
    pub fn insert_room(&mut self, room: &NewRoom) -> Result<RoomId> {
        self.conn.execute(
            "INSERT INTO rooms (code, name, owner_id, capacity, budget_limit,
                 active_gameweek, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                room.code,
                room.name,
                room.owner_id,
                room.capacity,
                room.budget_limit,
                room.active_gameweek,
                now_secs()
            ],
        )?;
        Ok(RoomId::new(self.conn.last_insert_rowid()))
    }

    pub fn room_code_exists(&self, code: &str) -> Result<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM rooms WHERE code = ?)",
            params![code],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    pub fn get_room(&self, id: RoomId) -> Result<Option<Room>> {
        let room = self
            .conn
            .query_row(
                &format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = ?"),
                params![id],
                row_to_room,
            )
            .optional()?;
        Ok(room)
    }

    /// Room codes are stored upper-case; lookups ignore case
    pub fn get_room_by_code(&self, code: &str) -> Result<Option<Room>> {
        let room = self
            .conn
            .query_row(
                &format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE code = ?"),
                params![code.trim().to_uppercase()],
                row_to_room,
            )
            .optional()?;
        Ok(room)
    }

    /// Rooms in which the user is an active member
    pub fn rooms_for_user(&self, user_id: &UserId) -> Result<Vec<Room>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.id, r.code, r.name, r.owner_id, r.capacity, r.budget_limit,
                    r.active_gameweek, r.created_at
             FROM rooms r
             JOIN room_members m ON m.room_id = r.id
             WHERE m.user_id = ? AND m.is_active = 1
             ORDER BY r.created_at, r.id",
        )?;
        let rows = stmt.query_map(params![user_id], row_to_room)?;

        let mut rooms = Vec::new();
        for row in rows {
            rooms.push(row?);
        }
        Ok(rooms)
    }

    /// Move every room still behind `gameweek` up to it. Returns the number
    /// of rooms moved.
    pub fn advance_active_gameweek(&mut self, gameweek: Gameweek) -> Result<usize> {
        let moved = self.conn.execute(
            "UPDATE rooms SET active_gameweek = ?1 WHERE active_gameweek < ?1",
            params![gameweek],
        )?;
        Ok(moved)
    }

    pub fn get_membership(&self, room_id: RoomId, user_id: &UserId) -> Result<Option<RoomMember>> {
        let member = self
            .conn
            .query_row(
                "SELECT room_id, user_id, is_active, joined_at FROM room_members
                 WHERE room_id = ? AND user_id = ?",
                params![room_id, user_id],
                row_to_member,
            )
            .optional()?;
        Ok(member)
    }

    pub fn is_active_member(&self, room_id: RoomId, user_id: &UserId) -> Result<bool> {
        Ok(self
            .get_membership(room_id, user_id)?
            .is_some_and(|m| m.is_active))
    }

    pub fn count_active_members(&self, room_id: RoomId) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM room_members WHERE room_id = ? AND is_active = 1",
            params![room_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Add the user to the room, or reactivate a previous membership.
    /// Reactivation resets the join timestamp.
    pub fn activate_membership(&mut self, room_id: RoomId, user_id: &UserId) -> Result<()> {
        self.conn.execute(
            "INSERT INTO room_members (room_id, user_id, is_active, joined_at)
             VALUES (?1, ?2, 1, ?3)
             ON CONFLICT(room_id, user_id) DO UPDATE SET is_active = 1, joined_at = ?3",
            params![room_id, user_id, now_secs()],
        )?;
        Ok(())
    }

    pub fn deactivate_membership(&mut self, room_id: RoomId, user_id: &UserId) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE room_members SET is_active = 0
             WHERE room_id = ? AND user_id = ? AND is_active = 1",
            params![room_id, user_id],
        )?;
        Ok(changed > 0)
    }

    pub fn active_members(&self, room_id: RoomId) -> Result<Vec<RoomMember>> {
        let mut stmt = self.conn.prepare(
            "SELECT room_id, user_id, is_active, joined_at FROM room_members
             WHERE room_id = ? AND is_active = 1
             ORDER BY joined_at, user_id",
        )?;
        let rows = stmt.query_map(params![room_id], row_to_member)?;

        let mut members = Vec::new();
        for row in rows {
            members.push(row?);
        }
        Ok(members)
    }
}

fn row_to_room(row: &Row) -> rusqlite::Result<Room> {
    Ok(Room {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        owner_id: row.get(3)?,
        capacity: row.get(4)?,
        budget_limit: row.get(5)?,
        active_gameweek: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn row_to_member(row: &Row) -> rusqlite::Result<RoomMember> {
    Ok(RoomMember {
        room_id: row.get(0)?,
        user_id: row.get(1)?,
        is_active: row.get(2)?,
        joined_at: row.get(3)?,
    })
}
