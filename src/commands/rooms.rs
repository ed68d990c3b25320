//! Rooms: creation, membership and leaderboards.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    storage::{Database, LeaderboardEntry, NewRoom, Room, RoomMember},
    FantasyError, Gameweek, Result, RoomId, UserId,
};

/// Room code characters: A-Z and 2-9 without the look-alikes I, O, 0 and 1
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const ROOM_CODE_LEN: usize = 6;

pub const MIN_CAPACITY: i64 = 2;
pub const MAX_CAPACITY: i64 = 50;
pub const DEFAULT_CAPACITY: i64 = 10;
pub const DEFAULT_BUDGET: f64 = 100.0;
pub const MAX_ROOM_NAME_LEN: usize = 60;

const CODE_ATTEMPTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub budget_limit: Option<f64>,
    #[serde(default)]
    pub active_gameweek: Option<Gameweek>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JoinRoomRequest {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomDetail {
    #[serde(flatten)]
    pub room: Room,
    pub is_owner: bool,
    pub members: Vec<RoomMember>,
}

pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Create a room owned by `owner`, who joins it immediately.
pub fn create_room(db: &mut Database, owner: &UserId, request: &CreateRoomRequest) -> Result<Room> {
    let name = request.name.trim();
    if name.is_empty() || name.chars().count() > MAX_ROOM_NAME_LEN {
        return Err(FantasyError::validation(format!(
            "room name must be 1 to {} characters",
            MAX_ROOM_NAME_LEN
        )));
    }

    let capacity = request.capacity.unwrap_or(DEFAULT_CAPACITY);
    if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&capacity) {
        return Err(FantasyError::validation(format!(
            "capacity must be between {} and {}",
            MIN_CAPACITY, MAX_CAPACITY
        )));
    }

    let budget_limit = request.budget_limit.unwrap_or(DEFAULT_BUDGET);
    if !budget_limit.is_finite() || budget_limit <= 0.0 {
        return Err(FantasyError::validation("budget limit must be positive"));
    }

    let active_gameweek = match request.active_gameweek {
        Some(gameweek) => Gameweek::checked(gameweek.as_u8() as i64)?,
        None => Gameweek::default(),
    };

    let mut rng = rand::thread_rng();
    let mut code = None;
    for _ in 0..CODE_ATTEMPTS {
        let candidate = generate_room_code(&mut rng);
        if !db.room_code_exists(&candidate)? {
            code = Some(candidate);
            break;
        }
    }
    let code = code.ok_or_else(|| FantasyError::conflict("could not allocate a room code"))?;

    let room_id = db.insert_room(&NewRoom {
        code,
        name: name.to_string(),
        owner_id: owner.clone(),
        capacity,
        budget_limit,
        active_gameweek,
    })?;
    db.activate_membership(room_id, owner)?;

    let room = db
        .get_room(room_id)?
        .ok_or_else(|| FantasyError::not_found("room", room_id))?;
    info!(room_id = %room.id, code = %room.code, owner = %owner, "room created");
    Ok(room)
}

/// Join a room by its code, reactivating a previous membership if any.
pub fn join_room(db: &mut Database, user: &UserId, code: &str) -> Result<Room> {
    let room = db
        .get_room_by_code(code)?
        .ok_or_else(|| FantasyError::not_found("room", code.trim().to_uppercase()))?;

    if db.is_active_member(room.id, user)? {
        return Err(FantasyError::conflict("already a member of this room"));
    }
    if db.count_active_members(room.id)? >= room.capacity {
        return Err(FantasyError::conflict("room is full"));
    }

    db.activate_membership(room.id, user)?;
    info!(room_id = %room.id, user = %user, "joined room");
    Ok(room)
}

pub fn leave_room(db: &mut Database, user: &UserId, room_id: RoomId) -> Result<()> {
    let room = db
        .get_room(room_id)?
        .ok_or_else(|| FantasyError::not_found("room", room_id))?;

    if room.owner_id == *user {
        return Err(FantasyError::validation("the room owner cannot leave"));
    }
    if !db.deactivate_membership(room_id, user)? {
        return Err(FantasyError::forbidden("not a member of this room"));
    }
    Ok(())
}

pub fn list_rooms(db: &Database, user: &UserId) -> Result<Vec<Room>> {
    db.rooms_for_user(user)
}

/// The room, provided `user` is an active member
pub fn require_member(db: &Database, room_id: RoomId, user: &UserId) -> Result<Room> {
    let room = db
        .get_room(room_id)?
        .ok_or_else(|| FantasyError::not_found("room", room_id))?;
    if !db.is_active_member(room_id, user)? {
        return Err(FantasyError::forbidden("not a member of this room"));
    }
    Ok(room)
}

pub fn room_detail(db: &Database, user: &UserId, room_id: RoomId) -> Result<RoomDetail> {
    let room = require_member(db, room_id, user)?;
    let members = db.active_members(room_id)?;
    Ok(RoomDetail {
        is_owner: room.owner_id == *user,
        room,
        members,
    })
}

pub fn room_leaderboard(
    db: &Database,
    user: &UserId,
    room_id: RoomId,
    gameweek: Option<Gameweek>,
) -> Result<Vec<LeaderboardEntry>> {
    require_member(db, room_id, user)?;
    db.leaderboard(room_id, gameweek)
}
