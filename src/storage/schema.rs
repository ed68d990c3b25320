//! Database schema and connection management

use crate::error::FantasyError;
use crate::Result;
use dirs::data_dir;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Connection to the fantasy store
pub struct Database {
    pub(crate) conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path` and ensure tables exist
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let mut db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// In-memory database, used by tests and dry runs
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Default on-disk location: `<data_dir>/fantasy-rooms/fantasy.db`
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = data_dir().ok_or_else(|| FantasyError::MissingConfig {
            env_var: crate::DB_PATH_ENV_VAR.to_string(),
        })?;
        Ok(data_dir.join("fantasy-rooms").join("fantasy.db"))
    }

    pub(crate) fn initialize_schema(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS teams (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                short_name TEXT NOT NULL,
                color TEXT,
                logo_url TEXT
            );

            CREATE TABLE IF NOT EXISTS team_mappings (
                provider TEXT NOT NULL,
                external_id TEXT NOT NULL,
                team_id INTEGER NOT NULL REFERENCES teams(id),
                PRIMARY KEY (provider, external_id)
            );

            CREATE TABLE IF NOT EXISTS players (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                position TEXT NOT NULL,
                team_id INTEGER REFERENCES teams(id),
                price REAL NOT NULL DEFAULT 0,
                goals INTEGER NOT NULL DEFAULT 0,
                assists INTEGER NOT NULL DEFAULT 0,
                total_points INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS player_mappings (
                provider TEXT NOT NULL,
                external_id TEXT NOT NULL,
                player_id INTEGER NOT NULL REFERENCES players(id),
                PRIMARY KEY (provider, external_id)
            );

            CREATE TABLE IF NOT EXISTS fixtures (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                provider_id INTEGER UNIQUE,
                gameweek INTEGER NOT NULL,
                home_team_id INTEGER NOT NULL REFERENCES teams(id),
                away_team_id INTEGER NOT NULL REFERENCES teams(id),
                home_score INTEGER,
                away_score INTEGER,
                finished INTEGER NOT NULL DEFAULT 0,
                minutes INTEGER NOT NULL DEFAULT 0,
                kickoff_time TEXT,
                UNIQUE (gameweek, home_team_id, away_team_id)
            );

            CREATE TABLE IF NOT EXISTS player_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                fixture_id INTEGER NOT NULL REFERENCES fixtures(id),
                player_id INTEGER NOT NULL REFERENCES players(id),
                event_type TEXT NOT NULL,
                minute INTEGER,
                value INTEGER
            );

            CREATE TABLE IF NOT EXISTS rooms (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                owner_id TEXT NOT NULL REFERENCES users(id),
                capacity INTEGER NOT NULL,
                budget_limit REAL NOT NULL,
                active_gameweek INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS room_members (
                room_id INTEGER NOT NULL REFERENCES rooms(id),
                user_id TEXT NOT NULL REFERENCES users(id),
                is_active INTEGER NOT NULL DEFAULT 1,
                joined_at INTEGER NOT NULL,
                PRIMARY KEY (room_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS lineups (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL REFERENCES users(id),
                room_id INTEGER NOT NULL REFERENCES rooms(id),
                gameweek INTEGER NOT NULL,
                formation TEXT NOT NULL,
                chip TEXT NOT NULL DEFAULT 'none',
                submitted INTEGER NOT NULL DEFAULT 0,
                gameweek_points INTEGER NOT NULL DEFAULT 0,
                total_points INTEGER NOT NULL DEFAULT 0,
                settled_at INTEGER,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                UNIQUE (user_id, room_id, gameweek)
            );

            CREATE TABLE IF NOT EXISTS lineup_players (
                lineup_id INTEGER NOT NULL REFERENCES lineups(id),
                player_id INTEGER NOT NULL REFERENCES players(id),
                is_starter INTEGER NOT NULL,
                is_captain INTEGER NOT NULL DEFAULT 0,
                is_vice_captain INTEGER NOT NULL DEFAULT 0,
                multiplier INTEGER NOT NULL DEFAULT 1,
                points_scored INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (lineup_id, player_id)
            );

            CREATE INDEX IF NOT EXISTS idx_fixtures_gameweek ON fixtures(gameweek);
            CREATE INDEX IF NOT EXISTS idx_events_player_fixture
                ON player_events(player_id, fixture_id);
            CREATE INDEX IF NOT EXISTS idx_lineups_room_gameweek ON lineups(room_id, gameweek);",
        )?;

        Ok(())
    }
}

pub(crate) fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
