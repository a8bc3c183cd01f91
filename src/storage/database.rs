//! Database operations using rusqlite.
//!
//! Player records are stored one row per identity with their stage progress
//! serialized as JSON.

use crate::progress::{PlayerRecord, StageProgress};
use crate::storage::player_store::PlayerStore;
use crate::storage::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::path::Path;
use thiserror::Error;

/// Database wrapper for SQLite operations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::IoError(e.to_string()))?;
        }

        let conn =
            Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Initialize the database schema.
    fn initialize(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let current_version = self.get_schema_version()?;

        if current_version < CURRENT_VERSION {
            self.migrate(current_version)?;
        }

        Ok(())
    }

    /// Get the current schema version.
    fn get_schema_version(&self) -> Result<i32, DatabaseError> {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Run database migrations.
    fn migrate(&self, from_version: i32) -> Result<(), DatabaseError> {
        if from_version < 1 {
            self.conn
                .execute_batch(SCHEMA)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            self.conn
                .execute(
                    "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                    [CURRENT_VERSION],
                )
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            tracing::info!("Database migrated to version {}", CURRENT_VERSION);
        }

        Ok(())
    }

    /// Get a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========== Player CRUD Operations ==========

    /// Insert or replace a player.
    pub fn upsert_player(&self, record: &PlayerRecord) -> Result<(), DatabaseError> {
        let progress_json = serde_json::to_string(&record.progress)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        self.conn
            .execute(
                "INSERT INTO players (identity, display_name, contact, registered_at,
                 last_active_at, progress_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(identity) DO UPDATE SET
                 display_name = excluded.display_name,
                 contact = excluded.contact,
                 last_active_at = excluded.last_active_at,
                 progress_json = excluded.progress_json",
                params![
                    record.identity,
                    record.display_name,
                    record.contact,
                    record.registered_at.to_rfc3339(),
                    record.last_active_at.to_rfc3339(),
                    progress_json,
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// Get a player by identity.
    pub fn get_player(&self, identity: &str) -> Result<Option<PlayerRecord>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT identity, display_name, contact, registered_at, last_active_at,
                 progress_json FROM players WHERE identity = ?1",
                params![identity],
                PlayerRow::from_row,
            )
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        row.map(PlayerRow::into_player_record).transpose()
    }

    /// List all players, oldest registration first.
    pub fn list_players(&self) -> Result<Vec<PlayerRecord>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT identity, display_name, contact, registered_at, last_active_at,
                 progress_json FROM players ORDER BY registered_at ASC, identity ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], PlayerRow::from_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut players = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            players.push(row.into_player_record()?);
        }

        Ok(players)
    }

    /// Count players in the database.
    pub fn count_players(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(count as usize)
    }
}

impl PlayerStore for Database {
    fn load_player(&self, identity: &str) -> Result<Option<PlayerRecord>, DatabaseError> {
        self.get_player(identity)
    }

    fn save_player(&self, record: &PlayerRecord) -> Result<(), DatabaseError> {
        self.upsert_player(record)
    }

    fn list_all_players(&self) -> Result<Vec<PlayerRecord>, DatabaseError> {
        self.list_players()
    }
}

/// Raw players row.
struct PlayerRow {
    identity: String,
    display_name: String,
    contact: Option<String>,
    registered_at: String,
    last_active_at: String,
    progress_json: String,
}

impl PlayerRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            identity: row.get(0)?,
            display_name: row.get(1)?,
            contact: row.get(2)?,
            registered_at: row.get(3)?,
            last_active_at: row.get(4)?,
            progress_json: row.get(5)?,
        })
    }

    fn into_player_record(self) -> Result<PlayerRecord, DatabaseError> {
        let progress: Vec<StageProgress> = serde_json::from_str(&self.progress_json)
            .map_err(|e| DatabaseError::DeserializationError(e.to_string()))?;

        Ok(PlayerRecord {
            identity: self.identity,
            display_name: self.display_name,
            contact: self.contact,
            registered_at: parse_timestamp(&self.registered_at)?,
            last_active_at: parse_timestamp(&self.last_active_at)?,
            progress,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::DeserializationError(e.to_string()))
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}
