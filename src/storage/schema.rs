//! Database schema definitions for StageQuest.

/// SQL schema for creating all database tables.
pub const SCHEMA: &str = r#"
-- Players table; progress is the JSON list of per-stage records
CREATE TABLE IF NOT EXISTS players (
    identity TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    contact TEXT,
    registered_at TEXT NOT NULL,
    last_active_at TEXT NOT NULL,
    progress_json TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_players_registered_at ON players(registered_at);
"#;

/// Schema version tracking table.
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;
