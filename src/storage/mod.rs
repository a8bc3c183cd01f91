//! Storage module for database and configuration.

pub mod config;
pub mod database;
pub mod player_store;
pub mod schema;

pub use config::{AppConfig, ConfigError, GameSettings};
pub use database::{Database, DatabaseError};
pub use player_store::PlayerStore;
