//! Player store interface.
//!
//! The progress engine never talks to storage; callers load a record
//! through this trait, run the engine and save the result.

use super::database::DatabaseError;
use crate::progress::PlayerRecord;

/// Load/save access to player records keyed by identity.
pub trait PlayerStore {
    /// Fetch a player by normalized identity.
    fn load_player(&self, identity: &str) -> Result<Option<PlayerRecord>, DatabaseError>;

    /// Insert or replace a player record.
    fn save_player(&self, record: &PlayerRecord) -> Result<(), DatabaseError>;

    /// Snapshot of every player.
    fn list_all_players(&self) -> Result<Vec<PlayerRecord>, DatabaseError>;
}

impl<S: PlayerStore + ?Sized> PlayerStore for &S {
    fn load_player(&self, identity: &str) -> Result<Option<PlayerRecord>, DatabaseError> {
        (**self).load_player(identity)
    }

    fn save_player(&self, record: &PlayerRecord) -> Result<(), DatabaseError> {
        (**self).save_player(record)
    }

    fn list_all_players(&self) -> Result<Vec<PlayerRecord>, DatabaseError> {
        (**self).list_all_players()
    }
}
