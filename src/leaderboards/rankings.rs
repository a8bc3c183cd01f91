//! Leaderboard rankings.
//!
//! Rankings are derived on demand from a complete snapshot of player records
//! and are never stored.

use serde::Serialize;

use crate::progress::PlayerRecord;

/// Leaderboard entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based position
    pub rank: u32,
    pub identity: String,
    pub display_name: String,
    pub stages_completed_count: usize,
    pub total_score: u32,
}

/// Rank players by completed stages, then total score.
///
/// Players tied on both keep their input order.
pub fn compute_leaderboard(players: &[PlayerRecord]) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = players
        .iter()
        .map(|player| LeaderboardEntry {
            rank: 0,
            identity: player.identity.clone(),
            display_name: player.display_name.clone(),
            stages_completed_count: player.stages_completed(),
            total_score: player.total_score(),
        })
        .collect();

    // sort_by is stable
    entries.sort_by(|a, b| {
        b.stages_completed_count
            .cmp(&a.stages_completed_count)
            .then_with(|| b.total_score.cmp(&a.total_score))
    });

    for (position, entry) in entries.iter_mut().enumerate() {
        entry.rank = (position + 1) as u32;
    }

    entries
}

/// Ranked snapshot of all players.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Build the leaderboard for a player snapshot.
    pub fn from_players(players: &[PlayerRecord]) -> Self {
        Self {
            entries: compute_leaderboard(players),
        }
    }

    /// Top `n` entries.
    pub fn top(&self, n: usize) -> &[LeaderboardEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Entry for a player.
    pub fn find_player(&self, identity: &str) -> Option<&LeaderboardEntry> {
        self.entries.iter().find(|e| e.identity == identity)
    }

    /// Number of ranked players.
    pub fn total_players(&self) -> usize {
        self.entries.len()
    }
}
