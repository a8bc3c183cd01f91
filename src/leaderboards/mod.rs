//! Leaderboards module
//!
//! Provides rankings, participation statistics, and data export.

pub mod export;
pub mod rankings;
pub mod stats;

// Re-export commonly used types
pub use export::{participants_csv, ExportError, GameDataExport};
pub use rankings::{compute_leaderboard, Leaderboard, LeaderboardEntry};
pub use stats::{participation_report, ParticipationReport};
