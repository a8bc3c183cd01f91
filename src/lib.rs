//! StageQuest - Gamified Learning Progression
//!
//! Players work through time-gated stages of quizzes, free-text puzzles and
//! mini-games, earn points per challenge and compete on a leaderboard.
//! Scoring is a pure engine over explicit records; persistence is a SQLite
//! player store behind the `PlayerStore` trait.

pub mod catalog;
pub mod leaderboards;
pub mod minigames;
pub mod progress;
pub mod service;
pub mod storage;

// Re-export commonly used types
pub use catalog::Catalog;
pub use leaderboards::{GameDataExport, Leaderboard};
pub use progress::{PlayerRecord, ProgressEngine, Submission};
pub use service::GameService;
pub use storage::{Database, PlayerStore};
