//! Player progress: records, registration and the scoring engine.

pub mod engine;
pub mod registration;
pub mod types;

// Re-export commonly used types
pub use engine::{ProgressEngine, ProgressError};
pub use registration::{get_or_create_player, normalize_identity, RegistrationError};
pub use types::{PlayerRecord, StageProgress, Submission, SubmissionOutcome};
