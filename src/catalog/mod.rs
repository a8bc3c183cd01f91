//! Stage catalog.
//!
//! The ordered, validated list of stages a game runs with. Loaded once at
//! startup and shared read-only afterwards.

pub mod loader;
pub mod types;

use chrono::{DateTime, Duration, Utc};
use std::path::Path;

pub use types::{ChallengeDefinition, ChallengeKind, SpecialType, StageDefinition, StageId, Subtask};

/// Immutable stage catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    stages: Vec<StageDefinition>,
}

impl Catalog {
    /// Build a catalog from stage definitions, rejecting invalid ones.
    pub fn new(stages: Vec<StageDefinition>) -> Result<Self, CatalogError> {
        loader::validate(&stages)?;
        Ok(Self { stages })
    }

    /// Parse and validate a catalog from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        Self::new(loader::parse_stages(content)?)
    }

    /// Load and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let catalog = Self::new(loader::read_stages(path)?)?;
        tracing::info!(
            "Loaded {} stages from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// The catalog compiled into the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(loader::BUILTIN_CATALOG)
    }

    /// All stages in catalog order.
    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    /// Look up a stage by id.
    pub fn stage(&self, stage_id: StageId) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false for a validated catalog.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Whether `stage_id` is playable at `now`. Unknown stages are locked.
    pub fn is_unlocked(&self, stage_id: StageId, now: DateTime<Utc>) -> bool {
        self.stage(stage_id).is_some_and(|s| s.is_unlocked(now))
    }

    /// Earliest unlock time strictly after `now`.
    pub fn next_unlock_time(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.stages
            .iter()
            .map(|s| s.unlock_at)
            .filter(|at| *at > now)
            .min()
    }

    /// Time left until the next stage unlocks.
    pub fn time_until_next_unlock(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.next_unlock_time(now).map(|at| at - now)
    }

    /// Stages already playable at `now`, in catalog order.
    pub fn unlocked_stages(&self, now: DateTime<Utc>) -> impl Iterator<Item = &StageDefinition> {
        self.stages.iter().filter(move |s| s.is_unlocked(now))
    }
}

/// Catalog errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Catalog has no stages")]
    Empty,

    #[error("Duplicate stage id: {0}")]
    DuplicateStage(StageId),

    #[error("Invalid stage {stage_id}: {reason}")]
    InvalidStage { stage_id: StageId, reason: String },
}
