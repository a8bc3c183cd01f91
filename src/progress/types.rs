//! Player record and per-stage progress types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::engine::ProgressError;
use crate::catalog::{StageDefinition, StageId};

/// A player's progress on one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageProgress {
    pub stage_id: StageId,
    /// True once every challenge of the stage is credited
    pub completed: bool,
    /// Sum of points of the credited challenges
    pub score: u32,
    /// Every submission counts, correct or not
    pub attempts: u32,
    /// Credited challenge indices. Never shrinks.
    pub completed_challenge_indices: BTreeSet<usize>,
}

impl StageProgress {
    /// Zeroed progress for a stage.
    pub fn new(stage_id: StageId) -> Self {
        Self {
            stage_id,
            completed: false,
            score: 0,
            attempts: 0,
            completed_challenge_indices: BTreeSet::new(),
        }
    }

    /// Whether the challenge at `index` has already been credited.
    pub fn is_challenge_completed(&self, index: usize) -> bool {
        self.completed_challenge_indices.contains(&index)
    }

    /// Number of credited challenges.
    pub fn completed_count(&self) -> usize {
        self.completed_challenge_indices.len()
    }

    /// Check this progress against its stage definition.
    ///
    /// Returns a description of the first mismatch, if any.
    pub fn mismatch_with(&self, stage: &StageDefinition) -> Option<String> {
        if self.stage_id != stage.id {
            return Some(format!("progress for stage {} checked against {}", self.stage_id, stage.id));
        }
        if let Some(index) = self
            .completed_challenge_indices
            .iter()
            .find(|&&i| i >= stage.challenges.len())
        {
            return Some(format!(
                "credited index {} but stage has {} challenges",
                index,
                stage.challenges.len()
            ));
        }
        let expected: u32 = self
            .completed_challenge_indices
            .iter()
            .map(|&i| stage.challenges[i].points)
            .sum();
        if self.score != expected {
            return Some(format!("score {} but credited points sum to {}", self.score, expected));
        }
        let complete = self.completed_count() == stage.challenges.len();
        if self.completed != complete {
            return Some(format!(
                "completed flag {} with {} of {} challenges credited",
                self.completed,
                self.completed_count(),
                stage.challenges.len()
            ));
        }
        None
    }
}

/// Everything stored about one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    /// Normalized email, unique key
    pub identity: String,
    pub display_name: String,
    #[serde(default)]
    pub contact: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    /// One entry per catalog stage, catalog order
    pub progress: Vec<StageProgress>,
}

impl PlayerRecord {
    /// Progress entry for a stage.
    pub fn stage_progress(&self, stage_id: StageId) -> Option<&StageProgress> {
        self.progress.iter().find(|p| p.stage_id == stage_id)
    }

    pub(crate) fn stage_progress_mut(&mut self, stage_id: StageId) -> Option<&mut StageProgress> {
        self.progress.iter_mut().find(|p| p.stage_id == stage_id)
    }

    /// Sum of all stage scores.
    pub fn total_score(&self) -> u32 {
        self.progress.iter().map(|p| p.score).sum()
    }

    /// Number of completed stages.
    pub fn stages_completed(&self) -> usize {
        self.progress.iter().filter(|p| p.completed).count()
    }

    /// Total submissions across stages.
    pub fn total_attempts(&self) -> u32 {
        self.progress.iter().map(|p| p.attempts).sum()
    }
}

/// A player's answer to one challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Chosen quiz option
    OptionIndex(usize),
    /// Typed answer
    Text(String),
    /// Verdict reported by a mini-game adapter
    MiniGame { passed: bool },
}

impl Submission {
    /// Validated text answer. Blank input never reaches the engine.
    pub fn text(answer: &str) -> Result<Self, ProgressError> {
        if answer.trim().is_empty() {
            return Err(ProgressError::BlankSubmission);
        }
        Ok(Self::Text(answer.to_string()))
    }

    /// Short name used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::OptionIndex(_) => "option",
            Self::Text(_) => "text",
            Self::MiniGame { .. } => "mini_game",
        }
    }
}

/// What a single submission changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub correct: bool,
    /// Zero when incorrect or already credited
    pub points_awarded: u32,
    /// True only on the call that completed the stage
    pub stage_newly_completed: bool,
}
