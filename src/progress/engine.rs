//! Progress engine: applies one submission to a player record.
//!
//! The engine is a pure computation over values the caller already holds.
//! It validates the whole request before touching anything, works on a copy
//! of the record and returns that copy; the caller decides whether to
//! persist it.

use chrono::{DateTime, Utc};

use super::types::{PlayerRecord, StageProgress, Submission, SubmissionOutcome};
use crate::catalog::{Catalog, ChallengeDefinition, ChallengeKind, StageDefinition, StageId};

/// Scoring engine bound to a catalog.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEngine<'a> {
    catalog: &'a Catalog,
}

impl<'a> ProgressEngine<'a> {
    /// Create an engine over `catalog`.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// The catalog this engine scores against.
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Record one submission.
    ///
    /// On error `record` is left exactly as it was passed in.
    pub fn submit_answer(
        &self,
        record: &PlayerRecord,
        stage_id: StageId,
        challenge_index: usize,
        submission: &Submission,
        now: DateTime<Utc>,
    ) -> Result<(PlayerRecord, SubmissionOutcome), ProgressError> {
        let stage = self
            .catalog
            .stage(stage_id)
            .ok_or(ProgressError::UnknownStage(stage_id))?;

        if !stage.is_unlocked(now) {
            return Err(ProgressError::StageLocked {
                stage_id,
                unlock_at: stage.unlock_at,
            });
        }

        let challenge = stage
            .challenge(challenge_index)
            .ok_or(ProgressError::ChallengeIndexOutOfRange {
                stage_id,
                index: challenge_index,
                len: stage.challenges.len(),
            })?;

        let current = record
            .stage_progress(stage_id)
            .ok_or(ProgressError::MissingStageProgress(stage_id))?;

        if let Some(reason) = current.mismatch_with(stage) {
            return Err(ProgressError::CatalogDrift { stage_id, reason });
        }

        let correct = evaluate(challenge, submission).ok_or(ProgressError::SubmissionMismatch {
            stage_id,
            index: challenge_index,
            submission: submission.kind_name(),
        })?;

        let mut updated = record.clone();
        let progress = updated
            .stage_progress_mut(stage_id)
            .ok_or(ProgressError::MissingStageProgress(stage_id))?;

        let was_completed = progress.completed;
        progress.attempts = progress.attempts.saturating_add(1);

        let mut points_awarded = 0;
        if correct && progress.completed_challenge_indices.insert(challenge_index) {
            points_awarded = challenge.points;
            progress.score += challenge.points;
        }

        progress.completed = progress.completed_count() == stage.challenges.len();
        let stage_newly_completed = progress.completed && !was_completed;

        assert_consistent(stage, progress);

        updated.last_active_at = now;

        tracing::debug!(
            "{} stage {} challenge {} ({}): correct={} points={}",
            record.identity,
            stage_id,
            challenge_index,
            submission.kind_name(),
            correct,
            points_awarded
        );

        if stage_newly_completed {
            tracing::info!(
                "{} completed stage {} with {} points",
                record.identity,
                stage_id,
                progress_score(&updated, stage_id)
            );
        }

        Ok((
            updated,
            SubmissionOutcome {
                correct,
                points_awarded,
                stage_newly_completed,
            },
        ))
    }
}

/// Decide correctness of a submission for a challenge.
///
/// Returns `None` when the submission does not fit the challenge kind.
pub fn evaluate(challenge: &ChallengeDefinition, submission: &Submission) -> Option<bool> {
    match (&challenge.kind, submission) {
        (
            ChallengeKind::Quiz {
                correct_option_index,
                ..
            },
            Submission::OptionIndex(chosen),
        ) => Some(chosen == correct_option_index),
        (
            ChallengeKind::FreeText {
                correct_answer,
                case_sensitive,
            },
            Submission::Text(answer),
        ) => {
            let answer = answer.trim();
            if answer.is_empty() {
                return Some(false);
            }
            if *case_sensitive {
                Some(answer == correct_answer)
            } else {
                Some(answer.to_lowercase() == correct_answer.to_lowercase())
            }
        }
        (ChallengeKind::MiniGameSubtask { .. }, Submission::MiniGame { passed }) => Some(*passed),
        _ => None,
    }
}

fn progress_score(record: &PlayerRecord, stage_id: StageId) -> u32 {
    record.stage_progress(stage_id).map_or(0, |p| p.score)
}

fn assert_consistent(stage: &StageDefinition, progress: &StageProgress) {
    assert!(
        progress.mismatch_with(stage).is_none(),
        "stage {} progress invariant broken: {:?}",
        stage.id,
        progress.mismatch_with(stage)
    );
}

/// Progress engine errors. All of them are caller input errors.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("Unknown stage: {0}")]
    UnknownStage(StageId),

    #[error("Stage {stage_id} is locked until {unlock_at}")]
    StageLocked {
        stage_id: StageId,
        unlock_at: DateTime<Utc>,
    },

    #[error("Challenge {index} out of range for stage {stage_id} ({len} challenges)")]
    ChallengeIndexOutOfRange {
        stage_id: StageId,
        index: usize,
        len: usize,
    },

    #[error("Blank submission")]
    BlankSubmission,

    #[error("A {submission} submission does not fit challenge {index} of stage {stage_id}")]
    SubmissionMismatch {
        stage_id: StageId,
        index: usize,
        submission: &'static str,
    },

    #[error("Player record has no progress for stage {0}")]
    MissingStageProgress(StageId),

    #[error("Stored progress for stage {stage_id} does not match the catalog: {reason}")]
    CatalogDrift { stage_id: StageId, reason: String },
}
