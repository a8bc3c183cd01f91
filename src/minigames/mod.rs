//! Mini-game scoring adapters.
//!
//! Each adapter consumes the events its game produces and turns win
//! conditions into [`SubtaskResult`]s. Results are applied through
//! [`apply_results`], which feeds them to the progress engine one by one, so
//! stage bookkeeping is never done by the games themselves.
//!
//! Judging an event never changes the adapter. Session state such as a
//! cleared level only moves forward in [`MiniGameAdapter::commit`], once the
//! verdicts it produced have been applied and saved.

pub mod password_puzzle;
pub mod platform_game;
pub mod robot_lab;

use chrono::{DateTime, Utc};

use crate::catalog::{SpecialType, StageDefinition, StageId, Subtask};
use crate::progress::{PlayerRecord, ProgressEngine, ProgressError, StageProgress, Submission, SubmissionOutcome};

pub use password_puzzle::{PasswordEvent, PasswordPuzzle};
pub use platform_game::{PlatformEvent, PlatformGame};
pub use robot_lab::{RobotLab, RobotLabEvent};

/// Verdict for one mini-game subtask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtaskResult {
    pub challenge_index: usize,
    pub passed: bool,
}

impl SubtaskResult {
    pub fn passed(challenge_index: usize) -> Self {
        Self {
            challenge_index,
            passed: true,
        }
    }

    pub fn failed(challenge_index: usize) -> Self {
        Self {
            challenge_index,
            passed: false,
        }
    }
}

/// Scoring contract every mini-game adapter implements.
pub trait MiniGameAdapter {
    /// Events the game emits.
    type Event;

    /// Stage this adapter scores.
    fn stage_id(&self) -> StageId;

    /// Mini-game flavour.
    fn special_type(&self) -> SpecialType;

    /// Turn one game event into subtask verdicts.
    ///
    /// `progress` is the player's current progress on the stage; adapters use
    /// it for step ordering and never modify it.
    fn handle_event(
        &self,
        progress: &StageProgress,
        event: &Self::Event,
    ) -> Result<Vec<SubtaskResult>, MiniGameError>;

    /// Record that `results`, judged from `event`, are now persisted.
    fn commit(&mut self, event: Self::Event, results: &[SubtaskResult]);
}

/// Apply verdicts to a record through the engine, in order.
///
/// Either every result is applied or the error of the first failing one is
/// returned and nothing is.
pub fn apply_results(
    engine: &ProgressEngine<'_>,
    record: &PlayerRecord,
    stage_id: StageId,
    results: &[SubtaskResult],
    now: DateTime<Utc>,
) -> Result<(PlayerRecord, Vec<SubmissionOutcome>), ProgressError> {
    let mut current = record.clone();
    let mut outcomes = Vec::with_capacity(results.len());

    for result in results {
        let (next, outcome) = engine.submit_answer(
            &current,
            stage_id,
            result.challenge_index,
            &Submission::MiniGame {
                passed: result.passed,
            },
            now,
        )?;
        current = next;
        outcomes.push(outcome);
    }

    Ok((current, outcomes))
}

/// Check the stage type an adapter is built for.
fn expect_stage_type(stage: &StageDefinition, expected: SpecialType) -> Result<(), MiniGameError> {
    if stage.special_type != expected {
        return Err(MiniGameError::WrongStageType {
            stage_id: stage.id,
            expected,
            found: stage.special_type,
        });
    }
    Ok(())
}

/// Indices and subtasks of a stage matching `filter`.
fn subtasks_where<'a>(
    stage: &'a StageDefinition,
    filter: impl Fn(&Subtask) -> bool + 'a,
) -> impl Iterator<Item = (usize, &'a Subtask)> + 'a {
    stage
        .challenges
        .iter()
        .enumerate()
        .filter_map(|(index, c)| c.as_subtask().map(|s| (index, s)))
        .filter(move |(_, s)| filter(s))
}

/// Lowercase and drop all whitespace.
fn squash(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Mini-game errors.
#[derive(Debug, thiserror::Error)]
pub enum MiniGameError {
    #[error("Stage {stage_id} is a {found} stage, expected {expected}")]
    WrongStageType {
        stage_id: StageId,
        expected: SpecialType,
        found: SpecialType,
    },

    #[error("Stage {stage_id} has no {subtask} step")]
    MissingSubtask {
        stage_id: StageId,
        subtask: &'static str,
    },

    #[error("Challenge {0} is not a step of this mini-game")]
    UnknownChallenge(usize),

    #[error("Input is blank")]
    BlankInput,

    #[error("{what}: need at least {required}, got {actual}")]
    InsufficientInput {
        what: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("Challenge {challenge_index} requires challenge {blocked_by} first")]
    OutOfOrder {
        challenge_index: usize,
        blocked_by: usize,
    },
}
