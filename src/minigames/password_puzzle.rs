//! Password puzzle: every step is a secret code.

use std::collections::BTreeMap;

use super::{expect_stage_type, squash, subtasks_where, MiniGameAdapter, MiniGameError, SubtaskResult};
use crate::catalog::{SpecialType, StageDefinition, StageId, Subtask};
use crate::progress::StageProgress;

/// Events from the code entry screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordEvent {
    CodeEntered { challenge_index: usize, code: String },
}

/// Password puzzle adapter.
#[derive(Debug, Clone)]
pub struct PasswordPuzzle {
    stage_id: StageId,
    /// challenge index -> normalized code
    codes: BTreeMap<usize, String>,
    failed_attempts: BTreeMap<usize, u32>,
}

impl PasswordPuzzle {
    pub fn new(stage: &StageDefinition) -> Result<Self, MiniGameError> {
        expect_stage_type(stage, SpecialType::PasswordPuzzle)?;

        let codes: BTreeMap<usize, String> =
            subtasks_where(stage, |s| matches!(s, Subtask::Passcode { .. }))
                .filter_map(|(index, subtask)| match subtask {
                    Subtask::Passcode { code } => Some((index, squash(code))),
                    _ => None,
                })
                .collect();

        if codes.is_empty() {
            return Err(MiniGameError::MissingSubtask {
                stage_id: stage.id,
                subtask: "passcode",
            });
        }

        Ok(Self {
            stage_id: stage.id,
            codes,
            failed_attempts: BTreeMap::new(),
        })
    }

    /// Wrong entries for a code during this session.
    pub fn failed_attempts(&self, challenge_index: usize) -> u32 {
        self.failed_attempts.get(&challenge_index).copied().unwrap_or(0)
    }
}

impl MiniGameAdapter for PasswordPuzzle {
    type Event = PasswordEvent;

    fn stage_id(&self) -> StageId {
        self.stage_id
    }

    fn special_type(&self) -> SpecialType {
        SpecialType::PasswordPuzzle
    }

    fn handle_event(
        &self,
        _progress: &StageProgress,
        event: &PasswordEvent,
    ) -> Result<Vec<SubtaskResult>, MiniGameError> {
        let PasswordEvent::CodeEntered {
            challenge_index,
            code,
        } = event;

        let expected = self
            .codes
            .get(challenge_index)
            .ok_or(MiniGameError::UnknownChallenge(*challenge_index))?;

        let entered = squash(code);
        if entered.is_empty() {
            return Err(MiniGameError::BlankInput);
        }

        if &entered == expected {
            Ok(vec![SubtaskResult::passed(*challenge_index)])
        } else {
            Ok(vec![SubtaskResult::failed(*challenge_index)])
        }
    }

    fn commit(&mut self, _event: PasswordEvent, results: &[SubtaskResult]) {
        for result in results.iter().filter(|r| !r.passed) {
            *self.failed_attempts.entry(result.challenge_index).or_insert(0) += 1;
        }
    }
}
