//! Platform game: fix the robot's code, then clear the level.
//!
//! Clearing the level credits every `platform_run` step at once. The clear
//! is latched once committed, so a game loop that keeps reporting its won
//! state produces a single set of verdicts. The code fix only counts once it
//! is credited in the player's progress.

use super::{expect_stage_type, squash, subtasks_where, MiniGameAdapter, MiniGameError, SubtaskResult};
use crate::catalog::{SpecialType, StageDefinition, StageId, Subtask};
use crate::progress::StageProgress;

/// Events from the platform game screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    /// The player submitted a line of code for the obstacle handler
    CodeFixSubmitted(String),
    /// The player reached the end of the level
    LevelCleared,
}

/// Platform game adapter.
#[derive(Debug, Clone)]
pub struct PlatformGame {
    stage_id: StageId,
    code_fix_index: usize,
    accepted_keywords: Vec<String>,
    run_indices: Vec<usize>,
    level_cleared: bool,
}

impl PlatformGame {
    pub fn new(stage: &StageDefinition) -> Result<Self, MiniGameError> {
        expect_stage_type(stage, SpecialType::PlatformGame)?;

        let (code_fix_index, accepted_keywords) =
            subtasks_where(stage, |s| matches!(s, Subtask::CodeFix { .. }))
                .find_map(|(index, subtask)| match subtask {
                    Subtask::CodeFix { accepted_keywords } => Some((
                        index,
                        accepted_keywords.iter().map(|k| squash(k)).collect::<Vec<_>>(),
                    )),
                    _ => None,
                })
                .ok_or(MiniGameError::MissingSubtask {
                    stage_id: stage.id,
                    subtask: "code_fix",
                })?;

        let run_indices: Vec<usize> = subtasks_where(stage, |s| matches!(s, Subtask::PlatformRun))
            .map(|(index, _)| index)
            .collect();
        if run_indices.is_empty() {
            return Err(MiniGameError::MissingSubtask {
                stage_id: stage.id,
                subtask: "platform_run",
            });
        }

        Ok(Self {
            stage_id: stage.id,
            code_fix_index,
            accepted_keywords,
            run_indices,
            level_cleared: false,
        })
    }

    /// Whether the obstacle handler repair is credited.
    pub fn is_code_fixed(&self, progress: &StageProgress) -> bool {
        progress.is_challenge_completed(self.code_fix_index)
    }

    /// Whether this session already committed a cleared level.
    pub fn is_level_cleared(&self) -> bool {
        self.level_cleared
    }

    fn check_code_fix(&self, code: &str) -> bool {
        let code = squash(code);
        self.accepted_keywords.iter().any(|k| code.contains(k.as_str()))
    }
}

impl MiniGameAdapter for PlatformGame {
    type Event = PlatformEvent;

    fn stage_id(&self) -> StageId {
        self.stage_id
    }

    fn special_type(&self) -> SpecialType {
        SpecialType::PlatformGame
    }

    fn handle_event(
        &self,
        progress: &StageProgress,
        event: &PlatformEvent,
    ) -> Result<Vec<SubtaskResult>, MiniGameError> {
        match event {
            PlatformEvent::CodeFixSubmitted(code) => {
                if code.trim().is_empty() {
                    return Err(MiniGameError::BlankInput);
                }
                if self.check_code_fix(code) {
                    Ok(vec![SubtaskResult::passed(self.code_fix_index)])
                } else {
                    Ok(vec![SubtaskResult::failed(self.code_fix_index)])
                }
            }
            PlatformEvent::LevelCleared => {
                if !self.is_code_fixed(progress) {
                    return Err(MiniGameError::OutOfOrder {
                        challenge_index: self.run_indices[0],
                        blocked_by: self.code_fix_index,
                    });
                }
                if self.level_cleared {
                    return Ok(Vec::new());
                }
                Ok(self
                    .run_indices
                    .iter()
                    .filter(|&&index| !progress.is_challenge_completed(index))
                    .map(|&index| SubtaskResult::passed(index))
                    .collect())
            }
        }
    }

    fn commit(&mut self, event: PlatformEvent, results: &[SubtaskResult]) {
        if matches!(event, PlatformEvent::LevelCleared) && results.iter().any(|r| r.passed) {
            self.level_cleared = true;
        }
    }
}
