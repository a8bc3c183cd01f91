//! Robot lab: design, program, simulate, then pitch an idea.
//!
//! Steps are strictly sequential. Inputs that are too small are rejected
//! without counting as an attempt, matching how the lab screens refuse to
//! submit them.

use std::collections::BTreeSet;

use super::{expect_stage_type, MiniGameAdapter, MiniGameError, SubtaskResult};
use crate::catalog::{SpecialType, StageDefinition, StageId, Subtask};
use crate::progress::StageProgress;

/// Events from the robot lab screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotLabEvent {
    /// Chosen components
    DesignSubmitted(Vec<String>),
    /// Assembled program blocks, in order
    ProgramSubmitted(Vec<String>),
    /// Simulator tick: items collected so far
    SimulationProgress { collected: u32 },
    /// Free-form idea text
    IdeaSubmitted(String),
}

/// Robot lab adapter.
#[derive(Debug, Clone)]
pub struct RobotLab {
    stage_id: StageId,
    design: (usize, usize),
    program: (usize, usize),
    simulation: (usize, u32),
    idea: (usize, usize),
    program_blocks: Vec<String>,
    simulation_done: bool,
}

impl RobotLab {
    pub fn new(stage: &StageDefinition) -> Result<Self, MiniGameError> {
        expect_stage_type(stage, SpecialType::RobotLab)?;

        let mut design = None;
        let mut program = None;
        let mut simulation = None;
        let mut idea = None;

        for (index, challenge) in stage.challenges.iter().enumerate() {
            match challenge.as_subtask() {
                Some(Subtask::ComponentDesign { min_components }) => {
                    design = Some((index, *min_components))
                }
                Some(Subtask::BlockProgram { min_blocks }) => program = Some((index, *min_blocks)),
                Some(Subtask::Simulation { target_items }) => {
                    simulation = Some((index, *target_items))
                }
                Some(Subtask::CreativeIdea { min_chars }) => idea = Some((index, *min_chars)),
                _ => {}
            }
        }

        let missing = |subtask: &'static str| MiniGameError::MissingSubtask {
            stage_id: stage.id,
            subtask,
        };

        Ok(Self {
            stage_id: stage.id,
            design: design.ok_or_else(|| missing("component_design"))?,
            program: program.ok_or_else(|| missing("block_program"))?,
            simulation: simulation.ok_or_else(|| missing("simulation"))?,
            idea: idea.ok_or_else(|| missing("creative_idea"))?,
            program_blocks: Vec::new(),
            simulation_done: false,
        })
    }

    /// Program committed in this session, replayed by the simulator.
    pub fn program_blocks(&self) -> &[String] {
        &self.program_blocks
    }

    /// Step order as challenge indices.
    fn steps(&self) -> [usize; 4] {
        [self.design.0, self.program.0, self.simulation.0, self.idea.0]
    }

    fn require_previous(&self, progress: &StageProgress, index: usize) -> Result<(), MiniGameError> {
        let blocked_by = self
            .steps()
            .into_iter()
            .take_while(|&step| step != index)
            .find(|&step| !progress.is_challenge_completed(step));

        match blocked_by {
            Some(blocked_by) => Err(MiniGameError::OutOfOrder {
                challenge_index: index,
                blocked_by,
            }),
            None => Ok(()),
        }
    }
}

impl MiniGameAdapter for RobotLab {
    type Event = RobotLabEvent;

    fn stage_id(&self) -> StageId {
        self.stage_id
    }

    fn special_type(&self) -> SpecialType {
        SpecialType::RobotLab
    }

    fn handle_event(
        &self,
        progress: &StageProgress,
        event: &RobotLabEvent,
    ) -> Result<Vec<SubtaskResult>, MiniGameError> {
        match event {
            RobotLabEvent::DesignSubmitted(components) => {
                let (index, required) = self.design;
                self.require_previous(progress, index)?;
                let distinct: BTreeSet<String> = components
                    .iter()
                    .map(|c| c.trim().to_lowercase())
                    .filter(|c| !c.is_empty())
                    .collect();
                if distinct.len() < required {
                    return Err(MiniGameError::InsufficientInput {
                        what: "components",
                        required,
                        actual: distinct.len(),
                    });
                }
                Ok(vec![SubtaskResult::passed(index)])
            }
            RobotLabEvent::ProgramSubmitted(blocks) => {
                let (index, required) = self.program;
                self.require_previous(progress, index)?;
                if blocks.len() < required {
                    return Err(MiniGameError::InsufficientInput {
                        what: "program blocks",
                        required,
                        actual: blocks.len(),
                    });
                }
                Ok(vec![SubtaskResult::passed(index)])
            }
            RobotLabEvent::SimulationProgress { collected } => {
                let (index, target) = self.simulation;
                self.require_previous(progress, index)?;
                if self.simulation_done
                    || progress.is_challenge_completed(index)
                    || *collected < target
                {
                    return Ok(Vec::new());
                }
                Ok(vec![SubtaskResult::passed(index)])
            }
            RobotLabEvent::IdeaSubmitted(text) => {
                let (index, required) = self.idea;
                self.require_previous(progress, index)?;
                let length = text.trim().chars().count();
                if length < required {
                    return Err(MiniGameError::InsufficientInput {
                        what: "idea characters",
                        required,
                        actual: length,
                    });
                }
                Ok(vec![SubtaskResult::passed(index)])
            }
        }
    }

    fn commit(&mut self, event: RobotLabEvent, results: &[SubtaskResult]) {
        if !results.iter().any(|r| r.passed) {
            return;
        }
        match event {
            RobotLabEvent::ProgramSubmitted(blocks) => self.program_blocks = blocks,
            RobotLabEvent::SimulationProgress { .. } => self.simulation_done = true,
            RobotLabEvent::DesignSubmitted(_) | RobotLabEvent::IdeaSubmitted(_) => {}
        }
    }
}
