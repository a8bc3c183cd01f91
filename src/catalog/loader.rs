//! Catalog loading and validation.
//!
//! A catalog that fails any rule here is rejected as a whole; the process is
//! expected to stop instead of running with a partial stage list.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use super::types::{ChallengeKind, SpecialType, StageDefinition, Subtask};
use super::CatalogError;

/// Catalog shipped with the binary.
pub const BUILTIN_CATALOG: &str = include_str!("../../data/stages.toml");

/// On-disk layout: a list of `[[stages]]` tables.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    stages: Vec<StageDefinition>,
}

/// Parse stages from TOML without validating them.
pub fn parse_stages(content: &str) -> Result<Vec<StageDefinition>, CatalogError> {
    let file: CatalogFile =
        toml::from_str(content).map_err(|e| CatalogError::ParseError(e.to_string()))?;
    Ok(file.stages)
}

/// Read stages from a TOML file without validating them.
pub fn read_stages(path: &Path) -> Result<Vec<StageDefinition>, CatalogError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CatalogError::IoError(format!("{}: {}", path.display(), e)))?;
    parse_stages(&content)
}

/// Check every catalog rule.
pub fn validate(stages: &[StageDefinition]) -> Result<(), CatalogError> {
    if stages.is_empty() {
        return Err(CatalogError::Empty);
    }

    // Player totals are u32 sums over the whole catalog.
    let mut seen = HashSet::new();
    let mut catalog_points: u32 = 0;
    for stage in stages {
        if !seen.insert(stage.id) {
            return Err(CatalogError::DuplicateStage(stage.id));
        }
        validate_stage(stage)?;

        let overflow = |reason: &str| CatalogError::InvalidStage {
            stage_id: stage.id,
            reason: reason.to_string(),
        };
        let points = stage_points(stage).ok_or_else(|| overflow("stage points overflow"))?;
        catalog_points = catalog_points
            .checked_add(points)
            .ok_or_else(|| overflow("catalog points overflow"))?;
    }

    Ok(())
}

fn stage_points(stage: &StageDefinition) -> Option<u32> {
    stage
        .challenges
        .iter()
        .try_fold(0u32, |total, challenge| total.checked_add(challenge.points))
}

fn validate_stage(stage: &StageDefinition) -> Result<(), CatalogError> {
    let invalid = |reason: String| CatalogError::InvalidStage {
        stage_id: stage.id,
        reason,
    };

    if stage.challenges.is_empty() {
        return Err(invalid("stage has no challenges".to_string()));
    }

    for (index, challenge) in stage.challenges.iter().enumerate() {
        match &challenge.kind {
            ChallengeKind::Quiz {
                options,
                correct_option_index,
            } => {
                if options.is_empty() {
                    return Err(invalid(format!("quiz {} has no options", index)));
                }
                if *correct_option_index >= options.len() {
                    return Err(invalid(format!(
                        "quiz {} answer index {} out of {} options",
                        index,
                        correct_option_index,
                        options.len()
                    )));
                }
            }
            ChallengeKind::FreeText { correct_answer, .. } => {
                if correct_answer.trim().is_empty() {
                    return Err(invalid(format!("free-text {} has a blank answer", index)));
                }
            }
            ChallengeKind::MiniGameSubtask { subtask } => {
                if !stage.special_type.accepts(subtask) {
                    return Err(invalid(format!(
                        "challenge {} is not a {} step",
                        index, stage.special_type
                    )));
                }
                validate_subtask(subtask).map_err(|reason| invalid(format!("challenge {}: {}", index, reason)))?;
            }
        }
    }

    if stage.special_type != SpecialType::None {
        if let Some(index) = stage.challenges.iter().position(|c| c.as_subtask().is_none()) {
            return Err(invalid(format!(
                "{} stage has a non mini-game challenge at {}",
                stage.special_type, index
            )));
        }
    }

    let subtasks: Vec<&Subtask> = stage.challenges.iter().filter_map(|c| c.as_subtask()).collect();

    match stage.special_type {
        SpecialType::None => Ok(()),
        SpecialType::PasswordPuzzle => Ok(()),
        SpecialType::PlatformGame => {
            let runs = subtasks
                .iter()
                .filter(|s| matches!(s, Subtask::PlatformRun))
                .count();
            let fixes = subtasks
                .iter()
                .filter(|s| matches!(s, Subtask::CodeFix { .. }))
                .count();
            if runs == 0 || fixes != 1 {
                return Err(invalid(
                    "platform game needs at least one run and exactly one code fix".to_string(),
                ));
            }
            Ok(())
        }
        SpecialType::RobotLab => {
            let in_order = subtasks.len() == 4
                && matches!(subtasks[0], Subtask::ComponentDesign { .. })
                && matches!(subtasks[1], Subtask::BlockProgram { .. })
                && matches!(subtasks[2], Subtask::Simulation { .. })
                && matches!(subtasks[3], Subtask::CreativeIdea { .. });
            if !in_order {
                return Err(invalid(
                    "robot lab needs design, program, simulation and idea steps in that order"
                        .to_string(),
                ));
            }
            Ok(())
        }
    }
}

fn validate_subtask(subtask: &Subtask) -> Result<(), String> {
    match subtask {
        Subtask::Passcode { code } if code.trim().is_empty() => Err("blank passcode".to_string()),
        Subtask::CodeFix { accepted_keywords } if accepted_keywords.is_empty() => {
            Err("code fix without accepted keywords".to_string())
        }
        Subtask::Simulation { target_items: 0 } => Err("simulation target is zero".to_string()),
        _ => Ok(()),
    }
}
