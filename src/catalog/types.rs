//! Stage and challenge definitions.
//!
//! These types are deserialized from the catalog TOML and never mutated
//! afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordinal identifier of a stage.
pub type StageId = u32;

/// Mini-game flavour of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialType {
    /// Regular quiz / free-text stage
    #[default]
    None,
    /// Secret code entry
    PasswordPuzzle,
    /// Side-scrolling platform run with a code-fix step
    PlatformGame,
    /// Robot design, programming and simulation
    RobotLab,
}

impl SpecialType {
    /// Stable lowercase name used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::PasswordPuzzle => "password_puzzle",
            Self::PlatformGame => "platform_game",
            Self::RobotLab => "robot_lab",
        }
    }

    /// Whether a subtask belongs to this mini-game.
    pub fn accepts(&self, subtask: &Subtask) -> bool {
        matches!(
            (self, subtask),
            (Self::PasswordPuzzle, Subtask::Passcode { .. })
                | (Self::PlatformGame, Subtask::PlatformRun)
                | (Self::PlatformGame, Subtask::CodeFix { .. })
                | (Self::RobotLab, Subtask::ComponentDesign { .. })
                | (Self::RobotLab, Subtask::BlockProgram { .. })
                | (Self::RobotLab, Subtask::Simulation { .. })
                | (Self::RobotLab, Subtask::CreativeIdea { .. })
        )
    }
}

impl std::fmt::Display for SpecialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Mini-game step a `mini_game_subtask` challenge stands for.
///
/// The engine never inspects this; the matching adapter in
/// [`crate::minigames`] decides whether the step was passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Subtask {
    /// Enter a secret code
    Passcode { code: String },
    /// Reach the end of the platform level
    PlatformRun,
    /// Repair the robot's obstacle handler
    CodeFix {
        #[serde(default = "default_code_fix_keywords")]
        accepted_keywords: Vec<String>,
    },
    /// Pick robot components
    ComponentDesign { min_components: usize },
    /// Assemble a block program
    BlockProgram { min_blocks: usize },
    /// Run the program in the simulator until enough items are collected
    Simulation { target_items: u32 },
    /// Describe an original robot idea
    CreativeIdea { min_chars: usize },
}

fn default_code_fix_keywords() -> Vec<String> {
    vec!["turnleft".to_string(), "left".to_string()]
}

/// Kind-specific part of a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChallengeKind {
    /// Multiple choice
    Quiz {
        options: Vec<String>,
        correct_option_index: usize,
    },
    /// Typed answer
    FreeText {
        correct_answer: String,
        #[serde(default = "default_case_sensitive")]
        case_sensitive: bool,
    },
    /// Step of the stage's mini-game
    MiniGameSubtask { subtask: Subtask },
}

fn default_case_sensitive() -> bool {
    true
}

/// A single challenge within a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeDefinition {
    /// Question or task shown to the player
    pub prompt: String,
    /// Points credited once on first success
    pub points: u32,
    #[serde(flatten)]
    pub kind: ChallengeKind,
}

impl ChallengeDefinition {
    /// Build a quiz challenge.
    pub fn quiz(prompt: &str, points: u32, options: &[&str], correct_option_index: usize) -> Self {
        Self {
            prompt: prompt.to_string(),
            points,
            kind: ChallengeKind::Quiz {
                options: options.iter().map(|o| o.to_string()).collect(),
                correct_option_index,
            },
        }
    }

    /// Build a free-text challenge.
    pub fn free_text(prompt: &str, points: u32, correct_answer: &str, case_sensitive: bool) -> Self {
        Self {
            prompt: prompt.to_string(),
            points,
            kind: ChallengeKind::FreeText {
                correct_answer: correct_answer.to_string(),
                case_sensitive,
            },
        }
    }

    /// Build a mini-game subtask challenge.
    pub fn subtask(prompt: &str, points: u32, subtask: Subtask) -> Self {
        Self {
            prompt: prompt.to_string(),
            points,
            kind: ChallengeKind::MiniGameSubtask { subtask },
        }
    }

    /// The mini-game step, if this is a subtask challenge.
    pub fn as_subtask(&self) -> Option<&Subtask> {
        match &self.kind {
            ChallengeKind::MiniGameSubtask { subtask } => Some(subtask),
            _ => None,
        }
    }
}

/// A stage: a timed unit of content with ordered challenges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub id: StageId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Moment from which the stage can be played
    pub unlock_at: DateTime<Utc>,
    #[serde(default)]
    pub special_type: SpecialType,
    pub challenges: Vec<ChallengeDefinition>,
}

impl StageDefinition {
    /// Whether the stage is playable at `now`.
    pub fn is_unlocked(&self, now: DateTime<Utc>) -> bool {
        now >= self.unlock_at
    }

    /// Sum of all challenge points.
    pub fn max_score(&self) -> u32 {
        self.challenges.iter().map(|c| c.points).sum()
    }

    /// Challenge at `index`, if any.
    pub fn challenge(&self, index: usize) -> Option<&ChallengeDefinition> {
        self.challenges.get(index)
    }
}
