//! Game service: load → compute → save around the progress engine.
//!
//! `GameService` is the explicit context a front end holds instead of a
//! "current player" global. Every mutating call re-fetches the player from
//! the store, runs the pure engine and persists the returned record before
//! reporting success.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::{Catalog, StageId};
use crate::leaderboards::{
    participation_report, ExportError, GameDataExport, Leaderboard, ParticipationReport,
};
use crate::minigames::{apply_results, MiniGameAdapter, MiniGameError, SubtaskResult};
use crate::progress::{
    get_or_create_player, normalize_identity, PlayerRecord, ProgressEngine, ProgressError,
    RegistrationError, Submission, SubmissionOutcome,
};
use crate::storage::{DatabaseError, PlayerStore};

/// Summary shown when a stage has just been completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSummary {
    pub stage_id: StageId,
    pub stage_title: String,
    pub stage_score: u32,
    pub stages_completed: usize,
    pub total_stages: usize,
}

impl CompletionSummary {
    /// Whether every stage of the catalog is now complete.
    pub fn all_completed(&self) -> bool {
        self.stages_completed == self.total_stages
    }
}

/// Result of a single answer submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    pub record: PlayerRecord,
    pub outcome: SubmissionOutcome,
    pub completion: Option<CompletionSummary>,
}

/// Result of feeding one event to a mini-game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiniGameReport {
    pub record: PlayerRecord,
    pub results: Vec<SubtaskResult>,
    pub outcomes: Vec<SubmissionOutcome>,
    pub completion: Option<CompletionSummary>,
}

/// Game service over a player store.
pub struct GameService<S: PlayerStore> {
    store: S,
    catalog: Catalog,
    admin_identity: Option<String>,
}

impl<S: PlayerStore> GameService<S> {
    /// Create a service without an admin.
    pub fn new(store: S, catalog: Catalog) -> Self {
        Self {
            store,
            catalog,
            admin_identity: None,
        }
    }

    /// Set the admin identity.
    pub fn with_admin(mut self, identity: &str) -> Result<Self, ServiceError> {
        self.admin_identity = Some(normalize_identity(identity)?);
        Ok(self)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether `identity` is the configured admin.
    pub fn is_admin(&self, identity: &str) -> bool {
        match (&self.admin_identity, normalize_identity(identity)) {
            (Some(admin), Ok(identity)) => *admin == identity,
            _ => false,
        }
    }

    /// Register a player or refresh an existing one.
    pub fn register(
        &self,
        identity: &str,
        display_name: &str,
        contact: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<PlayerRecord, ServiceError> {
        let identity = normalize_identity(identity).map_err(rejected)?;
        let existing = self.store.load_player(&identity)?;
        let record = get_or_create_player(
            existing,
            &identity,
            display_name,
            contact,
            &self.catalog,
            now,
        )
        .map_err(rejected)?;
        self.store.save_player(&record)?;
        Ok(record)
    }

    /// Fetch a registered player.
    pub fn player(&self, identity: &str) -> Result<PlayerRecord, ServiceError> {
        let identity = normalize_identity(identity)?;
        self.store
            .load_player(&identity)?
            .ok_or(ServiceError::UnknownPlayer(identity))
    }

    /// Submit an answer for a quiz or free-text challenge.
    pub fn submit(
        &self,
        identity: &str,
        stage_id: StageId,
        challenge_index: usize,
        submission: &Submission,
        now: DateTime<Utc>,
    ) -> Result<SubmissionReport, ServiceError> {
        let record = self.player(identity)?;
        let engine = ProgressEngine::new(&self.catalog);
        let (record, outcome) = engine
            .submit_answer(&record, stage_id, challenge_index, submission, now)
            .map_err(rejected)?;
        self.store.save_player(&record)?;

        let completion = outcome
            .stage_newly_completed
            .then(|| self.completion_summary(&record, stage_id));

        Ok(SubmissionReport {
            record,
            outcome,
            completion,
        })
    }

    /// Feed one event to a mini-game adapter and apply what it reports.
    ///
    /// The record is saved once, after every verdict has been applied. An
    /// event that produces no verdicts leaves the store untouched.
    pub fn play_mini_game<A: MiniGameAdapter>(
        &self,
        identity: &str,
        adapter: &mut A,
        event: A::Event,
        now: DateTime<Utc>,
    ) -> Result<MiniGameReport, ServiceError> {
        let record = self.player(identity)?;
        let stage_id = adapter.stage_id();
        let progress = record
            .stage_progress(stage_id)
            .ok_or(ProgressError::MissingStageProgress(stage_id))?;

        let results = adapter.handle_event(progress, &event).map_err(rejected)?;
        if results.is_empty() {
            adapter.commit(event, &results);
            return Ok(MiniGameReport {
                record,
                results,
                outcomes: Vec::new(),
                completion: None,
            });
        }

        let engine = ProgressEngine::new(&self.catalog);
        let (record, outcomes) =
            apply_results(&engine, &record, stage_id, &results, now).map_err(rejected)?;
        self.store.save_player(&record)?;
        adapter.commit(event, &results);

        let completion = outcomes
            .iter()
            .any(|o| o.stage_newly_completed)
            .then(|| self.completion_summary(&record, stage_id));

        Ok(MiniGameReport {
            record,
            results,
            outcomes,
            completion,
        })
    }

    /// Current leaderboard.
    pub fn leaderboard(&self) -> Result<Leaderboard, ServiceError> {
        let players = self.store.list_all_players()?;
        Ok(Leaderboard::from_players(&players))
    }

    /// Participation statistics, admin only.
    pub fn participation_report(
        &self,
        requester: &str,
    ) -> Result<ParticipationReport, ServiceError> {
        self.require_admin(requester)?;
        let players = self.store.list_all_players()?;
        Ok(participation_report(&players, &self.catalog))
    }

    /// Full data export, admin only.
    pub fn export(
        &self,
        requester: &str,
        now: DateTime<Utc>,
    ) -> Result<GameDataExport, ServiceError> {
        self.require_admin(requester)?;
        let players = self.store.list_all_players()?;
        Ok(GameDataExport::new(players, now))
    }

    fn require_admin(&self, requester: &str) -> Result<(), ServiceError> {
        if self.is_admin(requester) {
            Ok(())
        } else {
            tracing::warn!("Admin request denied for {}", requester);
            Err(ServiceError::NotAuthorized(requester.to_string()))
        }
    }

    fn completion_summary(&self, record: &PlayerRecord, stage_id: StageId) -> CompletionSummary {
        let stage_title = self
            .catalog
            .stage(stage_id)
            .map(|stage| stage.title.clone())
            .unwrap_or_default();
        CompletionSummary {
            stage_id,
            stage_title,
            stage_score: record
                .stage_progress(stage_id)
                .map_or(0, |progress| progress.score),
            stages_completed: record.stages_completed(),
            total_stages: self.catalog.len(),
        }
    }
}

/// Log an input error before handing it back.
fn rejected<E: std::fmt::Display>(error: E) -> E {
    tracing::warn!("Rejected: {}", error);
    error
}

/// Service errors.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("{0} is not authorized for admin operations")]
    NotAuthorized(String),

    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    MiniGame(#[from] MiniGameError),

    #[error(transparent)]
    Storage(#[from] DatabaseError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
