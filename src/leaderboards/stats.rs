//! Participation statistics for the admin view.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::{Catalog, StageId};
use crate::progress::PlayerRecord;

/// How many players finished one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageParticipation {
    pub stage_id: StageId,
    pub title: String,
    pub completed_count: usize,
    pub total_players: usize,
    /// 0..100
    pub completion_percentage: f64,
}

/// One row of the participants table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSummary {
    pub identity: String,
    pub display_name: String,
    pub contact: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub stages_completed: usize,
    pub total_stages: usize,
    pub total_score: u32,
}

/// Admin participation report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationReport {
    pub total_players: usize,
    pub stages: Vec<StageParticipation>,
    pub participants: Vec<ParticipantSummary>,
}

/// Build the participation report from a player snapshot.
pub fn participation_report(players: &[PlayerRecord], catalog: &Catalog) -> ParticipationReport {
    let total_players = players.len();

    let stages = catalog
        .stages()
        .iter()
        .map(|stage| {
            let completed_count = players
                .iter()
                .filter(|p| p.stage_progress(stage.id).is_some_and(|s| s.completed))
                .count();
            let completion_percentage = if total_players > 0 {
                completed_count as f64 / total_players as f64 * 100.0
            } else {
                0.0
            };
            StageParticipation {
                stage_id: stage.id,
                title: stage.title.clone(),
                completed_count,
                total_players,
                completion_percentage,
            }
        })
        .collect();

    let participants = players
        .iter()
        .map(|p| ParticipantSummary {
            identity: p.identity.clone(),
            display_name: p.display_name.clone(),
            contact: p.contact.clone(),
            registered_at: p.registered_at,
            stages_completed: p.stages_completed(),
            total_stages: catalog.len(),
            total_score: p.total_score(),
        })
        .collect();

    ParticipationReport {
        total_players,
        stages,
        participants,
    }
}
