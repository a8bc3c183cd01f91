//! Player registration and identity resolution.
//!
//! `get_or_create_player` is the only place a [`PlayerRecord`] is created.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use super::types::{PlayerRecord, StageProgress};
use crate::catalog::{Catalog, StageId};

/// Normalize a raw email into a player identity.
pub fn normalize_identity(raw: &str) -> Result<String, RegistrationError> {
    let identity = raw.trim().to_lowercase();
    if identity.is_empty() {
        return Err(RegistrationError::BlankIdentity);
    }
    Ok(identity)
}

/// Resolve a player from an optional stored record.
///
/// A new record gets one zeroed progress entry per catalog stage. An existing
/// record only has its name, contact and activity time refreshed; its
/// progress is reconciled with the catalog but never reset.
pub fn get_or_create_player(
    existing: Option<PlayerRecord>,
    identity: &str,
    display_name: &str,
    contact: Option<&str>,
    catalog: &Catalog,
    now: DateTime<Utc>,
) -> Result<PlayerRecord, RegistrationError> {
    let identity = normalize_identity(identity)?;
    let display_name = display_name.trim();
    if display_name.is_empty() {
        return Err(RegistrationError::BlankDisplayName);
    }
    let contact = contact
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    match existing {
        Some(mut record) => {
            if record.identity != identity {
                return Err(RegistrationError::IdentityMismatch {
                    expected: identity,
                    found: record.identity,
                });
            }
            reconcile_with_catalog(&mut record, catalog)?;
            record.display_name = display_name.to_string();
            record.contact = contact;
            record.last_active_at = now;
            Ok(record)
        }
        None => {
            tracing::info!("Registering new player {}", identity);
            Ok(PlayerRecord {
                identity,
                display_name: display_name.to_string(),
                contact,
                registered_at: now,
                last_active_at: now,
                progress: catalog
                    .stages()
                    .iter()
                    .map(|stage| StageProgress::new(stage.id))
                    .collect(),
            })
        }
    }
}

/// Bring a stored record in line with the current catalog.
///
/// Stages added since registration get a fresh entry; anything that would
/// require rewriting credited progress is rejected, and so is a stage with
/// more than one stored entry.
pub fn reconcile_with_catalog(
    record: &mut PlayerRecord,
    catalog: &Catalog,
) -> Result<(), RegistrationError> {
    let mut seen = BTreeSet::new();
    for progress in &record.progress {
        if !seen.insert(progress.stage_id) {
            return Err(RegistrationError::CatalogDrift {
                stage_id: progress.stage_id,
                reason: "duplicate progress entry".to_string(),
            });
        }
        let stage = catalog
            .stage(progress.stage_id)
            .ok_or_else(|| RegistrationError::CatalogDrift {
                stage_id: progress.stage_id,
                reason: "stage no longer in catalog".to_string(),
            })?;
        if let Some(reason) = progress.mismatch_with(stage) {
            return Err(RegistrationError::CatalogDrift {
                stage_id: stage.id,
                reason,
            });
        }
    }

    let mut reordered = Vec::with_capacity(catalog.len());
    for stage in catalog.stages() {
        match record.progress.iter().position(|p| p.stage_id == stage.id) {
            Some(index) => reordered.push(record.progress.swap_remove(index)),
            None => {
                tracing::info!(
                    "Adding progress for new stage {} to {}",
                    stage.id,
                    record.identity
                );
                reordered.push(StageProgress::new(stage.id));
            }
        }
    }
    record.progress = reordered;

    Ok(())
}

/// Registration errors.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Identity is blank")]
    BlankIdentity,

    #[error("Display name is blank")]
    BlankDisplayName,

    #[error("Stored record belongs to {found}, expected {expected}")]
    IdentityMismatch { expected: String, found: String },

    #[error("Stored progress for stage {stage_id} does not match the catalog: {reason}")]
    CatalogDrift { stage_id: StageId, reason: String },
}
