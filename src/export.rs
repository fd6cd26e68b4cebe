//! Backup export and import
//!
//! A backup is the collection document, pretty-printed, in a file named
//! after the UTC date it was taken.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

use crate::state::data::CollectionState;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExportError {
    #[error("could not encode backup: {0}")]
    Encode(String),

    #[error("not a valid backup: {0}")]
    Decode(String),

    #[error("file error: {0}")]
    Io(String),
}

/// `artifact-scanner-backup-<YYYY-MM-DD>.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("artifact-scanner-backup-{}.json", date.format("%Y-%m-%d"))
}

pub fn to_document(state: &CollectionState) -> Result<String, ExportError> {
    state
        .to_json_pretty()
        .map_err(|e| ExportError::Encode(e.to_string()))
}

/// Parse a backup, dropping note threads that point at no artifact
pub fn from_document(json: &str) -> Result<CollectionState, ExportError> {
    let mut state =
        CollectionState::from_json(json).map_err(|e| ExportError::Decode(e.to_string()))?;

    let pruned = state.prune_orphan_threads();
    if pruned > 0 {
        tracing::warn!("Backup had {} note threads without an artifact", pruned);
    }

    Ok(state)
}

/// Write an already-encoded backup to `path`
pub async fn write_backup(path: PathBuf, document: String) -> Result<PathBuf, ExportError> {
    tokio::fs::write(&path, document)
        .await
        .map_err(|e| ExportError::Io(e.to_string()))?;

    tracing::info!("💾 Backup written to {}", path.display());
    Ok(path)
}

pub async fn read_backup(path: PathBuf) -> Result<CollectionState, ExportError> {
    let json = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ExportError::Io(e.to_string()))?;

    let state = from_document(&json)?;
    tracing::info!(
        "📥 Read backup {} with {} artifacts",
        path.display(),
        state.artifacts.len()
    );
    Ok(state)
}
