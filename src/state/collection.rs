//! Pure operations on the collection document
//!
//! Nothing here touches storage or devices; the scanner persists after
//! every call that reports a change.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::data::{Artifact, ArtifactId, CollectionState, GeoLocation, Note, NOTE_AUTHOR};

/// Rejected note submissions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NoteError {
    #[error("note text is empty")]
    Empty,

    #[error("artifact not found: {0}")]
    UnknownArtifact(ArtifactId),
}

impl CollectionState {
    /// Look up an artifact by id
    pub fn artifact(&self, id: &ArtifactId) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| &a.id == id)
    }

    pub fn contains(&self, id: &ArtifactId) -> bool {
        self.artifact(id).is_some()
    }

    /// Note thread for an artifact, empty when none exists
    pub fn notes(&self, id: &ArtifactId) -> &[Note] {
        self.chat_messages
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Build the next artifact from a capture, deriving a unique id from
    /// the capture instant and the display name from the collection size.
    pub fn new_artifact(
        &self,
        image: String,
        location: Option<GeoLocation>,
        timestamp: DateTime<Utc>,
    ) -> Artifact {
        let id = unique_id(timestamp.timestamp_millis(), |candidate| {
            self.contains(&ArtifactId::new(candidate))
        });

        Artifact {
            id: ArtifactId::new(id),
            image,
            location,
            timestamp,
            name: format!("Artifact {}", self.artifacts.len() + 1),
            description: String::new(),
            tags: Vec::new(),
        }
    }

    /// Add an artifact at the end of the collection with an empty thread
    pub fn append(&mut self, artifact: Artifact) {
        self.chat_messages
            .entry(artifact.id.clone())
            .or_default();
        self.artifacts.push(artifact);
    }

    /// Remove an artifact and its note thread.
    /// Returns the removed artifact, or None if the id is unknown.
    pub fn delete(&mut self, id: &ArtifactId) -> Option<Artifact> {
        let position = self.artifacts.iter().position(|a| &a.id == id)?;
        let removed = self.artifacts.remove(position);
        self.chat_messages.remove(id);
        Some(removed)
    }

    /// Append a note to one artifact's thread
    pub fn add_note(
        &mut self,
        artifact_id: &ArtifactId,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Note, NoteError> {
        if text.trim().is_empty() {
            return Err(NoteError::Empty);
        }
        if !self.contains(artifact_id) {
            return Err(NoteError::UnknownArtifact(artifact_id.clone()));
        }

        let thread = self.chat_messages.entry(artifact_id.clone()).or_default();
        let id = unique_id(timestamp.timestamp_millis(), |candidate| {
            thread.iter().any(|n| n.id == candidate)
        });

        let note = Note {
            id,
            text: text.to_string(),
            timestamp,
            user: NOTE_AUTHOR.to_string(),
        };
        thread.push(note.clone());

        Ok(note)
    }

    /// Drop note threads whose artifact no longer exists.
    /// Returns how many threads were removed.
    pub fn prune_orphan_threads(&mut self) -> usize {
        let before = self.chat_messages.len();
        let artifacts = &self.artifacts;
        self.chat_messages
            .retain(|id, _| artifacts.iter().any(|a| &a.id == id));
        before - self.chat_messages.len()
    }
}

/// Time-derived id, bumped by one millisecond until `taken` says it is free
fn unique_id(millis: i64, taken: impl Fn(&str) -> bool) -> String {
    let mut candidate = millis;
    loop {
        let id = candidate.to_string();
        if !taken(&id) {
            return id;
        }
        candidate += 1;
    }
}
