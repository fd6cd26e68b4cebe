//! The scanner owns the collection, the active screen and the store.
//!
//! Every mutation goes through here and is followed by a full write of the
//! document. Write failures are logged and otherwise ignored; the in-memory
//! collection stays authoritative.

use chrono::{DateTime, Utc};

use crate::state::collection::NoteError;
use crate::state::data::{Artifact, ArtifactId, CollectionState, GeoLocation, Note};
use crate::state::screen::{Screen, Transition};
use crate::state::store::Store;

pub struct Scanner {
    state: CollectionState,
    screen: Screen,
    store: Box<dyn Store>,
}

impl Scanner {
    /// Load the collection from `store` and start on the scan screen
    pub fn open(store: Box<dyn Store>) -> Self {
        let state = store.load();
        Self {
            state,
            screen: Screen::default(),
            store,
        }
    }

    pub fn state(&self) -> &CollectionState {
        &self.state
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// The artifact shown by the Map or Notes screen
    pub fn selected(&self) -> Option<&Artifact> {
        self.screen
            .selected()
            .and_then(|id| self.state.artifact(id))
    }

    /// Apply a navigation event. Returns false, leaving the screen as it
    /// was, if the move is not in the transition table or targets an
    /// unknown artifact.
    pub fn navigate(&mut self, transition: Transition) -> bool {
        if let Transition::OpenMap(id) | Transition::OpenNotes(id) = &transition {
            if !self.state.contains(id) {
                tracing::warn!("Ignoring navigation to unknown artifact {}", id);
                return false;
            }
        }

        match self.screen.next(transition) {
            Some(next) => {
                tracing::debug!("Screen {:?} -> {:?}", self.screen, next);
                self.screen = next;
                true
            }
            None => false,
        }
    }

    /// Create an artifact from a finished capture and append it
    pub fn record_capture(
        &mut self,
        image: String,
        location: Option<GeoLocation>,
        timestamp: DateTime<Utc>,
    ) -> &Artifact {
        let artifact = self.state.new_artifact(image, location, timestamp);
        tracing::info!(
            "✅ Saved {} ({})",
            artifact.name,
            if artifact.location.is_some() { "located" } else { "no location" }
        );
        self.state.append(artifact);
        self.persist();

        let index = self.state.artifacts.len() - 1;
        &self.state.artifacts[index]
    }

    /// Remove an artifact and its notes. Callers confirm with the user
    /// first. Unknown ids are a no-op.
    pub fn delete(&mut self, id: &ArtifactId) -> Option<Artifact> {
        let removed = self.state.delete(id)?;

        if self.screen.selected() == Some(id) {
            self.screen = Screen::Collection;
        }

        tracing::info!("🗑️  Deleted {}", removed.name);
        self.persist();
        Some(removed)
    }

    pub fn add_note(
        &mut self,
        artifact_id: &ArtifactId,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Note, NoteError> {
        let note = self.state.add_note(artifact_id, text, timestamp)?;
        self.persist();
        Ok(note)
    }

    /// Swap in a whole collection, as restored from a backup
    pub fn replace(&mut self, state: CollectionState) {
        self.state = state;

        let stale = self
            .screen
            .selected()
            .is_some_and(|id| !self.state.contains(id));
        if stale {
            self.screen = Screen::Collection;
        }

        tracing::info!("Collection replaced ({} artifacts)", self.state.artifacts.len());
        self.persist();
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.state) {
            tracing::error!("Error saving collection: {}", e);
        }
    }
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("artifacts", &self.state.artifacts.len())
            .field("screen", &self.screen)
            .finish()
    }
}
