//! Shared data structures for the application state
//!
//! These structs represent the collection document that flows between
//! the store, the export file and the UI layer. Field names follow the
//! on-disk JSON (`chatMessages`, camelCase) so backups stay portable.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Label attached to every note written from this device
pub const NOTE_AUTHOR: &str = "You";

/// Opaque artifact identifier (decimal milliseconds since the epoch)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A one-shot position fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
    /// Radius of uncertainty in metres, absent in some imported backups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

impl GeoLocation {
    #[cfg(test)]
    pub fn new(lat: f64, lng: f64, accuracy: f64) -> Self {
        Self {
            lat,
            lng,
            accuracy: Some(accuracy),
        }
    }

    /// Short form shown on collection cards
    pub fn short_label(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }

    /// Link to the position on Google Maps
    pub fn maps_url(&self) -> String {
        format!("https://www.google.com/maps?q={},{}", self.lat, self.lng)
    }
}

/// A photographed object in the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    /// Encoded image as a `data:` URL
    pub image: String,
    pub location: Option<GeoLocation>,
    pub timestamp: DateTime<Utc>,
    pub name: String,
    /// Never written by the UI; kept so older documents round-trip
    #[serde(default)]
    pub description: String,
    /// Never written by the UI; kept so older documents round-trip
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A free-text observation attached to an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub user: String,
}

/// The whole persisted document: artifacts in display order plus one
/// note thread per artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionState {
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(default)]
    pub chat_messages: BTreeMap<ArtifactId, Vec<Note>>,
}

impl CollectionState {
    /// Parse a collection document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Compact form used by the store
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Indented form used for backups
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Current instant truncated to milliseconds, matching the precision of
/// timestamps in stored documents
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
