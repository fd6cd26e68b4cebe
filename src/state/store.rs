use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::data::CollectionState;

/// Key under which the collection document is kept
pub const DEFAULT_KEY: &str = "artifacts-database";

/// Failures of the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("could not create data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode collection: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Whole-document persistence for the collection.
///
/// `load` never fails: an absent or unreadable document is an empty
/// collection. `save` rewrites the full document every time.
pub trait Store {
    fn load(&self) -> CollectionState;

    fn save(&mut self, state: &CollectionState) -> Result<(), StoreError>;
}

/// The KvStore keeps documents in a small SQLite key-value table.
///
/// The database file lives in the user's data directory by default:
/// - Linux: ~/.local/share/artifact-scanner/artifacts.db
/// - macOS: ~/Library/Application Support/artifact-scanner/artifacts.db
/// - Windows: %APPDATA%\artifact-scanner\artifacts.db
pub struct KvStore {
    conn: Connection,
    db_path: PathBuf,
    key: String,
}

impl KvStore {
    /// Open or create the store at `db_path`, keeping the collection under `key`
    pub fn open(db_path: &Path, key: &str) -> Result<Self, StoreError> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;

        tracing::info!("📁 Store opened at: {}", db_path.display());

        let store = KvStore {
            conn,
            db_path: db_path.to_path_buf(),
            key: key.to_string(),
        };
        store.init_schema()?;

        Ok(store)
    }

    /// Default location of the database file
    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        path.push("artifact-scanner");
        path.push("artifacts.db");
        path
    }

    /// Create the key-value table if it doesn't exist
    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key             TEXT PRIMARY KEY,
                value           TEXT NOT NULL,
                updated_at      INTEGER NOT NULL
            )",
            [],
        )?;

        tracing::debug!("✅ Store schema initialized");

        Ok(())
    }

    /// Raw document text under the configured key
    fn read_raw(&self) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                [&self.key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_raw(&self, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![&self.key, value, Utc::now().timestamp()],
        )?;
        Ok(())
    }
}

impl Store for KvStore {
    fn load(&self) -> CollectionState {
        let raw = match self.read_raw() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::info!("Starting fresh collection");
                return CollectionState::default();
            }
            Err(e) => {
                tracing::warn!("⚠️  Could not read collection, starting fresh: {}", e);
                return CollectionState::default();
            }
        };

        match CollectionState::from_json(&raw) {
            Ok(mut state) => {
                let pruned = state.prune_orphan_threads();
                if pruned > 0 {
                    tracing::warn!("Dropped {} note threads without an artifact", pruned);
                }
                tracing::info!("📚 Loaded {} artifacts", state.artifacts.len());
                state
            }
            Err(e) => {
                tracing::warn!("⚠️  Stored collection is malformed, starting fresh: {}", e);
                CollectionState::default()
            }
        }
    }

    fn save(&mut self, state: &CollectionState) -> Result<(), StoreError> {
        let json = state.to_json()?;
        self.write_raw(&json)
    }
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvStore")
            .field("db_path", &self.db_path)
            .field("key", &self.key)
            .finish()
    }
}

/// Store used when the database cannot be opened: starts empty and keeps
/// nothing between runs.
#[derive(Debug, Default)]
pub struct DiscardStore;

impl Store for DiscardStore {
    fn load(&self) -> CollectionState {
        CollectionState::default()
    }

    fn save(&mut self, _state: &CollectionState) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-memory store holding the serialized document, for tests
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub document: std::rc::Rc<std::cell::RefCell<Option<String>>>,
    pub fail_writes: bool,
}

#[cfg(test)]
impl MemoryStore {
    /// Parse whatever was last written
    pub fn saved(&self) -> Option<CollectionState> {
        self.document
            .borrow()
            .as_deref()
            .and_then(|json| CollectionState::from_json(json).ok())
    }
}

#[cfg(test)]
impl Store for MemoryStore {
    fn load(&self) -> CollectionState {
        let mut state = self.saved().unwrap_or_default();
        state.prune_orphan_threads();
        state
    }

    fn save(&mut self, state: &CollectionState) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        *self.document.borrow_mut() = Some(state.to_json()?);
        Ok(())
    }
}
