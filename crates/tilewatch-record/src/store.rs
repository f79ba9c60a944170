//! Durable storage of the collected record history.
//!
//! The whole history is one JSON array that is rewritten on every change.
//! Loading never fails: a missing or unreadable document is an empty history.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::record::GameRecord;

/// File name of the persisted history inside a data directory.
pub const STORE_FILE_NAME: &str = "mines_predictor_data.json";

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum StoreError {
    #[display("failed to serialize record history")]
    Serialize(serde_json::Error),
    #[display("failed to write record history to {}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Persistent home of the record history.
pub trait RecordStore {
    /// Loads the persisted history, falling back to an empty one.
    fn load(&self) -> Vec<GameRecord>;

    /// Overwrites the persisted history with `records`.
    fn save(&mut self, records: &[GameRecord]) -> Result<(), StoreError>;
}

fn parse_document(document: &str, origin: &str) -> Vec<GameRecord> {
    match serde_json::from_str(document) {
        Ok(records) => records,
        Err(error) => {
            warn!(origin, %error, "discarding unreadable record history");
            Vec::new()
        }
    }
}

/// History stored as a JSON file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the conventional file name inside `data_dir`.
    #[must_use]
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(STORE_FILE_NAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> Vec<GameRecord> {
        match fs::read_to_string(&self.path) {
            Ok(document) => parse_document(&document, &self.path.display().to_string()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no record history yet");
                Vec::new()
            }
            Err(error) => {
                warn!(path = %self.path.display(), %error, "failed to read record history");
                Vec::new()
            }
        }
    }

    fn save(&mut self, records: &[GameRecord]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(records).map_err(StoreError::Serialize)?;
        self.write_atomic(&bytes).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), records = records.len(), "saved record history");
        Ok(())
    }
}

/// History kept as an in-memory JSON document.
///
/// Behaves like [`JsonFileStore`] without touching the filesystem, including
/// the soft failure on a corrupt document.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    document: Option<String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_document(document: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
        }
    }

    #[must_use]
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> Vec<GameRecord> {
        self.document
            .as_deref()
            .map(|document| parse_document(document, "memory"))
            .unwrap_or_default()
    }

    fn save(&mut self, records: &[GameRecord]) -> Result<(), StoreError> {
        self.document = Some(serde_json::to_string(records).map_err(StoreError::Serialize)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::record::{GameEvent, StartEvent};

    fn bare_start(game_id: &str) -> GameRecord {
        GameRecord::new(
            None,
            GameEvent::Start(StartEvent {
                active_game_id: Some(json!(game_id)),
                next_tile_multiplier: Some(1.5),
                next_tile_payout: Some(0.0),
                round: None,
                hashed_client_seed: None,
            }),
            json!({ "activeGameId": game_id }),
        )
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_file_store_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::in_dir(&dir.path().join("nested"));
        let records = vec![bare_start("a"), bare_start("b")];

        store.save(&records).unwrap();
        assert_eq!(store.load(), records);
        assert!(!store.path().with_extension("json.tmp").exists());

        // full overwrite, not append
        store.save(&records[..1]).unwrap();
        assert_eq!(store.load(), records[..1]);
    }

    #[test]
    fn test_file_store_corrupt_document_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(dir.path());
        fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().is_empty());

        fs::write(store.path(), r#"{"records": []}"#).unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(store.load().is_empty());

        let records = vec![bare_start("x")];
        store.save(&records).unwrap();
        assert_eq!(store.load(), records);
        assert!(store.document().unwrap().starts_with('['));
    }

    #[test]
    fn test_memory_store_corrupt_document_is_empty() {
        let store = MemoryStore::from_document("[1, 2, 3]");
        assert!(store.load().is_empty());
    }
}
