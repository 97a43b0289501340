use std::fs;
use std::io;
use std::path::PathBuf;

use notice_core::DedupState;
use notice_logging::{notice_info, notice_warn};

use crate::persist::{AtomicFileWriter, PersistError};

/// Durable home of the [`DedupState`].
pub trait DedupStore: Send + Sync {
    /// Never fails: a missing or unreadable store reads as empty.
    fn load(&self) -> DedupState;

    /// Replaces the persisted state with `state` as a whole.
    fn commit(&self, state: &DedupState) -> Result<(), PersistError>;
}

/// Pretty-printed JSON object of source name to token list.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DedupStore for JsonFileStore {
    fn load(&self) -> DedupState {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                notice_info!("No dedup state at {:?}; starting empty", self.path);
                return DedupState::new();
            }
            Err(err) => {
                notice_warn!("Failed to read dedup state from {:?}: {}", self.path, err);
                return DedupState::new();
            }
        };

        match serde_json::from_str::<DedupState>(&content) {
            Ok(state) => {
                notice_info!(
                    "Loaded dedup state from {:?}: {} tokens across {} sources",
                    self.path,
                    state.token_count(),
                    state.source_count()
                );
                state
            }
            Err(err) => {
                notice_warn!("Failed to parse dedup state from {:?}: {}", self.path, err);
                DedupState::new()
            }
        }
    }

    fn commit(&self, state: &DedupState) -> Result<(), PersistError> {
        let mut content = serde_json::to_string_pretty(state)?;
        content.push('\n');
        AtomicFileWriter::new(self.path.clone()).write(&content)?;
        notice_info!(
            "Committed dedup state to {:?}: {} tokens",
            self.path,
            state.token_count()
        );
        Ok(())
    }
}
