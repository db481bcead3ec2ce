//! Checkpoint persistence surviving a full page reload.
//!
//! The persisted layout is a single JSON object with the stable keys
//! `active`, `totalProcessed` and `lastLocation`. There is no schema version:
//! anything absent, mistyped or unparsable reads back as the inactive
//! checkpoint.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use engine_logging::{engine_debug, engine_warn};
use serde_json::Value;
use thiserror::Error;
use unwatch_core::{
    TaskCheckpoint, TaskError, KEY_ACTIVE, KEY_LAST_LOCATION, KEY_TOTAL_PROCESSED,
};

use crate::persist::{AtomicFileWriter, PersistError};

pub const CHECKPOINT_FILENAME: &str = "checkpoint.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("checkpoint storage unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("failed to encode checkpoint: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<StoreError> for TaskError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(detail) => TaskError::StorageUnavailable(detail),
            other => TaskError::StorageUnavailable(other.to_string()),
        }
    }
}

pub trait CheckpointStore: Send + Sync {
    /// Last saved checkpoint, or the inactive value when none exists.
    fn load(&self) -> Result<TaskCheckpoint, StoreError>;
    /// Persist every field at once.
    fn save(&self, checkpoint: &TaskCheckpoint) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Decode a persisted checkpoint, tolerating absent or garbled fields.
pub fn decode_checkpoint(raw: &str) -> TaskCheckpoint {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            engine_warn!("Discarding unparsable checkpoint: {}", err);
            return TaskCheckpoint::inactive();
        }
    };

    if value.get(KEY_ACTIVE).and_then(Value::as_bool) != Some(true) {
        return TaskCheckpoint::inactive();
    }
    let Some(total_processed) = value.get(KEY_TOTAL_PROCESSED).and_then(Value::as_u64) else {
        engine_warn!("Discarding checkpoint with garbled {}", KEY_TOTAL_PROCESSED);
        return TaskCheckpoint::inactive();
    };
    let last_location = match value.get(KEY_LAST_LOCATION) {
        None | Some(Value::Null) => None,
        Some(Value::String(location)) => Some(location.clone()),
        Some(_) => {
            engine_warn!("Discarding checkpoint with garbled {}", KEY_LAST_LOCATION);
            return TaskCheckpoint::inactive();
        }
    };

    TaskCheckpoint {
        active: true,
        total_processed,
        last_location,
    }
}

pub fn encode_checkpoint(checkpoint: &TaskCheckpoint) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(&checkpoint.clone().normalized())?)
}

/// Process-local store; clones share the same slot, which is how a reload
/// within one process sees the previous page's checkpoint.
#[derive(Debug, Clone, Default)]
pub struct MemoryCheckpointStore {
    inner: Arc<Mutex<MemorySlot>>,
}

#[derive(Debug, Default)]
struct MemorySlot {
    raw: Option<String>,
    unavailable: bool,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate storage going away (or coming back).
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut slot) = self.inner.lock() {
            slot.unavailable = unavailable;
        }
    }

    /// The raw persisted text, as a later page load would read it.
    pub fn raw(&self) -> Option<String> {
        self.inner.lock().ok().and_then(|slot| slot.raw.clone())
    }

    /// Overwrite the raw persisted text, bypassing validation.
    pub fn set_raw(&self, raw: impl Into<String>) {
        if let Ok(mut slot) = self.inner.lock() {
            slot.raw = Some(raw.into());
        }
    }

    fn with_slot<T>(
        &self,
        f: impl FnOnce(&mut MemorySlot) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut slot = self
            .inner
            .lock()
            .map_err(|_| StoreError::Unavailable("checkpoint slot poisoned".into()))?;
        if slot.unavailable {
            return Err(StoreError::Unavailable("storage disabled".into()));
        }
        f(&mut slot)
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self) -> Result<TaskCheckpoint, StoreError> {
        self.with_slot(|slot| {
            Ok(slot
                .raw
                .as_deref()
                .map(decode_checkpoint)
                .unwrap_or_default())
        })
    }

    fn save(&self, checkpoint: &TaskCheckpoint) -> Result<(), StoreError> {
        let raw = encode_checkpoint(checkpoint)?;
        self.with_slot(|slot| {
            slot.raw = checkpoint.active.then_some(raw);
            Ok(())
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.with_slot(|slot| {
            slot.raw = None;
            Ok(())
        })
    }
}

/// Store backed by `checkpoint.json` in a state directory.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    writer: AtomicFileWriter,
}

impl FileCheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir.into()),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.writer.dir().join(CHECKPOINT_FILENAME)
    }

    pub fn dir(&self) -> &Path {
        self.writer.dir()
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn load(&self) -> Result<TaskCheckpoint, StoreError> {
        let path = self.path();
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(decode_checkpoint(&raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(TaskCheckpoint::inactive()),
            Err(err) => Err(StoreError::Unavailable(format!("{}: {}", path.display(), err))),
        }
    }

    fn save(&self, checkpoint: &TaskCheckpoint) -> Result<(), StoreError> {
        if !checkpoint.active {
            return self.clear();
        }
        let raw = encode_checkpoint(checkpoint)?;
        let path = self.writer.write(CHECKPOINT_FILENAME, &raw)?;
        engine_debug!("Checkpoint saved to {:?}", path);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.writer.remove(CHECKPOINT_FILENAME)?;
        engine_debug!("Checkpoint cleared in {:?}", self.writer.dir());
        Ok(())
    }
}
