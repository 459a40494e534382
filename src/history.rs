//! Command history - persisted, capped, recallable
//!
//! The store keeps raw submitted lines, most recent last, and rewrites its
//! backing storage after every push. Storage lives behind a trait so the
//! session can run against a JSON file in the state directory or against
//! memory in tests.
//!
//! Recall navigation is ephemeral UI state and never persisted.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::config;

/// Maximum number of entries kept (oldest evicted first)
pub const HISTORY_LIMIT: usize = 50;

/// Fixed storage key; the JSON file is named after it
pub const HISTORY_KEY: &str = "terminal-history";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("history file {path} is not a JSON string list: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not locate state directory: {0}")]
    Location(String),
}

/// Backing storage for the history list
pub trait HistoryStorage: Send {
    fn load(&self) -> Result<Vec<String>, HistoryError>;
    fn save(&self, entries: &[String]) -> Result<(), HistoryError>;
    fn describe(&self) -> String;
}

/// JSON array of strings on disk
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at the default location in the state directory
    pub fn default_location() -> Result<Self, HistoryError> {
        let dir = config::state_dir().map_err(|e| HistoryError::Location(e.to_string()))?;
        Ok(Self::new(dir.join(format!("{}.json", HISTORY_KEY))))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl HistoryStorage for JsonFileStorage {
    fn load(&self) -> Result<Vec<String>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_err(e))?;
        serde_json::from_str(&content).map_err(|source| HistoryError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Write atomically (temp file + rename)
    fn save(&self, entries: &[String]) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let content = serde_json::to_string(entries).map_err(|source| HistoryError::Decode {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| self.io_err(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory storage; clones share the same list
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    saved: Arc<Mutex<Vec<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<String>) -> Self {
        Self {
            saved: Arc::new(Mutex::new(entries)),
        }
    }

    /// What was last written
    pub fn snapshot(&self) -> Vec<String> {
        self.saved.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl HistoryStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<String>, HistoryError> {
        Ok(self.snapshot())
    }

    fn save(&self, entries: &[String]) -> Result<(), HistoryError> {
        if let Ok(mut saved) = self.saved.lock() {
            *saved = entries.to_vec();
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}

/// Ordered, capped list of submitted command lines
pub struct HistoryStore {
    entries: Vec<String>,
    storage: Box<dyn HistoryStorage>,
}

impl HistoryStore {
    /// Create from storage, keeping only the newest `HISTORY_LIMIT` entries.
    /// Unreadable storage starts the store empty.
    pub fn hydrate(storage: Box<dyn HistoryStorage>) -> Self {
        let mut entries = match storage.load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(storage = %storage.describe(), "history not loaded: {}", e);
                Vec::new()
            }
        };
        let excess = entries.len().saturating_sub(HISTORY_LIMIT);
        entries.drain(..excess);
        Self { entries, storage }
    }

    pub fn in_memory() -> Self {
        Self::hydrate(Box::new(MemoryStorage::new()))
    }

    /// Append an entry, evicting the oldest on overflow, then persist.
    /// Persistence failure is logged, never returned.
    pub fn push(&mut self, line: &str) {
        self.entries.push(line.to_string());
        if self.entries.len() > HISTORY_LIMIT {
            let excess = self.entries.len() - HISTORY_LIMIT;
            self.entries.drain(..excess);
        }
        if let Err(e) = self.storage.save(&self.entries) {
            tracing::warn!(storage = %self.storage.describe(), "history not saved: {}", e);
        }
    }

    /// Drop all entries, in memory and in storage
    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.entries.clear();
        self.storage.save(&self.entries)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn storage_description(&self) -> String {
        self.storage.describe()
    }
}

// ═══════════════════════════════════════════════════════════════
// RECALL NAVIGATION
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recall {
    /// Toward older entries
    Up,
    /// Toward newer entries
    Down,
}

/// One recall step over `(cursor, entries, draft)`.
///
/// `None` as cursor means "not browsing". `Up` from not-browsing jumps to the
/// newest entry and then walks back, floored at the oldest. `Down` walks
/// forward; stepping past the newest leaves browsing with an empty draft.
/// `Down` while not browsing, or `Up` with no history, keeps the draft.
pub fn navigate(
    cursor: Option<usize>,
    entries: &[String],
    draft: &str,
    direction: Recall,
) -> (Option<usize>, String) {
    match direction {
        Recall::Up => {
            if entries.is_empty() {
                return (cursor, draft.to_string());
            }
            let idx = match cursor {
                None => entries.len() - 1,
                Some(i) => i.saturating_sub(1).min(entries.len() - 1),
            };
            (Some(idx), entries[idx].clone())
        }
        Recall::Down => match cursor {
            None => (None, draft.to_string()),
            Some(i) => {
                let next = i + 1;
                if next >= entries.len() {
                    (None, String::new())
                } else {
                    (Some(next), entries[next].clone())
                }
            }
        },
    }
}

/// Recall cursor held by the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryCursor {
    position: Option<usize>,
}

impl HistoryCursor {
    pub fn is_browsing(&self) -> bool {
        self.position.is_some()
    }

    pub fn step(&mut self, entries: &[String], draft: &str, direction: Recall) -> String {
        let (position, text) = navigate(self.position, entries, draft, direction);
        self.position = position;
        text
    }

    pub fn reset(&mut self) {
        self.position = None;
    }
}
