//! Transcript records
//!
//! One immutable unit of interpreter output. The `kind` tag is the only
//! rendering hint carried here; colors and the typing effect belong to the
//! presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rendering-relevant classification of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Echo of a submitted command line
    Command,
    /// Deterministic output from static data
    Output,
    /// User error or contained internal fault
    Error,
    /// Assistant-sourced text, replayed with the typing effect
    Ai,
}

impl RecordKind {
    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::Command => "command",
            RecordKind::Output => "output",
            RecordKind::Error => "error",
            RecordKind::Ai => "ai",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub id: Uuid,
    pub content: String,
    pub kind: RecordKind,
    pub created_at: DateTime<Utc>,
}

impl OutputRecord {
    pub fn new(kind: RecordKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            kind,
            created_at: Utc::now(),
        }
    }

    pub fn command(content: impl Into<String>) -> Self {
        Self::new(RecordKind::Command, content)
    }

    pub fn output(content: impl Into<String>) -> Self {
        Self::new(RecordKind::Output, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(RecordKind::Error, content)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(RecordKind::Ai, content)
    }
}
