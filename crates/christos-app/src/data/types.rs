//! Common data types for persistence
//!
//! Shared types used across the data module.

use serde::{Deserialize, Serialize};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a deterministic ID from a verse reference
///
/// Using the reference hash as ID provides:
/// - Deterministic: same reference always produces same ID
/// - Fast deduplication: check if ID exists without scanning
/// - Stable: ID doesn't change across sessions
pub fn reference_to_id(reference: &str) -> String {
    let mut hasher = DefaultHasher::new();
    reference.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Current Unix timestamp in seconds
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// A bookmarked verse
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    /// Deterministic ID derived from the reference
    pub id: String,
    /// Verse reference, e.g. "John 3:16"
    pub reference: String,
    /// Verse text at bookmark time
    pub text: String,
    /// When the bookmark was added (Unix timestamp)
    pub timestamp: u64,
    /// Optional user notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Bookmark {
    /// Create a bookmark for a verse, stamped with the current time
    pub fn new(reference: impl Into<String>, text: impl Into<String>) -> Self {
        let reference = reference.into();
        Self {
            id: reference_to_id(&reference),
            reference,
            text: text.into(),
            timestamp: unix_timestamp(),
            notes: None,
        }
    }

    /// Attach notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
