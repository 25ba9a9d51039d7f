//! Bookmarks management
//!
//! In-memory management of bookmarked verses, persisted as a single JSON
//! file that is read once at startup and rewritten in full after changes.

use crate::data::storage;
use crate::data::types::{reference_to_id, Bookmark};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Bookmarks data file name
const BOOKMARKS_FILE: &str = "bookmarks.json";

/// Bookmarks file format version for migrations
const BOOKMARKS_VERSION: u32 = 1;

/// Bookmarks file structure
#[derive(Debug, Serialize, Deserialize)]
struct BookmarksFile {
    version: u32,
    bookmarks: Vec<Bookmark>,
}

impl Default for BookmarksFile {
    fn default() -> Self {
        Self {
            version: BOOKMARKS_VERSION,
            bookmarks: Vec::new(),
        }
    }
}

/// Manages bookmarks in memory
///
/// Uses the reference hash as ID, so lookups by reference are O(1).
pub struct BookmarkStore {
    /// All bookmarks by ID (which is derived from the reference hash)
    bookmarks: HashMap<String, Bookmark>,
    /// Whether there are unsaved changes
    dirty: bool,
}

impl BookmarkStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            bookmarks: HashMap::new(),
            dirty: false,
        }
    }

    /// Load bookmarks from the default storage location
    pub fn load() -> Result<Self> {
        let path = storage::data_path(BOOKMARKS_FILE)?;
        Self::load_from(&path)
    }

    /// Load bookmarks from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut store = Self::new();

        if let Some(file) = storage::load_from::<BookmarksFile>(path)? {
            // TODO: Handle version migrations when BOOKMARKS_VERSION increases
            for bookmark in file.bookmarks {
                store.bookmarks.insert(bookmark.id.clone(), bookmark);
            }
        }

        store.dirty = false;
        Ok(store)
    }

    /// Save bookmarks to the default storage location
    pub fn save(&mut self) -> Result<()> {
        let path = storage::data_path(BOOKMARKS_FILE)?;
        self.save_to(&path)
    }

    /// Save bookmarks to a specific path
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let file = BookmarksFile {
            version: BOOKMARKS_VERSION,
            bookmarks: self.bookmarks.values().cloned().collect(),
        };

        storage::save_to(path, &file)?;
        self.dirty = false;
        Ok(())
    }

    /// Check if there are unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Add a new bookmark
    pub fn add(&mut self, bookmark: Bookmark) -> Result<()> {
        // ID is derived from the reference, so same reference = same ID
        if self.bookmarks.contains_key(&bookmark.id) {
            return Err(AppError::Config(format!(
                "'{}' is already bookmarked",
                bookmark.reference
            )));
        }

        self.bookmarks.insert(bookmark.id.clone(), bookmark);
        self.dirty = true;
        Ok(())
    }

    /// Remove a bookmark by ID
    pub fn remove(&mut self, id: &str) -> Result<Bookmark> {
        let bookmark = self
            .bookmarks
            .remove(id)
            .ok_or_else(|| AppError::NotFound(format!("Bookmark with ID '{}' not found", id)))?;

        self.dirty = true;
        Ok(bookmark)
    }

    /// Remove a bookmark by reference
    pub fn remove_by_reference(&mut self, reference: &str) -> Result<Bookmark> {
        let id = reference_to_id(reference);
        self.remove(&id)
    }

    /// Get a bookmark by ID
    pub fn get(&self, id: &str) -> Option<&Bookmark> {
        self.bookmarks.get(id)
    }

    /// Get a bookmark by reference (O(1) - just compute hash)
    pub fn get_by_reference(&self, reference: &str) -> Option<&Bookmark> {
        self.bookmarks.get(&reference_to_id(reference))
    }

    /// Check if a reference is bookmarked (O(1))
    pub fn is_bookmarked(&self, reference: &str) -> bool {
        self.bookmarks.contains_key(&reference_to_id(reference))
    }

    /// Toggle bookmark membership for a reference.
    ///
    /// Returns `Some(id)` if added, `None` if removed. Toggling twice with
    /// the same reference restores the original membership state.
    pub fn toggle(&mut self, reference: &str, text: &str) -> Result<Option<String>> {
        let id = reference_to_id(reference);

        if self.bookmarks.contains_key(&id) {
            self.remove(&id)?;
            Ok(None)
        } else {
            let bookmark = Bookmark::new(reference, text);
            let id = bookmark.id.clone();
            self.add(bookmark)?;
            Ok(Some(id))
        }
    }

    /// Get all bookmarks, unordered
    pub fn all(&self) -> Vec<&Bookmark> {
        self.bookmarks.values().collect()
    }

    /// Get all bookmarks, most recently added first
    pub fn sorted(&self) -> Vec<&Bookmark> {
        let mut bookmarks: Vec<_> = self.bookmarks.values().collect();
        bookmarks.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(a.reference.cmp(&b.reference)));
        bookmarks
    }

    /// Get number of bookmarks
    pub fn count(&self) -> usize {
        self.bookmarks.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }
}

impl Default for BookmarkStore {
    fn default() -> Self {
        Self::new()
    }
}
