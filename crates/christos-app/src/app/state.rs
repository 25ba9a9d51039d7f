//! Shared application state and commands
//!
//! `AppCommand` is the unified command type sent by any frontend.
//! `AppSnapshot` is the shared state read back by frontends; it is only
//! mutated by the controller.

use std::collections::HashMap;
use std::fmt;

use crate::providers::types::Chapter;

/// Named application views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    Reader,
    Counselor,
    Explainer,
    Devotional,
    Quiz,
    Bookmarks,
    Advent,
}

impl Route {
    /// All routes, in navigation order
    pub const ALL: [Route; 8] = [
        Route::Home,
        Route::Reader,
        Route::Counselor,
        Route::Explainer,
        Route::Devotional,
        Route::Quiz,
        Route::Bookmarks,
        Route::Advent,
    ];

    /// Stable machine-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Reader => "reader",
            Route::Counselor => "counselor",
            Route::Explainer => "explainer",
            Route::Devotional => "devotional",
            Route::Quiz => "quiz",
            Route::Bookmarks => "bookmarks",
            Route::Advent => "advent",
        }
    }

    /// Parse a route from its name
    pub fn from_name(name: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.name() == name)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a "speak verse" request currently is.
///
/// A reference is in the snapshot's `speaking` map from the moment the
/// request is accepted until playback finishes or the request fails; its
/// absence is the Idle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechPhase {
    Synthesizing,
    Decoding,
    Playing,
}

/// Commands sent by any frontend
#[derive(Debug)]
pub enum AppCommand {
    /// Switch the active view
    Navigate(Route),
    /// Load a chapter into the reader
    OpenChapter { book: String, chapter: u32 },
    /// Add or remove a bookmark for a verse
    ToggleBookmark { reference: String, text: String },
    /// Read a verse aloud; a no-op if the reference is already speaking
    Speak { reference: String, text: String },
    /// Cut current speech playback
    StopSpeaking,
    /// Set playback volume
    SetVolume(f32),
    /// Shut down the controller loop
    Shutdown,

    // Internal: worker thread results (not sent by frontends)
    InternalChapterLoaded {
        generation: u64,
        result: Result<Chapter, String>,
    },
    InternalSpeechSynthesized {
        reference: String,
        result: Result<Option<String>, String>,
    },
}

/// Snapshot of app state — shared between the controller and frontends
#[derive(Clone, Debug)]
pub struct AppSnapshot {
    pub route: Route,

    // Reader
    pub book: String,
    pub chapter: u32,
    pub chapter_data: Option<Chapter>,
    /// True while a chapter load is in flight
    pub is_loading: bool,

    /// Last error from providers or playback
    pub last_error: Option<String>,

    /// References currently being synthesized, decoded, or played
    pub speaking: HashMap<String, SpeechPhase>,

    pub bookmark_count: usize,
    pub volume: f32,
}

impl AppSnapshot {
    /// Whether a speak request for this reference is in flight
    pub fn is_speaking(&self, reference: &str) -> bool {
        self.speaking.contains_key(reference)
    }
}

impl Default for AppSnapshot {
    fn default() -> Self {
        Self {
            route: Route::Home,
            book: "John".to_string(),
            chapter: 3,
            chapter_data: None,
            is_loading: false,
            last_error: None,
            speaking: HashMap::new(),
            bookmark_count: 0,
            volume: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_route_is_home() {
        assert_eq!(Route::default(), Route::Home);
        assert_eq!(AppSnapshot::default().route, Route::Home);
    }

    #[test]
    fn route_names_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::from_name(route.name()), Some(route));
        }
    }

    #[test]
    fn unknown_route_name() {
        assert_eq!(Route::from_name("prayer-closet"), None);
    }

    #[test]
    fn route_display_matches_name() {
        assert_eq!(Route::Reader.to_string(), "reader");
        assert_eq!(Route::Advent.to_string(), "advent");
    }

    #[test]
    fn default_snapshot_opens_john_3() {
        let snapshot = AppSnapshot::default();
        assert_eq!(snapshot.book, "John");
        assert_eq!(snapshot.chapter, 3);
        assert!(snapshot.chapter_data.is_none());
        assert!(!snapshot.is_loading);
    }

    #[test]
    fn is_speaking_reflects_map() {
        let mut snapshot = AppSnapshot::default();
        assert!(!snapshot.is_speaking("John 3:16"));

        snapshot
            .speaking
            .insert("John 3:16".to_string(), SpeechPhase::Synthesizing);
        assert!(snapshot.is_speaking("John 3:16"));
        assert!(!snapshot.is_speaking("John 3:17"));
    }
}
