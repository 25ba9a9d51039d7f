//! Application settings management
//!
//! User preferences, persisted through the storage layer.

use crate::config::generative::SPEECH_VOICE;
use crate::config::scripture::DEFAULT_TRANSLATION;
use crate::data::storage;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings data file name
const SETTINGS_FILE: &str = "settings.json";

/// Settings file format version for migrations
const SETTINGS_VERSION: u32 = 1;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// File format version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Preferred translation code (e.g. "kjv", "web")
    #[serde(default = "default_translation")]
    pub translation: String,

    /// Prebuilt voice used for verse reading
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Playback volume (0.0 - 2.0)
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_translation() -> String {
    DEFAULT_TRANSLATION.to_string()
}

fn default_voice() -> String {
    SPEECH_VOICE.to_string()
}

fn default_volume() -> f32 {
    1.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            translation: default_translation(),
            voice: default_voice(),
            volume: default_volume(),
        }
    }
}

impl Settings {
    /// Load settings from the default storage location
    pub fn load() -> Result<Self> {
        match storage::load::<Settings>(SETTINGS_FILE)? {
            Some(settings) => Ok(settings),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        match storage::load_from::<Settings>(path)? {
            Some(settings) => Ok(settings),
            None => Ok(Self::default()),
        }
    }

    /// Save settings to the default storage location
    pub fn save(&self) -> Result<()> {
        storage::save(SETTINGS_FILE, self)
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        storage::save_to(path, self)
    }
}
