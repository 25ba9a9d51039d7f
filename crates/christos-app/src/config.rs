//! Configuration constants for Christos app services

/// Application metadata
pub mod app {
    /// Application name (used for config directory, etc.)
    pub const NAME: &str = "christos";
}

/// Scripture source configuration
pub mod scripture {
    /// Default bible-api.com server
    pub const BIBLE_API_DEFAULT_SERVER: &str = "https://bible-api.com";

    /// Default translation code
    pub const DEFAULT_TRANSLATION: &str = "kjv";
}

/// Generative service configuration
pub mod generative {
    /// Default Gemini API server
    pub const GEMINI_DEFAULT_SERVER: &str = "https://generativelanguage.googleapis.com";

    /// Model used for text and structured JSON generation
    pub const TEXT_MODEL: &str = "gemini-3-flash-preview";

    /// Model used for speech synthesis
    pub const SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";

    /// Prebuilt voice used for scripture reading
    pub const SPEECH_VOICE: &str = "Kore";

    /// Environment variable holding the API key
    pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

    /// Number of questions in a generated quiz
    pub const QUIZ_QUESTION_COUNT: usize = 5;

    /// Advent devotionals cover December 1–25
    pub const ADVENT_FIRST_DAY: u8 = 1;
    pub const ADVENT_LAST_DAY: u8 = 25;
}
