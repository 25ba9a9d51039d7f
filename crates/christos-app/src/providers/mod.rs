//! Content providers
//!
//! Scripture text sources and the generative service client.

pub mod bible_api;
pub mod gemini;
pub mod traits;
pub mod types;

// Re-exports
pub use bible_api::{BibleApiProvider, BOOKS};
pub use gemini::GeminiClient;
pub use traits::ScriptureProvider;
pub use types::{Chapter, ChatRole, ChatTurn, Devotional, QuizQuestion, Verse};
