//! Scripture provider trait
//!
//! Defines the interface that scripture text sources must implement.

use crate::error::Result;

use super::types::Chapter;

/// A source of scripture text
///
/// Implementations fetch chapters and free-form passages from a specific
/// Bible text service.
pub trait ScriptureProvider: Send + Sync {
    /// Display name for the provider (e.g., "Bible API")
    fn name(&self) -> &'static str;

    /// Machine-readable identifier (e.g., "bible-api")
    fn id(&self) -> &'static str;

    /// Fetch a chapter by book name and chapter number.
    ///
    /// `translation` falls back to the provider default when `None`.
    fn chapter(&self, book: &str, chapter: u32, translation: Option<&str>) -> Result<Chapter>;

    /// Fetch a passage by free reference string (e.g. "John 3:16",
    /// "Psalm 23:1-6").
    fn passage(&self, reference: &str, translation: Option<&str>) -> Result<Chapter>;
}
