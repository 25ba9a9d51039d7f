//! bible-api.com scripture provider
//!
//! Implementation of `ScriptureProvider` for the public bible-api.com
//! service (<https://bible-api.com/>).

use crate::config::scripture::{BIBLE_API_DEFAULT_SERVER, DEFAULT_TRANSLATION};
use crate::error::Result;
use crate::network::HttpClient;

use super::traits::ScriptureProvider;
use super::types::{Chapter, Verse};

use serde::Deserialize;

/// The 66 canonical book names accepted by the reader and quiz
pub const BOOKS: [&str; 66] = [
    "Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy", "Joshua", "Judges", "Ruth",
    "1 Samuel", "2 Samuel", "1 Kings", "2 Kings", "1 Chronicles", "2 Chronicles", "Ezra",
    "Nehemiah", "Esther", "Job", "Psalms", "Proverbs", "Ecclesiastes", "Song of Solomon",
    "Isaiah", "Jeremiah", "Lamentations", "Ezekiel", "Daniel", "Hosea", "Joel", "Amos",
    "Obadiah", "Jonah", "Micah", "Nahum", "Habakkuk", "Zephaniah", "Haggai", "Zechariah",
    "Malachi", "Matthew", "Mark", "Luke", "John", "Acts", "Romans", "1 Corinthians",
    "2 Corinthians", "Galatians", "Ephesians", "Philippians", "Colossians", "1 Thessalonians",
    "2 Thessalonians", "1 Timothy", "2 Timothy", "Titus", "Philemon", "Hebrews", "James",
    "1 Peter", "2 Peter", "1 John", "2 John", "3 John", "Jude", "Revelation",
];

// =============================================================================
// Internal API response types (serde)
// =============================================================================

#[derive(Debug, Deserialize)]
struct BaVerse {
    #[serde(default)]
    chapter: u32,
    #[serde(default)]
    verse: u32,
    #[serde(default)]
    text: String,
    #[serde(default)]
    book_id: String,
    #[serde(default)]
    book_name: String,
}

#[derive(Debug, Deserialize)]
struct BaChapter {
    reference: String,
    #[serde(default)]
    verses: Vec<BaVerse>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    translation_id: String,
    #[serde(default)]
    translation_name: String,
}

// =============================================================================
// BaChapter -> Chapter conversion
// =============================================================================

impl From<BaVerse> for Verse {
    fn from(ba: BaVerse) -> Self {
        Verse {
            chapter: ba.chapter,
            verse: ba.verse,
            // The API keeps trailing newlines inside verse text
            text: ba.text.trim().to_string(),
            book_id: ba.book_id,
            book_name: ba.book_name,
        }
    }
}

impl From<BaChapter> for Chapter {
    fn from(ba: BaChapter) -> Self {
        Chapter {
            reference: ba.reference,
            verses: ba.verses.into_iter().map(Verse::from).collect(),
            text: ba.text,
            translation_id: ba.translation_id,
            translation_name: ba.translation_name,
        }
    }
}

// =============================================================================
// BibleApiProvider
// =============================================================================

/// bible-api.com provider
///
/// Fetches chapters and passages from the free [bible-api.com] service,
/// which serves public-domain translations keyed by plain reference strings.
///
/// [bible-api.com]: https://bible-api.com/
pub struct BibleApiProvider {
    client: HttpClient,
    base_url: String,
}

impl BibleApiProvider {
    /// Create a provider using the default server
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: BIBLE_API_DEFAULT_SERVER.to_string(),
        })
    }

    /// Create a provider with a custom base URL (for testing or mirrors)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: base_url.into(),
        })
    }

    /// Build a request URL for a reference string
    ///
    /// The service accepts spaces as '+', e.g. `/1+samuel+3?translation=kjv`.
    fn url(&self, reference: &str, translation: Option<&str>) -> String {
        format!(
            "{}/{}?translation={}",
            self.base_url,
            reference.trim().replace(' ', "+"),
            translation.unwrap_or(DEFAULT_TRANSLATION)
        )
    }

    fn fetch(&self, reference: &str, translation: Option<&str>) -> Result<Chapter> {
        let ba: BaChapter = self.client.get_json(&self.url(reference, translation))?;
        Ok(ba.into())
    }
}

impl ScriptureProvider for BibleApiProvider {
    fn name(&self) -> &'static str {
        "Bible API"
    }

    fn id(&self) -> &'static str {
        "bible-api"
    }

    fn chapter(&self, book: &str, chapter: u32, translation: Option<&str>) -> Result<Chapter> {
        self.fetch(&format!("{} {}", book, chapter), translation)
    }

    fn passage(&self, reference: &str, translation: Option<&str>) -> Result<Chapter> {
        self.fetch(reference, translation)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ba_chapter() -> BaChapter {
        BaChapter {
            reference: "John 3".to_string(),
            verses: vec![
                BaVerse {
                    chapter: 3,
                    verse: 16,
                    text: "For God so loved the world...\n".to_string(),
                    book_id: "JHN".to_string(),
                    book_name: "John".to_string(),
                },
                BaVerse {
                    chapter: 3,
                    verse: 17,
                    text: "For God sent not his Son...\n".to_string(),
                    book_id: "JHN".to_string(),
                    book_name: "John".to_string(),
                },
            ],
            text: "For God so loved the world...".to_string(),
            translation_id: "kjv".to_string(),
            translation_name: "King James Version".to_string(),
        }
    }

    // ---- BaChapter -> Chapter conversion ----

    #[test]
    fn test_conversion_basic() {
        let chapter: Chapter = sample_ba_chapter().into();
        assert_eq!(chapter.reference, "John 3");
        assert_eq!(chapter.verses.len(), 2);
        assert_eq!(chapter.translation_id, "kjv");
    }

    #[test]
    fn test_conversion_trims_verse_text() {
        let chapter: Chapter = sample_ba_chapter().into();
        assert_eq!(chapter.verses[0].text, "For God so loved the world...");
        assert!(!chapter.verses[0].text.ends_with('\n'));
    }

    #[test]
    fn test_conversion_preserves_verse_numbers() {
        let chapter: Chapter = sample_ba_chapter().into();
        assert_eq!(chapter.verses[0].verse, 16);
        assert_eq!(chapter.verses[1].verse, 17);
        assert_eq!(chapter.verses[0].chapter, 3);
    }

    #[test]
    fn test_conversion_empty_verses() {
        let mut ba = sample_ba_chapter();
        ba.verses = vec![];
        let chapter: Chapter = ba.into();
        assert!(chapter.verses.is_empty());
    }

    // ---- Deserialization ----

    #[test]
    fn test_deserialize_full_response() {
        let json = r#"{
            "reference": "John 3:16",
            "verses": [
                {"book_id": "JHN", "book_name": "John", "chapter": 3, "verse": 16,
                 "text": "For God so loved the world...\n"}
            ],
            "text": "For God so loved the world...\n",
            "translation_id": "kjv",
            "translation_name": "King James Version",
            "translation_note": "Public Domain"
        }"#;
        let ba: BaChapter = serde_json::from_str(json).unwrap();
        assert_eq!(ba.reference, "John 3:16");
        assert_eq!(ba.verses.len(), 1);

        let chapter: Chapter = ba.into();
        assert_eq!(chapter.verses[0].book_id, "JHN");
    }

    #[test]
    fn test_deserialize_minimal_response() {
        // Only the reference is required; everything else defaults
        let json = r#"{"reference": "Jude 1"}"#;
        let ba: BaChapter = serde_json::from_str(json).unwrap();
        assert_eq!(ba.reference, "Jude 1");
        assert!(ba.verses.is_empty());
        assert_eq!(ba.translation_id, "");
    }

    #[test]
    fn test_deserialize_missing_reference_fails() {
        let json = r#"{"verses": []}"#;
        let result: std::result::Result<BaChapter, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    // ---- URL building ----

    #[test]
    fn test_url_single_word_book() {
        let provider = BibleApiProvider::with_base_url("https://api.example.com").unwrap();
        assert_eq!(
            provider.url("John 3", None),
            "https://api.example.com/John+3?translation=kjv"
        );
    }

    #[test]
    fn test_url_numbered_book() {
        let provider = BibleApiProvider::with_base_url("https://api.example.com").unwrap();
        assert_eq!(
            provider.url("1 Samuel 3", Some("web")),
            "https://api.example.com/1+Samuel+3?translation=web"
        );
    }

    #[test]
    fn test_url_verse_reference() {
        let provider = BibleApiProvider::with_base_url("https://api.example.com").unwrap();
        assert_eq!(
            provider.url("John 3:16", None),
            "https://api.example.com/John+3:16?translation=kjv"
        );
    }

    #[test]
    fn test_url_trims_whitespace() {
        let provider = BibleApiProvider::with_base_url("https://api.example.com").unwrap();
        assert_eq!(
            provider.url("  John 3  ", None),
            "https://api.example.com/John+3?translation=kjv"
        );
    }

    // ---- Provider construction ----

    #[test]
    fn test_provider_creation() {
        assert!(BibleApiProvider::new().is_ok());
    }

    #[test]
    fn test_provider_identity() {
        let provider = BibleApiProvider::new().unwrap();
        assert_eq!(provider.id(), "bible-api");
        assert_eq!(provider.name(), "Bible API");
    }

    // ---- Book catalog ----

    #[test]
    fn test_books_catalog_is_canonical() {
        assert_eq!(BOOKS.len(), 66);
        assert_eq!(BOOKS[0], "Genesis");
        assert_eq!(BOOKS[38], "Malachi");
        assert_eq!(BOOKS[39], "Matthew");
        assert_eq!(BOOKS[65], "Revelation");
    }

    // ---- Integration tests (require network, marked #[ignore]) ----

    #[test]
    #[ignore]
    fn test_integration_chapter() {
        let provider = BibleApiProvider::new().unwrap();
        let chapter = provider.chapter("John", 3, None).unwrap();
        assert_eq!(chapter.reference, "John 3");
        assert!(!chapter.verses.is_empty());
    }

    #[test]
    #[ignore]
    fn test_integration_passage() {
        let provider = BibleApiProvider::new().unwrap();
        let passage = provider.passage("John 3:16", None).unwrap();
        assert_eq!(passage.verses.len(), 1);
    }

    #[test]
    #[ignore]
    fn test_integration_unknown_book_fails() {
        let provider = BibleApiProvider::new().unwrap();
        assert!(provider.chapter("NotABook", 1, None).is_err());
    }
}
