//! Gemini generative provider
//!
//! Blocking client for the Gemini `generateContent` REST endpoint, covering
//! every generative task the app delegates: verse explanation, daily and
//! advent devotionals, quiz generation, counseling chat, and speech
//! synthesis. Structured responses are requested with an explicit JSON
//! schema and still parsed defensively on the way back in.

use crate::config::generative::{
    ADVENT_FIRST_DAY, ADVENT_LAST_DAY, GEMINI_DEFAULT_SERVER, QUIZ_QUESTION_COUNT, SPEECH_MODEL,
    SPEECH_VOICE, TEXT_MODEL,
};
use crate::error::{AppError, Result};
use crate::network::HttpClient;

use super::types::{ChatTurn, Devotional, QuizQuestion};

use serde::{Deserialize, Serialize};
use serde_json::json;

/// System persona for the counseling chat
const COUNSELOR_INSTRUCTION: &str = "You are a compassionate, wise, and knowledgeable Biblical \
    Counselor named Christos AI. Provide guidance based strictly on Biblical principles and the \
    teachings of Jesus Christ. Be empathetic, encouraging, and clear. Always quote relevant \
    verses to support your advice.";

// =============================================================================
// Wire types (serde)
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    data: String,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl Content {
    fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.into()),
                inline_data: None,
            }],
        }
    }

    fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: Some(text.into()),
                inline_data: None,
            }],
        }
    }
}

impl GenerateResponse {
    /// First text part of the first candidate
    fn text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|p| p.text)
    }

    /// First inline-data payload of the first candidate (speech audio)
    fn inline_data(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|p| p.inline_data.map(|d| d.data))
    }
}

// =============================================================================
// Response schemas
// =============================================================================

fn devotional_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "scripture": { "type": "STRING" },
            "reflection": { "type": "STRING" },
            "prayer": { "type": "STRING" },
            "application": { "type": "STRING" },
        },
        "required": ["title", "scripture", "reflection", "prayer", "application"],
    })
}

fn quiz_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "question": { "type": "STRING" },
                "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                "correctAnswer": { "type": "INTEGER" },
                "explanation": { "type": "STRING" },
            },
            "required": ["question", "options", "correctAnswer", "explanation"],
        },
    })
}

// =============================================================================
// GeminiClient
// =============================================================================

/// Gemini generateContent client
#[derive(Clone)]
pub struct GeminiClient {
    client: HttpClient,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a client against the default server
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: GEMINI_DEFAULT_SERVER.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Create a client with a custom base URL (for testing or proxies)
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    fn url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        )
    }

    fn generate(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse> {
        self.client.post_json(&self.url(model), request)
    }

    /// Run a text-model request and extract the response text
    fn generate_text(&self, request: &GenerateRequest) -> Result<String> {
        self.generate(TEXT_MODEL, request)?
            .text()
            .ok_or_else(|| AppError::Provider("Response contained no text".to_string()))
    }

    /// Explain a verse's historical context, theology, and application
    pub fn verse_explanation(&self, reference: &str, text: &str) -> Result<String> {
        let prompt = format!(
            "As a biblical scholar, explain the historical context, theological significance, \
             and modern application of this verse: \"{}: {}\". Use Markdown for formatting.",
            reference, text
        );
        self.generate_text(&GenerateRequest {
            contents: vec![Content::user_text(prompt)],
            system_instruction: None,
            generation_config: None,
        })
    }

    /// Generate a structured daily devotional, optionally themed
    pub fn daily_devotional(&self, theme: Option<&str>) -> Result<Devotional> {
        let prompt = match theme {
            Some(theme) => format!(
                "Create a structured daily devotional focused on the theme: {}. Include a \
                 title, a key scripture reference, a reflective passage, a short prayer, and a \
                 practical application step.",
                theme
            ),
            None => "Create a structured daily devotional for today. Include a title, a key \
                     scripture reference, a reflective passage, a short prayer, and a practical \
                     application step."
                .to_string(),
        };
        self.structured_devotional(prompt)
    }

    /// Generate the advent devotional for a December day (1–25)
    pub fn advent_reflection(&self, day: u8) -> Result<Devotional> {
        if !(ADVENT_FIRST_DAY..=ADVENT_LAST_DAY).contains(&day) {
            return Err(AppError::Config(format!(
                "Advent day must be {}-{}, got {}",
                ADVENT_FIRST_DAY, ADVENT_LAST_DAY, day
            )));
        }
        let prompt = format!(
            "Create a Christmas Advent Devotional for Day {} of December. Focus on the coming \
             of Jesus Christ, the prophecies leading to His birth, and the joy of Christmas. \
             Include a title, key scripture, reflection, prayer, and application.",
            day
        );
        self.structured_devotional(prompt)
    }

    fn structured_devotional(&self, prompt: String) -> Result<Devotional> {
        let text = self.generate_text(&GenerateRequest {
            contents: vec![Content::user_text(prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(devotional_schema()),
                ..Default::default()
            }),
        })?;
        let devotional = parse_devotional(&text)?;
        Ok(devotional)
    }

    /// Generate multiple-choice quiz questions for a Bible book
    pub fn quiz(&self, book: &str) -> Result<Vec<QuizQuestion>> {
        let prompt = format!(
            "Generate {} multiple-choice questions about the Bible book of {}. Provide the \
             question, 4 options, the index of the correct answer (0-3), and a brief \
             explanation of the answer.",
            QUIZ_QUESTION_COUNT, book
        );
        let text = self.generate_text(&GenerateRequest {
            contents: vec![Content::user_text(prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(quiz_schema()),
                ..Default::default()
            }),
        })?;
        parse_quiz(&text)
    }

    /// Get a counseling reply given the conversation so far
    pub fn counseling_reply(&self, message: &str, history: &[ChatTurn]) -> Result<String> {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content {
                role: Some(turn.role.as_str().to_string()),
                parts: vec![Part {
                    text: Some(turn.text.clone()),
                    inline_data: None,
                }],
            })
            .collect();
        contents.push(Content::user_text(message));

        self.generate_text(&GenerateRequest {
            contents,
            system_instruction: Some(Content::instruction(COUNSELOR_INSTRUCTION)),
            generation_config: None,
        })
    }

    /// Synthesize a verse reading; returns the base64 PCM payload.
    ///
    /// An answer without audio data is `Ok(None)`, which callers treat as a
    /// silent no-op rather than an error.
    pub fn synthesize(&self, text: &str) -> Result<Option<String>> {
        let prompt = format!("Read this scripture verse clearly and reverently: {}", text);
        let response = self.generate(
            SPEECH_MODEL,
            &GenerateRequest {
                contents: vec![Content::user_text(prompt)],
                system_instruction: None,
                generation_config: Some(GenerationConfig {
                    response_modalities: Some(vec!["AUDIO".to_string()]),
                    speech_config: Some(SpeechConfig {
                        voice_config: VoiceConfig {
                            prebuilt_voice_config: PrebuiltVoiceConfig {
                                voice_name: SPEECH_VOICE.to_string(),
                            },
                        },
                    }),
                    ..Default::default()
                }),
            },
        )?;
        Ok(response.inline_data())
    }
}

// =============================================================================
// Response parsing
// =============================================================================

fn parse_devotional(text: &str) -> Result<Devotional> {
    let devotional: Devotional = serde_json::from_str(text)
        .map_err(|e| AppError::Format(format!("Malformed devotional response: {}", e)))?;
    devotional.validate()?;
    Ok(devotional)
}

fn parse_quiz(text: &str) -> Result<Vec<QuizQuestion>> {
    let questions: Vec<QuizQuestion> = serde_json::from_str(text)
        .map_err(|e| AppError::Format(format!("Malformed quiz response: {}", e)))?;
    if questions.is_empty() {
        return Err(AppError::Format(
            "Quiz response contained no questions".to_string(),
        ));
    }
    for question in &questions {
        question.validate()?;
    }
    Ok(questions)
}

// =============================================================================
// Tests
// =============================================================================
