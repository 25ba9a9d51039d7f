//! Provider domain types
//!
//! Typed records for scripture chapters and generative responses. Generative
//! payloads are validated here so a schema drift in the remote service
//! surfaces as a `Format` error instead of propagating bad data.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// A single verse within a chapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Verse {
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    pub book_id: String,
    pub book_name: String,
}

/// A fetched scripture chapter (or passage)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    /// Human-readable reference, e.g. "John 3"
    pub reference: String,
    pub verses: Vec<Verse>,
    /// Full chapter text as one string
    pub text: String,
    pub translation_id: String,
    pub translation_name: String,
}

impl Chapter {
    /// Build the per-verse reference used for bookmarks and speech,
    /// e.g. "John 3" + 16 -> "John 3:16"
    pub fn verse_reference(&self, verse: u32) -> String {
        format!("{}:{}", self.reference, verse)
    }
}

/// A structured devotional (daily or advent)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Devotional {
    pub title: String,
    pub scripture: String,
    pub reflection: String,
    pub prayer: String,
    pub application: String,
}

impl Devotional {
    /// Reject responses that omit required fields.
    ///
    /// The response schema marks every field required, but the service is
    /// not trusted to honor it.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("title", &self.title),
            ("scripture", &self.scripture),
            ("reflection", &self.reflection),
            ("prayer", &self.prayer),
            ("application", &self.application),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(AppError::Format(format!(
                    "Devotional response is missing the '{}' field",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// A multiple-choice quiz question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: usize,
    pub explanation: String,
}

impl QuizQuestion {
    /// Exactly four options, answer index 0–3.
    pub fn validate(&self) -> Result<()> {
        if self.options.len() != 4 {
            return Err(AppError::Format(format!(
                "Quiz question has {} options, expected 4",
                self.options.len()
            )));
        }
        if self.correct_answer > 3 {
            return Err(AppError::Format(format!(
                "Quiz answer index {} is out of range 0-3",
                self.correct_answer
            )));
        }
        Ok(())
    }
}

/// Who produced a chat turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    /// Wire name expected by the generative API
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// One turn of a counseling conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}
