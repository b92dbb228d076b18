use chrono::{DateTime, Utc};
use prompt_flow::{FieldChecks, Validate, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_LANGUAGE: &str = "English";

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// The loaded paper. Never empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperText(Arc<str>);

impl PaperText {
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(Arc::from(text)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Serialize for PaperText {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[default]
    Simple,
    Detailed,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Complexity::Simple => write!(f, "simple"),
            Complexity::Detailed => write!(f, "detailed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeRequest {
    pub paper_text: String,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Validate for SummarizeRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        FieldChecks::new()
            .non_empty("paper_text", &self.paper_text)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeResult {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRequest {
    pub paper_text: String,
}

impl Validate for KeywordRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        FieldChecks::new()
            .non_empty("paper_text", &self.paper_text)
            .finish()
    }
}

/// Extracted keywords. An empty list means "no keywords found".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordResult {
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub paper_text: String,
    pub question: String,
    #[serde(default)]
    pub eli5: bool,
}

impl Validate for AnswerRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        FieldChecks::new()
            .non_empty("paper_text", &self.paper_text)
            .non_empty("question", &self.question)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(Sender::Ai, text)
    }

    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            text: text.into(),
            sent_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Default,
    Destructive,
}

/// Short transient notification produced by every user-facing operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    pub fn info(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            severity: Severity::Default,
        }
    }

    pub fn destructive(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            severity: Severity::Destructive,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.severity == Severity::Destructive
    }
}

// ---- HTTP payloads ----

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitPaperRequest {
    pub text: String,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default = "default_language")]
    pub language: String,
}

/// Query parameters for raw file uploads.
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryOptions {
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default = "default_language")]
    pub language: String,
    pub filename: Option<String>,
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub question: String,
    #[serde(default)]
    pub eli5: bool,
}
