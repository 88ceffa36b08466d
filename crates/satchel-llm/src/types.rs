//! Request types for remote classification.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use satchel_core::ContentType;

/// LLM provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    OpenAI,
    Anthropic,
    Groq,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Groq => write!(f, "groq"),
        }
    }
}

/// Call-site purpose. Callers pick a purpose, never a raw sampling
/// parameter; the temperature per purpose is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// Field extraction — want the most deterministic output.
    Extraction,
    /// Capture classification.
    Classification,
    /// Conversational acknowledgment text.
    Conversation,
}

impl Purpose {
    pub fn temperature(&self) -> f64 {
        match self {
            Purpose::Extraction => 0.2,
            Purpose::Classification => 0.4,
            Purpose::Conversation => 0.7,
        }
    }
}

/// A classification request: the raw content plus the context the
/// remote service needs (today's date for relative-date resolution,
/// optional user rules and remembered facts).
#[derive(Debug, Clone)]
pub struct ClassifyRequest {
    pub content: String,
    pub content_type: ContentType,
    /// Anchor date for resolving "by Tuesday" and friends.
    pub today: NaiveDate,
    /// Free-text user rules injected into the prompt.
    pub rules: Option<String>,
    /// Remembered facts injected into the prompt.
    pub memories: Vec<String>,
}

impl ClassifyRequest {
    pub fn new(content: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            content: content.into(),
            content_type,
            today: chrono::Utc::now().date_naive(),
            rules: None,
            memories: Vec::new(),
        }
    }

    /// Weekday name for the prompt's TODAY line.
    pub fn weekday(&self) -> &'static str {
        match self.today.weekday() {
            chrono::Weekday::Mon => "Monday",
            chrono::Weekday::Tue => "Tuesday",
            chrono::Weekday::Wed => "Wednesday",
            chrono::Weekday::Thu => "Thursday",
            chrono::Weekday::Fri => "Friday",
            chrono::Weekday::Sat => "Saturday",
            chrono::Weekday::Sun => "Sunday",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_temperatures_ordered() {
        assert!(Purpose::Extraction.temperature() < Purpose::Classification.temperature());
        assert!(Purpose::Classification.temperature() < Purpose::Conversation.temperature());
    }

    #[test]
    fn test_weekday_name() {
        let mut req = ClassifyRequest::new("x", ContentType::Text);
        req.today = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        assert_eq!(req.weekday(), "Monday");
    }
}
