//! Satchel LLM — remote classification via external providers
//! (OpenAI/Anthropic/Groq).
//!
//! The adapter turns raw capture text into a structured classification
//! by prompting a hosted model for JSON, then pushing the payload
//! through a defaulting boundary so a partial or sloppy response still
//! yields a complete capture. Transport failures surface as
//! `ClassificationUnavailable`; callers fall back to the deterministic
//! classifier instead of erroring out.

pub mod adapter;
pub mod config;
pub mod providers;
pub mod types;

pub use adapter::{classified_from_value, ClassifierBackend, RemoteClassifier};
pub use config::LLMConfig;
pub use types::{ClassifyRequest, LLMProvider, Purpose};
