//! Satchel Classify — pattern-based field extraction and the
//! deterministic fallback classifier.
//!
//! Everything here is synchronous and total: when the remote classifier
//! is unreachable, this crate still produces a complete capture.

pub mod extract;
pub mod rules;

pub use extract::{extract, hashtags, mentions, ExtractedFields};
pub use rules::classify_fallback;
