//! Intent routing for the chat surface.
//!
//! One text box, two behaviors: messages that open with an
//! interrogative word search the existing captures, everything else
//! becomes a new capture. The prefix heuristic is deliberately coarse
//! and misroutes phrasings like "Remind me what the budget was"; those
//! land in capture mode.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use satchel_core::{Capture, ContentType, Error, Result};
use satchel_runtime::CaptureRepository;

static QUESTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(what|how|when|where|why|who|find|search|show|list|get|tell)\b")
        .expect("question regex")
});

/// Search replies carry at most this many captures.
const MAX_SEARCH_RESULTS: usize = 5;

/// Outcome of routing one chat message.
#[derive(Debug)]
pub enum Routed {
    Search {
        reply: String,
        results: Vec<Capture>,
    },
    Capture {
        reply: String,
        capture: Box<Capture>,
    },
}

pub struct IntentRouter {
    repository: Arc<CaptureRepository>,
}

impl IntentRouter {
    pub fn new(repository: Arc<CaptureRepository>) -> Self {
        Self { repository }
    }

    /// Route one message: search for questions, capture for the rest.
    /// An empty message is `InvalidInput`.
    pub async fn route(&self, message: &str) -> Result<Routed> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::InvalidInput("chat message is empty".into()));
        }

        if QUESTION_RE.is_match(message) {
            debug!("Routing as search: {:?}", message);
            let mut results = satchel_search::search(&self.repository.list(), message);
            results.truncate(MAX_SEARCH_RESULTS);
            let reply = search_reply(&results);
            return Ok(Routed::Search { reply, results });
        }

        debug!("Routing as capture");
        let capture = self
            .repository
            .create(message, ContentType::detect(message))
            .await?;
        let reply = capture_reply(&capture);
        Ok(Routed::Capture {
            reply,
            capture: Box::new(capture),
        })
    }
}

fn search_reply(results: &[Capture]) -> String {
    match results.len() {
        0 => "I couldn't find anything matching that. Try different keywords or capture something new!".to_string(),
        1 => "Found 1 related capture:".to_string(),
        n => format!("Found {} related captures:", n),
    }
}

fn capture_reply(capture: &Capture) -> String {
    match &capture.response {
        Some(response) if !response.trim().is_empty() => response.clone(),
        _ => format!("Got it! I've saved this as a **{}** capture.", capture.category),
    }
}
