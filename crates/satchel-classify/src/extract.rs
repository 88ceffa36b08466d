//! Pattern-based field extraction from raw capture text.
//!
//! Fixed regex rules, English month names only, first match wins per
//! field. A second date or money amount in the same text is dropped —
//! a documented limitation carried over from the capture contract, not
//! an oversight to fix here.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

// North-American 10-digit shape with optional separators. The area
// code may be parenthesized; the alternation keeps the open paren in
// the match (a `\b` before `(` never matches).
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\(\d{3}\)|\b\d{3})[\s.-]?\d{3}[\s.-]?\d{4}\b").unwrap()
});

// `$`-prefixed amount with optional `k` suffix, or a bare 4+-digit number.
static MONEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\d[\d,]*(?:\.\d+)?[kK]?|\b\d{4,}\b").unwrap());

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept?|oct|nov|dec)\.?\s+\d{1,2}(?:st|nd|rd|th)?(?:,?\s*\d{4})?\b|\b\d{1,2}/\d{1,2}(?:/\d{2,4})?\b",
    )
    .unwrap()
});

static WEBSITE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bhttps?://\S+|\b(?:www\.)?[a-z0-9][a-z0-9-]*\.(?:com|net|org|io|co|biz|info)\b")
        .unwrap()
});

static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#([A-Za-z0-9_]+)").unwrap());

// Two consecutive capitalized words, likely a person name.
static NAME_PAIR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b").unwrap());

// Single capitalized word right after a relational preposition.
static RELATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:from|at|with)\s+([A-Z][A-Za-z]+)").unwrap());

/// Candidate structured fields found in raw text. First match only,
/// per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub money: Option<String>,
    pub date: Option<String>,
    pub website: Option<String>,
}

/// Extract candidate fields. Pure, deterministic, never fails.
pub fn extract(text: &str) -> ExtractedFields {
    let first = |re: &Regex| re.find(text).map(|m| m.as_str().to_string());
    ExtractedFields {
        email: first(&EMAIL_RE),
        phone: first(&PHONE_RE),
        money: first(&MONEY_RE),
        date: first(&DATE_RE),
        website: first(&WEBSITE_RE),
    }
}

/// Lexically extracted names and topics for cross-linking. No identity
/// resolution — just capitalized-word heuristics.
pub fn mentions(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    for m in NAME_PAIR_RE.find_iter(text) {
        // Skip a pair at the very start of the text — likely a sentence
        // opener, not a name.
        if m.start() > 2 {
            let name = m.as_str().to_string();
            if !found.contains(&name) {
                found.push(name);
            }
        }
    }

    for cap in RELATION_RE.captures_iter(text) {
        if let Some(m) = cap.get(1) {
            let name = m.as_str().to_string();
            if !found.iter().any(|f| f == &name || f.contains(&name)) {
                found.push(name);
            }
        }
    }

    found.truncate(10);
    found
}

/// Hashtag tokens, lower-cased, capped at 5.
pub fn hashtags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = HASHTAG_RE
        .captures_iter(text)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_lowercase()))
        .collect();
    tags.truncate(5);
    tags
}
