//! Deterministic fallback classification — an ordered rule cascade.
//!
//! Used when the remote classifier is unavailable. Each rule is a
//! `(predicate, builder)` pair; rules are evaluated top-to-bottom and
//! the first match wins. Total and deterministic: every input string
//! produces a valid capture shape.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use satchel_core::{
    summarize, CaptureContext, Category, Classified, ContentType, Entity, EntityType, LeadData,
    Priority, ShowData, ShowStatus, TaskData,
};

use crate::extract::{extract, hashtags, mentions, ExtractedFields};

const LEAD_WORDS: &[&str] = &[
    "inquiry", "inquiries", "booking", "book us", "interested in", "quote request", "lead",
    "referral", "event planner", "agency", "client",
];

const COMPANY_WORDS: &[&str] = &[
    "hotel", "hotels", "inc", "llc", "corp", "company", "corporate", "group", "agency", "venue",
    "resort", "casino",
];

const SHOW_WORDS: &[&str] = &[
    "show", "gig", "performance", "perform", "set time", "stage", "concert", "festival",
];

const SHOW_CONFIRMED_WORDS: &[&str] = &["confirmed", "booked", "signed"];
const SHOW_QUOTED_WORDS: &[&str] = &["quoted", "quote"];
const SHOW_COMPLETED_WORDS: &[&str] = &["completed", "played", "wrapped"];

const TASK_WORDS: &[&str] = &[
    "todo", "task", "need to", "must", "should", "remind", "reminder", "don't forget",
    "follow up", "asap", "call",
];

const URGENT_WORDS: &[&str] = &["urgent", "asap", "immediately", "right away", "today", "now"];
const DEFER_WORDS: &[&str] = &["eventually", "someday", "no rush", "whenever", "later"];

const MEETING_WORDS: &[&str] = &["meeting", "schedule", "agenda", "zoom", "sync up"];

const IDEA_WORDS: &[&str] = &["idea", "thought", "what if", "maybe", "could", "concept", "brainstorm"];

const QUOTE_WORDS: &[&str] = &["said", "quote"];

static QUOTED_TEXT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["“][^"”]+["”]"#).unwrap());

// `from Sarah` / `with Sarah Johnson` — best-effort contact name.
static LEAD_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:from|with)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)").unwrap());

// `at Marriott Hotels` — best-effort company name.
static LEAD_COMPANY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bat\s+([A-Z][A-Za-z]+(?:\s+[A-Z][A-Za-z]+)*)").unwrap());

// `call John`, `email Sarah` — short imperative for the suggested action.
static ACTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(call|email|text|send)\s+([A-Z][a-z]+)").unwrap());

/// Inputs shared by every rule predicate and builder.
pub struct RuleInput<'a> {
    pub text: &'a str,
    pub lower: String,
    pub content_type: ContentType,
    pub fields: ExtractedFields,
}

struct Rule {
    name: &'static str,
    applies: fn(&RuleInput) -> bool,
    build: fn(&RuleInput) -> Classified,
}

fn any_word(lower: &str, words: &[&str]) -> bool {
    words.iter().any(|w| lower.contains(w))
}

static RULES: &[Rule] = &[
    Rule {
        name: "leads",
        applies: |input| {
            any_word(&input.lower, LEAD_WORDS)
                && (input.fields.email.is_some() || input.fields.website.is_some())
                && any_word(&input.lower, COMPANY_WORDS)
        },
        build: build_lead,
    },
    Rule {
        name: "shows",
        applies: |input| {
            any_word(&input.lower, SHOW_WORDS)
                && (input.fields.date.is_some() || input.fields.money.is_some())
        },
        build: build_show,
    },
    Rule {
        name: "tasks",
        applies: |input| any_word(&input.lower, TASK_WORDS),
        build: build_task,
    },
    Rule {
        name: "bookmarks",
        applies: |input| input.content_type == ContentType::Url,
        build: |input| Classified {
            category: Category::Bookmarks,
            ..base(input)
        },
    },
    Rule {
        name: "meetings",
        applies: |input| any_word(&input.lower, MEETING_WORDS),
        build: |input| Classified {
            category: Category::Meetings,
            ..base(input)
        },
    },
    Rule {
        name: "ideas",
        applies: |input| any_word(&input.lower, IDEA_WORDS),
        build: |input| Classified {
            category: Category::Ideas,
            ..base(input)
        },
    },
    Rule {
        name: "contacts",
        applies: |input| input.fields.email.is_some() || input.fields.phone.is_some(),
        build: |input| Classified {
            category: Category::Contacts,
            ..base(input)
        },
    },
    Rule {
        name: "quotes",
        applies: |input| {
            QUOTED_TEXT_RE.is_match(input.text) || any_word(&input.lower, QUOTE_WORDS)
        },
        build: |input| Classified {
            category: Category::Quotes,
            ..base(input)
        },
    },
    Rule {
        name: "notes",
        applies: |_| true,
        build: base,
    },
];

/// Classify raw text without any remote call. First matching rule wins;
/// the trailing `notes` rule always matches.
///
/// The summary is the (truncated) input itself, so it is non-empty for
/// every non-empty input. An empty input yields an empty summary; the
/// repository rejects empty content before classification, so no empty
/// summary ever reaches a stored capture.
pub fn classify_fallback(text: &str, content_type: ContentType) -> Classified {
    let input = RuleInput {
        text,
        lower: text.to_lowercase(),
        content_type,
        fields: extract(text),
    };

    let rule = RULES
        .iter()
        .find(|r| (r.applies)(&input))
        .unwrap_or(&RULES[RULES.len() - 1]);
    debug!(rule = rule.name, "fallback classification");

    let mut classified = (rule.build)(&input);
    finish(&mut classified, &input);
    classified
}

/// Baseline classification shared by the simple rules.
fn base(input: &RuleInput) -> Classified {
    Classified {
        summary: summarize(input.text),
        ..Default::default()
    }
}

fn build_lead(input: &RuleInput) -> Classified {
    let name = LEAD_NAME_RE
        .captures(input.text)
        .and_then(|cap| cap.get(1).map(|m| m.as_str().to_string()));
    let company = LEAD_COMPANY_RE
        .captures(input.text)
        .and_then(|cap| cap.get(1).map(|m| m.as_str().to_string()));

    let lead_data = LeadData {
        name: name.clone(),
        company,
        email: input.fields.email.clone(),
        phone: input.fields.phone.clone(),
        website: input.fields.website.clone(),
        event_date: input.fields.date.clone(),
        budget: input.fields.money.clone(),
        ..Default::default()
    };

    Classified {
        category: Category::Leads,
        context: CaptureContext::Business,
        needs_action: true,
        suggested_action: name.map(|n| format!("Follow up with {}", n)),
        lead_data: Some(lead_data),
        ..base(input)
    }
}

fn build_show(input: &RuleInput) -> Classified {
    let status = if any_word(&input.lower, SHOW_CONFIRMED_WORDS) {
        ShowStatus::Confirmed
    } else if any_word(&input.lower, SHOW_COMPLETED_WORDS) {
        ShowStatus::Completed
    } else if any_word(&input.lower, SHOW_QUOTED_WORDS) {
        ShowStatus::Quoted
    } else {
        ShowStatus::Inquiry
    };

    let show_data = ShowData {
        client: LEAD_COMPANY_RE
            .captures(input.text)
            .and_then(|cap| cap.get(1).map(|m| m.as_str().to_string())),
        date: input.fields.date.clone(),
        fee: input.fields.money.clone(),
        status: Some(status),
        ..Default::default()
    };

    Classified {
        category: Category::Shows,
        context: CaptureContext::Business,
        needs_action: matches!(status, ShowStatus::Inquiry | ShowStatus::Quoted),
        show_data: Some(show_data),
        ..base(input)
    }
}

fn build_task(input: &RuleInput) -> Classified {
    let priority = if any_word(&input.lower, URGENT_WORDS) {
        Priority::High
    } else if any_word(&input.lower, DEFER_WORDS) {
        Priority::Low
    } else {
        Priority::Medium
    };

    let context = if any_word(&input.lower, COMPANY_WORDS) {
        CaptureContext::Business
    } else {
        CaptureContext::Personal
    };

    let title: String = {
        let first_line = input.text.lines().next().unwrap_or("").trim();
        first_line.chars().take(80).collect()
    };

    let suggested_action = ACTION_RE.captures(input.text).map(|cap| {
        let verb = cap.get(1).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
        let target = cap.get(2).map(|m| m.as_str()).unwrap_or_default();
        let mut verb_chars = verb.chars();
        let capitalized = match verb_chars.next() {
            Some(c) => c.to_uppercase().collect::<String>() + verb_chars.as_str(),
            None => verb,
        };
        format!("{} {}", capitalized, target)
    });

    Classified {
        category: Category::Tasks,
        context,
        needs_action: true,
        suggested_action,
        task_data: Some(TaskData {
            title: if title.is_empty() { None } else { Some(title) },
            priority: Some(priority),
            ..Default::default()
        }),
        ..base(input)
    }
}

/// Common post-pass: tags, entities, mentions, time context.
fn finish(classified: &mut Classified, input: &RuleInput) {
    let mut tags = hashtags(input.text);

    // Category tag for business captures, if there is room.
    if classified.context == CaptureContext::Business && tags.len() < 5 {
        let tag = match classified.category {
            Category::Leads => Some("lead"),
            Category::Shows => Some("show"),
            _ => None,
        };
        if let Some(tag) = tag {
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
    }
    classified.tags = tags;

    let mut entities = Vec::new();
    if let Some(email) = &input.fields.email {
        entities.push(Entity {
            entity_type: EntityType::Email,
            value: email.clone(),
            confidence: 1.0,
        });
    }
    if let Some(phone) = &input.fields.phone {
        entities.push(Entity {
            entity_type: EntityType::Phone,
            value: phone.clone(),
            confidence: 1.0,
        });
    }
    if let Some(money) = &input.fields.money {
        entities.push(Entity {
            entity_type: EntityType::Money,
            value: money.clone(),
            confidence: 0.8,
        });
    }
    if let Some(date) = &input.fields.date {
        entities.push(Entity {
            entity_type: EntityType::Date,
            value: date.clone(),
            confidence: 0.8,
        });
    }
    classified.entities = entities;

    classified.mentions = mentions(input.text);

    if classified.time_context.is_none() {
        classified.time_context = input.fields.date.clone();
    }
}
