//! The remote classification adapter and its defaulting boundary.
//!
//! A payload that parses as JSON always yields a usable `Classified`,
//! even when fields are missing or mistyped. Only transport failures
//! and non-JSON responses surface as `ClassificationUnavailable`, and
//! the caller falls back to the rule classifier for those.

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use satchel_core::{
    summarize, CaptureContext, Category, Classified, Entity, EntityType, Error, LeadData, Result,
    ShowData, SimpleType, TaskData,
};

use crate::config::LLMConfig;
use crate::providers;
use crate::types::{ClassifyRequest, Purpose};

/// Bound on a single classification round-trip. A timeout is treated
/// exactly like a transport failure.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Object-safe seam for the classification backend, so the repository
/// can run against a mock in tests.
#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    async fn classify(&self, request: &ClassifyRequest) -> Result<Classified>;
}

/// Classifier backed by a hosted LLM provider.
pub struct RemoteClassifier {
    client: Client,
    config: LLMConfig,
}

impl RemoteClassifier {
    pub fn new(config: LLMConfig) -> Result<Self> {
        // The timeout is load-bearing: a hung provider call must fail
        // like a transport error, so a client without it is not an
        // acceptable substitute.
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::ClassificationUnavailable(format!("http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ClassifierBackend for RemoteClassifier {
    async fn classify(&self, request: &ClassifyRequest) -> Result<Classified> {
        let (provider, model, api_key) = self.config.resolve_provider().ok_or_else(|| {
            Error::ClassificationUnavailable("no LLM provider configured".into())
        })?;

        let prompt = build_prompt(request);
        let text = providers::complete(
            &self.client,
            provider,
            &prompt,
            &model,
            &api_key,
            Purpose::Classification.temperature(),
        )
        .await?;

        let value: Value = serde_json::from_str(text.trim()).map_err(|e| {
            Error::ClassificationUnavailable(format!("unparseable payload: {}", e))
        })?;

        Ok(classified_from_value(&value, &request.content))
    }
}

/// Build the classification prompt: today anchor, optional user rules
/// and memories, the input, and the output contract the remote service
/// is instructed to honor.
pub fn build_prompt(request: &ClassifyRequest) -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "You are the assistant behind a personal capture inbox. The user throws \
         free-form text at you — notes, ideas, leads, reminders — and you classify \
         it, summarize it, and extract structure for later recall."
    );
    let _ = writeln!(prompt, "\nTODAY: {}, {}", request.weekday(), request.today);

    if let Some(rules) = request.rules.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        let _ = writeln!(prompt, "\nUSER'S RULES:\n{}", rules);
    }
    if !request.memories.is_empty() {
        let _ = writeln!(prompt, "\nTHINGS TO REMEMBER:");
        for memory in &request.memories {
            let _ = writeln!(prompt, "• {}", memory);
        }
    }

    let _ = writeln!(prompt, "\nINPUT:\n\"\"\"\n{}\n\"\"\"", request.content);

    let _ = writeln!(
        prompt,
        r#"
YOUR JOB:
1. Acknowledge conversationally ("Got it, I'll remind you Tuesday", "Saved that idea"). Brief and natural, not formal.
2. Extract deadlines. Convert relative dates to actual ISO dates (YYYY-MM-DD) anchored on today. dueDate is the deadline, reminderDate is when to surface it. Null when there is no deadline.
3. Identify mentions: people, companies, projects, topics — for linking related items later.
4. Pick a type: task, reminder, idea, note, contact, show, lead, reference. Don't overthink it.
5. needsAction is true only when the user must DO something (call, email, follow up); then suggestedAction is a short imperative like "Call Sarah".

Return a single JSON object with exactly these fields:
{{
  "response": string,
  "summary": string,
  "type": "task"|"reminder"|"idea"|"note"|"contact"|"show"|"lead"|"reference",
  "context": "business"|"personal",
  "dueDate": "YYYY-MM-DD" or null,
  "reminderDate": "YYYY-MM-DD" or null,
  "timeContext": string or null,
  "mentions": string[],
  "tags": string[] (2-4 searchable tags),
  "needsAction": boolean,
  "suggestedAction": string or null,
  "leadData": object or null (only when type is lead: name, company, email, phone, website, eventDate, eventType, budget, notes),
  "showData": object or null (only when type is show: client, showType, date, venue, fee, status),
  "taskData": object or null (only when type is task or reminder: title, dueDate, priority, relatedTo)
}}"#
    );

    prompt
}

/// The defaulting boundary: coalesce every field of a remote payload
/// into a valid `Classified`. Nothing from the payload is trusted —
/// missing or mistyped fields become safe defaults, dates are kept only
/// when they parse as ISO, tags are lower-cased and capped at 5.
pub fn classified_from_value(value: &Value, content: &str) -> Classified {
    let string_field = |key: &str| -> Option<String> {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "null")
            .map(String::from)
    };
    let string_list = |key: &str| -> Vec<String> {
        value
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    };

    let required_keys = ["response", "summary", "type", "tags", "needsAction"];
    let defaulted = required_keys.iter().any(|k| value.get(*k).is_none());
    if defaulted {
        debug!("remote payload missing required fields, defaulting");
    }

    let simple_type = SimpleType::parse(
        value.get("type").and_then(Value::as_str).unwrap_or_default(),
    );
    let category = match value.get("category").and_then(Value::as_str) {
        Some(s) => Category::parse(s),
        None => simple_type.category(),
    };
    let context = match value.get("context").and_then(Value::as_str) {
        Some("business") => CaptureContext::Business,
        _ => CaptureContext::Personal,
    };

    let mut tags: Vec<String> = string_list("tags")
        .into_iter()
        .map(|t| t.to_lowercase())
        .collect();
    tags.truncate(5);

    let entities = value
        .get("entities")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let entity_type =
                        EntityType::parse(item.get("type")?.as_str()?)?;
                    let entity_value = item.get("value")?.as_str()?.trim();
                    if entity_value.is_empty() {
                        return None;
                    }
                    let confidence = item
                        .get("confidence")
                        .and_then(Value::as_f64)
                        .unwrap_or(0.5)
                        .clamp(0.0, 1.0);
                    Some(Entity {
                        entity_type,
                        value: entity_value.to_string(),
                        confidence,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let needs_action = value
        .get("needsAction")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Classified {
        response: Some(string_field("response").unwrap_or_else(|| "Got it".into())),
        summary: string_field("summary").unwrap_or_else(|| summarize(content)),
        simple_type: Some(simple_type),
        category,
        context,
        tags,
        entities,
        due_date: string_field("dueDate").filter(|s| is_iso_date(s)),
        reminder_date: string_field("reminderDate").filter(|s| is_iso_date(s)),
        time_context: string_field("timeContext"),
        mentions: string_list("mentions"),
        needs_action,
        suggested_action: if needs_action {
            string_field("suggestedAction")
        } else {
            None
        },
        lead_data: object_field::<LeadData>(value, "leadData"),
        show_data: object_field::<ShowData>(value, "showData"),
        task_data: object_field::<TaskData>(value, "taskData"),
    }
}

fn is_iso_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn object_field<T: serde::de::DeserializeOwned>(value: &Value, key: &str) -> Option<T> {
    let v = value.get(key)?;
    if !v.is_object() {
        return None;
    }
    serde_json::from_value(v.clone()).ok()
}
