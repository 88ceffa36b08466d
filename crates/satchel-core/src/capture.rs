//! The capture data model: a single unit of captured text plus the
//! structured metadata derived from it by classification.
//!
//! Enumerations here are closed sets. Anything read from an external
//! payload goes through the lenient `parse` constructors, which map
//! unknown values to the default rather than failing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed category set used for filtering and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Ideas,
    Tasks,
    Contacts,
    Leads,
    Shows,
    #[default]
    Notes,
    Reference,
    Quotes,
    Bookmarks,
    Meetings,
    Projects,
}

impl Category {
    /// Lenient parse — unknown strings become `Notes`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "ideas" => Category::Ideas,
            "tasks" => Category::Tasks,
            "contacts" => Category::Contacts,
            "leads" => Category::Leads,
            "shows" => Category::Shows,
            "reference" => Category::Reference,
            "quotes" => Category::Quotes,
            "bookmarks" => Category::Bookmarks,
            "meetings" => Category::Meetings,
            "projects" => Category::Projects,
            _ => Category::Notes,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ideas => "ideas",
            Category::Tasks => "tasks",
            Category::Contacts => "contacts",
            Category::Leads => "leads",
            Category::Shows => "shows",
            Category::Notes => "notes",
            Category::Reference => "reference",
            Category::Quotes => "quotes",
            Category::Bookmarks => "bookmarks",
            Category::Meetings => "meetings",
            Category::Projects => "projects",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the content was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    Url,
    Image,
    Voice,
}

impl ContentType {
    /// Capture-time heuristic: a URL-shaped input is a `Url` capture.
    pub fn detect(content: &str) -> Self {
        let trimmed = content.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            ContentType::Url
        } else {
            ContentType::Text
        }
    }
}

/// Coarse visibility and routing tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureContext {
    Business,
    #[default]
    Personal,
}

/// The remote classifier's simple type. Maps onto `Category` for
/// filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimpleType {
    Task,
    Reminder,
    Idea,
    #[default]
    Note,
    Contact,
    Show,
    Lead,
    Reference,
}

impl SimpleType {
    /// Lenient parse — unknown strings become `Note`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "task" => SimpleType::Task,
            "reminder" => SimpleType::Reminder,
            "idea" => SimpleType::Idea,
            "contact" => SimpleType::Contact,
            "show" => SimpleType::Show,
            "lead" => SimpleType::Lead,
            "reference" => SimpleType::Reference,
            _ => SimpleType::Note,
        }
    }

    /// Category bucket for this type.
    pub fn category(&self) -> Category {
        match self {
            SimpleType::Task | SimpleType::Reminder => Category::Tasks,
            SimpleType::Idea => Category::Ideas,
            SimpleType::Note => Category::Notes,
            SimpleType::Contact => Category::Contacts,
            SimpleType::Show => Category::Shows,
            SimpleType::Lead => Category::Leads,
            SimpleType::Reference => Category::Reference,
        }
    }
}

/// Entity kinds the pipeline extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Person,
    Company,
    Date,
    Location,
    Project,
    Email,
    Phone,
    Money,
}

impl EntityType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "person" => Some(EntityType::Person),
            "company" => Some(EntityType::Company),
            "date" => Some(EntityType::Date),
            "location" => Some(EntityType::Location),
            "project" => Some(EntityType::Project),
            "email" => Some(EntityType::Email),
            "phone" => Some(EntityType::Phone),
            "money" => Some(EntityType::Money),
            _ => None,
        }
    }
}

/// A single extracted entity with a confidence in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub value: String,
    pub confidence: f64,
}

/// Lifecycle status of a show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowStatus {
    #[default]
    Inquiry,
    Quoted,
    Confirmed,
    Completed,
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Best-effort structured data for lead captures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Best-effort structured data for show captures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ShowStatus>,
}

/// Best-effort structured data for task captures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_to: Option<String>,
}

/// Downstream action recorded against a capture. The only mutable
/// post-creation state besides content edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionTaken {
    AddedToLeadtrack,
    AddedToShowsync,
    AddedToTasks,
}

/// Classification output, before identity and timestamps are attached.
/// Produced by the remote adapter (after the defaulting boundary) or by
/// the deterministic fallback classifier.
#[derive(Debug, Clone, Default)]
pub struct Classified {
    pub response: Option<String>,
    pub summary: String,
    pub simple_type: Option<SimpleType>,
    pub category: Category,
    pub context: CaptureContext,
    pub tags: Vec<String>,
    pub entities: Vec<Entity>,
    pub due_date: Option<String>,
    pub reminder_date: Option<String>,
    pub time_context: Option<String>,
    pub mentions: Vec<String>,
    pub needs_action: bool,
    pub suggested_action: Option<String>,
    pub lead_data: Option<LeadData>,
    pub show_data: Option<ShowData>,
    pub task_data: Option<TaskData>,
}

/// A persisted capture: raw content plus derived metadata.
///
/// `id` and `created_at` are immutable; reprocessing replaces the
/// derived fields and bumps `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capture {
    pub id: String,
    pub raw_content: String,
    pub content_type: ContentType,
    pub summary: String,
    pub category: Category,
    pub context: CaptureContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple_type: Option<SimpleType>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_context: Option<String>,
    #[serde(default)]
    pub mentions: Vec<String>,
    #[serde(default)]
    pub needs_action: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_data: Option<LeadData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_data: Option<ShowData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_data: Option<TaskData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_taken: Option<ActionTaken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Capture {
    /// Generate a fresh capture id.
    pub fn new_id() -> String {
        format!("cap_{}", Uuid::new_v4().simple())
    }

    /// Build a capture from classification output, assigning identity
    /// and timestamps.
    pub fn from_classified(
        id: String,
        raw_content: &str,
        content_type: ContentType,
        classified: Classified,
        created_at: String,
        updated_at: String,
    ) -> Self {
        let summary = if classified.summary.trim().is_empty() {
            summarize(raw_content)
        } else {
            classified.summary
        };
        let source = if content_type == ContentType::Url {
            Some(raw_content.trim().to_string())
        } else {
            None
        };
        Capture {
            id,
            raw_content: raw_content.to_string(),
            content_type,
            summary,
            category: classified.category,
            context: classified.context,
            response: classified.response,
            simple_type: classified.simple_type,
            tags: classified.tags,
            entities: classified.entities,
            due_date: classified.due_date,
            reminder_date: classified.reminder_date,
            time_context: classified.time_context,
            mentions: classified.mentions,
            needs_action: classified.needs_action,
            suggested_action: classified.suggested_action,
            lead_data: classified.lead_data,
            show_data: classified.show_data,
            task_data: classified.task_data,
            action_taken: None,
            source,
            created_at,
            updated_at,
        }
    }

    /// Replace the derived fields after a reprocessing pass, preserving
    /// `id`, `created_at`, and `action_taken`.
    pub fn apply_classified(
        &mut self,
        raw_content: &str,
        content_type: ContentType,
        classified: Classified,
        updated_at: String,
    ) {
        let action_taken = self.action_taken;
        let id = std::mem::take(&mut self.id);
        let created_at = std::mem::take(&mut self.created_at);
        *self = Capture::from_classified(
            id,
            raw_content,
            content_type,
            classified,
            created_at,
            updated_at,
        );
        self.action_taken = action_taken;
    }
}

/// Summary fallback: the content itself, or a 197-character prefix plus
/// an ellipsis when it exceeds 200 characters. Char-indexed, so
/// multi-byte input never splits a codepoint.
pub fn summarize(content: &str) -> String {
    if content.chars().count() > 200 {
        let prefix: String = content.chars().take(197).collect();
        format!("{}...", prefix)
    } else {
        content.to_string()
    }
}

/// Current timestamp in RFC 3339.
pub fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_lenient() {
        assert_eq!(Category::parse("leads"), Category::Leads);
        assert_eq!(Category::parse("LEADS"), Category::Leads);
        assert_eq!(Category::parse("nonsense"), Category::Notes);
        assert_eq!(Category::parse(""), Category::Notes);
    }

    #[test]
    fn test_simple_type_maps_to_category() {
        assert_eq!(SimpleType::parse("reminder").category(), Category::Tasks);
        assert_eq!(SimpleType::parse("lead").category(), Category::Leads);
        assert_eq!(SimpleType::parse("unknown").category(), Category::Notes);
    }

    #[test]
    fn test_content_type_detect() {
        assert_eq!(ContentType::detect("https://example.com/a"), ContentType::Url);
        assert_eq!(ContentType::detect("  http://x.y "), ContentType::Url);
        assert_eq!(ContentType::detect("call Sarah"), ContentType::Text);
    }

    #[test]
    fn test_summarize_short_is_verbatim() {
        assert_eq!(summarize("a short note"), "a short note");
    }

    #[test]
    fn test_summarize_long_truncates_at_197() {
        let long = "x".repeat(300);
        let s = summarize(&long);
        assert_eq!(s.chars().count(), 200);
        assert!(s.ends_with("..."));
    }

    #[test]
    fn test_summarize_non_ascii_safe() {
        let long = "日本語のテキスト。".repeat(40);
        let s = summarize(&long);
        assert!(s.ends_with("..."));
        assert_eq!(s.chars().count(), 200);
    }

    #[test]
    fn test_capture_json_shape() {
        let capture = Capture::from_classified(
            Capture::new_id(),
            "https://example.com/article",
            ContentType::Url,
            Classified::default(),
            now(),
            now(),
        );
        let json = serde_json::to_value(&capture).unwrap();
        assert_eq!(json["contentType"], "url");
        assert_eq!(json["category"], "notes");
        assert_eq!(json["rawContent"], "https://example.com/article");
        assert_eq!(json["source"], "https://example.com/article");
        // Unset optionals stay off the wire
        assert!(json.get("leadData").is_none());
    }

    #[test]
    fn test_apply_classified_preserves_identity() {
        let mut capture = Capture::from_classified(
            "cap_fixed".into(),
            "original",
            ContentType::Text,
            Classified::default(),
            "2026-01-01T00:00:00Z".into(),
            "2026-01-01T00:00:00Z".into(),
        );
        capture.action_taken = Some(ActionTaken::AddedToTasks);

        let reclassified = Classified {
            category: Category::Tasks,
            ..Default::default()
        };
        capture.apply_classified("edited", ContentType::Text, reclassified, now());

        assert_eq!(capture.id, "cap_fixed");
        assert_eq!(capture.created_at, "2026-01-01T00:00:00Z");
        assert_eq!(capture.raw_content, "edited");
        assert_eq!(capture.category, Category::Tasks);
        assert_eq!(capture.action_taken, Some(ActionTaken::AddedToTasks));
        assert_ne!(capture.updated_at, "2026-01-01T00:00:00Z");
    }
}
