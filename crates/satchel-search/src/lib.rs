//! Satchel Search — weighted substring scoring over existing captures.
//!
//! Pure and synchronous; no remote calls. Scores are integer weights
//! accumulated per capture, zero-score captures are dropped, and the
//! sort is stable so ties keep their most-recent-first order.

use satchel_core::Capture;

/// Weight per scoring rule. Whole-query matches outweigh word matches;
/// tag matches outweigh content matches.
const WHOLE_IN_SUMMARY: i64 = 10;
const WHOLE_IN_CONTENT: i64 = 5;
const WHOLE_IN_TAG: i64 = 8;
const WORD_IN_SUMMARY: i64 = 2;
const WORD_IN_CONTENT: i64 = 1;
const WORD_IN_TAG: i64 = 3;
const WHOLE_IN_ENTITY: i64 = 7;
const WHOLE_IN_STRUCTURED: i64 = 8;

/// Score a single capture against a lower-cased query and its words.
fn score(capture: &Capture, query: &str, words: &[&str]) -> i64 {
    let summary = capture.summary.to_lowercase();
    let content = capture.raw_content.to_lowercase();
    let mut total = 0;

    if summary.contains(query) {
        total += WHOLE_IN_SUMMARY;
    }
    if content.contains(query) {
        total += WHOLE_IN_CONTENT;
    }
    for tag in &capture.tags {
        if tag.to_lowercase().contains(query) {
            total += WHOLE_IN_TAG;
        }
    }

    for word in words {
        if summary.contains(word) {
            total += WORD_IN_SUMMARY;
        }
        if content.contains(word) {
            total += WORD_IN_CONTENT;
        }
        for tag in &capture.tags {
            if tag.to_lowercase().contains(word) {
                total += WORD_IN_TAG;
            }
        }
    }

    for entity in &capture.entities {
        if entity.value.to_lowercase().contains(query) {
            total += WHOLE_IN_ENTITY;
        }
    }

    if let Some(lead) = &capture.lead_data {
        if serialized_contains(lead, query) {
            total += WHOLE_IN_STRUCTURED;
        }
    }
    if let Some(show) = &capture.show_data {
        if serialized_contains(show, query) {
            total += WHOLE_IN_STRUCTURED;
        }
    }

    total
}

fn serialized_contains<T: serde::Serialize>(data: &T, query: &str) -> bool {
    serde_json::to_string(data)
        .map(|s| s.to_lowercase().contains(query))
        .unwrap_or(false)
}

/// Rank captures against a free-text query. Returns matching captures
/// ordered by descending score; the input is never mutated. An empty
/// query matches nothing.
pub fn search(captures: &[Capture], query: &str) -> Vec<Capture> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    let words: Vec<&str> = query.split_whitespace().filter(|w| w.len() > 2).collect();

    let mut scored: Vec<(i64, &Capture)> = captures
        .iter()
        .filter_map(|capture| {
            let s = score(capture, &query, &words);
            (s > 0).then_some((s, capture))
        })
        .collect();

    // Stable: ties keep the input's most-recent-first order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, c)| c.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel_core::{
        now, Capture, Classified, ContentType, Entity, EntityType, LeadData,
    };

    fn capture_with(summary: &str, content: &str, tags: &[&str]) -> Capture {
        Capture::from_classified(
            Capture::new_id(),
            content,
            ContentType::Text,
            Classified {
                summary: summary.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                ..Default::default()
            },
            now(),
            now(),
        )
    }

    #[test]
    fn test_ranking_weights_exact_scenario() {
        // First: summary substring only (+10, content "x" has no match).
        // Second: summary (+10) + tag (+8) = 18.
        let first = capture_with("call the vendor", "x", &[]);
        let second = capture_with("vendor payment due", "y", &["vendor"]);
        let captures = vec![first.clone(), second.clone()];

        let results = search(&captures, "vendor");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, second.id);
        assert_eq!(results[1].id, first.id);
    }

    #[test]
    fn test_zero_score_filtered() {
        let captures = vec![capture_with("about drums", "drum stuff", &[])];
        assert!(search(&captures, "quantum").is_empty());
    }

    #[test]
    fn test_entity_match_scores() {
        let mut capture = capture_with("a note", "b", &[]);
        capture.entities.push(Entity {
            entity_type: EntityType::Email,
            value: "sarah@marriott.com".into(),
            confidence: 1.0,
        });
        let results = search(&[capture], "marriott");
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_lead_data_match_scores() {
        let mut capture = capture_with("a note", "b", &[]);
        capture.lead_data = Some(LeadData {
            company: Some("Marriott Hotels".into()),
            ..Default::default()
        });
        let results = search(&[capture], "marriott");
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_deterministic() {
        let captures = vec![
            capture_with("vendor a", "x", &[]),
            capture_with("vendor b", "y", &[]),
            capture_with("vendor c", "z", &["vendor"]),
        ];
        let a = search(&captures, "vendor");
        let b = search(&captures, "vendor");
        let ids = |v: &[Capture]| v.iter().map(|c| c.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn test_tie_keeps_input_order() {
        let first = capture_with("vendor one", "x", &[]);
        let second = capture_with("vendor two", "y", &[]);
        let results = search(&[first.clone(), second.clone()], "vendor");
        assert_eq!(results[0].id, first.id);
        assert_eq!(results[1].id, second.id);
    }

    #[test]
    fn test_tag_monotonicity() {
        let plain = capture_with("about the gala", "gala details", &[]);
        let mut tagged = plain.clone();
        tagged.tags.push("gala".into());

        let query = "gala";
        let words: Vec<&str> = vec![query];
        let base = score(&plain, query, &words);
        let boosted = score(&tagged, query, &words);
        assert!(boosted > base);
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let captures = vec![capture_with("anything", "x", &[])];
        assert!(search(&captures, "").is_empty());
        assert!(search(&captures, "   ").is_empty());
    }

    #[test]
    fn test_short_words_ignored_for_word_pass() {
        // "to" is <= 2 chars; only whole-query matching applies.
        let capture = capture_with("to do list", "x", &[]);
        let results = search(&[capture], "to");
        // Whole query "to" still substring-matches the summary.
        assert_eq!(results.len(), 1);
    }
}
