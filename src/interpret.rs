//! Reply interpretation
//!
//! Extracts a JSON object out of a free-form analyst reply. Models often wrap
//! JSON in markdown fences or prose and leave trailing commas; both defects
//! are tolerated here. Interpretation failure is a normal outcome returned as
//! `None`, never an error: the controller decides what happens next.

use crate::types::{AnalysisResult, InsightDraft, ScoreDraft};
use regex::Regex;
use std::sync::OnceLock;

fn trailing_comma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*([}\]])").expect("trailing comma pattern"))
}

/// Interpret a raw analyst reply into a validated analysis result.
///
/// Returns `None` when no JSON object can be extracted, when the JSON does
/// not parse, when any score/insight entry fails validation against the
/// closed enums, or when the reply carries zero score entries.
pub fn interpret_reply(raw: &str) -> Option<AnalysisResult> {
    let sliced = slice_json_object(raw);
    let cleaned = trailing_comma_re().replace_all(sliced, "$1");

    let value: serde_json::Value = serde_json::from_str(&cleaned).ok()?;

    // Absent or non-list fields read as empty lists
    let scores = collect_entries::<ScoreDraft>(value.get("scores"))?;
    let insights = collect_entries::<InsightDraft>(value.get("insights"))?;

    // A reply without a single score is useless to the pipeline
    if scores.is_empty() {
        return None;
    }

    Some(AnalysisResult { scores, insights })
}

/// Slice the reply to the span between its first `{` and last `}`, dropping
/// enclosing prose and code-fence markers. Falls back to the whole reply when
/// no such span exists.
fn slice_json_object(raw: &str) -> &str {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(first), Some(last)) if last > first => &raw[first..=last],
        _ => raw,
    }
}

/// Deserialize every element of a JSON list; any invalid element rejects the
/// whole reply so misspelled enum values fail fast instead of propagating.
fn collect_entries<T: serde::de::DeserializeOwned>(
    field: Option<&serde_json::Value>,
) -> Option<Vec<T>> {
    let items = match field.and_then(|v| v.as_array()) {
        Some(items) => items,
        None => return Some(Vec::new()),
    };

    items
        .iter()
        .map(|item| serde_json::from_value(item.clone()).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ScoreType, Severity};
    use pretty_assertions::assert_eq;

    const VALID_REPLY: &str = r#"{
        "scores": [
            {
                "type": "overall",
                "score": 72,
                "confidence": 0.8,
                "factors": {"sleep_quality": 0.7},
                "explanation": "solid baseline"
            }
        ],
        "insights": [
            {
                "title": "Wind down earlier",
                "description": "Late nights are cutting into deep sleep.",
                "category": "sleep",
                "severity": "medium",
                "priority": 60,
                "recommendations": ["Set a consistent bedtime"],
                "practiceTypes": ["sleep"],
                "evidence": {"deep_sleep_ratio": "14%"},
                "reasoning": "Deep sleep trending down"
            }
        ]
    }"#;

    #[test]
    fn test_valid_json_parses() {
        let result = interpret_reply(VALID_REPLY).unwrap();
        assert_eq!(result.scores.len(), 1);
        assert_eq!(result.scores[0].score_type, ScoreType::Overall);
        assert_eq!(result.scores[0].score, 72.0);
        assert_eq!(result.insights.len(), 1);
        assert_eq!(result.insights[0].severity, Severity::Medium);
    }

    #[test]
    fn test_fenced_reply_with_trailing_comma_parses_identically() {
        let fenced = format!(
            "Here is the analysis you asked for:\n```json\n{}\n```\nLet me know if you need more.",
            VALID_REPLY.replace("\"explanation\": \"solid baseline\"", "\"explanation\": \"solid baseline\",")
        );
        let plain = interpret_reply(VALID_REPLY).unwrap();
        let from_fenced = interpret_reply(&fenced).unwrap();
        assert_eq!(plain, from_fenced);
    }

    #[test]
    fn test_trailing_comma_before_bracket() {
        let reply = r#"{"scores": [{"type": "sleep", "score": 78, "confidence": 0.9},], "insights": []}"#;
        let result = interpret_reply(reply).unwrap();
        assert_eq!(result.scores.len(), 1);
        assert_eq!(result.scores[0].score_type, ScoreType::Sleep);
    }

    #[test]
    fn test_zero_scores_rejected() {
        assert!(interpret_reply(r#"{"scores": [], "insights": []}"#).is_none());
    }

    #[test]
    fn test_absent_fields_default_then_reject_on_empty_scores() {
        assert!(interpret_reply(r#"{"analysis": "looks fine"}"#).is_none());
    }

    #[test]
    fn test_non_list_scores_read_as_empty() {
        assert!(interpret_reply(r#"{"scores": "high", "insights": []}"#).is_none());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(interpret_reply("the model timed out, sorry").is_none());
        assert!(interpret_reply("{not json}").is_none());
        assert!(interpret_reply("").is_none());
    }

    #[test]
    fn test_unknown_score_type_rejects_reply() {
        let reply = r#"{"scores": [{"type": "vigor", "score": 50, "confidence": 0.5}]}"#;
        assert!(interpret_reply(reply).is_none());
    }

    #[test]
    fn test_unknown_severity_rejects_reply() {
        let reply = r#"{
            "scores": [{"type": "overall", "score": 70, "confidence": 0.8}],
            "insights": [{
                "title": "t", "description": "d", "category": "stress",
                "severity": "extreme", "priority": 50
            }]
        }"#;
        assert!(interpret_reply(reply).is_none());
    }

    #[test]
    fn test_missing_optional_fields_tolerated() {
        let reply = r#"{"scores": [{"type": "energy", "score": 70, "confidence": 0.75}]}"#;
        let result = interpret_reply(reply).unwrap();
        assert!(result.scores[0].factors.is_empty());
        assert_eq!(result.scores[0].explanation, "");
        assert!(result.insights.is_empty());
    }
}
