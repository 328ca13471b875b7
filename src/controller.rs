//! Retry/fallback controller
//!
//! Orchestrates analyst invocation as an explicit state machine:
//!
//! ```text
//! NoAnalyst    -> Mock
//! FirstAttempt -> Accept | RetryAttempt
//! RetryAttempt -> Accept | Mock
//! ```
//!
//! A failed first attempt (transport error or uninterpretable reply) earns
//! exactly one retry with a stricter system instruction; a failed retry falls
//! back to the fixed mock analysis. Total gateway calls per run are 0, 1,
//! or 2, and the pipeline always completes with a usable result.

use crate::analyst::AnalystClient;
use crate::interpret::interpret_reply;
use crate::prompt::{STRICT_RETRY_INSTRUCTION, SYSTEM_INSTRUCTION};
use crate::types::{AnalysisResult, InsightDraft, ScoreDraft, ScoreType, Severity};
use std::collections::HashMap;

/// Terminal state that produced an analysis result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisSource {
    /// First gateway attempt interpreted successfully
    FirstAttempt,
    /// Retry with the stricter instruction interpreted successfully
    Retry,
    /// Fixed mock analysis: no analyst configured, or both attempts failed
    Mock,
}

/// Accepted analysis plus provenance of how it was obtained
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub source: AnalysisSource,
    /// Gateway invocations made for this run (0, 1, or 2)
    pub gateway_calls: u8,
}

/// Run the analyst under the retry/fallback state machine.
///
/// `analyst` is `None` when no usable credential is configured; that is a
/// deliberate, silent degrade to the mock path, not an error.
pub fn run_analysis(analyst: Option<&dyn AnalystClient>, prompt: &str) -> AnalysisOutcome {
    let client = match analyst {
        Some(client) => client,
        None => {
            log::debug!("no usable analyst configured; using mock analysis");
            return AnalysisOutcome {
                result: mock_analysis(),
                source: AnalysisSource::Mock,
                gateway_calls: 0,
            };
        }
    };

    if let Some(result) = attempt(client, SYSTEM_INSTRUCTION, prompt) {
        return AnalysisOutcome {
            result,
            source: AnalysisSource::FirstAttempt,
            gateway_calls: 1,
        };
    }

    // One retry with the stricter instruction layered over the same prompt
    let strict_instruction = format!("{STRICT_RETRY_INSTRUCTION}\n\n{SYSTEM_INSTRUCTION}");
    if let Some(result) = attempt(client, &strict_instruction, prompt) {
        return AnalysisOutcome {
            result,
            source: AnalysisSource::Retry,
            gateway_calls: 2,
        };
    }

    log::warn!("analyst failed both attempts; falling back to mock analysis");
    AnalysisOutcome {
        result: mock_analysis(),
        source: AnalysisSource::Mock,
        gateway_calls: 2,
    }
}

/// One gateway call plus interpretation. Transport/service failures and
/// uninterpretable replies collapse to `None`; the caller decides whether to
/// retry or fall back. Detail is logged for operators only.
fn attempt(
    client: &dyn AnalystClient,
    system_instruction: &str,
    prompt: &str,
) -> Option<AnalysisResult> {
    match client.complete(system_instruction, prompt) {
        Ok(raw) => {
            let result = interpret_reply(&raw);
            if result.is_none() {
                let snippet: String = raw.chars().take(500).collect();
                log::warn!("uninterpretable analyst reply; snippet: {snippet}");
            }
            result
        }
        Err(err) => {
            log::warn!("analyst call failed: {err}");
            None
        }
    }
}

/// The fixed, hand-authored fallback analysis.
///
/// Guarantees four scores and two insights so the pipeline always completes
/// regardless of analyst availability.
pub fn mock_analysis() -> AnalysisResult {
    AnalysisResult {
        scores: vec![
            ScoreDraft {
                score_type: ScoreType::Overall,
                score: 72.0,
                confidence: 0.8,
                factors: HashMap::from([
                    ("sleep_quality".to_string(), 0.7),
                    ("stress_level".to_string(), -0.4),
                    ("activity_level".to_string(), 0.3),
                ]),
                explanation: "Good overall wellness with room for improvement in stress management"
                    .to_string(),
            },
            ScoreDraft {
                score_type: ScoreType::Stress,
                score: 65.0,
                confidence: 0.85,
                factors: HashMap::from([
                    ("hrv_variability".to_string(), -0.5),
                    ("resting_heart_rate".to_string(), -0.3),
                ]),
                explanation: "Elevated stress indicators detected".to_string(),
            },
            ScoreDraft {
                score_type: ScoreType::Sleep,
                score: 78.0,
                confidence: 0.9,
                factors: HashMap::from([
                    ("sleep_duration".to_string(), 0.8),
                    ("sleep_quality".to_string(), 0.6),
                ]),
                explanation: "Good sleep quality and duration".to_string(),
            },
            ScoreDraft {
                score_type: ScoreType::Energy,
                score: 70.0,
                confidence: 0.75,
                factors: HashMap::from([
                    ("activity_level".to_string(), 0.5),
                    ("recovery_metrics".to_string(), 0.4),
                ]),
                explanation: "Moderate energy levels with good recovery".to_string(),
            },
        ],
        insights: vec![
            InsightDraft {
                title: "Consider Mindfulness Practices".to_string(),
                description: "Your wearable data shows elevated stress patterns. Mindfulness and breathing exercises could help reduce stress levels."
                    .to_string(),
                category: "stress".to_string(),
                severity: Severity::Medium,
                priority: 75,
                recommendations: vec![
                    "Try 10 minutes of deep breathing daily".to_string(),
                    "Practice mindfulness meditation".to_string(),
                    "Consider yoga for stress relief".to_string(),
                ],
                practice_types: vec![
                    "meditation".to_string(),
                    "breathing".to_string(),
                    "yoga".to_string(),
                ],
                evidence: serde_json::json!({ "hrv_drop": "15%", "elevated_rhr": "8bpm" }),
                reasoning: "HRV and resting heart rate patterns indicate stress accumulation that could benefit from mindfulness practices"
                    .to_string(),
            },
            InsightDraft {
                title: "Sleep Quality Optimization".to_string(),
                description: "Your sleep data looks good, but there may be opportunities to optimize your sleep environment."
                    .to_string(),
                category: "sleep".to_string(),
                severity: Severity::Low,
                priority: 45,
                recommendations: vec![
                    "Maintain consistent bedtime routine".to_string(),
                    "Keep bedroom cool and dark".to_string(),
                    "Avoid screens 1 hour before bed".to_string(),
                ],
                practice_types: vec!["sleep".to_string(), "relaxation".to_string()],
                evidence: serde_json::json!({ "sleep_efficiency": "87%", "deep_sleep_ratio": "18%" }),
                reasoning: "Sleep metrics are solid but could be enhanced with better pre-sleep routines"
                    .to_string(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    /// Scripted analyst that replays canned replies and records every call
    struct ScriptedAnalyst {
        replies: RefCell<Vec<Result<String, PipelineError>>>,
        systems_seen: RefCell<Vec<String>>,
    }

    impl ScriptedAnalyst {
        fn new(replies: Vec<Result<String, PipelineError>>) -> Self {
            Self {
                replies: RefCell::new(replies),
                systems_seen: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.systems_seen.borrow().len()
        }
    }

    impl AnalystClient for ScriptedAnalyst {
        fn complete(
            &self,
            system_instruction: &str,
            _user_prompt: &str,
        ) -> Result<String, PipelineError> {
            self.systems_seen
                .borrow_mut()
                .push(system_instruction.to_string());
            self.replies.borrow_mut().remove(0)
        }
    }

    const VALID_REPLY: &str =
        r#"{"scores": [{"type": "overall", "score": 81, "confidence": 0.9}], "insights": []}"#;

    #[test]
    fn test_no_analyst_goes_straight_to_mock() {
        let outcome = run_analysis(None, "prompt");

        assert_eq!(outcome.source, AnalysisSource::Mock);
        assert_eq!(outcome.gateway_calls, 0);
        assert_eq!(outcome.result, mock_analysis());
        assert_eq!(outcome.result.scores.len(), 4);
        assert_eq!(outcome.result.insights.len(), 2);
    }

    #[test]
    fn test_valid_first_reply_accepted_after_one_call() {
        let analyst = ScriptedAnalyst::new(vec![Ok(VALID_REPLY.to_string())]);
        let outcome = run_analysis(Some(&analyst), "prompt");

        assert_eq!(outcome.source, AnalysisSource::FirstAttempt);
        assert_eq!(outcome.gateway_calls, 1);
        assert_eq!(analyst.calls(), 1);
        assert_eq!(outcome.result.scores[0].score, 81.0);
    }

    #[test]
    fn test_invalid_then_valid_uses_retry() {
        let analyst = ScriptedAnalyst::new(vec![
            Ok("I could not produce JSON this time.".to_string()),
            Ok(VALID_REPLY.to_string()),
        ]);
        let outcome = run_analysis(Some(&analyst), "prompt");

        assert_eq!(outcome.source, AnalysisSource::Retry);
        assert_eq!(outcome.gateway_calls, 2);
        assert_eq!(analyst.calls(), 2);

        // Retry layers the stricter instruction over the original one
        let systems = analyst.systems_seen.borrow();
        assert_eq!(systems[0], SYSTEM_INSTRUCTION);
        assert!(systems[1].starts_with(STRICT_RETRY_INSTRUCTION));
        assert!(systems[1].contains(SYSTEM_INSTRUCTION));
    }

    #[test]
    fn test_always_invalid_falls_back_to_mock_after_two_calls() {
        let analyst = ScriptedAnalyst::new(vec![
            Ok("nope".to_string()),
            Ok("still nope".to_string()),
        ]);
        let outcome = run_analysis(Some(&analyst), "prompt");

        assert_eq!(outcome.source, AnalysisSource::Mock);
        assert_eq!(outcome.gateway_calls, 2);
        assert_eq!(analyst.calls(), 2);
        assert_eq!(outcome.result, mock_analysis());
    }

    #[test]
    fn test_transport_error_treated_like_invalid_reply() {
        let analyst = ScriptedAnalyst::new(vec![
            Err(PipelineError::AnalystService("HTTP 503".to_string())),
            Ok(VALID_REPLY.to_string()),
        ]);
        let outcome = run_analysis(Some(&analyst), "prompt");

        assert_eq!(outcome.source, AnalysisSource::Retry);
        assert_eq!(outcome.gateway_calls, 2);
    }

    #[test]
    fn test_two_transport_errors_fall_back_to_mock() {
        let analyst = ScriptedAnalyst::new(vec![
            Err(PipelineError::NoResponse),
            Err(PipelineError::AnalystService("HTTP 500".to_string())),
        ]);
        let outcome = run_analysis(Some(&analyst), "prompt");

        assert_eq!(outcome.source, AnalysisSource::Mock);
        assert_eq!(outcome.gateway_calls, 2);
        assert_eq!(outcome.result, mock_analysis());
    }

    #[test]
    fn test_zero_score_reply_is_invalid() {
        let analyst = ScriptedAnalyst::new(vec![
            Ok(r#"{"scores": [], "insights": []}"#.to_string()),
            Ok(VALID_REPLY.to_string()),
        ]);
        let outcome = run_analysis(Some(&analyst), "prompt");

        assert_eq!(outcome.source, AnalysisSource::Retry);
    }
}
