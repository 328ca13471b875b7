//! Analysis prompt construction
//!
//! Pure rendering of the per-metric summary into the analyst request, plus
//! the fixed system instructions the gateway sends alongside it.

use crate::types::{MetricSummary, MetricType};
use std::collections::HashMap;

/// System instruction for the analyst: role, expected JSON reply shape
pub const SYSTEM_INSTRUCTION: &str = r#"You are an expert wellness intelligence analyst. Analyze wearable data to provide actionable wellness insights and scores.

Return a JSON object with the following structure:
{
  "scores": [
    {
      "type": "overall|stress|sleep|energy|recovery|focus|mood",
      "score": 0-100,
      "confidence": 0-1,
      "factors": {"factor_name": impact_score},
      "explanation": "brief explanation"
    }
  ],
  "insights": [
    {
      "title": "Brief title",
      "description": "Detailed description",
      "category": "stress|sleep|activity|nutrition|mindfulness",
      "severity": "low|medium|high",
      "priority": 1-100,
      "recommendations": ["actionable recommendation"],
      "practiceTypes": ["yoga", "meditation", "breathing", "movement"],
      "evidence": {"supporting_data": "value"},
      "reasoning": "why this insight matters"
    }
  ]
}"#;

/// Stricter instruction layered on top for the single retry attempt
pub const STRICT_RETRY_INSTRUCTION: &str =
    "Reply with ONLY valid JSON matching the requested structure. No markdown fences, no prose.";

/// Render the aggregated summary into the analysis request.
///
/// Deterministic: metric keys are rendered in sorted order by serde_json.
pub fn build_analysis_prompt(summary: &HashMap<MetricType, MetricSummary>) -> String {
    let mut rendered = serde_json::Map::new();
    for metric in MetricType::ALL {
        if let Some(metric_summary) = summary.get(&metric) {
            rendered.insert(
                metric.as_str().to_string(),
                serde_json::to_value(metric_summary).unwrap_or(serde_json::Value::Null),
            );
        }
    }
    let summary_json = serde_json::to_string_pretty(&serde_json::Value::Object(rendered))
        .unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"
Analyze this wearable data summary and provide wellness insights:

DATA SUMMARY:
{summary_json}

Please analyze patterns in:
- Sleep quality and duration
- Heart rate variability (stress indicator)
- Activity levels and recovery
- Resting heart rate trends
- Overall physiological stress markers

Focus on identifying:
1. Current wellness state
2. Potential issues (stress, poor sleep, overtraining)
3. Positive trends to maintain
4. Actionable recommendations
5. Specific wellness practices that would help

Consider correlations between different metrics to provide holistic insights.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Trend;

    fn summary_entry(count: usize, average: f64) -> MetricSummary {
        MetricSummary {
            count,
            average: Some(average),
            min: Some(average - 5.0),
            max: Some(average + 5.0),
            latest: Some(average),
            trend: Trend::Stable,
        }
    }

    #[test]
    fn test_prompt_contains_summary_and_directives() {
        let mut summary = HashMap::new();
        summary.insert(MetricType::Heartrate, summary_entry(3, 62.0));
        summary.insert(MetricType::Sleep, summary_entry(2, 7.2));

        let prompt = build_analysis_prompt(&summary);

        assert!(prompt.contains("DATA SUMMARY:"));
        assert!(prompt.contains("\"heartrate\""));
        assert!(prompt.contains("\"sleep\""));
        assert!(prompt.contains("Heart rate variability (stress indicator)"));
        assert!(prompt.contains("Specific wellness practices"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let mut summary = HashMap::new();
        summary.insert(MetricType::Stress, summary_entry(5, 40.0));
        summary.insert(MetricType::Hrv, summary_entry(4, 55.0));

        assert_eq!(build_analysis_prompt(&summary), build_analysis_prompt(&summary));
    }

    #[test]
    fn test_prompt_omits_absent_metrics() {
        let mut summary = HashMap::new();
        summary.insert(MetricType::Activity, summary_entry(2, 300.0));

        let prompt = build_analysis_prompt(&summary);
        assert!(prompt.contains("\"activity\""));
        assert!(!prompt.contains("\"oxygen\""));
    }
}
