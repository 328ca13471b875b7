//! Sample aggregation
//!
//! This module condenses raw wearable samples into per-metric statistical
//! summaries: count, mean, min, max, latest reading, and trend direction.
//! Callers supply samples newest-first; the aggregator never mutates or
//! rejects input, it only summarizes what is there.

use crate::types::{MetricSummary, MetricType, Sample, Trend};
use std::collections::HashMap;

/// Minimum samples before a trend is attempted
const TREND_MIN_SAMPLES: usize = 3;

/// Relative change below which a trend counts as stable
const TREND_STABLE_THRESHOLD: f64 = 0.05;

/// Aggregator for computing per-metric summaries
pub struct SampleAggregator;

impl SampleAggregator {
    /// Summarize samples by metric type.
    ///
    /// Metric types with no matching samples are omitted from the output.
    /// Samples with unrecognized types are skipped. Non-finite or absent
    /// values still count toward `count` but are excluded from the numeric
    /// aggregates.
    pub fn summarize(samples: &[Sample]) -> HashMap<MetricType, MetricSummary> {
        let mut grouped: HashMap<MetricType, Vec<&Sample>> = HashMap::new();
        for sample in samples {
            if let Some(metric) = MetricType::parse(&sample.data_type) {
                grouped.entry(metric).or_default().push(sample);
            }
        }

        grouped
            .into_iter()
            .map(|(metric, matched)| (metric, summarize_metric(&matched)))
            .collect()
    }
}

fn summarize_metric(samples: &[&Sample]) -> MetricSummary {
    let numeric: Vec<f64> = samples
        .iter()
        .filter_map(|s| s.value)
        .filter(|v| v.is_finite())
        .collect();

    let average = mean(&numeric);
    let min = numeric.iter().cloned().fold(None, |acc: Option<f64>, v| {
        Some(acc.map_or(v, |a| a.min(v)))
    });
    let max = numeric.iter().cloned().fold(None, |acc: Option<f64>, v| {
        Some(acc.map_or(v, |a| a.max(v)))
    });

    MetricSummary {
        count: samples.len(),
        average,
        min,
        max,
        // Newest sample only; no fallback to the next one when absent
        latest: samples.first().and_then(|s| s.value),
        trend: compute_trend(samples),
    }
}

/// Classify the trend of a newest-first sample list.
///
/// The recent window is the first `min(10, n)` samples; the older window
/// spans indices `[max(0, n-10), n-5)`. Window means ignore absent and
/// non-finite values. An empty older window (n <= 5) or one with no usable
/// mean is insufficient data and reads as stable.
fn compute_trend(samples: &[&Sample]) -> Trend {
    let n = samples.len();
    if n < TREND_MIN_SAMPLES {
        return Trend::Stable;
    }

    let recent = &samples[..n.min(10)];
    let older_start = n.saturating_sub(10);
    let older_end = n.saturating_sub(5);
    if older_start >= older_end {
        return Trend::Stable;
    }
    let older = &samples[older_start..older_end];

    let recent_mean = window_mean(recent);
    let older_mean = window_mean(older);

    match (recent_mean, older_mean) {
        (Some(recent), Some(older)) if older != 0.0 => {
            let change = (recent - older) / older;
            if change.abs() < TREND_STABLE_THRESHOLD {
                Trend::Stable
            } else if change > 0.0 {
                Trend::Increasing
            } else {
                Trend::Decreasing
            }
        }
        _ => Trend::Stable,
    }
}

fn window_mean(samples: &[&Sample]) -> Option<f64> {
    let values: Vec<f64> = samples
        .iter()
        .filter_map(|s| s.value)
        .filter(|v| v.is_finite())
        .collect();
    mean(&values)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
