//! Core types for the wellness analysis pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw samples, per-metric summaries, analyst drafts, and the
//! persisted score/insight records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Recognized wearable metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Heartrate,
    Sleep,
    Activity,
    Hrv,
    Stress,
    Temperature,
    Oxygen,
}

impl MetricType {
    /// All recognized metric types, in summary rendering order
    pub const ALL: [MetricType; 7] = [
        MetricType::Heartrate,
        MetricType::Sleep,
        MetricType::Activity,
        MetricType::Hrv,
        MetricType::Stress,
        MetricType::Temperature,
        MetricType::Oxygen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Heartrate => "heartrate",
            MetricType::Sleep => "sleep",
            MetricType::Activity => "activity",
            MetricType::Hrv => "hrv",
            MetricType::Stress => "stress",
            MetricType::Temperature => "temperature",
            MetricType::Oxygen => "oxygen",
        }
    }

    /// Parse a caller-supplied data type string (case-insensitive).
    /// Unrecognized types yield `None` and are skipped by the aggregator.
    pub fn parse(data_type: &str) -> Option<MetricType> {
        match data_type.to_ascii_lowercase().as_str() {
            "heartrate" => Some(MetricType::Heartrate),
            "sleep" => Some(MetricType::Sleep),
            "activity" => Some(MetricType::Activity),
            "hrv" => Some(MetricType::Hrv),
            "stress" => Some(MetricType::Stress),
            "temperature" => Some(MetricType::Temperature),
            "oxygen" => Some(MetricType::Oxygen),
            _ => None,
        }
    }
}

/// One timestamped wearable reading, as supplied by the caller (newest-first)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Metric type reported by the device (e.g., "heartrate", "sleep")
    pub data_type: String,
    /// Numeric reading; absent for samples that carry only structured payload
    pub value: Option<f64>,
    /// When the reading was taken
    pub timestamp: DateTime<Utc>,
    /// Vendor-specific payload preserved as-is; never interpreted here
    #[serde(default)]
    pub raw_data: serde_json::Value,
}

/// Trend direction over the analyzed window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

/// Per-metric statistical summary, derived and ephemeral (never persisted)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Number of matching samples, regardless of numeric validity
    pub count: usize,
    /// Mean of the finite numeric values, or None if there were none
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Value of the newest sample; None only when that sample has no value
    pub latest: Option<f64>,
    pub trend: Trend,
}

/// Wellness score categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreType {
    Overall,
    Stress,
    Sleep,
    Energy,
    Recovery,
    Focus,
    Mood,
}

impl ScoreType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreType::Overall => "overall",
            ScoreType::Stress => "stress",
            ScoreType::Sleep => "sleep",
            ScoreType::Energy => "energy",
            ScoreType::Recovery => "recovery",
            ScoreType::Focus => "focus",
            ScoreType::Mood => "mood",
        }
    }
}

/// Insight severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Insight lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightStatus {
    Active,
    Dismissed,
    ActedUpon,
}

/// One score entry from the analyst reply (or the mock analysis)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDraft {
    #[serde(rename = "type")]
    pub score_type: ScoreType,
    /// 0-100 wellness rating
    pub score: f64,
    /// 0-1 analyst confidence
    pub confidence: f64,
    /// Contributing factors and their signed weights
    #[serde(default)]
    pub factors: HashMap<String, f64>,
    #[serde(default)]
    pub explanation: String,
}

/// One insight entry from the analyst reply (or the mock analysis)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightDraft {
    pub title: String,
    pub description: String,
    /// Open-ended category (e.g., "stress", "sleep", "mindfulness")
    pub category: String,
    pub severity: Severity,
    /// 1-100, higher surfaces first
    pub priority: u8,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Requested practice categories/tags, resolved against the catalog
    #[serde(rename = "practiceTypes", default)]
    pub practice_types: Vec<String>,
    /// Supporting data points, kept as an open structure
    #[serde(default)]
    pub evidence: serde_json::Value,
    #[serde(default)]
    pub reasoning: String,
}

/// Parsed and validated analyst reply, or the mock substitute.
///
/// Once accepted by the retry/fallback controller this always carries at
/// least one score entry (the mock guarantees four).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub scores: Vec<ScoreDraft>,
    #[serde(default)]
    pub insights: Vec<InsightDraft>,
}

/// Persisted wellness score record.
///
/// Scores are never updated in place; history accumulates as new rows with
/// the same `(user_id, score_type)` but a later `period_end`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellnessScore {
    pub id: Uuid,
    pub user_id: String,
    pub score_type: ScoreType,
    pub score: f64,
    pub confidence: f64,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub factors: HashMap<String, f64>,
    pub explanation: String,
    pub created_at: DateTime<Utc>,
}

/// Persisted insight record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub severity: Severity,
    pub priority: u8,
    pub recommendations: Vec<String>,
    /// Catalog practice ids resolved by the practice matcher
    pub practice_ids: Vec<String>,
    pub evidence: serde_json::Value,
    pub reasoning: String,
    pub status: InsightStatus,
    /// Advisory expiry; expired rows are not deleted here
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub acted_at: Option<DateTime<Utc>>,
    pub dismissed_at: Option<DateTime<Utc>>,
}

impl Insight {
    /// Transition the insight status, stamping the matching timestamp.
    /// Called by external collaborators after creation (dismiss / act upon).
    pub fn transition(&mut self, status: InsightStatus, at: DateTime<Utc>) {
        self.status = status;
        match status {
            InsightStatus::ActedUpon => self.acted_at = Some(at),
            InsightStatus::Dismissed => self.dismissed_at = Some(at),
            InsightStatus::Active => {}
        }
    }
}

/// Catalog practice entry, read-only from the pipeline's perspective
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Practice {
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub popularity: u32,
}

/// Result of a full pipeline run: persisted scores plus the insight drafts
/// (not re-read from storage)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedWellness {
    pub scores: Vec<WellnessScore>,
    pub insights: Vec<InsightDraft>,
}
