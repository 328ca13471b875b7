//! Sagewell - Wellness analysis engine for wearable data
//!
//! Sagewell condenses time-stamped physiological samples into per-metric
//! statistical summaries, consults a language-model analyst, and turns its
//! structured reply into persisted wellness scores and actionable insights
//! linked to suggested practices: aggregation → prompt construction →
//! analyst invocation under a validating retry loop → tolerant reply
//! interpretation → deterministic mock fallback → persistence and practice
//! matching.
//!
//! The analyst is optional: without a usable credential the pipeline
//! degrades silently to a fixed mock analysis and always completes.

pub mod aggregate;
pub mod analyst;
pub mod catalog;
pub mod controller;
pub mod error;
pub mod interpret;
pub mod pipeline;
pub mod prompt;
pub mod store;
pub mod types;

pub use analyst::{AnalystClient, AnalystConfig, MistralAnalyst};
pub use catalog::{InMemoryCatalog, PracticeCatalog};
pub use controller::{mock_analysis, run_analysis, AnalysisOutcome, AnalysisSource};
pub use error::PipelineError;
pub use pipeline::{process_wellness_data, WellnessProcessor};
pub use store::{InMemoryStore, PersistenceWriter, WellnessStore};
pub use types::{
    AnalysisResult, Insight, InsightDraft, MetricSummary, MetricType, Practice,
    ProcessedWellness, Sample, ScoreDraft, ScoreType, Trend, WellnessScore,
};

/// Sagewell version embedded in CLI output
pub const SAGEWELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for CLI output
pub const PRODUCER_NAME: &str = "sagewell";
