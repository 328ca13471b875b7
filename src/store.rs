//! Persistence of scores and insights
//!
//! Turns accepted analysis drafts into durable records scoped to the user and
//! time window. The record store is an explicit handle threaded in by the
//! caller so tests can substitute an in-memory fake. Writes are independent:
//! a failure part-way through leaves earlier rows in place, there is no
//! cross-row transaction or rollback.

use crate::catalog::{match_practices, PracticeCatalog};
use crate::error::PipelineError;
use crate::types::{Insight, InsightDraft, InsightStatus, ScoreDraft, WellnessScore};
use chrono::{Duration, Utc};
use std::sync::Mutex;
use uuid::Uuid;

/// Fixed run-time scoring window, independent of the analyzed data window
pub const SCORE_WINDOW_HOURS: i64 = 24;

/// Advisory insight lifetime
pub const INSIGHT_TTL_DAYS: i64 = 7;

/// Record store supporting insert-by-fields for both record kinds
pub trait WellnessStore {
    fn insert_score(&self, score: WellnessScore) -> Result<(), PipelineError>;
    fn insert_insight(&self, insight: Insight) -> Result<(), PipelineError>;
}

/// Writer that materializes drafts into persisted records
pub struct PersistenceWriter;

impl PersistenceWriter {
    /// Persist one `WellnessScore` per draft over the last-24-hours window.
    /// Returns the records as written, generated ids and timestamps included.
    pub fn save_scores(
        store: &dyn WellnessStore,
        user_id: &str,
        drafts: &[ScoreDraft],
    ) -> Result<Vec<WellnessScore>, PipelineError> {
        let now = Utc::now();
        let period_start = now - Duration::hours(SCORE_WINDOW_HOURS);

        let mut saved = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let record = WellnessScore {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                score_type: draft.score_type,
                score: draft.score,
                confidence: draft.confidence,
                period_start,
                period_end: now,
                factors: draft.factors.clone(),
                explanation: draft.explanation.clone(),
                created_at: now,
            };
            store.insert_score(record.clone())?;
            saved.push(record);
        }
        Ok(saved)
    }

    /// Resolve each draft's practice requests, then persist one active
    /// `Insight` per draft with a 7-day advisory expiry.
    pub fn save_insights(
        store: &dyn WellnessStore,
        catalog: &dyn PracticeCatalog,
        user_id: &str,
        drafts: &[InsightDraft],
    ) -> Result<Vec<Insight>, PipelineError> {
        let mut saved = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let practices = match_practices(catalog, &draft.practice_types)?;
            let now = Utc::now();

            let record = Insight {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                title: draft.title.clone(),
                description: draft.description.clone(),
                category: draft.category.clone(),
                severity: draft.severity,
                priority: draft.priority,
                recommendations: draft.recommendations.clone(),
                practice_ids: practices.into_iter().map(|p| p.id).collect(),
                evidence: draft.evidence.clone(),
                reasoning: draft.reasoning.clone(),
                status: InsightStatus::Active,
                expires_at: now + Duration::days(INSIGHT_TTL_DAYS),
                created_at: now,
                acted_at: None,
                dismissed_at: None,
            };
            store.insert_insight(record.clone())?;
            saved.push(record);
        }
        Ok(saved)
    }
}

/// In-memory record store for tests and embedded use
#[derive(Debug, Default)]
pub struct InMemoryStore {
    scores: Mutex<Vec<WellnessScore>>,
    insights: Mutex<Vec<Insight>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scores(&self) -> Vec<WellnessScore> {
        self.scores.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    pub fn insights(&self) -> Vec<Insight> {
        self.insights.lock().map(|rows| rows.clone()).unwrap_or_default()
    }
}

impl WellnessStore for InMemoryStore {
    fn insert_score(&self, score: WellnessScore) -> Result<(), PipelineError> {
        self.scores
            .lock()
            .map_err(|_| PipelineError::StorageError("score store lock poisoned".to_string()))?
            .push(score);
        Ok(())
    }

    fn insert_insight(&self, insight: Insight) -> Result<(), PipelineError> {
        self.insights
            .lock()
            .map_err(|_| PipelineError::StorageError("insight store lock poisoned".to_string()))?
            .push(insight);
        Ok(())
    }
}
