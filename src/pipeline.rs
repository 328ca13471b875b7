//! Pipeline orchestration
//!
//! Public API for the wellness analysis run:
//! aggregation → prompt construction → analyst invocation under the
//! retry/fallback controller → practice matching → persistence.
//!
//! Each run is a pure function of its input samples plus the analyst
//! configuration in effect at call time; no state is shared between runs.

use crate::aggregate::SampleAggregator;
use crate::analyst::{AnalystClient, AnalystConfig, MistralAnalyst};
use crate::catalog::PracticeCatalog;
use crate::controller::run_analysis;
use crate::error::PipelineError;
use crate::prompt::build_analysis_prompt;
use crate::store::{PersistenceWriter, WellnessStore};
use crate::types::{ProcessedWellness, Sample};

/// Run the full wellness-analysis pipeline for one user.
///
/// The caller supplies an already-time-filtered, newest-first sample list and
/// is responsible for rejecting empty input upstream. `analyst` is `None`
/// when no usable credential is configured; the run then degrades to the
/// mock analysis without error. Persistence failures propagate; analyst and
/// interpretation failures never do.
pub fn process_wellness_data(
    user_id: &str,
    samples: &[Sample],
    analyst: Option<&dyn AnalystClient>,
    catalog: &dyn PracticeCatalog,
    store: &dyn WellnessStore,
) -> Result<ProcessedWellness, PipelineError> {
    log::info!(
        "processing wellness data for user {user_id} with {} samples",
        samples.len()
    );

    let summary = SampleAggregator::summarize(samples);
    let prompt = build_analysis_prompt(&summary);

    let outcome = run_analysis(analyst, &prompt);
    log::debug!(
        "analysis accepted from {:?} after {} gateway call(s)",
        outcome.source,
        outcome.gateway_calls
    );

    let scores = PersistenceWriter::save_scores(store, user_id, &outcome.result.scores)?;
    PersistenceWriter::save_insights(store, catalog, user_id, &outcome.result.insights)?;

    // Insight drafts are returned as accepted, not re-read from storage
    Ok(ProcessedWellness {
        scores,
        insights: outcome.result.insights,
    })
}

/// Stateful processor owning the catalog and store handles.
///
/// When no analyst is injected, configuration is resolved from the process
/// environment on every run, so credential changes take effect on the next
/// call without a restart.
pub struct WellnessProcessor {
    catalog: Box<dyn PracticeCatalog>,
    store: Box<dyn WellnessStore>,
    analyst: Option<Box<dyn AnalystClient>>,
}

impl WellnessProcessor {
    pub fn new(catalog: Box<dyn PracticeCatalog>, store: Box<dyn WellnessStore>) -> Self {
        Self {
            catalog,
            store,
            analyst: None,
        }
    }

    /// Use a fixed analyst instead of resolving one from the environment
    pub fn with_analyst(mut self, analyst: Box<dyn AnalystClient>) -> Self {
        self.analyst = Some(analyst);
        self
    }

    pub fn process(&self, user_id: &str, samples: &[Sample]) -> Result<ProcessedWellness, PipelineError> {
        match &self.analyst {
            Some(client) => process_wellness_data(
                user_id,
                samples,
                Some(client.as_ref()),
                self.catalog.as_ref(),
                self.store.as_ref(),
            ),
            None => {
                let env_analyst = AnalystConfig::from_env().map(MistralAnalyst::new);
                process_wellness_data(
                    user_id,
                    samples,
                    env_analyst
                        .as_ref()
                        .map(|client| client as &dyn AnalystClient),
                    self.catalog.as_ref(),
                    self.store.as_ref(),
                )
            }
        }
    }
}
