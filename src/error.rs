//! Error types for the wellness pipeline

use thiserror::Error;

/// Errors that can occur during a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Analyst service returned no completion text")]
    NoResponse,

    #[error("Analyst service error: {0}")]
    AnalystService(String),

    #[error("Analyst transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Catalog error: {0}")]
    CatalogError(String),
}
