//! Practice matching
//!
//! Maps an insight's requested practice categories/tags to existing catalog
//! practices. The catalog is read-only here; popularity is maintained by an
//! external collaborator.

use crate::error::PipelineError;
use crate::types::Practice;

/// Maximum practices linked to one insight
pub const MAX_PRACTICE_MATCHES: usize = 3;

/// Queryable practice catalog, substitutable with an in-memory fake in tests
pub trait PracticeCatalog {
    /// Practices whose category equals one of the requested strings or whose
    /// tags contain one of them, ordered by descending popularity, at most
    /// `limit` entries.
    fn find_matching(
        &self,
        requests: &[String],
        limit: usize,
    ) -> Result<Vec<Practice>, PipelineError>;
}

/// Resolve one insight's practice requests against the catalog.
///
/// An empty request list yields an empty result without touching the catalog.
pub fn match_practices(
    catalog: &dyn PracticeCatalog,
    requests: &[String],
) -> Result<Vec<Practice>, PipelineError> {
    if requests.is_empty() {
        return Ok(Vec::new());
    }
    catalog.find_matching(requests, MAX_PRACTICE_MATCHES)
}

/// In-memory practice catalog
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    practices: Vec<Practice>,
}

impl InMemoryCatalog {
    pub fn new(practices: Vec<Practice>) -> Self {
        Self { practices }
    }

    pub fn is_empty(&self) -> bool {
        self.practices.is_empty()
    }
}

impl PracticeCatalog for InMemoryCatalog {
    fn find_matching(
        &self,
        requests: &[String],
        limit: usize,
    ) -> Result<Vec<Practice>, PipelineError> {
        let mut matched: Vec<Practice> = self
            .practices
            .iter()
            .filter(|practice| {
                requests.iter().any(|request| {
                    practice.category == *request || practice.tags.contains(request)
                })
            })
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.popularity.cmp(&a.popularity));
        matched.truncate(limit);
        Ok(matched)
    }
}
