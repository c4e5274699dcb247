//! Review output types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A decoded model answer.
///
/// Untyped on purpose: the system prompt asks for `improvements`, `bugs`
/// and `code_quality`, but whatever decodes as JSON is accepted as-is.
pub type ParsedReview = serde_json::Value;

/// Per-file reviews for one repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    /// Repository the snapshot was cloned from.
    pub repository: String,
    /// Snapshot key → decoded review, in snapshot order.
    pub reviews: IndexMap<String, ParsedReview>,
    /// Files for which the model never produced valid JSON.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
}

impl ReviewReport {
    /// Create an empty report for `repository`.
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            ..Self::default()
        }
    }

    /// Number of files that were sent to the model.
    pub fn attempted(&self) -> usize {
        self.reviews.len() + self.failed.len()
    }
}
