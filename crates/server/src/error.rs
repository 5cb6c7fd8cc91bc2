//! Errors surfaced to callers of the recommender.
//!
//! An unmatched title is never an error. The only failure a request can see
//! is a model that could not be built (or a task that died building it).

use data_loader::DataLoadError;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RecommendError {
    /// The ratings dataset could not be loaded, so no model exists.
    ///
    /// The error is shared: every request that hits the same failed build
    /// sees the same cause.
    #[error("Recommendation model unavailable: {0}")]
    ModelUnavailable(#[source] Arc<DataLoadError>),

    /// The blocking recommendation task panicked or was cancelled
    #[error("Recommendation task failed: {0}")]
    TaskFailed(String),
}

impl RecommendError {
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, RecommendError::ModelUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, RecommendError>;
