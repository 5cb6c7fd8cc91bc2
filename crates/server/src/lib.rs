//! Server crate for the book recommender.
//!
//! Owns the built model (three sources plus the hybrid blend), the
//! build-once model cache and the async orchestrator that serves requests.

pub mod cache;
pub mod config;
pub mod error;
pub mod hybrid;
pub mod model;
pub mod orchestrator;

pub use cache::ModelCache;
pub use config::{RecommenderConfig, WeightSchedule};
pub use error::{RecommendError, Result};
pub use hybrid::{ScoreAccumulator, ScoredTitle};
pub use model::{ModelStats, RecommenderModel};
pub use orchestrator::RecommendationOrchestrator;
