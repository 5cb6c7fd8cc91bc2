//! # Recommendation Orchestrator
//!
//! Async front door for the recommender:
//! 1. Get (or build) the shared model from the [`ModelCache`]
//! 2. Query the three sources and blend them, on the blocking pool
//! 3. Return the top N titles
//!
//! Model construction and queries are CPU-bound, so both run inside
//! `spawn_blocking` and never stall the async runtime.

use std::sync::Arc;
use std::time::Instant;

use data_loader::RatingsSource;
use tracing::{debug, info};

use crate::cache::ModelCache;
use crate::config::RecommenderConfig;
use crate::error::{RecommendError, Result};
use crate::hybrid::ScoredTitle;
use crate::model::RecommenderModel;

/// Cheap-to-clone handle shared by request handlers
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    cache: Arc<ModelCache>,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator over a dataset source; nothing is loaded yet
    pub fn new(source: impl RatingsSource + 'static, config: RecommenderConfig) -> Self {
        Self::from_cache(Arc::new(ModelCache::new(source, config)))
    }

    pub fn from_cache(cache: Arc<ModelCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<ModelCache> {
        &self.cache
    }

    /// Main entry point: the default number of recommendations for a title
    pub async fn recommend(&self, title: &str) -> Result<Vec<String>> {
        let limit = self.cache.config().default_limit;
        self.recommend_with_limit(title, limit).await
    }

    /// Up to `limit` recommendation titles, best first
    pub async fn recommend_with_limit(&self, title: &str, limit: usize) -> Result<Vec<String>> {
        let scored = self.recommend_scored(title, limit).await?;
        Ok(scored.into_iter().map(|s| s.title).collect())
    }

    /// Up to `limit` recommendations with scores and contributing sources
    pub async fn recommend_scored(&self, title: &str, limit: usize) -> Result<Vec<ScoredTitle>> {
        let start_time = Instant::now();

        let cache = Arc::clone(&self.cache);
        let query = title.to_string();
        let recommendations = run_blocking(move || {
            let model = cache.get_or_build()?;
            Ok(model.recommend_scored(&query, limit))
        })
        .await?;

        debug!(
            "Recommended {} titles for {:?} in {:.2?}",
            recommendations.len(),
            title,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Build the model now instead of on the first request
    pub async fn warm_up(&self) -> Result<Arc<RecommenderModel>> {
        let start_time = Instant::now();
        let cache = Arc::clone(&self.cache);
        let model = run_blocking(move || cache.get_or_build()).await?;

        info!("Recommender warm in {:.2?}", start_time.elapsed());
        Ok(model)
    }

    /// Rebuild from the dataset source and swap the new model in
    pub async fn reload(&self) -> Result<Arc<RecommenderModel>> {
        let cache = Arc::clone(&self.cache);
        run_blocking(move || cache.reload()).await
    }

    /// Drop the cached model; the next request rebuilds it
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| RecommendError::TaskFailed(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{RatingRecord, RatingsTable, RawExportSource};

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    /// Two readers' favourites, one outlier and a long tail
    fn build_test_table() -> RatingsTable {
        let mut records = Vec::new();
        for user in 0..8 {
            records.push(RatingRecord::new("Nebula Nights", user, 9));
            records.push(RatingRecord::new("Nebula Dawn", user, 8));
        }
        for user in 0..5 {
            records.push(RatingRecord::new("Quasar Garden", user + 20, 6));
        }
        for (i, title) in ["Zephyr One", "Zephyr Two", "Zephyr Three"].iter().enumerate() {
            records.push(RatingRecord::new(*title, 40 + i as u32, 7));
        }
        RatingsTable::from_records(records)
    }

    fn test_config() -> RecommenderConfig {
        RecommenderConfig::default()
            .with_knn_min_ratings(5)
            .with_content_min_ratings(5)
    }

    // ============================================================================
    // Tests
    // ============================================================================

    #[tokio::test]
    async fn test_recommend_known_title() {
        let orchestrator = RecommendationOrchestrator::new(build_test_table(), test_config());

        let recs = orchestrator.recommend("nebula nights").await.unwrap();

        assert_eq!(recs[0], "Nebula Dawn");
        assert!(!recs.is_empty() && recs.len() <= 10);
        assert!(orchestrator.cache().is_loaded());
    }

    #[tokio::test]
    async fn test_recommend_unknown_title_is_popularity() {
        let orchestrator = RecommendationOrchestrator::new(build_test_table(), test_config());

        let recs = orchestrator.recommend("ZZZQQQNOMATCH123").await.unwrap();
        let model = orchestrator.warm_up().await.unwrap();

        assert_eq!(recs, model.popularity_based(5));
    }

    #[tokio::test]
    async fn test_recommend_with_limit() {
        let orchestrator = RecommendationOrchestrator::new(build_test_table(), test_config());

        let recs = orchestrator.recommend_with_limit("Nebula", 2).await.unwrap();
        assert_eq!(recs.len(), 2);

        let none = orchestrator.recommend_with_limit("Nebula", 0).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_one_model() {
        let orchestrator = RecommendationOrchestrator::new(build_test_table(), test_config());
        let clone = orchestrator.clone();

        let (a, b) = tokio::join!(
            orchestrator.recommend("Quasar"),
            clone.recommend("Quasar")
        );

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(orchestrator.cache().build_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_dataset_is_model_unavailable() {
        let orchestrator = RecommendationOrchestrator::new(
            RawExportSource::new("/nonexistent/datasets"),
            test_config(),
        );

        let err = orchestrator.recommend("Nebula").await.unwrap_err();
        assert!(err.is_model_unavailable());

        // Remembered, not retried
        assert!(orchestrator.recommend("Nebula").await.is_err());
        assert_eq!(orchestrator.cache().build_count(), 1);
    }

    #[tokio::test]
    async fn test_reload_and_invalidate() {
        let orchestrator = RecommendationOrchestrator::new(build_test_table(), test_config());

        let first = orchestrator.warm_up().await.unwrap();
        let reloaded = orchestrator.reload().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &reloaded));

        orchestrator.invalidate();
        assert!(!orchestrator.cache().is_loaded());

        orchestrator.recommend("Nebula").await.unwrap();
        assert_eq!(orchestrator.cache().build_count(), 3);
    }
}
