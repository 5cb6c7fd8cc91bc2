//! # Model Cache
//!
//! Build-once gate around [`RecommenderModel`].
//!
//! The first caller of [`ModelCache::get_or_build`] loads the ratings from the
//! configured [`RatingsSource`] and builds the model while holding the gate;
//! concurrent callers block on the gate and then share the same
//! `Arc<RecommenderModel>`. A failed build is remembered: later calls get the
//! same error back without touching the source until [`ModelCache::reload`]
//! or [`ModelCache::invalidate`] is called.
//!
//! A reload of a ready cache builds outside the gate, so requests keep being
//! served by the old model until the new one is swapped in.

use crate::config::RecommenderConfig;
use crate::error::{RecommendError, Result};
use crate::model::RecommenderModel;
use data_loader::{DataLoadError, RatingsSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{error, info, warn};

enum CacheState {
    Empty,
    Ready(Arc<RecommenderModel>),
    Failed(Arc<DataLoadError>),
}

pub struct ModelCache {
    source: Box<dyn RatingsSource>,
    config: RecommenderConfig,
    state: Mutex<CacheState>,
    /// Serializes reloads; never held together with `state` during a build
    reloading: Mutex<()>,
    builds: AtomicUsize,
}

impl ModelCache {
    pub fn new(source: impl RatingsSource + 'static, config: RecommenderConfig) -> Self {
        Self {
            source: Box::new(source),
            config,
            state: Mutex::new(CacheState::Empty),
            reloading: Mutex::new(()),
            builds: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Name of the dataset source, for logs
    pub fn source_name(&self) -> String {
        self.source.name()
    }

    /// The cached model, building it first if nothing has been tried yet
    pub fn get_or_build(&self) -> Result<Arc<RecommenderModel>> {
        let mut state = self.lock();
        match &*state {
            CacheState::Ready(model) => Ok(Arc::clone(model)),
            CacheState::Failed(err) => Err(RecommendError::ModelUnavailable(Arc::clone(err))),
            CacheState::Empty => self.build_into(&mut state),
        }
    }

    /// Rebuild from the source now.
    ///
    /// On success the new model replaces the old one. On failure a previously
    /// built model keeps serving; with no previous model the failure is cached.
    /// With nothing built yet this behaves like [`ModelCache::get_or_build`]
    /// and holds the gate, so first requests wait for this build.
    pub fn reload(&self) -> Result<Arc<RecommenderModel>> {
        let _reloading = self.reloading.lock().unwrap_or_else(PoisonError::into_inner);
        info!("Reloading recommender from {}", self.source.name());

        {
            let mut state = self.lock();
            if let CacheState::Empty = &*state {
                return self.build_into(&mut state);
            }
        }

        let built = self.build();
        let mut state = self.lock();
        match built {
            Ok(model) => {
                *state = CacheState::Ready(Arc::clone(&model));
                Ok(model)
            }
            Err(err) => {
                if let CacheState::Ready(_) = &*state {
                    warn!("Reload failed, keeping previous model: {}", err);
                } else {
                    *state = CacheState::Failed(Arc::clone(&err));
                }
                Err(RecommendError::ModelUnavailable(err))
            }
        }
    }

    /// Drop the cached model or failure; the next request rebuilds
    pub fn invalidate(&self) {
        let mut state = self.lock();
        *state = CacheState::Empty;
        info!("Recommender cache invalidated");
    }

    /// Whether a built model is currently cached
    pub fn is_loaded(&self) -> bool {
        matches!(&*self.lock(), CacheState::Ready(_))
    }

    /// Number of build attempts so far
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // A panic mid-build leaves the state untouched, so it is still valid
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn build_into(&self, state: &mut CacheState) -> Result<Arc<RecommenderModel>> {
        match self.build() {
            Ok(model) => {
                *state = CacheState::Ready(Arc::clone(&model));
                Ok(model)
            }
            Err(err) => {
                *state = CacheState::Failed(Arc::clone(&err));
                Err(RecommendError::ModelUnavailable(err))
            }
        }
    }

    fn build(&self) -> std::result::Result<Arc<RecommenderModel>, Arc<DataLoadError>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        let start = Instant::now();

        let table = self.source.load().map_err(|e| {
            error!("Failed to load ratings from {}: {}", self.source.name(), e);
            Arc::new(e)
        })?;
        let model = RecommenderModel::build(&table, &self.config);

        info!(
            "Recommender ready from {} in {:.2?}",
            self.source.name(),
            start.elapsed()
        );
        Ok(Arc::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{RatingRecord, RatingsTable, RawExportSource};

    fn create_test_table() -> RatingsTable {
        RatingsTable::from_records(vec![
            RatingRecord::new("Emma", 1, 8),
            RatingRecord::new("Emma", 2, 6),
            RatingRecord::new("Dune", 1, 9),
        ])
    }

    #[test]
    fn test_builds_once() {
        let cache = ModelCache::new(create_test_table(), RecommenderConfig::default());
        assert!(!cache.is_loaded());

        let first = cache.get_or_build().unwrap();
        let second = cache.get_or_build().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.build_count(), 1);
        assert!(cache.is_loaded());
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let cache = ModelCache::new(create_test_table(), RecommenderConfig::default());
        let first = cache.get_or_build().unwrap();

        cache.invalidate();
        assert!(!cache.is_loaded());

        let second = cache.get_or_build().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cache.build_count(), 2);
    }

    #[test]
    fn test_failure_is_sticky() {
        let cache = ModelCache::new(
            RawExportSource::new("/nonexistent/datasets"),
            RecommenderConfig::default(),
        );

        let err = cache.get_or_build().unwrap_err();
        assert!(err.is_model_unavailable());
        assert!(cache.get_or_build().is_err());
        assert_eq!(cache.build_count(), 1);

        assert!(cache.reload().is_err());
        assert_eq!(cache.build_count(), 2);
    }
}
