//! Recommender configuration.
//!
//! Defaults reproduce the production settings: 50 ratings for a title to
//! enter the rating matrix, 80 to enter the content corpus, five candidates
//! per source, ten recommendations per request.

use sources::{content, matrix};

/// Position-based weights: `start` for the first item, `step` less for each
/// following item, never below zero
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightSchedule {
    pub start: f64,
    pub step: f64,
}

impl WeightSchedule {
    pub const fn new(start: f64, step: f64) -> Self {
        Self { start, step }
    }

    /// Weight of the item at `position` (0-based)
    pub fn weight(&self, position: usize) -> f64 {
        (self.start - self.step * position as f64).max(0.0)
    }
}

/// Everything tunable about model construction and blending
#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderConfig {
    /// Minimum ratings for a title to get a rating-matrix row
    pub knn_min_ratings: u32,
    /// Minimum ratings for a title to join the content corpus
    pub content_min_ratings: u32,
    /// Candidates requested from each source per recommendation
    pub per_source_limit: usize,
    /// Recommendations returned when the caller does not ask for a count
    pub default_limit: usize,
    pub neighbor_weights: WeightSchedule,
    pub content_weights: WeightSchedule,
    pub popularity_weights: WeightSchedule,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            knn_min_ratings: matrix::DEFAULT_MIN_RATINGS,
            content_min_ratings: content::DEFAULT_MIN_RATINGS,
            per_source_limit: 5,
            default_limit: 10,
            neighbor_weights: WeightSchedule::new(1.0, 0.1),
            content_weights: WeightSchedule::new(1.0, 0.1),
            popularity_weights: WeightSchedule::new(0.5, 0.05),
        }
    }
}

impl RecommenderConfig {
    /// Configure the rating-matrix threshold (default: 50)
    pub fn with_knn_min_ratings(mut self, min: u32) -> Self {
        self.knn_min_ratings = min;
        self
    }

    /// Configure the content-corpus threshold (default: 80)
    pub fn with_content_min_ratings(mut self, min: u32) -> Self {
        self.content_min_ratings = min;
        self
    }

    /// Configure candidates per source (default: 5)
    pub fn with_per_source_limit(mut self, limit: usize) -> Self {
        self.per_source_limit = limit;
        self
    }

    /// Configure the default number of recommendations (default: 10)
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_schedules() {
        let config = RecommenderConfig::default();

        let knn: Vec<f64> = (0..5).map(|i| config.neighbor_weights.weight(i)).collect();
        for (w, expected) in knn.iter().zip([1.0, 0.9, 0.8, 0.7, 0.6]) {
            assert!(approx(*w, expected));
        }

        let popular: Vec<f64> = (0..5).map(|i| config.popularity_weights.weight(i)).collect();
        for (w, expected) in popular.iter().zip([0.5, 0.45, 0.4, 0.35, 0.3]) {
            assert!(approx(*w, expected));
        }
    }

    #[test]
    fn test_weight_never_negative() {
        assert_eq!(WeightSchedule::new(1.0, 0.1).weight(20), 0.0);
    }

    #[test]
    fn test_builder() {
        let config = RecommenderConfig::default()
            .with_knn_min_ratings(5)
            .with_content_min_ratings(8)
            .with_default_limit(3);

        assert_eq!(config.knn_min_ratings, 5);
        assert_eq!(config.content_min_ratings, 8);
        assert_eq!(config.default_limit, 3);
        assert_eq!(config.per_source_limit, 5);
    }
}
