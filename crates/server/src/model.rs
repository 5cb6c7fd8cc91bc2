//! The built recommender: three sources plus the blend.

use crate::config::RecommenderConfig;
use crate::hybrid::{self, ScoredTitle};
use data_loader::RatingsTable;
use sources::{ContentModel, NeighborModel, PopularityRanker, TfidfVectorizer};
use std::time::Instant;
use tracing::{debug, info};

/// Size summary of a built model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelStats {
    pub ratings: usize,
    pub titles: usize,
    pub users: usize,
    /// Rating matrix `(titles, users)`
    pub matrix_shape: (usize, usize),
    pub corpus_size: usize,
    pub vocabulary_size: usize,
}

/// Immutable, shareable recommender built from one ratings table
#[derive(Debug)]
pub struct RecommenderModel {
    neighbors: NeighborModel,
    content: ContentModel,
    popularity: PopularityRanker,
    config: RecommenderConfig,
    stats: ModelStats,
}

impl RecommenderModel {
    /// Build all three sources, in parallel
    pub fn build(table: &RatingsTable, config: &RecommenderConfig) -> Self {
        let start = Instant::now();
        let vectorizer = TfidfVectorizer::english();

        let ((neighbors, content), popularity) = rayon::join(
            || {
                rayon::join(
                    || NeighborModel::build_with_threshold(table, config.knn_min_ratings),
                    || ContentModel::build_with(table, config.content_min_ratings, &vectorizer),
                )
            },
            || PopularityRanker::build(table),
        );

        let (ratings, titles, users) = table.counts();
        let stats = ModelStats {
            ratings,
            titles,
            users,
            matrix_shape: neighbors.matrix().shape(),
            corpus_size: content.titles().len(),
            vocabulary_size: content.vocabulary_size(),
        };

        info!(
            "Built recommender in {:.2?}: {} ratings, matrix {}x{}, corpus {} titles",
            start.elapsed(),
            stats.ratings,
            stats.matrix_shape.0,
            stats.matrix_shape.1,
            stats.corpus_size
        );

        Self {
            neighbors,
            content,
            popularity,
            config: config.clone(),
            stats,
        }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    pub fn stats(&self) -> ModelStats {
        self.stats
    }

    pub fn neighbors(&self) -> &NeighborModel {
        &self.neighbors
    }

    pub fn content(&self) -> &ContentModel {
        &self.content
    }

    pub fn popularity(&self) -> &PopularityRanker {
        &self.popularity
    }

    pub fn knn_recommend(&self, title: &str, n: usize) -> Vec<String> {
        self.neighbors.knn_recommend(title, n)
    }

    pub fn content_recommend(&self, title: &str, n: usize) -> Vec<String> {
        self.content.content_recommend(title, n)
    }

    pub fn popularity_based(&self, n: usize) -> Vec<String> {
        self.popularity.popularity_based(n)
    }

    /// Blended recommendations with scores and contributing sources
    pub fn recommend_scored(&self, title: &str, n: usize) -> Vec<ScoredTitle> {
        let per_source = self.config.per_source_limit;

        let neighbors = self.neighbors.recommend(title, per_source);
        let content = self.content.recommend(title, per_source);
        let popular = self.popularity.recommend(per_source);
        debug!(
            "Candidates for {:?}: {} neighbor, {} content, {} popular",
            title,
            neighbors.len(),
            content.len(),
            popular.len()
        );

        hybrid::blend(&neighbors, &content, &popular, &self.config, n)
    }

    /// Blended recommendation titles, best first
    pub fn recommend_books(&self, title: &str, n: usize) -> Vec<String> {
        self.recommend_scored(title, n)
            .into_iter()
            .map(|scored| scored.title)
            .collect()
    }
}
