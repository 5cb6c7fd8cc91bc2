//! Popularity Ranker - most-rated titles overall
//!
//! Counts explicit ratings per title over the whole table (no threshold).
//! Ties on count are broken alphabetically so the ranking never depends on
//! hash or load order.

use crate::types::{Candidate, CandidateSource};
use data_loader::RatingsTable;
use std::collections::HashMap;
use tracing::instrument;

/// Titles ranked by rating count
#[derive(Debug, Clone, Default)]
pub struct PopularityRanker {
    /// `(title, count)` by count DESC, then title ASC
    ranked: Vec<(String, u32)>,
    counts: HashMap<String, u32>,
}

impl PopularityRanker {
    pub fn build(table: &RatingsTable) -> Self {
        let mut ranked: Vec<(String, u32)> = table
            .title_counts()
            .into_iter()
            .map(|(title, count)| (title.to_string(), count))
            .collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let counts = ranked.iter().cloned().collect();
        Self { ranked, counts }
    }

    /// The `n` most-rated titles, with their counts as base scores
    #[instrument(skip(self))]
    pub fn recommend(&self, n: usize) -> Vec<Candidate> {
        self.ranked
            .iter()
            .take(n)
            .map(|(title, count)| Candidate::new(title.clone(), CandidateSource::Popularity, *count as f32))
            .collect()
    }

    /// Titles only, most rated first
    pub fn popularity_based(&self, n: usize) -> Vec<String> {
        self.ranked.iter().take(n).map(|(title, _)| title.clone()).collect()
    }

    /// Explicit rating count for an exact title (0 if unknown)
    pub fn rating_count(&self, title: &str) -> u32 {
        self.counts.get(title).copied().unwrap_or(0)
    }

    /// All titles in rank order
    pub fn ranked(&self) -> &[(String, u32)] {
        &self.ranked
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}
