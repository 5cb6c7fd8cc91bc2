//! # Hybrid Aggregation
//!
//! Blends the ranked lists of the three sources into one list.
//!
//! Each source contributes a position-based weight per title (see
//! [`WeightSchedule`]); weights for a title recommended by several sources
//! add up. The blend is sorted by total score descending with a stable sort,
//! so equal totals keep first-insertion order: neighbor titles first, then
//! content titles, then popular titles, each in its source's own order.
//!
//! Raw source scores (distances, similarities, counts) are ignored; only
//! rank position counts.

use crate::config::{RecommenderConfig, WeightSchedule};
use sources::{Candidate, CandidateSource};
use std::collections::HashMap;

/// A blended recommendation
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTitle {
    pub title: String,
    pub score: f64,
    /// Sources that recommended this title, in contribution order
    pub sources: Vec<CandidateSource>,
}

/// Title -> accumulated weight, remembering first-insertion order
#[derive(Debug, Default)]
pub struct ScoreAccumulator {
    entries: Vec<ScoredTitle>,
    index: HashMap<String, usize>,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one weight for `title` from `source`
    pub fn add(&mut self, title: &str, weight: f64, source: CandidateSource) {
        match self.index.get(title) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                entry.score += weight;
                if !entry.sources.contains(&source) {
                    entry.sources.push(source);
                }
            }
            None => {
                self.index.insert(title.to_string(), self.entries.len());
                self.entries.push(ScoredTitle {
                    title: title.to_string(),
                    score: weight,
                    sources: vec![source],
                });
            }
        }
    }

    /// Add a whole ranked list, weighting by position
    pub fn add_ranked(&mut self, candidates: &[Candidate], schedule: WeightSchedule) {
        for (position, candidate) in candidates.iter().enumerate() {
            self.add(&candidate.title, schedule.weight(position), candidate.source);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest `n` totals, ties in insertion order
    pub fn into_ranked(self, n: usize) -> Vec<ScoredTitle> {
        let mut ranked = self.entries;
        // sort_by is stable
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(n);
        ranked
    }
}

/// Blend the three ranked candidate lists and keep the top `n`
pub fn blend(
    neighbors: &[Candidate],
    content: &[Candidate],
    popular: &[Candidate],
    config: &RecommenderConfig,
    n: usize,
) -> Vec<ScoredTitle> {
    let mut acc = ScoreAccumulator::new();
    acc.add_ranked(neighbors, config.neighbor_weights);
    acc.add_ranked(content, config.content_weights);
    acc.add_ranked(popular, config.popularity_weights);
    acc.into_ranked(n)
}
