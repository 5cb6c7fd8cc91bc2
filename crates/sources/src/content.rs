//! Content Model - title text similarity
//!
//! "Books whose titles read like this one."
//!
//! ## Algorithm
//! 1. Corpus = distinct titles with at least `min_ratings` ratings, sorted
//! 2. TF-IDF vectorize the corpus (one vector per title)
//! 3. Precompute the full pairwise cosine similarity matrix
//! 4. Query: match the title, sort its similarity row descending, emit up
//!    to n titles other than the query, each title at most once

use crate::matcher::find_best_match_index;
use crate::tfidf::{TfidfVectorizer, cosine_similarity};
use crate::types::{Candidate, CandidateSource};
use data_loader::RatingsTable;
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Default minimum ratings for a title to join the content corpus
pub const DEFAULT_MIN_RATINGS: u32 = 80;

/// TF-IDF title corpus with precomputed similarities
#[derive(Debug, Clone, Default)]
pub struct ContentModel {
    titles: Vec<String>,
    vocabulary_size: usize,
    /// Row-major `titles.len()` x `titles.len()` cosine similarities
    similarity: Vec<f32>,
}

impl ContentModel {
    /// Build with the default threshold (80 ratings) and English stop words
    pub fn build(table: &RatingsTable) -> Self {
        Self::build_with(table, DEFAULT_MIN_RATINGS, &TfidfVectorizer::english())
    }

    /// Build from titles with at least `min_ratings` ratings
    pub fn build_with(
        table: &RatingsTable,
        min_ratings: u32,
        vectorizer: &TfidfVectorizer,
    ) -> Self {
        let titles: Vec<String> = table
            .titles_with_min_ratings(min_ratings)
            .into_iter()
            .map(str::to_string)
            .collect();
        Self::from_titles(titles, vectorizer)
    }

    /// Build directly from a corpus of titles (kept in the given order)
    pub fn from_titles(titles: Vec<String>, vectorizer: &TfidfVectorizer) -> Self {
        let tfidf = vectorizer.fit_transform(&titles);
        let vectors = tfidf.vectors();
        let n = titles.len();

        let similarity: Vec<f32> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| (0..n).map(move |j| cosine_similarity(&vectors[i], &vectors[j])))
            .collect();

        debug!(
            "Built content model: {} titles, vocabulary {}",
            n,
            tfidf.vocabulary_size()
        );

        Self {
            titles,
            vocabulary_size: tfidf.vocabulary_size(),
            similarity,
        }
    }

    /// Corpus titles in row order
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    /// Similarities of title `idx` to every corpus title
    pub fn similarity_row(&self, idx: usize) -> Option<&[f32]> {
        let n = self.titles.len();
        (idx < n).then(|| &self.similarity[idx * n..(idx + 1) * n])
    }

    /// Up to `n` titles most similar to the best match for `title`
    #[instrument(skip(self))]
    pub fn recommend(&self, title: &str, n: usize) -> Vec<Candidate> {
        let Some(idx) = find_best_match_index(title, &self.titles) else {
            debug!("No content match for {:?}", title);
            return Vec::new();
        };
        let Some(row) = self.similarity_row(idx) else {
            return Vec::new();
        };
        let matched = self.titles[idx].as_str();

        let mut order: Vec<usize> = (0..row.len()).collect();
        // Stable sort: equal similarities keep corpus order
        order.sort_by(|&a, &b| {
            row[b]
                .partial_cmp(&row[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut seen: HashSet<&str> = HashSet::new();
        let mut candidates = Vec::new();
        for i in order {
            if candidates.len() >= n {
                break;
            }
            let candidate = self.titles[i].as_str();
            if candidate == matched || !seen.insert(candidate) {
                continue;
            }
            candidates.push(Candidate::new(candidate, CandidateSource::Content, row[i]));
        }

        debug!("Generated {} content candidates", candidates.len());
        candidates
    }

    /// Titles only, most similar first
    pub fn content_recommend(&self, title: &str, n: usize) -> Vec<String> {
        crate::types::titles(self.recommend(title, n))
    }
}
