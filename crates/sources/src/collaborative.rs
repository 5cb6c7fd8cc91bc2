//! Neighbor Model - item-based collaborative filtering
//!
//! "Readers who rated this book rated these books the same way."
//!
//! ## Algorithm
//! 1. Build the title x user [`RatingMatrix`] (popular titles only)
//! 2. Resolve the query to a row with the title matcher
//! 3. Brute-force cosine distance from that row to every row
//! 4. Take the n+1 closest rows, drop the query row, return n titles
//!
//! The search is exact: every row is compared. Ties on distance keep row
//! (alphabetical) order.

use crate::matcher::find_best_match_index;
use crate::matrix::{DEFAULT_MIN_RATINGS, RatingMatrix};
use crate::types::{Candidate, CandidateSource};
use data_loader::RatingsTable;
use rayon::prelude::*;
use tracing::{debug, instrument};

/// k-nearest-neighbor index over the rows of a rating matrix
#[derive(Debug, Clone, Default)]
pub struct NeighborModel {
    matrix: RatingMatrix,
}

impl NeighborModel {
    /// Fit the index over an existing matrix
    pub fn fit(matrix: RatingMatrix) -> Self {
        Self { matrix }
    }

    /// Build the matrix with the default threshold (50 ratings) and fit
    pub fn build(table: &RatingsTable) -> Self {
        Self::build_with_threshold(table, DEFAULT_MIN_RATINGS)
    }

    /// Build the matrix from titles with at least `min_ratings` ratings and fit
    pub fn build_with_threshold(table: &RatingsTable, min_ratings: u32) -> Self {
        Self::fit(RatingMatrix::build(table, min_ratings))
    }

    pub fn matrix(&self) -> &RatingMatrix {
        &self.matrix
    }

    /// The `k` rows closest to `row`, as `(row, distance)` ascending by distance
    ///
    /// The queried row itself is included (at distance 0 unless it is a
    /// zero row). `k` is clamped to the number of rows.
    pub fn kneighbors(&self, row: usize, k: usize) -> Vec<(usize, f32)> {
        let Some(query) = self.matrix.row(row) else {
            return Vec::new();
        };

        let mut distances: Vec<(usize, f32)> = self
            .matrix
            .rows()
            .par_iter()
            .enumerate()
            .map(|(idx, other)| (idx, query.cosine_distance(other)))
            .collect();

        // The query row always comes first, then ascending distance, then row order
        distances.sort_by(|a, b| {
            (a.0 != row)
                .cmp(&(b.0 != row))
                .then_with(|| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| a.0.cmp(&b.0))
        });
        distances.truncate(k);
        distances
    }

    /// Up to `n` titles closest to the best match for `title`
    ///
    /// Returns an empty list when no row label contains `title`. The matched
    /// title is never part of the result.
    #[instrument(skip(self))]
    pub fn recommend(&self, title: &str, n: usize) -> Vec<Candidate> {
        let Some(row) = find_best_match_index(title, self.matrix.titles()) else {
            debug!("No collaborative match for {:?}", title);
            return Vec::new();
        };
        debug!("Matched {:?} to row {:?}", title, self.matrix.titles()[row]);

        let candidates: Vec<Candidate> = self
            .kneighbors(row, n.saturating_add(1))
            .into_iter()
            .filter(|&(idx, _)| idx != row)
            .take(n)
            .map(|(idx, distance)| {
                Candidate::new(
                    self.matrix.titles()[idx].clone(),
                    CandidateSource::Collaborative,
                    1.0 - distance,
                )
            })
            .collect();

        debug!("Generated {} collaborative candidates", candidates.len());
        candidates
    }

    /// Titles only, closest first
    pub fn knn_recommend(&self, title: &str, n: usize) -> Vec<String> {
        crate::types::titles(self.recommend(title, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::RatingRecord;

    /// Four titles rated by five users.
    ///
    /// "Alpha Saga" and "Alpha Sequel" are rated identically, "Beta Book"
    /// overlaps partially, "Gamma Tale" is rated by a disjoint set of users.
    fn create_test_table() -> RatingsTable {
        let mut records = Vec::new();
        for user in 1..=3 {
            records.push(RatingRecord::new("Alpha Saga", user, 9));
            records.push(RatingRecord::new("Alpha Sequel", user, 9));
        }
        records.push(RatingRecord::new("Beta Book", 1, 8));
        records.push(RatingRecord::new("Beta Book", 4, 8));
        records.push(RatingRecord::new("Gamma Tale", 5, 7));
        records.push(RatingRecord::new("Gamma Tale", 6, 7));
        RatingsTable::from_records(records)
    }

    #[test]
    fn test_kneighbors_orders_by_distance() {
        let model = NeighborModel::build_with_threshold(&create_test_table(), 2);
        let saga = model.matrix().row_index("Alpha Saga").unwrap();

        let neighbors = model.kneighbors(saga, 4);
        let titles: Vec<&str> = neighbors
            .iter()
            .map(|&(idx, _)| model.matrix().titles()[idx].as_str())
            .collect();

        assert_eq!(titles, vec!["Alpha Saga", "Alpha Sequel", "Beta Book", "Gamma Tale"]);
        assert!(neighbors[1].1.abs() < 1e-6);
        assert!((neighbors[3].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_recommend_excludes_query_title() {
        let model = NeighborModel::build_with_threshold(&create_test_table(), 2);

        for title in model.matrix().titles().to_vec() {
            let recs = model.knn_recommend(&title, 5);
            assert!(!recs.contains(&title), "{} recommended itself", title);
        }
    }

    #[test]
    fn test_recommend_duplicate_vectors_still_exclude_self() {
        // "Alpha Sequel" sorts after "Alpha Saga" but has an identical row
        let model = NeighborModel::build_with_threshold(&create_test_table(), 2);
        let recs = model.knn_recommend("alpha sequel", 1);
        assert_eq!(recs, vec!["Alpha Saga".to_string()]);
    }

    #[test]
    fn test_recommend_no_match_is_empty() {
        let model = NeighborModel::build_with_threshold(&create_test_table(), 2);
        assert!(model.recommend("ZZZQQQNOMATCH123", 5).is_empty());
    }

    #[test]
    fn test_recommend_clamps_to_available_rows() {
        let model = NeighborModel::build_with_threshold(&create_test_table(), 2);
        let recs = model.recommend("Gamma", 10);
        assert_eq!(recs.len(), 3);
        assert!(recs.iter().all(|c| c.source == CandidateSource::Collaborative));
    }

    #[test]
    fn test_recommend_unbounded_n() {
        let model = NeighborModel::build_with_threshold(&create_test_table(), 2);
        let recs = model.knn_recommend("Alpha Saga", usize::MAX);
        assert_eq!(recs, vec!["Alpha Sequel", "Beta Book", "Gamma Tale"]);
    }

    #[test]
    fn test_threshold_excludes_rare_titles() {
        let model = NeighborModel::build_with_threshold(&create_test_table(), 3);
        assert_eq!(model.matrix().titles(), &["Alpha Saga".to_string(), "Alpha Sequel".to_string()]);
        assert!(model.recommend("Beta", 5).is_empty());
    }
}
