//! Rating Matrix - sparse title x user ratings
//!
//! Rows are titles with at least `min_ratings` explicit ratings, sorted
//! lexicographically; columns are the users who rated any of those titles,
//! sorted by id. A cell is the user's rating of the title, or 0 ("no
//! signal") when absent. If one user rated several editions sharing a
//! title, the cell is the mean of those ratings.
//!
//! Each row is stored as its non-zero `(column, value)` pairs in column
//! order, with the L2 norm precomputed for cosine distance.

use data_loader::{RatingsTable, UserId};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Default minimum ratings for a title to get a matrix row
pub const DEFAULT_MIN_RATINGS: u32 = 50;

/// One title's ratings
#[derive(Debug, Clone, PartialEq)]
pub struct SparseRow {
    entries: Vec<(usize, f32)>,
    norm: f32,
}

impl SparseRow {
    fn new(entries: Vec<(usize, f32)>) -> Self {
        let norm = entries.iter().map(|&(_, v)| v * v).sum::<f32>().sqrt();
        Self { entries, norm }
    }

    /// Non-zero cells as `(column, rating)`, ascending by column
    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    pub fn norm(&self) -> f32 {
        self.norm
    }

    /// Dot product of two column-sorted rows
    pub fn dot(&self, other: &SparseRow) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_col, a_val) = self.entries[i];
            let (b_col, b_val) = other.entries[j];
            match a_col.cmp(&b_col) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_val * b_val;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Cosine distance `1 - cos(a, b)`; a zero row is at distance 1 from everything
    pub fn cosine_distance(&self, other: &SparseRow) -> f32 {
        if self.norm == 0.0 || other.norm == 0.0 {
            return 1.0;
        }
        let similarity = (self.dot(other) / (self.norm * other.norm)).clamp(-1.0, 1.0);
        1.0 - similarity
    }
}

/// Sparse title x user rating matrix
#[derive(Debug, Clone, Default)]
pub struct RatingMatrix {
    titles: Vec<String>,
    users: Vec<UserId>,
    rows: Vec<SparseRow>,
}

impl RatingMatrix {
    /// Build the matrix from titles with at least `min_ratings` explicit ratings
    pub fn build(table: &RatingsTable, min_ratings: u32) -> Self {
        let kept = table.titles_with_min_ratings(min_ratings);

        let titles: Vec<String> = kept.iter().map(|t| t.to_string()).collect();
        let row_of: HashMap<&str, usize> = kept
            .iter()
            .enumerate()
            .map(|(idx, &title)| (title, idx))
            .collect();

        // (sum, count) per cell so repeated ratings average out
        let mut cells: Vec<BTreeMap<UserId, (f32, u32)>> = vec![BTreeMap::new(); titles.len()];
        for record in table.iter() {
            if let Some(&row) = row_of.get(record.title.as_str()) {
                let cell = cells[row].entry(record.user_id).or_insert((0.0, 0));
                cell.0 += record.rating as f32;
                cell.1 += 1;
            }
        }

        let mut users: Vec<UserId> = cells.iter().flat_map(|row| row.keys().copied()).collect();
        users.sort_unstable();
        users.dedup();
        let column_of: HashMap<UserId, usize> = users
            .iter()
            .enumerate()
            .map(|(idx, &user)| (user, idx))
            .collect();

        // BTreeMap iteration is by user id, which is column order
        let rows: Vec<SparseRow> = cells
            .into_iter()
            .map(|row| {
                SparseRow::new(
                    row.into_iter()
                        .map(|(user, (sum, count))| (column_of[&user], sum / count as f32))
                        .collect(),
                )
            })
            .collect();

        debug!(
            "Built rating matrix: {} titles x {} users (threshold {})",
            titles.len(),
            users.len(),
            min_ratings
        );

        Self {
            titles,
            users,
            rows,
        }
    }

    /// Row labels, sorted
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// Column labels, ascending
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.titles.len(), self.users.len())
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn row(&self, idx: usize) -> Option<&SparseRow> {
        self.rows.get(idx)
    }

    pub fn rows(&self) -> &[SparseRow] {
        &self.rows
    }

    /// Exact-title row lookup
    pub fn row_index(&self, title: &str) -> Option<usize> {
        self.titles
            .binary_search_by(|t| t.as_str().cmp(title))
            .ok()
    }

    /// Dense cell value (0.0 when the user did not rate the title)
    pub fn get(&self, title: &str, user: UserId) -> f32 {
        let (Some(row), Ok(col)) = (self.row_index(title), self.users.binary_search(&user)) else {
            return 0.0;
        };
        self.rows[row]
            .entries
            .binary_search_by_key(&col, |&(c, _)| c)
            .map(|pos| self.rows[row].entries[pos].1)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::RatingRecord;

    fn table() -> RatingsTable {
        RatingsTable::from_records(vec![
            RatingRecord::new("Emma", 3, 8),
            RatingRecord::new("Emma", 1, 6),
            RatingRecord::new("Dune", 2, 9),
            RatingRecord::new("Dune", 1, 7),
            RatingRecord::new("Dune", 1, 9), // second edition, same user
            RatingRecord::new("Rare", 4, 10),
        ])
    }

    #[test]
    fn test_threshold_and_order() {
        let matrix = RatingMatrix::build(&table(), 2);

        assert_eq!(matrix.titles(), &["Dune".to_string(), "Emma".to_string()]);
        // user 4 only rated the filtered-out title
        assert_eq!(matrix.users(), &[1, 2, 3]);
        assert_eq!(matrix.shape(), (2, 3));
    }

    #[test]
    fn test_cells_and_mean() {
        let matrix = RatingMatrix::build(&table(), 2);

        assert_eq!(matrix.get("Dune", 1), 8.0);
        assert_eq!(matrix.get("Dune", 2), 9.0);
        assert_eq!(matrix.get("Dune", 3), 0.0);
        assert_eq!(matrix.get("Emma", 3), 8.0);
        assert_eq!(matrix.get("Rare", 4), 0.0);
    }

    #[test]
    fn test_cosine_distance() {
        let a = SparseRow::new(vec![(0, 1.0), (2, 1.0)]);
        let b = SparseRow::new(vec![(0, 2.0), (2, 2.0)]);
        let c = SparseRow::new(vec![(1, 5.0)]);
        let zero = SparseRow::new(vec![]);

        assert!(a.cosine_distance(&b).abs() < 1e-6);
        assert!((a.cosine_distance(&c) - 1.0).abs() < 1e-6);
        assert_eq!(a.cosine_distance(&zero), 1.0);
    }

    #[test]
    fn test_empty_table() {
        let matrix = RatingMatrix::build(&RatingsTable::new(), DEFAULT_MIN_RATINGS);
        assert!(matrix.is_empty());
        assert_eq!(matrix.shape(), (0, 0));
    }
}
