//! # Data Loader Crate
//!
//! This crate turns the Book-Crossing exports into the cleaned ratings table
//! every recommendation model is built from.
//!
//! ## Main Components
//!
//! - **types**: Raw export rows (Book, User, BookRating) and the denormalized
//!   RatingsTable
//! - **parser**: Parse the `;` separated Latin-1 CSV exports
//! - **index**: Join books, users and ratings; drop implicit ratings
//! - **cache**: Write/read the prepared table as JSON
//! - **source**: The RatingsSource seam (raw exports, cache, in-memory)
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{RatingsSource, RawExportSource};
//!
//! let table = RawExportSource::new("Datasets").load()?;
//! let (ratings, titles, users) = table.counts();
//! println!("{} ratings of {} titles by {} users", ratings, titles, users);
//! ```

pub mod cache;
pub mod error;
pub mod index;
pub mod parser;
pub mod source;
pub mod types;

pub use cache::{prepare, read_cache, write_cache};
pub use error::{DataLoadError, Result};
pub use source::{CacheSource, RatingsSource, RawExportSource};
pub use types::{
    Book, BookRating, Isbn, RatingRecord, RatingValue, RatingsTable, User, UserId,
    IMPLICIT_RATING, MAX_RATING,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratings_table_creation() {
        let table = RatingsTable::new();
        let (ratings, titles, users) = table.counts();

        assert_eq!(ratings, 0);
        assert_eq!(titles, 0);
        assert_eq!(users, 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_insert_drops_implicit_rating() {
        let mut table = RatingsTable::new();

        assert!(table.insert(RatingRecord::new("Dune", 1, 8)));
        assert!(!table.insert(RatingRecord::new("Dune", 2, IMPLICIT_RATING)));

        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].user_id, 1);
    }

    #[test]
    fn test_title_counts_and_threshold() {
        let table: RatingsTable = vec![
            RatingRecord::new("Dune", 1, 8),
            RatingRecord::new("Dune", 2, 6),
            RatingRecord::new("Dune", 3, 9),
            RatingRecord::new("Emma", 1, 7),
        ]
        .into_iter()
        .collect();

        let counts = table.title_counts();
        assert_eq!(counts["Dune"], 3);
        assert_eq!(counts["Emma"], 1);

        let popular: Vec<&str> = table.titles_with_min_ratings(2).into_iter().collect();
        assert_eq!(popular, vec!["Dune"]);
        assert_eq!(table.counts(), (4, 2, 3));
    }

    #[test]
    fn test_in_memory_source() {
        let table = RatingsTable::from_records(vec![RatingRecord::new("Dune", 1, 8)]);
        let loaded = table.load().unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        // Built through serde to bypass insert()
        let table: RatingsTable =
            serde_json::from_str(r#"[{"title":"Dune","user_id":1,"rating":42}]"#).unwrap();
        assert!(table.validate().is_err());
    }
}
