//! Core domain types for the Book-Crossing ratings dataset.
//!
//! The raw exports describe three tables (books, users, ratings). Everything
//! downstream of this crate only sees the denormalized [`RatingsTable`]:
//! one row per explicit rating, keyed by the book's title rather than its
//! ISBN, because several editions of the same book share one title.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user (the `User-ID` column)
pub type UserId = u32;

/// A book's ISBN exactly as it appears in the exports (may contain letters)
pub type Isbn = String;

/// Rating value on the 0-10 Book-Crossing scale
pub type RatingValue = u8;

/// The "no opinion" sentinel in the ratings export
pub const IMPLICIT_RATING: RatingValue = 0;

/// Highest rating a user can give
pub const MAX_RATING: RatingValue = 10;

// =============================================================================
// Raw Export Rows
// =============================================================================

/// A row of `Books.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub isbn: Isbn,
    pub title: String,
}

/// A row of `Users.csv`
///
/// Only the id takes part in the merge. Location and age feed the dataset
/// summary and are optional because some exports omit them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub location: Option<String>,
    /// `None` when the export has `NULL` or no age column
    pub age: Option<u16>,
}

/// A row of `Book-Ratings.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRating {
    pub user_id: UserId,
    pub isbn: Isbn,
    pub rating: RatingValue,
}

impl User {
    /// Last segment of `"city, state, country"`, if it names anything
    pub fn country(&self) -> Option<&str> {
        let country = self.location.as_deref()?.rsplit(',').next()?.trim();
        match country {
            "" | "n/a" => None,
            country => Some(country),
        }
    }
}

impl BookRating {
    /// True for a user-supplied rating (anything but the 0 sentinel)
    pub fn is_explicit(&self) -> bool {
        self.rating != IMPLICIT_RATING
    }
}

// =============================================================================
// Denormalized Table
// =============================================================================

/// One explicit rating joined with its book title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub title: String,
    pub user_id: UserId,
    pub rating: RatingValue,
}

impl RatingRecord {
    pub fn new(title: impl Into<String>, user_id: UserId, rating: RatingValue) -> Self {
        Self {
            title: title.into(),
            user_id,
            rating,
        }
    }
}

/// The cleaned ratings dataset consumed by every recommendation model.
///
/// Invariant: only explicit ratings are stored. [`RatingsTable::insert`]
/// silently drops the 0 sentinel, so the invariant holds no matter how the
/// table was assembled (raw merge, cache, or hand-built in tests).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingsTable {
    records: Vec<RatingRecord>,
}

impl RatingsTable {
    /// Creates a new, empty table
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Builds a table from arbitrary records, dropping implicit ratings
    pub fn from_records(records: impl IntoIterator<Item = RatingRecord>) -> Self {
        let mut table = Self::new();
        for record in records {
            table.insert(record);
        }
        table
    }

    /// Insert a record. Returns false (and stores nothing) for a 0 rating.
    pub fn insert(&mut self, record: RatingRecord) -> bool {
        if record.rating == IMPLICIT_RATING {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn records(&self) -> &[RatingRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &RatingRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of explicit ratings per title
    pub fn title_counts(&self) -> HashMap<&str, u32> {
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for record in &self.records {
            *counts.entry(record.title.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Titles with at least `min_ratings` explicit ratings, sorted
    pub fn titles_with_min_ratings(&self, min_ratings: u32) -> BTreeSet<&str> {
        self.title_counts()
            .into_iter()
            .filter(|&(_, count)| count >= min_ratings)
            .map(|(title, _)| title)
            .collect()
    }

    /// Get counts for debugging/validation: (ratings, distinct titles, distinct users)
    pub fn counts(&self) -> (usize, usize, usize) {
        let titles: BTreeSet<&str> = self.records.iter().map(|r| r.title.as_str()).collect();
        let users: BTreeSet<UserId> = self.records.iter().map(|r| r.user_id).collect();
        (self.records.len(), titles.len(), users.len())
    }

    /// Check every record is an explicit rating on the 1-10 scale
    pub fn validate(&self) -> crate::Result<()> {
        for record in &self.records {
            if record.rating == IMPLICIT_RATING || record.rating > MAX_RATING {
                return Err(crate::DataLoadError::InvalidValue {
                    field: "Book-Rating".to_string(),
                    value: record.rating.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<RatingRecord> for RatingsTable {
    fn from_iter<I: IntoIterator<Item = RatingRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}
