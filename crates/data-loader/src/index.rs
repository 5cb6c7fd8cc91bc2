//! Building the denormalized ratings table from the raw exports.
//!
//! - Parse the three exports in parallel
//! - Join books to ratings on ISBN, then to users on User-ID
//! - Keep explicit ratings only

use crate::error::Result;
use crate::parser::{self, BOOKS_FILE, RATINGS_FILE, USERS_FILE};
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;
use tracing::info;

impl RatingsTable {
    /// Load and merge the raw Book-Crossing exports from a directory
    ///
    /// Expects `Books.csv`, `Users.csv` and `Book-Ratings.csv` inside
    /// `data_dir`.
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading Book-Crossing exports from {:?}", data_dir);
        let start = Instant::now();

        let books_path = data_dir.join(BOOKS_FILE);
        let users_path = data_dir.join(USERS_FILE);
        let ratings_path = data_dir.join(RATINGS_FILE);

        // Nested joins give three-way parallelism
        let ((books, users), ratings) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_books_file(&books_path),
                    || parser::parse_users_file(&users_path),
                )
            },
            || parser::parse_ratings_file(&ratings_path),
        );

        let books = books?;
        let users = users?;
        let ratings = ratings?;

        info!(
            "Parsed {} books, {} users, {} ratings",
            books.len(),
            users.len(),
            ratings.len()
        );

        let table = Self::merge(&books, &users, ratings);
        table.validate()?;

        let (records, titles, rated_by) = table.counts();
        info!(
            "Ratings table built in {:.2?}: {} explicit ratings, {} titles, {} users",
            start.elapsed(),
            records,
            titles,
            rated_by
        );
        Ok(table)
    }

    /// Inner-join the three raw tables and keep explicit ratings
    ///
    /// A rating survives only if its ISBN is a known book and its user is a
    /// known user. An ISBN listed more than once in the books export yields
    /// one record per listing, as a relational join would.
    pub fn merge(books: &[Book], users: &[User], ratings: Vec<BookRating>) -> Self {
        let mut titles_by_isbn: HashMap<&str, Vec<&str>> = HashMap::new();
        for book in books {
            titles_by_isbn
                .entry(book.isbn.as_str())
                .or_default()
                .push(book.title.as_str());
        }

        let known_users: HashSet<UserId> = users.iter().map(|u| u.id).collect();

        let mut table = RatingsTable::new();
        for rating in ratings.into_iter().filter(BookRating::is_explicit) {
            if !known_users.contains(&rating.user_id) {
                continue;
            }
            let Some(titles) = titles_by_isbn.get(rating.isbn.as_str()) else {
                continue;
            };
            for title in titles {
                table.insert(RatingRecord::new(*title, rating.user_id, rating.rating));
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(isbn: &str, title: &str) -> Book {
        Book {
            isbn: isbn.to_string(),
            title: title.to_string(),
        }
    }

    fn user(id: UserId) -> User {
        User {
            id,
            location: None,
            age: None,
        }
    }

    fn rating(user_id: UserId, isbn: &str, value: RatingValue) -> BookRating {
        BookRating {
            user_id,
            isbn: isbn.to_string(),
            rating: value,
        }
    }

    #[test]
    fn test_merge_drops_implicit_and_unmatched() {
        let books = vec![book("A", "Dune"), book("B", "Emma")];
        let users = vec![user(1), user(2)];
        let ratings = vec![
            rating(1, "A", 8),
            rating(2, "A", 0),  // implicit
            rating(3, "B", 7),  // unknown user
            rating(1, "ZZ", 9), // unknown book
            rating(2, "B", 5),
        ];

        let table = RatingsTable::merge(&books, &users, ratings);

        assert_eq!(
            table.records(),
            &[RatingRecord::new("Dune", 1, 8), RatingRecord::new("Emma", 2, 5)]
        );
    }

    #[test]
    fn test_merge_duplicate_isbn_listing() {
        let books = vec![book("A", "Dune"), book("A", "Dune (Reissue)")];
        let users = vec![user(1)];
        let table = RatingsTable::merge(&books, &users, vec![rating(1, "A", 9)]);

        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_editions_share_title() {
        // Two ISBNs, one title: both ratings count toward the title
        let books = vec![book("A", "Dune"), book("B", "Dune")];
        let users = vec![user(1), user(2)];
        let table = RatingsTable::merge(
            &books,
            &users,
            vec![rating(1, "A", 9), rating(2, "B", 6)],
        );

        assert_eq!(table.title_counts().get("Dune"), Some(&2));
    }
}
