//! Parser for the Book-Crossing CSV exports.
//!
//! The three files share one dialect:
//! - `;` separated, fields wrapped in double quotes
//! - ISO-8859-1 (Latin-1) encoded
//! - a header row naming the columns
//!
//! - Books.csv: "ISBN";"Book-Title";"Book-Author";...;"Image-URL-L"
//! - Users.csv: "User-ID";"Location";"Age"
//! - Book-Ratings.csv: "User-ID";"ISBN";"Book-Rating"
//!
//! Columns are located by header name, so extra or reordered columns are
//! fine. A row whose field count differs from the header is a "bad line"
//! and is skipped; a row with the right shape but an unparsable id or rating
//! is a hard [`DataLoadError::ParseError`].

use crate::error::{DataLoadError, Result};
use crate::types::*;
use csv::{ByteRecord, ReaderBuilder};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, warn};

pub const BOOKS_FILE: &str = "Books.csv";
pub const USERS_FILE: &str = "Users.csv";
pub const RATINGS_FILE: &str = "Book-Ratings.csv";

/// Convert ISO-8859-1 bytes to a String
///
/// Every Latin-1 byte maps directly to the Unicode code point of the same
/// value, so this conversion never fails.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Open a data file, reporting a missing file by path
fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

fn find_column(headers: &ByteRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| decode_latin1(h).trim() == name)
}

fn require_column(headers: &ByteRecord, file: &str, name: &str) -> Result<usize> {
    find_column(headers, name).ok_or_else(|| DataLoadError::MissingColumn {
        file: file.to_string(),
        column: name.to_string(),
    })
}

/// Walk every well-formed row of a `;` separated export.
///
/// `visit` receives the raw record and its 1-based line number. Rows with
/// the wrong number of fields are skipped and counted.
fn for_each_row<R: Read>(
    reader: R,
    file: &str,
    mut visit: impl FnMut(&ByteRecord, &ByteRecord, u64) -> Result<()>,
) -> Result<()> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.byte_headers()?.clone();
    let expected = headers.len();
    let mut skipped = 0usize;

    for (idx, record) in csv_reader.byte_records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 2);

        if record.len() != expected {
            debug!(
                "Skipping bad line {} in {}: expected {} fields, found {}",
                line,
                file,
                expected,
                record.len()
            );
            skipped += 1;
            continue;
        }

        visit(&headers, &record, line)?;
    }

    if skipped > 0 {
        warn!("Skipped {} malformed lines in {}", skipped, file);
    }
    Ok(())
}

fn field(record: &ByteRecord, idx: usize) -> String {
    record.get(idx).map(decode_latin1).unwrap_or_default()
}

fn parse_number<T: std::str::FromStr>(value: &str, file: &str, line: u64, name: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Invalid {}: {} ({})", name, value, e),
    })
}

/// Parse the books export
///
/// Only ISBN and title are kept; author, publisher and the image URL
/// columns play no part in recommendations.
pub fn parse_books<R: Read>(reader: R) -> Result<Vec<Book>> {
    let mut books = Vec::new();
    let mut columns: Option<(usize, usize)> = None;

    for_each_row(reader, BOOKS_FILE, |headers, record, _line| {
        let (isbn_col, title_col) = match columns {
            Some(cols) => cols,
            None => {
                let cols = (
                    require_column(headers, BOOKS_FILE, "ISBN")?,
                    require_column(headers, BOOKS_FILE, "Book-Title")?,
                );
                columns = Some(cols);
                cols
            }
        };

        books.push(Book {
            isbn: field(record, isbn_col),
            title: field(record, title_col),
        });
        Ok(())
    })?;

    Ok(books)
}

/// Parse the users export
pub fn parse_users<R: Read>(reader: R) -> Result<Vec<User>> {
    let mut users = Vec::new();
    let mut columns: Option<(usize, Option<usize>, Option<usize>)> = None;

    for_each_row(reader, USERS_FILE, |headers, record, line| {
        let (id_col, location_col, age_col) = match columns {
            Some(cols) => cols,
            None => {
                let cols = (
                    require_column(headers, USERS_FILE, "User-ID")?,
                    find_column(headers, "Location"),
                    find_column(headers, "Age"),
                );
                columns = Some(cols);
                cols
            }
        };

        let user = User {
            id: parse_number(&field(record, id_col), USERS_FILE, line, "User-ID")?,
            location: location_col.map(|col| field(record, col)),
            // "NULL" and other junk ages are treated as unknown
            age: age_col.and_then(|col| field(record, col).trim().parse().ok()),
        };
        users.push(user);
        Ok(())
    })?;

    Ok(users)
}

/// Parse the ratings export
///
/// Implicit (0) ratings are still returned here; the merge step drops them.
pub fn parse_ratings<R: Read>(reader: R) -> Result<Vec<BookRating>> {
    let mut ratings = Vec::new();
    let mut columns: Option<(usize, usize, usize)> = None;

    for_each_row(reader, RATINGS_FILE, |headers, record, line| {
        let (user_col, isbn_col, rating_col) = match columns {
            Some(cols) => cols,
            None => {
                let cols = (
                    require_column(headers, RATINGS_FILE, "User-ID")?,
                    require_column(headers, RATINGS_FILE, "ISBN")?,
                    require_column(headers, RATINGS_FILE, "Book-Rating")?,
                );
                columns = Some(cols);
                cols
            }
        };

        let rating: RatingValue =
            parse_number(&field(record, rating_col), RATINGS_FILE, line, "Book-Rating")?;
        if rating > MAX_RATING {
            return Err(DataLoadError::InvalidValue {
                field: "Book-Rating".to_string(),
                value: rating.to_string(),
            });
        }

        ratings.push(BookRating {
            user_id: parse_number(&field(record, user_col), RATINGS_FILE, line, "User-ID")?,
            isbn: field(record, isbn_col),
            rating,
        });
        Ok(())
    })?;

    Ok(ratings)
}

pub fn parse_books_file(path: &Path) -> Result<Vec<Book>> {
    parse_books(open_file(path)?)
}

pub fn parse_users_file(path: &Path) -> Result<Vec<User>> {
    parse_users(open_file(path)?)
}

pub fn parse_ratings_file(path: &Path) -> Result<Vec<BookRating>> {
    parse_ratings(open_file(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_latin1() {
        // 0xE9 is 'é' in ISO-8859-1 but invalid as a lone UTF-8 byte
        assert_eq!(decode_latin1(b"Caf\xE9"), "Café");
    }

    #[test]
    fn test_parse_books_keeps_isbn_and_title() {
        let data = "\"ISBN\";\"Book-Title\";\"Book-Author\"\n\
                    \"0195153448\";\"Classical Mythology\";\"Mark P. O. Morford\"\n\
                    \"0002005018\";\"Clara Callan\";\"Richard Bruce Wright\"\n";

        let books = parse_books(data.as_bytes()).unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].isbn, "0195153448");
        assert_eq!(books[0].title, "Classical Mythology");
        assert_eq!(books[1].title, "Clara Callan");
    }

    #[test]
    fn test_parse_books_skips_bad_lines() {
        let data = "\"ISBN\";\"Book-Title\";\"Book-Author\"\n\
                    \"1\";\"Good Row\";\"Someone\"\n\
                    \"2\";\"Too\";\"Many\";\"Fields\"\n\
                    \"3\";\"Another Good Row\";\"Someone Else\"\n";

        let books = parse_books(data.as_bytes()).unwrap();
        let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Good Row", "Another Good Row"]);
    }

    #[test]
    fn test_parse_books_missing_title_column() {
        let data = "\"ISBN\";\"Book-Author\"\n\"1\";\"Someone\"\n";
        let err = parse_books(data.as_bytes()).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn { ref column, .. } if column == "Book-Title"));
    }

    #[test]
    fn test_parse_users_null_age() {
        let data = "\"User-ID\";\"Location\";\"Age\"\n\
                    \"1\";\"nyc, new york, usa\";NULL\n\
                    \"2\";\"stockton, california, usa\";\"18\"\n";

        let users = parse_users(data.as_bytes()).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].age, None);
        assert_eq!(users[1].age, Some(18));
        assert_eq!(users[1].location.as_deref(), Some("stockton, california, usa"));
    }

    #[test]
    fn test_parse_ratings() {
        let data = "\"User-ID\";\"ISBN\";\"Book-Rating\"\n\
                    \"276725\";\"034545104X\";\"0\"\n\
                    \"276726\";\"0155061224\";\"5\"\n";

        let ratings = parse_ratings(data.as_bytes()).unwrap();
        assert_eq!(ratings.len(), 2);
        assert!(!ratings[0].is_explicit());
        assert_eq!(ratings[1].user_id, 276726);
        assert_eq!(ratings[1].rating, 5);
    }

    #[test]
    fn test_parse_ratings_rejects_garbage_rating() {
        let data = "\"User-ID\";\"ISBN\";\"Book-Rating\"\n\"1\";\"X\";\"great\"\n";
        let err = parse_ratings(data.as_bytes()).unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { line: 2, .. }));
    }

    #[test]
    fn test_parse_ratings_rejects_out_of_range() {
        let data = "\"User-ID\";\"ISBN\";\"Book-Rating\"\n\"1\";\"X\";\"11\"\n";
        let err = parse_ratings(data.as_bytes()).unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidValue { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_books_file(Path::new("/definitely/not/here/Books.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }
}
