//! Title Matcher - map a free-text query to a known title
//!
//! Matching is a case-insensitive substring test, not an edit distance:
//! "lord of the" matches "The Lord of the Rings". The first title in the
//! collection's iteration order wins, so callers pass sorted collections
//! to get a reproducible answer.

/// Return the first title whose lowercase form contains the lowercase query
pub fn find_best_match<'a, I>(query: &str, titles: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = query.to_lowercase();
    titles
        .into_iter()
        .find(|title| title.to_lowercase().contains(&query))
}

/// Like [`find_best_match`] but returns the position within `titles`
pub fn find_best_match_index(query: &str, titles: &[String]) -> Option<usize> {
    let query = query.to_lowercase();
    titles
        .iter()
        .position(|title| title.to_lowercase().contains(&query))
}

/// Every matching title, in iteration order, up to `limit`
pub fn find_all_matches<'a, I>(query: &str, titles: I, limit: usize) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = query.to_lowercase();
    titles
        .into_iter()
        .filter(|title| title.to_lowercase().contains(&query))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles() -> Vec<String> {
        vec![
            "Harry Potter and the Chamber of Secrets".to_string(),
            "Harry Potter and the Sorcerer's Stone".to_string(),
            "The Lord of the Rings".to_string(),
        ]
    }

    #[test]
    fn test_case_insensitive_substring() {
        let titles = titles();
        let found = find_best_match("LORD OF", titles.iter().map(String::as_str));
        assert_eq!(found, Some("The Lord of the Rings"));
    }

    #[test]
    fn test_first_match_wins() {
        let titles = titles();
        let found = find_best_match("harry potter", titles.iter().map(String::as_str));
        assert_eq!(found, Some("Harry Potter and the Chamber of Secrets"));
        assert_eq!(find_best_match_index("sorcerer", &titles), Some(1));
    }

    #[test]
    fn test_no_match() {
        let titles = titles();
        assert_eq!(
            find_best_match("ZZZQQQNOMATCH123", titles.iter().map(String::as_str)),
            None
        );
        assert_eq!(find_best_match_index("ZZZQQQNOMATCH123", &titles), None);
    }

    #[test]
    fn test_find_all_matches_limit() {
        let titles = titles();
        let all = find_all_matches("the", titles.iter().map(String::as_str), 2);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], "Harry Potter and the Chamber of Secrets");
    }
}
