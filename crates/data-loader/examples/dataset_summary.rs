//! Summarize a Book-Crossing export directory.
//!
//! Run with: cargo run -p data-loader --example dataset_summary -- Datasets

use data_loader::parser::{self, parse_books_file, parse_ratings_file, parse_users_file};
use data_loader::{RatingsTable, User};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Instant;

fn main() -> data_loader::Result<()> {
    let data_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "Datasets".into()));
    let start = Instant::now();

    let books = parse_books_file(&data_dir.join(parser::BOOKS_FILE))?;
    let users = parse_users_file(&data_dir.join(parser::USERS_FILE))?;
    let ratings = parse_ratings_file(&data_dir.join(parser::RATINGS_FILE))?;

    println!("=== Exports in {} ===", data_dir.display());
    println!("Books:   {}", books.len());
    println!("Users:   {}", users.len());
    println!("Ratings: {}", ratings.len());

    let known_isbns: HashSet<&str> = books.iter().map(|b| b.isbn.as_str()).collect();
    let implicit = ratings.iter().filter(|r| !r.is_explicit()).count();
    let unknown_isbn = ratings
        .iter()
        .filter(|r| !known_isbns.contains(r.isbn.as_str()))
        .count();
    println!("  implicit (0) ratings:   {}", implicit);
    println!("  ratings of unknown ISBN: {}", unknown_isbn);

    print_demographics(&users);

    let table = RatingsTable::merge(&books, &users, ratings);
    let (kept, titles, raters) = table.counts();

    println!("\n=== Merged Table ===");
    println!("{} explicit ratings of {} titles by {} readers", kept, titles, raters);
    for threshold in [50, 80] {
        println!(
            "Titles with >= {} ratings: {}",
            threshold,
            table.titles_with_min_ratings(threshold).len()
        );
    }
    println!("\nDone in {:.2?}", start.elapsed());
    Ok(())
}

fn print_demographics(users: &[User]) {
    let mut ages: Vec<u16> = users.iter().filter_map(|u| u.age).collect();
    ages.sort_unstable();

    println!("\n=== Readers ===");
    if users.is_empty() {
        println!("No users");
        return;
    }
    println!(
        "Known age: {:.1}%",
        100.0 * ages.len() as f64 / users.len() as f64
    );
    if let Some(median) = ages.get(ages.len() / 2) {
        println!("Median age: {}", median);
    }

    let mut countries: HashMap<&str, usize> = HashMap::new();
    for country in users.iter().filter_map(User::country) {
        *countries.entry(country).or_insert(0) += 1;
    }
    let mut countries: Vec<(&str, usize)> = countries.into_iter().collect();
    countries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    println!("Top countries:");
    for (country, count) in countries.iter().take(5) {
        println!("  {:<20} {}", country, count);
    }
}
