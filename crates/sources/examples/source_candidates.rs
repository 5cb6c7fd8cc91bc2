//! Example: candidates from each recommendation source
//!
//! Run with: cargo run --package sources --example source_candidates -- "Lovely Bones"
//!
//! This example shows how to:
//! 1. Load the Book-Crossing exports
//! 2. Build the neighbor, content and popularity models
//! 3. Print what each source suggests for a title

use data_loader::{RatingsSource, RawExportSource};
use sources::{ContentModel, NeighborModel, PopularityRanker};
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let title = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "The Lovely Bones".to_string());

    println!("=== Book Recommendation Sources Example ===\n");

    let start = Instant::now();
    let table = RawExportSource::new("Datasets").load()?;
    println!("Loaded {} ratings in {:?}\n", table.len(), start.elapsed());

    let start = Instant::now();
    let knn = NeighborModel::build(&table);
    let content = ContentModel::build(&table);
    let popular = PopularityRanker::build(&table);
    println!("Built models in {:?}", start.elapsed());
    println!("  Rating matrix: {:?}", knn.matrix().shape());
    println!("  Content corpus: {} titles\n", content.titles().len());

    println!("Collaborative candidates for {:?}:", title);
    for (i, c) in knn.recommend(&title, 5).iter().enumerate() {
        println!("  {}. {} (similarity {:.3})", i + 1, c.title, c.base_score);
    }

    println!("\nContent candidates for {:?}:", title);
    for (i, c) in content.recommend(&title, 5).iter().enumerate() {
        println!("  {}. {} (similarity {:.3})", i + 1, c.title, c.base_score);
    }

    println!("\nMost rated:");
    for (i, c) in popular.recommend(5).iter().enumerate() {
        println!("  {}. {} ({} ratings)", i + 1, c.title, c.base_score);
    }

    Ok(())
}
