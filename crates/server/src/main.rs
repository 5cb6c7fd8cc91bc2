//! Simple test harness for the recommendation orchestrator.
//!
//! Loads the Book-Crossing exports from `Datasets/` (or the directory given
//! as the first argument) and prints recommendations for a few titles.

use std::env;

use anyhow::{Context, Result};
use tracing::info;

use data_loader::RawExportSource;
use server::{RecommendationOrchestrator, RecommenderConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info,server=debug,sources=debug")
        .init();

    info!("Starting book recommender test harness");

    let data_dir = env::args().nth(1).unwrap_or_else(|| "Datasets".to_string());
    let orchestrator = RecommendationOrchestrator::new(
        RawExportSource::new(&data_dir),
        RecommenderConfig::default(),
    );

    let model = orchestrator
        .warm_up()
        .await
        .with_context(|| format!("Failed to build recommender from {}", data_dir))?;
    let stats = model.stats();
    info!(
        "Model ready: {} ratings, {} titles, {} users",
        stats.ratings, stats.titles, stats.users
    );

    for title in ["The Lovely Bones", "Harry Potter", "ZZZQQQNOMATCH123"] {
        let recommendations = orchestrator.recommend_scored(title, 10).await?;

        info!("Recommendations for {:?}:", title);
        for (i, rec) in recommendations.iter().enumerate() {
            let sources: Vec<String> = rec.sources.iter().map(|s| s.to_string()).collect();
            info!(
                "{}. {} - Score: {:.2} [{}]",
                i + 1,
                rec.title,
                rec.score,
                sources.join(", ")
            );
        }
    }

    Ok(())
}
