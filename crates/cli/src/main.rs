use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{CacheSource, RatingsSource, RawExportSource};
use server::{RecommendationOrchestrator, RecommenderConfig, RecommenderModel, ScoredTitle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// Book Recs - Hybrid Book Recommendation Engine
#[derive(Parser)]
#[command(name = "book-recs")]
#[command(about = "Book recommendations blending similar readers, similar titles and popularity", long_about = None)]
struct Cli {
    /// Path to the Book-Crossing export directory
    #[arg(short, long, default_value = "Datasets")]
    data_dir: PathBuf,

    /// Load ratings from a prepared JSON cache instead of the raw exports
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Minimum ratings for a title to take part in neighbor search
    #[arg(long, default_value = "50")]
    knn_min_ratings: u32,

    /// Minimum ratings for a title to take part in title similarity
    #[arg(long, default_value = "80")]
    content_min_ratings: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get book recommendations for a title
    Recommend {
        /// Book title (case-insensitive substring match)
        #[arg(long)]
        title: String,

        /// Number of recommendations to return
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Show score and contributing sources for each recommendation
        #[arg(long)]
        explain: bool,
    },

    /// Search for books by title
    Search {
        /// Title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,

        /// Maximum number of matches to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Show the most-rated books
    Popular {
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Merge the raw exports once and write a ratings cache
    Prepare {
        /// Output path for the JSON cache
        #[arg(long, default_value = "ratings.json")]
        output: PathBuf,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::Prepare { output } = &cli.command {
        return handle_prepare(&cli.data_dir, output);
    }

    let config = RecommenderConfig::default()
        .with_knn_min_ratings(cli.knn_min_ratings)
        .with_content_min_ratings(cli.content_min_ratings);
    let orchestrator = match &cli.cache {
        Some(path) => open(CacheSource::new(path), config),
        None => open(RawExportSource::new(&cli.data_dir), config),
    };

    // Build the model up front (this may take a moment)
    println!("Loading ratings from {}...", orchestrator.cache().source_name());
    let start = Instant::now();
    let model = orchestrator
        .warm_up()
        .await
        .context("Failed to build the recommender")?;
    println!("{} Built recommender in {:?}", "✓".green(), start.elapsed());

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            title,
            limit,
            explain,
        } => handle_recommend(&orchestrator, &model, &title, limit, explain).await?,
        Commands::Search { title, limit } => handle_search(&model, &title, limit),
        Commands::Popular { limit } => handle_popular(&model, limit),
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(orchestrator, &model, requests, concurrent).await?,
        Commands::Prepare { .. } => {}
    }

    Ok(())
}

fn open(source: impl RatingsSource + 'static, config: RecommenderConfig) -> RecommendationOrchestrator {
    RecommendationOrchestrator::new(source, config)
}

/// Handle the 'recommend' command
async fn handle_recommend(
    orchestrator: &RecommendationOrchestrator,
    model: &RecommenderModel,
    title: &str,
    limit: usize,
    explain: bool,
) -> Result<()> {
    let recommendations = orchestrator.recommend_scored(title, limit).await?;

    let matched = sources::find_best_match(
        title,
        model.neighbors().matrix().titles().iter().map(String::as_str),
    )
    .or_else(|| {
        sources::find_best_match(title, model.content().titles().iter().map(String::as_str))
    });
    match matched {
        Some(matched) => println!("Matched {}", format!("\"{}\"", matched).bold()),
        None => println!(
            "{} No popular book matches {:?}; showing most-rated books",
            "!".yellow(),
            title
        ),
    }

    print_recommendations(&recommendations, explain);
    Ok(())
}

/// Handle the 'search' command
fn handle_search(model: &RecommenderModel, title: &str, limit: usize) {
    let popularity = model.popularity();
    let matrix = model.neighbors().matrix();
    let corpus = model.content().titles();

    // Most-rated titles first
    let matches = sources::find_all_matches(
        title,
        popularity.ranked().iter().map(|(t, _)| t.as_str()),
        limit,
    );

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  (no matches)");
        return;
    }
    for matched in matches {
        let mut tags = Vec::new();
        if matrix.row_index(matched).is_some() {
            tags.push("neighbors");
        }
        if corpus.binary_search_by(|t| t.as_str().cmp(matched)).is_ok() {
            tags.push("content");
        }
        println!(
            "{}{} ({} ratings){}",
            "• ".green(),
            matched,
            popularity.rating_count(matched),
            if tags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", tags.join(", ")).cyan().to_string()
            }
        );
    }
}

/// Handle the 'popular' command
fn handle_popular(model: &RecommenderModel, limit: usize) {
    println!("{}", "Most-rated books:".bold().blue());
    for (i, (title, count)) in model.popularity().ranked().iter().take(limit).enumerate() {
        println!("{}. {} ({} ratings)", (i + 1).to_string().green(), title, count);
    }
}

/// Handle the 'prepare' command
fn handle_prepare(data_dir: &Path, output: &Path) -> Result<()> {
    println!("Preparing ratings cache from {}...", data_dir.display());
    let start = Instant::now();

    let table = data_loader::prepare(data_dir, output)
        .with_context(|| format!("Failed to prepare cache at {}", output.display()))?;
    let (ratings, titles, users) = table.counts();

    println!(
        "{} Wrote {} ratings ({} titles, {} users) to {} in {:?}",
        "✓".green(),
        ratings,
        titles,
        users,
        output.display(),
        start.elapsed()
    );
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    orchestrator: RecommendationOrchestrator,
    model: &RecommenderModel,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        println!("Nothing to do: 0 requests");
        return Ok(());
    }

    // Query titles drawn from the 200 most-rated books
    let pool = model.popularity_based(200);
    if pool.is_empty() {
        anyhow::bail!("Dataset has no rated books to query");
    }
    let titles: Vec<String> = (0..requests)
        .map(|_| pool[rand::random::<u32>() as usize % pool.len()].clone())
        .collect();

    info!(
        "Running {} requests with concurrency {}",
        requests, concurrent
    );
    let semaphore = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();

    let mut handles = vec![];
    for title in titles {
        let orchestrator = orchestrator.clone();
        let semaphore = Arc::clone(&semaphore);
        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let start = Instant::now();
            orchestrator.recommend(&title).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings: Vec<Duration> = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let total_time = wall_clock.elapsed();

    let latency_sum: Duration = timings.iter().sum();
    let avg_latency = latency_sum / (timings.len() as u32);
    timings.sort();
    let p50 = timings[timings.len() / 2];
    let p95 = timings[(timings.len() as f32 * 0.95) as usize];
    let p99 = timings[(timings.len() as f32 * 0.99) as usize];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[ScoredTitle], explain: bool) {
    println!("{}", "Book Recommendations:".bold().blue());
    for (i, rec) in recommendations.iter().enumerate() {
        println!("{}. {}", (i + 1).to_string().green(), rec.title);
        if explain {
            let sources: Vec<String> = rec.sources.iter().map(|s| s.to_string()).collect();
            println!(
                "   Score: {:.2} from {}",
                rec.score,
                sources.join(" + ").cyan()
            );
        }
    }
}
