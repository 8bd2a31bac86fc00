use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use data_loader::LoadReport;
use pipeline::FilterCriteria;
use recommender::{RecommendError, ScoredTitle};
use service::{MovieSummary, OrchestratorConfig, RecommendationOrchestrator};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// movie-match - find movies similar to one you like
#[derive(Parser)]
#[command(name = "movie-match")]
#[command(about = "Content-based movie recommendations from a precomputed similarity matrix", long_about = None)]
struct Cli {
    /// Path to the cleaned movie dataset (CSV)
    #[arg(short, long, default_value = "data/movies_cleaned.csv")]
    movies: PathBuf,

    /// Path to the similarity matrix (.json, or raw little-endian f32)
    #[arg(short, long, default_value = "data/similarity.json")]
    similarity: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Filter settings shared by the commands that narrow the catalog
#[derive(Args, Debug, Clone)]
struct FilterArgs {
    /// Minimum vote count
    #[arg(long, default_value_t = 500)]
    min_votes: u32,

    /// Maximum vote count
    #[arg(long, default_value_t = 10_000)]
    max_votes: u32,

    /// Minimum average rating
    #[arg(long, default_value_t = 6.0)]
    min_rating: f64,

    /// Maximum average rating
    #[arg(long, default_value_t = 9.0)]
    max_rating: f64,

    /// Keep movies in any of these genres (repeat for more than one)
    #[arg(long = "genre")]
    genres: Vec<String>,
}

impl FilterArgs {
    fn to_criteria(&self) -> FilterCriteria {
        FilterCriteria::default()
            .with_votes(self.min_votes, self.max_votes)
            .with_rating(self.min_rating, self.max_rating)
            .with_genres(self.genres.iter().cloned())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend movies similar to a title
    Recommend {
        /// Movie title (case and surrounding spaces are ignored)
        #[arg(long)]
        title: String,

        #[command(flatten)]
        filters: FilterArgs,

        /// Ignore all filters
        #[arg(long)]
        no_filter: bool,

        /// Show the similarity value of each recommendation
        #[arg(long)]
        explain: bool,
    },

    /// List the top movies passing the filters
    Top {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show selectable genres and the vote/rating ranges of the dataset
    Genres,

    /// Search for movies by title
    Search {
        /// Title fragment (case-insensitive substring match)
        #[arg(long)]
        title: String,

        /// Maximum number of matches to show
        #[arg(long, default_value = "20")]
        limit: usize,
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

    println!(
        "Loading {} with {}...",
        cli.movies.display(),
        cli.similarity.display()
    );
    let start = Instant::now();
    let (orchestrator, report) =
        RecommendationOrchestrator::load(&cli.movies, &cli.similarity, OrchestratorConfig::default())
            .context("Failed to load movie data")?;
    println!(
        "{} Loaded {} movies in {:?}",
        "✓".green(),
        orchestrator.catalog().len(),
        start.elapsed()
    );
    print_load_report(&report);

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            title,
            filters,
            no_filter,
            explain,
        } => handle_recommend(&orchestrator, &title, &filters, no_filter, explain)?,
        Commands::Top { filters } => handle_top(&orchestrator, &filters),
        Commands::Genres => handle_genres(&orchestrator),
        Commands::Search { title, limit } => handle_search(&orchestrator, &title, limit)?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(orchestrator, requests, concurrent).await?,
    }

    Ok(())
}

/// Summarise data-quality problems found while loading
fn print_load_report(report: &LoadReport) {
    if report.is_clean() {
        return;
    }
    if !report.malformed_genres.is_empty() {
        println!(
            "{} {} movies had unreadable genres and will not match genre filters",
            "!".yellow(),
            report.malformed_genres.len()
        );
        for malformed in &report.malformed_genres {
            debug!(
                "Row {} ({}): {}",
                malformed.row, malformed.title, malformed.reason
            );
        }
    }
    if !report.duplicate_titles.is_empty() {
        println!(
            "{} {} titles appear more than once; the last occurrence is used",
            "!".yellow(),
            report.duplicate_titles.len()
        );
    }
}

/// Warn about selected genres the dataset never uses
fn warn_unknown_genres(orchestrator: &RecommendationOrchestrator, filters: &FilterArgs) {
    let vocabulary = orchestrator.catalog().genre_vocabulary();
    for genre in &filters.genres {
        if !vocabulary.contains(genre) {
            warn!("Genre '{}' does not occur in the dataset", genre);
        }
    }
}

/// Handle the 'recommend' command
fn handle_recommend(
    orchestrator: &RecommendationOrchestrator,
    title: &str,
    filters: &FilterArgs,
    no_filter: bool,
    explain: bool,
) -> Result<()> {
    if title.trim().is_empty() {
        bail!("Please enter a movie title");
    }

    let criteria = if no_filter {
        None
    } else {
        warn_unknown_genres(orchestrator, filters);
        Some(filters.to_criteria())
    };

    match orchestrator.recommend_scored(title, criteria.as_ref()) {
        Ok(recommendations) if recommendations.is_empty() => {
            println!(
                "{}",
                format!("'{}' was found, but no similar movies match the selected filters.", title.trim())
                    .yellow()
            );
        }
        Ok(recommendations) => print_recommendations(&recommendations, explain),
        Err(RecommendError::TitleNotFound { .. }) => {
            println!(
                "{}",
                format!("Movie '{}' not found. Try `search` to find the exact title.", title.trim()).red()
            );
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Handle the 'top' command
fn handle_top(orchestrator: &RecommendationOrchestrator, filters: &FilterArgs) {
    warn_unknown_genres(orchestrator, filters);

    let top = orchestrator.top_movies(&filters.to_criteria());
    print_top_movies(&top);
}

/// Handle the 'genres' command
fn handle_genres(orchestrator: &RecommendationOrchestrator) {
    let options = orchestrator.filter_options();

    println!("{}", "Genres:".bold().blue());
    for genre in &options.genres {
        println!("  - {}", genre);
    }

    if let Some((min, max)) = options.votes_range {
        println!("{}Vote count: {} to {}", "• ".cyan(), min, max);
    }
    if let Some((min, max)) = options.rating_range {
        println!("{}Rating: {:.1} to {:.1}", "• ".cyan(), min, max);
    }
}

/// Handle the 'search' command
fn handle_search(orchestrator: &RecommendationOrchestrator, title: &str, limit: usize) -> Result<()> {
    if title.trim().is_empty() {
        bail!("Please enter part of a movie title");
    }

    let catalog = orchestrator.catalog();
    let rows = catalog.search(title, limit);

    println!("{}", format!("Search results for '{}':", title.trim()).bold().blue());
    if rows.is_empty() {
        println!("  (no matches)");
    }
    for row in rows {
        if let Some(movie) = catalog.get(row) {
            println!(
                "  {} [{}] ⭐ {} (Votes: {})",
                movie.display_title(),
                movie.genres.join(", "),
                movie.vote_average,
                movie.vote_count
            );
        }
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    orchestrator: RecommendationOrchestrator,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 || concurrent == 0 {
        bail!("--requests and --concurrent must both be at least 1");
    }

    let orchestrator = Arc::new(orchestrator);
    let semaphore = Arc::new(Semaphore::new(concurrent));
    let criteria = Arc::new(FilterCriteria::default());
    let catalog_size = orchestrator.catalog().len();

    // Random titles from the catalog, so every request resolves
    let titles: Vec<String> = (0..requests)
        .map(|_| {
            let row = rand::random_range(0..catalog_size);
            orchestrator
                .catalog()
                .get(row)
                .map(|m| m.title.clone())
                .unwrap_or_default()
        })
        .collect();

    let wall_clock = Instant::now();
    let mut handles = vec![];
    for title in titles {
        let orchestrator = orchestrator.clone();
        let semaphore = semaphore.clone();
        let criteria = criteria.clone();
        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let elapsed = tokio::task::spawn_blocking(move || {
                let start = Instant::now();
                orchestrator.recommend(&title, &criteria)?;
                Ok::<_, anyhow::Error>(start.elapsed())
            })
            .await??;
            Ok::<_, anyhow::Error>(elapsed)
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall_clock.elapsed();

    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", requests, concurrent);
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[ScoredTitle], explain: bool) {
    println!("{}", "Top Similar Movies:".bold().blue());
    for (rank, rec) in recommendations.iter().enumerate() {
        if explain {
            println!(
                "{}. {} (similarity: {:.3})",
                (rank + 1).to_string().green(),
                rec.title,
                rec.similarity
            );
        } else {
            println!("{}. {}", (rank + 1).to_string().green(), rec.title);
        }
    }
}

/// Helper function to print the filtered top listing
fn print_top_movies(movies: &[MovieSummary]) {
    println!("{}", "Top Recommended Movies (Filtered):".bold().blue());
    if movies.is_empty() {
        println!("  (no movies match the selected filters)");
    }
    for movie in movies {
        println!(
            "🎬 {} — ⭐ {} (Votes: {})",
            movie.title, movie.vote_average, movie.vote_count
        );
    }
}
