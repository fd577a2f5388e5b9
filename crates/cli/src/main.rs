use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use engine::{DimensionAnalyser, MovieId, PredictionKernel, SearchConfig};
use rand::prelude::IndexedRandom;
use server::{RecommenderService, ServiceConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// reelpath - a friendly recommender guiding you to new territory
#[derive(Parser)]
#[command(name = "reelpath")]
#[command(about = "Connects and recommends movies through a personalized taste space", long_about = None)]
struct Cli {
    /// Path to the movie map (catalog) file
    #[arg(long, default_value = "data/moviemap.dat.gz")]
    movie_map: PathBuf,

    /// Path to the taste-space embedding file
    #[arg(long, default_value = "data/tastespace.dat.gz")]
    taste_space: PathBuf,

    /// Path to the default user rating file
    #[arg(long, default_value = "data/default-user.csv.gz")]
    default_user: PathBuf,

    /// Number of taste dimensions kept when personalizing
    #[arg(long, default_value = "7")]
    dimensions: usize,

    /// Dimension analyser strategy
    #[arg(long, value_enum, default_value_t = AnalyserArg::Midpoint)]
    analyser: AnalyserArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a chain of clusters connecting two movies
    Path {
        /// Target movie ID
        #[arg(short = 'm', long)]
        target: MovieId,

        /// Start movie ID; when omitted the best-suited rated movie is used
        #[arg(short, long)]
        start: Option<MovieId>,

        /// Your own ratings file for personalized results
        #[arg(short, long)]
        user_file: Option<PathBuf>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Predict the rating the profile's owner would give a movie
    Predict {
        /// Movie ID to predict for
        #[arg(short, long)]
        movie_id: MovieId,

        /// Weighting kernel
        #[arg(long, value_enum, default_value_t = KernelArg::Inverse)]
        kernel: KernelArg,

        /// Your own ratings file for personalized results
        #[arg(short, long)]
        user_file: Option<PathBuf>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Recommend movies around one the user knows
    Recommend {
        /// Movie ID to recommend around
        #[arg(short, long)]
        movie_id: MovieId,

        /// Your own ratings file for personalized results
        #[arg(short, long)]
        user_file: Option<PathBuf>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Search for movies by title
    Search {
        /// Part of a title, case- and accent-insensitive
        #[arg(short, long)]
        find: String,
    },

    /// Issue concurrent prediction requests against the shared service
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "8")]
        concurrent: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KernelArg {
    Inverse,
    Gaussian,
}

impl From<KernelArg> for PredictionKernel {
    fn from(arg: KernelArg) -> Self {
        match arg {
            KernelArg::Inverse => PredictionKernel::InverseProportional,
            KernelArg::Gaussian => PredictionKernel::Gaussian,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum AnalyserArg {
    Inverse,
    Midpoint,
}

impl From<AnalyserArg> for DimensionAnalyser {
    fn from(arg: AnalyserArg) -> Self {
        match arg {
            AnalyserArg::Inverse => DimensionAnalyser::InverseFunction,
            AnalyserArg::Midpoint => DimensionAnalyser::MidpointFit,
        }
    }
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

    let mut config = ServiceConfig::new(
        cli.movie_map.clone(),
        cli.taste_space.clone(),
        cli.default_user.clone(),
    );
    config.search = SearchConfig::default().with_user_dimensions(cli.dimensions);
    config.analyser = cli.analyser.into();

    println!("Loading datasets...");
    let start = Instant::now();
    let service =
        Arc::new(RecommenderService::init(&config).context("failed to initialize the service")?);
    println!("{} Loaded datasets in {:?}", "✓".green(), start.elapsed());

    match cli.command {
        Commands::Path {
            target,
            start,
            user_file,
            json,
        } => handle_path(&service, start, target, user_file, json)?,
        Commands::Predict {
            movie_id,
            kernel,
            user_file,
            json,
        } => handle_predict(&service, movie_id, kernel.into(), user_file, json)?,
        Commands::Recommend {
            movie_id,
            user_file,
            json,
        } => handle_recommend(&service, movie_id, user_file, json)?,
        Commands::Search { find } => handle_search(&service, &find),
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(service, requests, concurrent).await?,
    }

    Ok(())
}

fn handle_path(
    service: &RecommenderService,
    start: Option<MovieId>,
    target: MovieId,
    user_file: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let path = service.find_path(start, target, user_file.as_deref())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&path)?);
        return Ok(());
    }
    println!(
        "\n{} {} (C{})  →  {} (C{}),  distance {:.3}\n",
        "Path:".bold(),
        path.start.title,
        path.start.cluster_id,
        path.target.title,
        path.target.cluster_id,
        path.distance
    );
    for (cluster_id, movies) in path.cluster_ids.iter().zip(&path.clusters) {
        println!("  {}", format!("cluster {cluster_id}").cyan());
        for movie in movies {
            match movie.rating {
                Some(rating) => println!("    {} ({:.1})", movie.title, rating),
                None => println!("    {}", movie.title),
            }
        }
    }
    Ok(())
}

fn handle_predict(
    service: &RecommenderService,
    movie_id: MovieId,
    kernel: PredictionKernel,
    user_file: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let prediction = service.predict(movie_id, kernel, user_file.as_deref())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
        return Ok(());
    }
    println!(
        "\n{} {} → {}",
        "Prediction:".bold(),
        prediction.movie.title,
        format!("{:.2}", prediction.predicted_rating).green()
    );
    for component in &prediction.components {
        println!(
            "    {:<40} rated {:.1}, distance {:.3}, weight {:.1}%",
            component.title,
            component.rating,
            component.distance,
            component.proportion * 100.0
        );
    }
    Ok(())
}

fn handle_recommend(
    service: &RecommenderService,
    movie_id: MovieId,
    user_file: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let recommendations = service.recommend(movie_id, user_file.as_deref())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
        return Ok(());
    }
    println!("\n{}", "Recommendations:".bold());
    for (i, prediction) in recommendations.iter().enumerate() {
        println!(
            "  {:>2}. {:<40} predicted {}",
            i + 1,
            prediction.movie.title,
            format!("{:.2}", prediction.predicted_rating).green()
        );
    }
    Ok(())
}

fn handle_search(service: &RecommenderService, term: &str) {
    let hits = service.search(term);
    if hits.is_empty() {
        println!("No movies containing '{term}' found. Please try something else.");
        return;
    }
    println!("Movies found containing '{term}':");
    for hit in hits {
        println!("  {hit}");
    }
}

/// Fires `requests` predictions at the shared service, `concurrent` at a
/// time. The engine is blocking by design, so each request runs on the
/// blocking pool while the service itself is shared read-only.
async fn handle_benchmark(
    service: Arc<RecommenderService>,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let movie_ids = service.lookup().movie_ids();
    anyhow::ensure!(!movie_ids.is_empty(), "catalog is empty");

    let started = Instant::now();
    let mut completed = 0usize;
    let mut failed = 0usize;
    let mut remaining = requests;
    let mut rng = rand::rng();

    while remaining > 0 {
        let batch = remaining.min(concurrent.max(1));
        let mut handles = Vec::with_capacity(batch);
        for _ in 0..batch {
            let service = service.clone();
            let movie_id = *movie_ids
                .choose(&mut rng)
                .expect("catalog checked non-empty above");
            handles.push(tokio::task::spawn_blocking(move || {
                service.predict(movie_id, PredictionKernel::InverseProportional, None)
            }));
        }
        for handle in handles {
            match handle.await? {
                Ok(_) => completed += 1,
                Err(_) => failed += 1,
            }
        }
        remaining -= batch;
    }

    let elapsed = started.elapsed();
    println!(
        "\n{} {} predictions ({} failed) in {:?} ({:.1} req/s)",
        "✓".green(),
        completed,
        failed,
        elapsed,
        completed as f64 / elapsed.as_secs_f64()
    );
    Ok(())
}
