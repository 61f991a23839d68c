use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

use catalog_types::Catalog;
use providers::{ProviderIndex, movies_router, ratings_router, serve_router};
use server::{ServiceConfig, UpstreamConfig};

/// Catalog - joins a user's ratings with movie metadata
#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Movie catalog aggregation service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the catalog HTTP service
    Serve(ServiceConfig),

    /// Run local rating-data and movie-info providers
    Providers {
        /// MovieLens directory with movies.dat and ratings.dat (demo data if omitted)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Address of the rating-data provider
        #[arg(long, default_value = "127.0.0.1:8083")]
        ratings_bind: SocketAddr,

        /// Address of the movie-info provider
        #[arg(long, default_value = "127.0.0.1:8082")]
        movies_bind: SocketAddr,
    },

    /// Build one user's catalog and print it
    Fetch {
        /// User ID to build the catalog for
        #[arg(long)]
        user_id: String,

        #[command(flatten)]
        upstream: UpstreamConfig,
    },

    /// Look up the rating recorded for one item
    Rating {
        /// Item ID to look up
        #[arg(long)]
        item_id: String,

        #[command(flatten)]
        upstream: UpstreamConfig,
    },

    /// Load-test a running catalog service
    Benchmark {
        /// Base URL of the catalog service
        #[arg(long, default_value = "http://127.0.0.1:8081")]
        url: String,

        /// User IDs to pick from at random
        #[arg(long = "user-id", value_delimiter = ',', default_value = "u1,u2")]
        user_ids: Vec<String>,

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

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Serve(config) => server::serve(config).await?,
        Commands::Providers {
            data_dir,
            ratings_bind,
            movies_bind,
        } => handle_providers(data_dir, ratings_bind, movies_bind).await?,
        Commands::Fetch { user_id, upstream } => handle_fetch(&user_id, &upstream).await?,
        Commands::Rating { item_id, upstream } => handle_rating(&item_id, &upstream).await?,
        Commands::Benchmark {
            url,
            user_ids,
            requests,
            concurrent,
        } => handle_benchmark(url, user_ids, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'providers' command
async fn handle_providers(
    data_dir: Option<PathBuf>,
    ratings_bind: SocketAddr,
    movies_bind: SocketAddr,
) -> Result<()> {
    let index = match data_dir {
        Some(dir) => {
            println!("Loading MovieLens data from {}...", dir.display());
            let start = Instant::now();
            let index = tokio::task::spawn_blocking(move || ProviderIndex::load_from_dir(&dir))
                .await
                .context("Loader task panicked")?
                .context("Failed to load MovieLens data")?;
            println!("{} Loaded data in {:?}", "✓".green(), start.elapsed());
            index
        }
        None => ProviderIndex::demo(),
    };
    let index = Arc::new(index);

    tokio::try_join!(
        serve_router("rating-data", ratings_bind, ratings_router(index.clone())),
        serve_router("movie-info", movies_bind, movies_router(index)),
    )?;
    Ok(())
}

/// Handle the 'fetch' command
async fn handle_fetch(user_id: &str, upstream: &UpstreamConfig) -> Result<()> {
    let aggregator = upstream.build_aggregator()?;

    let start = Instant::now();
    let catalog = aggregator
        .get_catalog(user_id)
        .await
        .with_context(|| format!("Failed to build catalog for user {}", user_id))?;

    print_catalog(user_id, &catalog);
    println!("{}", format!("Built in {:?}", start.elapsed()).dimmed());
    Ok(())
}

/// Handle the 'rating' command
async fn handle_rating(item_id: &str, upstream: &UpstreamConfig) -> Result<()> {
    let client = upstream.ratings_client()?;
    let rating = client
        .fetch_item_rating(item_id)
        .await
        .with_context(|| format!("Failed to look up rating for item {}", item_id))?;

    println!("{} {}: {}", "•".green(), rating.item_id.bold(), rating.score);
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    url: String,
    user_ids: Vec<String>,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if user_ids.is_empty() {
        bail!("at least one --user-id is required");
    }
    if requests == 0 || concurrent == 0 {
        bail!("--requests and --concurrent must be positive");
    }

    let client = reqwest::Client::new();
    let limiter = Arc::new(Semaphore::new(concurrent));
    let started = Instant::now();

    // Use tokio::spawn to make concurrent requests, at most `concurrent` in flight
    let mut handles = Vec::with_capacity(requests);
    for _ in 0..requests {
        let user_id = user_ids[rand::random_range(0..user_ids.len())].clone();
        let url = format!("{}/catalog/{}", url.trim_end_matches('/'), user_id);
        let client = client.clone();
        let limiter = limiter.clone();
        handles.push(tokio::spawn(async move {
            let _permit = limiter.acquire_owned().await?;
            let start = Instant::now();
            let response = client.get(&url).send().await?;
            Ok::<_, anyhow::Error>((start.elapsed(), response.status().is_success()))
        }));
    }

    // Wait for all tasks to complete and collect timings
    let mut timings = Vec::with_capacity(requests);
    let mut failed = 0;
    for handle in handles {
        match handle.await? {
            Ok((elapsed, true)) => timings.push(elapsed),
            Ok((elapsed, false)) => {
                failed += 1;
                timings.push(elapsed);
            }
            Err(e) => {
                failed += 1;
                tracing::warn!("Request failed: {}", e);
            }
        }
    }
    let wall_time = started.elapsed();

    if timings.is_empty() {
        bail!("all {} requests failed", requests);
    }
    timings.sort();
    let total: Duration = timings.iter().sum();
    let avg_latency = total / timings.len() as u32;
    let percentile = |p: f64| timings[((timings.len() - 1) as f64 * p) as usize];

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} failed)", requests, failed);
    println!("Total time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} requests/second",
        requests as f64 / wall_time.as_secs_f64()
    );

    Ok(())
}

/// Helper function to format and print a catalog
fn print_catalog(user_id: &str, catalog: &Catalog) {
    println!("{}", format!("Catalog for user {}:", user_id).bold().blue());
    if catalog.entries.is_empty() {
        println!("  (no rated items)");
    }
    for (rank, entry) in catalog.entries.iter().enumerate() {
        println!(
            "{}. {} - {} [rating: {}]",
            (rank + 1).to_string().green(),
            entry.name,
            entry.desc.dimmed(),
            entry.rating
        );
    }
    if catalog.is_degraded() {
        println!("{}", "Unavailable items:".yellow());
        for failure in &catalog.failures {
            println!(
                "  #{} {} ({}): {}",
                failure.index + 1,
                failure.item_id,
                failure.error.kind(),
                failure.error
            );
        }
    }
}
