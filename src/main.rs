//! Commit Activity Planner and Analyzer
//!
//! CLI surface over the gitpulse library: plan a batch schedule for an
//! external executor, or aggregate contribution statistics from a remote
//! repository.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gitpulse::{assign, schedule, AppConfig, Aggregator, GithubClient, WorkItem};

#[derive(Parser)]
#[command(name = "gitpulse")]
#[command(about = "Plan synthetic commit activity and analyze repository contributions")]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce a dated commit-batch plan as JSON for an external executor
    Plan {
        /// Seed for reproducible schedules
        #[arg(long)]
        seed: Option<u64>,

        /// JSON file of work items to assign into the batches; without it
        /// only the batch skeletons (timestamps and labels) are emitted
        #[arg(long)]
        items: Option<PathBuf>,
    },
    /// Aggregate contribution statistics for a remote repository
    Analyze {
        /// Repository URL or owner/name shorthand
        #[arg(long)]
        repo: String,

        /// Number of top contributors to report
        #[arg(long, default_value_t = 5)]
        top: usize,

        /// Emit the full outcome as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => AppConfig::default(),
    };
    config.validate()?;

    match cli.command {
        Commands::Plan { seed, items } => run_plan(&config, seed, items),
        Commands::Analyze { repo, top, json } => run_analyze(&config, &repo, top, json).await,
    }
}

fn run_plan(config: &AppConfig, seed: Option<u64>, items: Option<PathBuf>) -> anyhow::Result<()> {
    let window = config.window_anchored(Utc::now())?;
    let constraints = config.constraints()?;
    let skeletons = schedule(&window, &constraints, seed)?;

    let batches = match items {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading work items from {}", path.display()))?;
            let work_items: Vec<WorkItem> = serde_json::from_str(&raw)?;
            assign(&work_items, skeletons, seed)
        }
        None => skeletons,
    };

    println!("{}", serde_json::to_string_pretty(&batches)?);
    Ok(())
}

async fn run_analyze(
    config: &AppConfig,
    repo: &str,
    top: usize,
    json: bool,
) -> anyhow::Result<()> {
    let window = config.window_anchored(Utc::now())?;
    let client = GithubClient::new(repo, &config.fetch)?;
    let aggregator = Aggregator::new(client, &config.fetch);
    let outcome = aggregator.aggregate(&window).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let stats = &outcome.stats;
    println!("Total commits: {}", stats.total);
    println!("Commit-bearing days: {}", stats.unique_commit_days());
    println!("Average commits per day: {:.2}", stats.average_commits_per_day());
    println!("Top contributors:");
    for (author, count) in stats.top_contributors(top) {
        println!("  {author}: {count}");
    }
    if !outcome.skipped.is_empty() {
        println!("Skipped commits: {}", outcome.skipped.len());
        for skipped in &outcome.skipped {
            println!("  {}: {}", skipped.id, skipped.error);
        }
    }
    Ok(())
}
