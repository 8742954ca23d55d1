//! RepoLens command-line entry point
//!
//! `analyze`, `ask` and `chat` go through the completion service and need an
//! API key. `scan` profiles a local directory without leaving the machine.

use anyhow::Context;
use clap::{Parser, Subcommand};
use repolens_analysis::{
    AnalyzeRequest, QueryRequest, RepoLensConfig, RepositoryService, ServiceError,
};
use repolens_core::{CacheEntry, GitFetcher, LocalFetcher, RepositoryAnalyzer, SourceFetcher};
use repolens_llm::render_languages;
use repolens_utils::logging::{basic_config, LogLevel};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser)]
#[command(name = "repolens")]
#[command(about = "RepoLens - Summarize and question code repositories")]
#[command(version)]
struct Cli {
    /// Configuration file (.toml, .json or .yaml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, profile and summarize a repository
    Analyze {
        /// Repository URL, or a directory with --local
        locator: String,

        /// Treat the locator as a local directory instead of cloning it
        #[arg(long)]
        local: bool,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze a repository and answer one question about it
    Ask {
        /// Repository URL, or a directory with --local
        locator: String,

        /// Question about the repository
        question: String,

        /// Treat the locator as a local directory instead of cloning it
        #[arg(long)]
        local: bool,
    },

    /// Analyze a repository, then answer questions read from stdin
    Chat {
        /// Repository URL, or a directory with --local
        locator: String,

        /// Treat the locator as a local directory instead of cloning it
        #[arg(long)]
        local: bool,
    },

    /// Profile a local directory without calling the completion service
    Scan {
        /// Directory to profile
        path: PathBuf,

        /// Print the profile as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { LogLevel::Debug } else { LogLevel::Warning };
    basic_config(Some(level))?;

    let config = RepoLensConfig::load(cli.config.as_deref())
        .with_context(|| "Failed to load configuration")?;
    debug!("Loaded configuration: {:?}", config.walk);

    let outcome = match cli.command {
        Commands::Analyze { locator, local, json } => {
            run_analyze(&config, &locator, local, json).await
        }
        Commands::Ask {
            locator,
            question,
            local,
        } => run_ask(&config, &locator, &question, local).await,
        Commands::Chat { locator, local } => run_chat(&config, &locator, local).await,
        Commands::Scan { path, json } => run_scan(&config, path, json).await,
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        std::process::exit(if e.is_client_error() { 2 } else { 1 });
    }
    Ok(())
}

fn service_for(config: &RepoLensConfig, local: bool) -> Result<RepositoryService, ServiceError> {
    let fetcher: Arc<dyn SourceFetcher> = if local {
        Arc::new(LocalFetcher)
    } else {
        Arc::new(GitFetcher::default())
    };
    RepositoryService::from_config(config, fetcher)
}

async fn run_analyze(
    config: &RepoLensConfig,
    locator: &str,
    local: bool,
    json: bool,
) -> Result<(), ServiceError> {
    let service = service_for(config, local)?;
    let response = service.analyze(AnalyzeRequest::new(locator)).await?;

    if json {
        println!("{}", to_json(&response)?);
    } else {
        println!("{}\n", response.message);
        print_entry(&response.data);
    }
    Ok(())
}

async fn run_ask(
    config: &RepoLensConfig,
    locator: &str,
    question: &str,
    local: bool,
) -> Result<(), ServiceError> {
    let service = service_for(config, local)?;
    service.analyze(AnalyzeRequest::new(locator)).await?;

    let response = service.query(QueryRequest::new(locator, question)).await?;
    println!("{}", response.answer);
    Ok(())
}

async fn run_chat(config: &RepoLensConfig, locator: &str, local: bool) -> Result<(), ServiceError> {
    let service = service_for(config, local)?;
    let analyzed = service.analyze(AnalyzeRequest::new(locator)).await?;
    println!("{}\n", analyzed.data.summary);

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush().map_err(io_error)?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).map_err(io_error)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }

        // A failed answer ends only this turn
        match service.query(QueryRequest::new(locator, question)).await {
            Ok(response) => println!("{}\n", response.answer),
            Err(e) => eprintln!("Error: {e}"),
        }
    }
    Ok(())
}

async fn run_scan(config: &RepoLensConfig, path: PathBuf, json: bool) -> Result<(), ServiceError> {
    let analyzer = RepositoryAnalyzer::new(config.walk.clone());
    let locator = path.display().to_string();

    let profile = tokio::task::spawn_blocking(move || analyzer.analyze(&locator, &path))
        .await
        .map_err(|e| ServiceError::Internal(format!("Scan task failed: {e}")))??;
    let entry = profile.into_cache_entry();

    if json {
        println!("{}", to_json(&entry)?);
    } else {
        print_entry(&entry);
    }
    Ok(())
}

fn print_entry(entry: &CacheEntry) {
    let info = &entry.repo_info;
    if !entry.summary.is_empty() {
        println!("{}\n", entry.summary);
    }
    println!("Total Files: {}", info.total_files);
    println!("Languages: {}", render_languages(&entry.languages));
    println!("README: {}", if info.has_readme { "yes" } else { "no" });
    if info.key_files.is_empty() {
        println!("Key Files: none");
    } else {
        println!("Key Files: {}", info.key_files.join(", "));
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ServiceError> {
    serde_json::to_string_pretty(value).map_err(|e| ServiceError::Internal(e.to_string()))
}

fn io_error(e: std::io::Error) -> ServiceError {
    ServiceError::Internal(e.to_string())
}
