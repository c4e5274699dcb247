//! repo-review: clone a repository and review it with a local model.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use repo_review::chat::ChatClient;
use repo_review::config::Config;
use repo_review::constants;
use repo_review::env::Env;
use repo_review::fetcher::RepoFetcher;
use repo_review::providers::ollama::OllamaProvider;
use repo_review::review::Reviewer;
use repo_review::server;

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use cli::args::{Cli, Command, FetchArgs, ReviewArgs, ServeArgs};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    cli::setup_logging(&cli.log_level);

    if let Command::Version = cli.command {
        return run_version();
    }

    let work_dir = std::env::current_dir().context("failed to determine working directory")?;
    let config = Config::load(Some(&work_dir), cli.config.as_deref(), &Env::real())
        .context("failed to load configuration")?;

    match cli.command {
        Command::Fetch(args) => run_fetch(args, &config).await,
        Command::Review(args) => run_review(args, &config).await,
        Command::Serve(args) => run_serve(args, config).await,
        Command::Version => run_version(),
    }
}

/// Print version and build information.
fn run_version() -> Result<()> {
    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    println!("{}     {}", "target:".dimmed(), constants::TARGET);
    Ok(())
}

/// Clone and read a repository, then print what was found.
async fn run_fetch(args: FetchArgs, config: &Config) -> Result<()> {
    let snapshot = RepoFetcher::new(config.fetch.clone())
        .fetch(&args.url)
        .await
        .with_context(|| format!("failed to fetch {}", args.url))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    for (name, content) in &snapshot {
        println!("{}  {}", name.bold(), format!("{} bytes", content.len()).dimmed());
    }
    eprintln!(
        "{} {} text file(s) from {}",
        "✔".green(),
        snapshot.len(),
        args.url
    );
    Ok(())
}

/// Clone, read and review a repository; print the report as JSON.
async fn run_review(args: ReviewArgs, config: &Config) -> Result<()> {
    let transport = Arc::new(
        OllamaProvider::new(&config.model).context("failed to build model client")?,
    );
    let chat = ChatClient::new(
        transport,
        config.model.clone(),
        config.prompts.system_prompt.clone(),
    );
    let reviewer = Reviewer::new(chat, &config.prompts);

    let snapshot = RepoFetcher::new(config.fetch.clone())
        .fetch(&args.url)
        .await
        .with_context(|| format!("failed to fetch {}", args.url))?;

    let report = reviewer
        .review_snapshot(&args.url, &snapshot)
        .await
        .context("review aborted")?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.failed.is_empty() {
        eprintln!("{} reviewed {} file(s)", "✔".green(), report.attempted());
    } else {
        eprintln!(
            "{} reviewed {} of {} file(s), {} without a usable answer",
            "!".yellow().bold(),
            report.reviews.len(),
            report.attempted(),
            report.failed.len()
        );
    }
    Ok(())
}

/// Run the HTTP server.
async fn run_serve(args: ServeArgs, mut config: Config) -> Result<()> {
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }

    let listener = tokio::net::TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen))?;

    server::serve(&config, listener).await
}
