//! Clap argument types.

use clap::Parser;
use std::path::PathBuf;

/// Clone a repository and review its files with a local model.
#[derive(Parser, Debug)]
#[command(
    name = "repo-review",
    version = repo_review::constants::VERSION,
    about = "Clone a repository and review its files with a local model",
)]
pub struct Cli {
    /// Log filter (e.g. `debug`, `repo_review=trace`). `RUST_LOG` takes precedence.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Config file to use instead of `.repo-review.toml` in the working directory.
    #[arg(long, global = true, env = "REPO_REVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Clone a repository and list the text files it contains.
    Fetch(FetchArgs),

    /// Clone a repository and review every text file.
    Review(ReviewArgs),

    /// Run the HTTP server.
    Serve(ServeArgs),

    /// Print version and build information.
    Version,
}

/// Arguments for the `fetch` subcommand.
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Repository URL (anything `git clone` accepts).
    pub url: String,

    /// Print the full name-to-content mapping as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Arguments for the `review` subcommand.
#[derive(Parser, Debug)]
pub struct ReviewArgs {
    /// Repository URL (anything `git clone` accepts).
    pub url: String,
}

/// Arguments for the `serve` subcommand.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to listen on (overrides config and environment).
    #[arg(long)]
    pub listen: Option<String>,
}
