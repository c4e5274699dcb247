//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! endpoint defaults and prompt templates so a rename only requires
//! changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "repo-review";

/// Crate version, as reported by `repo-review version` and `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compilation target triple (set by `build.rs`).
pub const TARGET: &str = env!("TARGET");

/// Local config filename (e.g. `.repo-review.toml` in the working directory).
pub const CONFIG_FILENAME: &str = ".repo-review.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "repo-review";

/// Default Ollama server address.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default model served by Ollama.
pub const DEFAULT_MODEL: &str = "llama3";

/// Default retry budget: additional attempts after the first request.
pub const DEFAULT_TRY_OUTS: u32 = 5;

/// Default listen address for `repo-review serve`.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8000";

/// Number of leading bytes inspected when sniffing for binary content.
pub const BINARY_SNIFF_LEN: usize = 1024;

/// System instruction sent with every review request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a developer who does code review. Your task is to \
analyse the given code and answer in the following JSON, the values can be null: \
{\"improvements\": \"\", \"bugs\": \"\", \"code_quality\": \"\"}";

/// Prefix placed in front of each file submitted for review.
pub const DEFAULT_CODE_PROMPT: &str = "Analyse the following code in json format \
{\"improvements\": \"\", \"bugs\": \"\", \"code_quality\": \"\"}:";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_MODEL: &str = "REPO_REVIEW_MODEL";
pub const ENV_OLLAMA_URL: &str = "REPO_REVIEW_OLLAMA_URL";
pub const ENV_TRY_OUTS: &str = "REPO_REVIEW_TRY_OUTS";
pub const ENV_LISTEN: &str = "REPO_REVIEW_LISTEN";
pub const ENV_GIT: &str = "REPO_REVIEW_GIT";
pub const ENV_KEY_BY: &str = "REPO_REVIEW_KEY_BY";
