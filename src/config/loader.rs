//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.repo-review.toml` in the working directory (or `--config <path>`)
//! 4. `~/.config/repo-review/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants;
use crate::env::Env;
use crate::models::SnapshotKey;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
///
/// Passed by value (or reference) into every component; nothing reads
/// configuration from global state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub prompts: PromptConfig,
    pub fetch: FetchConfig,
    pub server: ServerConfig,
}

/// Ollama endpoint and retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name as known to the Ollama server.
    pub name: String,
    /// Base URL of the Ollama server.
    pub base_url: String,
    /// Retry budget: additional attempts after the first request.
    pub try_outs: u32,
    /// Overall per-request timeout. `None` waits as long as the server takes.
    pub timeout_secs: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: constants::DEFAULT_MODEL.to_string(),
            base_url: constants::DEFAULT_OLLAMA_URL.to_string(),
            try_outs: constants::DEFAULT_TRY_OUTS,
            timeout_secs: None,
        }
    }
}

/// Prompt templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Appended as a system message to every chat request.
    pub system_prompt: String,
    /// Placed in front of each file's content in the user message.
    pub code_prompt: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_prompt: constants::DEFAULT_SYSTEM_PROMPT.to_string(),
            code_prompt: constants::DEFAULT_CODE_PROMPT.to_string(),
        }
    }
}

/// Repository fetch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Version-control executable invoked as `<git_program> clone <url> <dest>`.
    pub git_program: String,
    /// Prefix for the scratch checkout directory name.
    pub temp_prefix: String,
    /// Parent directory for scratch checkouts. `None` uses the system temp dir.
    pub scratch_dir: Option<PathBuf>,
    /// How snapshot entries are keyed.
    pub key_by: SnapshotKey,
    /// Skip the `.git` metadata directory while walking the checkout.
    pub exclude_git_dir: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            git_program: "git".to_string(),
            temp_prefix: format!("{}-", constants::APP_NAME),
            scratch_dir: None,
            key_by: SnapshotKey::FileName,
            exclude_git_dir: false,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    /// Upper bound on clones running at the same time.
    pub max_concurrent_clones: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: constants::DEFAULT_LISTEN.to_string(),
            max_concurrent_clones: 4,
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// `local_file` is the repo-local layer: an explicit `--config` path
    /// must exist, while the implicit `.repo-review.toml` is optional.
    pub fn load(
        work_dir: Option<&Path>,
        local_file: Option<&Path>,
        env: &Env,
    ) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: explicit file, else the working directory's dotfile
        match local_file {
            Some(path) => config.merge(Self::load_file(path)?),
            None => {
                if let Some(dir) = work_dir {
                    let local_path = dir.join(constants::CONFIG_FILENAME);
                    if local_path.exists() {
                        config.merge(Self::load_file(&local_path)?);
                    }
                }
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other takes precedence for non-default values).
    fn merge(&mut self, other: Config) {
        let default_model = ModelConfig::default();
        if other.model.name != default_model.name {
            self.model.name = other.model.name;
        }
        if other.model.base_url != default_model.base_url {
            self.model.base_url = other.model.base_url;
        }
        if other.model.try_outs != default_model.try_outs {
            self.model.try_outs = other.model.try_outs;
        }
        if other.model.timeout_secs.is_some() {
            self.model.timeout_secs = other.model.timeout_secs;
        }

        let default_prompts = PromptConfig::default();
        if other.prompts.system_prompt != default_prompts.system_prompt {
            self.prompts.system_prompt = other.prompts.system_prompt;
        }
        if other.prompts.code_prompt != default_prompts.code_prompt {
            self.prompts.code_prompt = other.prompts.code_prompt;
        }

        let default_fetch = FetchConfig::default();
        if other.fetch.git_program != default_fetch.git_program {
            self.fetch.git_program = other.fetch.git_program;
        }
        if other.fetch.temp_prefix != default_fetch.temp_prefix {
            self.fetch.temp_prefix = other.fetch.temp_prefix;
        }
        if other.fetch.scratch_dir.is_some() {
            self.fetch.scratch_dir = other.fetch.scratch_dir;
        }
        if other.fetch.key_by != default_fetch.key_by {
            self.fetch.key_by = other.fetch.key_by;
        }
        if other.fetch.exclude_git_dir {
            self.fetch.exclude_git_dir = true;
        }

        let default_server = ServerConfig::default();
        if other.server.listen != default_server.listen {
            self.server.listen = other.server.listen;
        }
        if other.server.max_concurrent_clones != default_server.max_concurrent_clones {
            self.server.max_concurrent_clones = other.server.max_concurrent_clones;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(val) = env.var(constants::ENV_MODEL) {
            self.model.name = val;
        }
        if let Some(val) = env.var(constants::ENV_OLLAMA_URL) {
            self.model.base_url = val;
        }
        if let Some(val) = env.parsed::<u32>(constants::ENV_TRY_OUTS) {
            self.model.try_outs = val;
        }
        if let Some(val) = env.var(constants::ENV_LISTEN) {
            self.server.listen = val;
        }
        if let Some(val) = env.var(constants::ENV_GIT) {
            self.fetch.git_program = val;
        }
        if let Some(val) = env.parsed::<SnapshotKey>(constants::ENV_KEY_BY) {
            self.fetch.key_by = val;
        }
    }
}
