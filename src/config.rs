//! TOML configuration for the `bkh` client.
//!
//! Every section is optional; a missing file at the default location falls
//! back to [`Config::minimal`]. The backend base URL can be overridden with
//! the `BKH_API_BASE` environment variable.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding `api.base_url`.
pub const API_BASE_ENV: &str = "BKH_API_BASE";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub search: SearchDefaults,
    #[serde(default)]
    pub ask: AskDefaults,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8001".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

fn default_session_path() -> PathBuf {
    PathBuf::from("./.bkh/session.json")
}

/// Initial values of the Search form.
#[derive(Debug, Deserialize, Clone)]
pub struct SearchDefaults {
    #[serde(default = "default_search_query")]
    pub q: String,
    #[serde(default = "default_search_k")]
    pub k: u32,
    #[serde(default = "default_search_min_score")]
    pub min_score: f64,
    #[serde(default = "default_true")]
    pub keyword_filter: bool,
    #[serde(default = "default_per_doc")]
    pub per_doc: u32,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            q: default_search_query(),
            k: default_search_k(),
            min_score: default_search_min_score(),
            keyword_filter: true,
            per_doc: default_per_doc(),
        }
    }
}

fn default_search_query() -> String {
    "latte".to_string()
}
fn default_search_k() -> u32 {
    5
}
fn default_search_min_score() -> f64 {
    0.25
}
fn default_true() -> bool {
    true
}
fn default_per_doc() -> u32 {
    2
}

/// Initial values of the Ask form.
#[derive(Debug, Deserialize, Clone)]
pub struct AskDefaults {
    #[serde(default = "default_question")]
    pub question: String,
    #[serde(default = "default_ask_k")]
    pub k: u32,
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: u32,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub require_all_terms: bool,
    #[serde(default = "default_ask_min_score")]
    pub min_score: f64,
    #[serde(default = "default_per_file")]
    pub per_file: u32,
    #[serde(default = "default_max_answer_chars")]
    pub max_answer_chars: u32,
}

impl Default for AskDefaults {
    fn default() -> Self {
        Self {
            question: default_question(),
            k: default_ask_k(),
            max_context_tokens: default_max_context_tokens(),
            provider: default_provider(),
            model: default_model(),
            require_all_terms: false,
            min_score: default_ask_min_score(),
            per_file: default_per_file(),
            max_answer_chars: default_max_answer_chars(),
        }
    }
}

fn default_question() -> String {
    "What is the name of server in \"BEAN & BREW COFFEE SHOP\"?".to_string()
}
fn default_ask_k() -> u32 {
    6
}
fn default_max_context_tokens() -> u32 {
    800
}
fn default_provider() -> String {
    "ollama".to_string()
}
fn default_model() -> String {
    "phi3:3.8b".to_string()
}
fn default_ask_min_score() -> f64 {
    0.2
}
fn default_per_file() -> u32 {
    1
}
fn default_max_answer_chars() -> u32 {
    140
}

impl Config {
    /// Configuration used when no config file exists.
    pub fn minimal() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            search: SearchDefaults::default(),
            ask: AskDefaults::default(),
        }
    }

    /// Replace the base URL, normalizing a trailing slash away.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.api.base_url = base_url.trim_end_matches('/').to_string();
        validate(&self)?;
        Ok(self)
    }
}

/// Parse configuration from TOML text and validate it.
pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config =
        toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.api.base_url = config.api.base_url.trim_end_matches('/').to_string();
    validate(&config)?;
    Ok(config)
}

/// Load the config file at `path`.
///
/// When `required` is false a missing file yields [`Config::minimal`]. The
/// `BKH_API_BASE` environment variable is applied last.
pub fn load_config(path: &Path, required: bool) -> Result<Config> {
    let config = if path.exists() || required {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        parse_config(&content)?
    } else {
        Config::minimal()
    };

    match std::env::var(API_BASE_ENV) {
        Ok(base) if !base.trim().is_empty() => config.with_base_url(base.trim()),
        _ => Ok(config),
    }
}

fn validate(config: &Config) -> Result<()> {
    let base = &config.api.base_url;
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        anyhow::bail!("api.base_url must start with http:// or https://, got '{}'", base);
    }

    check_min_score("search.min_score", config.search.min_score)?;
    check_min_score("ask.min_score", config.ask.min_score)?;

    Ok(())
}

/// Similarity thresholds are cosine scores in `[0.0, 1.0]`. Shared by config
/// validation and the CLI flags.
pub fn check_min_score(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        anyhow::bail!("{} must be in [0.0, 1.0], got {}", name, value);
    }
    Ok(())
}
