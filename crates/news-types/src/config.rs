//! Configuration loading for news-clusterer.
//!
//! Layered config: defaults -> default config file -> `--config` file -> env vars -> CLI flags.
//! The default config file lives at `<config_dir>/news-clusterer/config.toml`.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::NewsError;

/// Distance used for density clustering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetricSetting {
    /// L2-normalize embeddings, then cluster with Euclidean distance
    #[default]
    Cosine,
    /// Cluster raw embeddings with Euclidean distance
    Euclidean,
}

/// What to do with articles HDBSCAN labels as noise.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoisePolicySetting {
    /// Each noise article becomes its own single-member cluster
    #[default]
    Singleton,
    /// Noise articles are left out of the response
    Drop,
}

/// LLM provider for cluster summaries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SummarizerProvider {
    /// OpenAI or any OpenAI-compatible chat completions endpoint
    #[default]
    Openai,
    /// Anthropic messages API
    Anthropic,
}

impl SummarizerProvider {
    /// Environment variable consulted when no key is configured.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            SummarizerProvider::Openai => "OPENAI_API_KEY",
            SummarizerProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Default API base URL.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            SummarizerProvider::Openai => "https://api.openai.com/v1",
            SummarizerProvider::Anthropic => "https://api.anthropic.com/v1",
        }
    }
}

/// Embedding model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// HuggingFace repository of the sentence-transformer model
    #[serde(default = "default_embedding_repo")]
    pub repo_id: String,

    /// Model cache directory (defaults to the OS cache dir)
    #[serde(default)]
    pub cache_dir: Option<String>,

    /// Texts per forward pass
    #[serde(default = "default_embedding_batch_size")]
    pub batch_size: usize,
}

fn default_embedding_repo() -> String {
    "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2".to_string()
}

fn default_embedding_batch_size() -> usize {
    32
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            repo_id: default_embedding_repo(),
            cache_dir: None,
            batch_size: default_embedding_batch_size(),
        }
    }
}

/// HDBSCAN and representative selection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringSettings {
    /// Smallest group HDBSCAN will report as a cluster
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: usize,

    /// Neighbourhood size for core distances
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    #[serde(default)]
    pub metric: DistanceMetricSetting,

    /// Clusters closer than this distance are merged during selection
    #[serde(default = "default_cluster_selection_epsilon")]
    pub cluster_selection_epsilon: f64,

    #[serde(default)]
    pub allow_single_cluster: bool,

    /// Representatives per cluster sent to the summarizer
    #[serde(default = "default_representatives")]
    pub representatives: usize,

    #[serde(default)]
    pub noise_policy: NoisePolicySetting,
}

fn default_min_cluster_size() -> usize {
    2
}

fn default_min_samples() -> usize {
    1
}

fn default_cluster_selection_epsilon() -> f64 {
    0.15
}

fn default_representatives() -> usize {
    3
}

impl Default for ClusteringSettings {
    fn default() -> Self {
        Self {
            min_cluster_size: default_min_cluster_size(),
            min_samples: default_min_samples(),
            metric: DistanceMetricSetting::default(),
            cluster_selection_epsilon: default_cluster_selection_epsilon(),
            allow_single_cluster: false,
            representatives: default_representatives(),
            noise_policy: NoisePolicySetting::default(),
        }
    }
}

/// Summarizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerSettings {
    #[serde(default)]
    pub provider: SummarizerProvider,

    /// Model name (e.g., "gpt-3.5-turbo", "gpt-4o-mini")
    #[serde(default = "default_summarizer_model")]
    pub model: String,

    /// API key (normally loaded from the provider env var, not stored in config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub api_base_url: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Articles included in a single prompt
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,

    /// Clusters summarized in parallel
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Return a generic title/summary instead of failing the request
    #[serde(default = "default_true")]
    pub fallback_on_error: bool,
}

fn default_summarizer_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    200
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_max_articles() -> usize {
    3
}

fn default_concurrency() -> usize {
    4
}

fn default_true() -> bool {
    true
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            provider: SummarizerProvider::default(),
            model: default_summarizer_model(),
            api_key: None,
            api_base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            max_articles: default_max_articles(),
            concurrency: default_concurrency(),
            fallback_on_error: default_true(),
        }
    }
}

impl SummarizerSettings {
    /// Configured key, or the provider's environment variable.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(self.provider.api_key_env()).ok())
            .filter(|k| !k.trim().is_empty())
    }

    /// Configured base URL, or the provider default.
    pub fn resolved_base_url(&self) -> String {
        self.api_base_url
            .clone()
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string()
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// HTTP server host
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Route prefix for the clustering endpoint
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub embedding: EmbeddingSettings,

    #[serde(default)]
    pub clustering: ClusteringSettings,

    #[serde(default)]
    pub summarizer: SummarizerSettings,
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8000
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http_host: default_http_host(),
            http_port: default_http_port(),
            api_prefix: default_api_prefix(),
            max_body_bytes: default_max_body_bytes(),
            log_level: default_log_level(),
            embedding: EmbeddingSettings::default(),
            clustering: ClusteringSettings::default(),
            summarizer: SummarizerSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (<config_dir>/news-clusterer/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (NEWS_*, `__` between nested keys)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, NewsError> {
        let config_dir = ProjectDirs::from("", "", "news-clusterer")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("http_host", default_http_host())
            .map_err(|e| NewsError::Config(e.to_string()))?
            .set_default("http_port", default_http_port() as i64)
            .map_err(|e| NewsError::Config(e.to_string()))?
            .set_default("api_prefix", default_api_prefix())
            .map_err(|e| NewsError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| NewsError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: NEWS_HTTP_PORT, NEWS_SUMMARIZER__MODEL, NEWS_CLUSTERING__MIN_CLUSTER_SIZE
        builder = builder.add_source(
            Environment::with_prefix("NEWS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| NewsError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| NewsError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), NewsError> {
        let clustering = &self.clustering;
        if clustering.min_cluster_size < 2 {
            return Err(NewsError::Config(format!(
                "clustering.min_cluster_size must be >= 2, got {}",
                clustering.min_cluster_size
            )));
        }
        if clustering.min_samples == 0 {
            return Err(NewsError::Config(
                "clustering.min_samples must be > 0".to_string(),
            ));
        }
        if !clustering.cluster_selection_epsilon.is_finite()
            || clustering.cluster_selection_epsilon < 0.0
        {
            return Err(NewsError::Config(format!(
                "clustering.cluster_selection_epsilon must be a non-negative number, got {}",
                clustering.cluster_selection_epsilon
            )));
        }
        if clustering.representatives == 0 {
            return Err(NewsError::Config(
                "clustering.representatives must be > 0".to_string(),
            ));
        }
        if self.embedding.batch_size == 0 {
            return Err(NewsError::Config(
                "embedding.batch_size must be > 0".to_string(),
            ));
        }

        let summarizer = &self.summarizer;
        if summarizer.concurrency == 0 {
            return Err(NewsError::Config(
                "summarizer.concurrency must be > 0".to_string(),
            ));
        }
        if summarizer.max_articles == 0 {
            return Err(NewsError::Config(
                "summarizer.max_articles must be > 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&summarizer.temperature) {
            return Err(NewsError::Config(format!(
                "summarizer.temperature must be 0.0-2.0, got {}",
                summarizer.temperature
            )));
        }
        if !self.api_prefix.is_empty() && !self.api_prefix.starts_with('/') {
            return Err(NewsError::Config(format!(
                "api_prefix must start with '/', got {}",
                self.api_prefix
            )));
        }
        Ok(())
    }

    /// Get the socket address for the HTTP server
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Model cache directory, with `~` expanded.
    pub fn expanded_cache_dir(&self) -> Option<PathBuf> {
        self.embedding.cache_dir.as_deref().map(expand_home)
    }
}

/// Expand a leading `~/` to the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(base) = directories::BaseDirs::new() {
            return base.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}
