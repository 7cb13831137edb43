//! Configuration management for chunkwave.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with defaults tuned for LLM-sized chunk
//! processing (10 second optimal call, waves of five).

use crate::core::error::{ChunkwaveError, Result};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub waves: WaveConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Chunking and feedback-controller configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChunkingConfig {
    /// Starting target chunk size in characters
    #[serde(default = "default_initial_chunk_size")]
    pub initial_chunk_size: usize,

    #[serde(default = "default_min_chunk_size")]
    pub min_chunk_size: usize,

    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Processing time the controller steers towards
    #[serde(default = "default_optimal_duration_ms")]
    pub optimal_duration_ms: u64,

    /// Calls faster than this grow the target size
    #[serde(default = "default_fast_threshold_ms")]
    pub fast_threshold_ms: u64,

    /// Calls slower than this shrink the target size
    #[serde(default = "default_slow_threshold_ms")]
    pub slow_threshold_ms: u64,

    #[serde(default = "default_grow_factor")]
    pub grow_factor: f64,

    #[serde(default = "default_shrink_factor")]
    pub shrink_factor: f64,

    /// Optional cap on chunks per document
    #[serde(default)]
    pub max_chunks: Option<usize>,

    /// Entries kept by the classification/boundary LRU cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

/// Wave scheduling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WaveConfig {
    /// Chunks dispatched concurrently per wave
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// A result counts as confident when strictly above this
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Confident results needed to stop dispatching waves
    #[serde(default = "default_min_confident_chunks")]
    pub min_confident_chunks: usize,

    /// Per-call timeout in seconds
    #[serde(default = "default_call_timeout")]
    pub call_timeout_sec: u64,
}

/// Chunk materialization configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory chunk files are written to
    #[serde(default = "default_chunk_dir")]
    pub chunk_dir: PathBuf,

    /// File name prefix for chunk files and chunk ids
    #[serde(default = "default_chunk_prefix")]
    pub chunk_prefix: String,
}

// Default value functions
fn default_initial_chunk_size() -> usize {
    50_000
}

fn default_min_chunk_size() -> usize {
    50_000
}

fn default_max_chunk_size() -> usize {
    200_000
}

fn default_optimal_duration_ms() -> u64 {
    10_000
}

fn default_fast_threshold_ms() -> u64 {
    5_000
}

fn default_slow_threshold_ms() -> u64 {
    15_000
}

fn default_grow_factor() -> f64 {
    1.2
}

fn default_shrink_factor() -> f64 {
    0.7
}

fn default_cache_capacity() -> usize {
    128
}

fn default_max_concurrency() -> usize {
    5
}

fn default_confidence_threshold() -> f64 {
    0.8
}

fn default_min_confident_chunks() -> usize {
    3
}

fn default_call_timeout() -> u64 {
    120
}

fn default_chunk_dir() -> PathBuf {
    PathBuf::from("./chunks")
}

fn default_chunk_prefix() -> String {
    "chunk".to_string()
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            initial_chunk_size: default_initial_chunk_size(),
            min_chunk_size: default_min_chunk_size(),
            max_chunk_size: default_max_chunk_size(),
            optimal_duration_ms: default_optimal_duration_ms(),
            fast_threshold_ms: default_fast_threshold_ms(),
            slow_threshold_ms: default_slow_threshold_ms(),
            grow_factor: default_grow_factor(),
            shrink_factor: default_shrink_factor(),
            max_chunks: None,
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            confidence_threshold: default_confidence_threshold(),
            min_confident_chunks: default_min_confident_chunks(),
            call_timeout_sec: default_call_timeout(),
        }
    }
}

impl WaveConfig {
    /// Per-call timeout as a `Duration`
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_sec)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            chunk_dir: default_chunk_dir(),
            chunk_prefix: default_chunk_prefix(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ChunkwaveError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. CHUNKWAVE_CONFIG env var
    /// 2. XDG config file (~/.config/chunkwave/config.toml)
    /// 3. ./chunkwave.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("CHUNKWAVE_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("chunkwave.toml").exists() {
                Self::from_file("chunkwave.toml")?
            } else {
                Self::default()
            }
        };

        // Chunk files go to the XDG state directory unless configured
        if env::var("CHUNKWAVE_CHUNK_DIR").is_err()
            && config.output.chunk_dir == default_chunk_dir()
        {
            config.output.chunk_dir = xdg.chunks_dir();
        }

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        // Chunking configuration
        if let Some(size) = env_parse("CHUNKWAVE_INITIAL_CHUNK_SIZE") {
            self.chunking.initial_chunk_size = size;
        }
        if let Some(size) = env_parse("CHUNKWAVE_MIN_CHUNK_SIZE") {
            self.chunking.min_chunk_size = size;
        }
        if let Some(size) = env_parse("CHUNKWAVE_MAX_CHUNK_SIZE") {
            self.chunking.max_chunk_size = size;
        }
        if let Some(ms) = env_parse("CHUNKWAVE_OPTIMAL_DURATION_MS") {
            self.chunking.optimal_duration_ms = ms;
        }
        if let Some(max) = env_parse("CHUNKWAVE_MAX_CHUNKS") {
            self.chunking.max_chunks = Some(max);
        }

        // Wave configuration
        if let Some(n) = env_parse("CHUNKWAVE_MAX_CONCURRENCY") {
            self.waves.max_concurrency = n;
        }
        if let Some(t) = env_parse("CHUNKWAVE_CONFIDENCE_THRESHOLD") {
            self.waves.confidence_threshold = t;
        }
        if let Some(n) = env_parse("CHUNKWAVE_MIN_CONFIDENT_CHUNKS") {
            self.waves.min_confident_chunks = n;
        }
        if let Some(t) = env_parse("CHUNKWAVE_CALL_TIMEOUT_SEC") {
            self.waves.call_timeout_sec = t;
        }

        // Output configuration
        if let Ok(dir) = env::var("CHUNKWAVE_CHUNK_DIR") {
            self.output.chunk_dir = PathBuf::from(dir);
        }
        if let Ok(prefix) = env::var("CHUNKWAVE_CHUNK_PREFIX") {
            self.output.chunk_prefix = prefix;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let chunking = &self.chunking;
        if chunking.min_chunk_size == 0 {
            return Err(config_error("Min chunk size must be non-zero"));
        }
        if chunking.min_chunk_size > chunking.max_chunk_size {
            return Err(config_error("Min chunk size cannot exceed max chunk size"));
        }
        if chunking.initial_chunk_size == 0 {
            return Err(config_error("Initial chunk size must be non-zero"));
        }
        if chunking.fast_threshold_ms > chunking.slow_threshold_ms {
            return Err(config_error(
                "Fast threshold cannot exceed slow threshold",
            ));
        }
        if !(chunking.grow_factor >= 1.0 && chunking.grow_factor.is_finite()) {
            return Err(config_error("Grow factor must be >= 1.0"));
        }
        if !(chunking.shrink_factor > 0.0 && chunking.shrink_factor <= 1.0) {
            return Err(config_error("Shrink factor must be in (0, 1]"));
        }
        if chunking.max_chunks == Some(0) {
            return Err(config_error("Max chunks must be non-zero when set"));
        }
        if chunking.cache_capacity == 0 {
            return Err(config_error("Cache capacity must be non-zero"));
        }

        let waves = &self.waves;
        if waves.max_concurrency == 0 {
            return Err(config_error("Max concurrency must be non-zero"));
        }
        if !(0.0..=1.0).contains(&waves.confidence_threshold) {
            return Err(config_error("Confidence threshold must be in [0, 1]"));
        }
        if waves.min_confident_chunks == 0 {
            return Err(config_error("Min confident chunks must be non-zero"));
        }
        if waves.call_timeout_sec == 0 {
            return Err(config_error("Call timeout must be non-zero"));
        }

        if self.output.chunk_prefix.trim().is_empty() {
            return Err(config_error("Chunk prefix must not be empty"));
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!(
            "  Chunk size: {} chars (min {}, max {})",
            self.chunking.initial_chunk_size,
            self.chunking.min_chunk_size,
            self.chunking.max_chunk_size
        );
        tracing::info!(
            "  Feedback: optimal {}ms, fast <{}ms (x{}), slow >{}ms (x{})",
            self.chunking.optimal_duration_ms,
            self.chunking.fast_threshold_ms,
            self.chunking.grow_factor,
            self.chunking.slow_threshold_ms,
            self.chunking.shrink_factor
        );
        tracing::info!("  Max chunks: {:?}", self.chunking.max_chunks);
        tracing::info!("  Cache capacity: {}", self.chunking.cache_capacity);
        tracing::info!("  Max concurrency: {}", self.waves.max_concurrency);
        tracing::info!(
            "  Early stop: {} results above {}",
            self.waves.min_confident_chunks,
            self.waves.confidence_threshold
        );
        tracing::info!("  Call timeout: {}s", self.waves.call_timeout_sec);
        tracing::info!("  Chunk dir: {:?}", self.output.chunk_dir);
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn config_error(message: &str) -> ChunkwaveError {
    ChunkwaveError::ConfigError(message.to_string())
}
