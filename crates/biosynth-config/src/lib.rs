//! Configuration loading for BioSynth.
//! Reads biosynth.toml from the current directory or the path in the BIOSYNTH_CONFIG
//! env var, then applies environment overrides (a `.env` file is honoured).

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16    { 8000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

/// External API credentials. Placeholder values count as absent.
#[derive(Clone, Deserialize)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub ncbi_api_key: Option<String>,
    #[serde(default = "default_ncbi_email")]
    pub ncbi_email: String,
}

fn default_ncbi_email() -> String { "your_email@example.com".to_string() }

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            gemini_api_key: None,
            ncbi_api_key: None,
            ncbi_email: default_ncbi_email(),
        }
    }
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |k: &Option<String>| k.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("CredentialsConfig")
            .field("anthropic_api_key", &redact(&self.anthropic_api_key))
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("ncbi_api_key", &redact(&self.ncbi_api_key))
            .field("ncbi_email", &self.ncbi_email)
            .finish()
    }
}

impl CredentialsConfig {
    pub fn anthropic(&self) -> Option<&str> { usable_key(&self.anthropic_api_key) }
    pub fn gemini(&self) -> Option<&str>    { usable_key(&self.gemini_api_key) }
    pub fn ncbi(&self) -> Option<&str>      { usable_key(&self.ncbi_api_key) }
}

fn usable_key(key: &Option<String>) -> Option<&str> {
    key.as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty() && !(k.starts_with("your_") && k.ends_with("_here")))
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_anthropic_model() -> String { "claude-3-5-sonnet-20241022".to_string() }
fn default_gemini_model()    -> String { "gemini-2.0-flash".to_string() }
fn default_max_tokens()      -> u32    { 1024 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            anthropic_model: default_anthropic_model(),
            gemini_model: default_gemini_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Network key-value store; the in-memory store is used when unset.
    pub redis_url: Option<String>,
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_ttl")]
    pub result_ttl_secs: u64,
}

fn default_ttl() -> u64 { 3600 }

impl Default for CacheConfig {
    fn default() -> Self {
        Self { redis_url: None, ttl_secs: default_ttl(), result_ttl_secs: default_ttl() }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration { Duration::from_secs(self.ttl_secs) }
    pub fn result_ttl(&self) -> Duration { Duration::from_secs(self.result_ttl_secs) }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_max_sequence_length")]
    pub max_sequence_length: usize,
    #[serde(default = "default_external_timeout")]
    pub external_timeout_secs: u64,
    /// Seed for every simulated value (placeholder genes, off-target synthesis, risk scores).
    #[serde(default = "default_seed")]
    pub simulation_seed: u64,
    #[serde(default = "default_esmfold_url")]
    pub esmfold_url: String,
    #[serde(default = "bool_true")]
    pub use_external_services: bool,
}

fn default_max_sequence_length() -> usize { 10_000 }
fn default_external_timeout()    -> u64   { 30 }
fn default_seed()                -> u64   { 42 }
fn default_esmfold_url()         -> String { "https://api.esmatlas.com/foldSequence/v1/pdb/".to_string() }
fn bool_true()                   -> bool  { true }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_sequence_length: default_max_sequence_length(),
            external_timeout_secs: default_external_timeout(),
            simulation_seed: default_seed(),
            esmfold_url: default_esmfold_url(),
            use_external_services: true,
        }
    }
}

impl PipelineConfig {
    pub fn external_timeout(&self) -> Duration { Duration::from_secs(self.external_timeout_secs) }
}

mod tests;

impl Config {
    /// Load configuration: `.env`, then biosynth.toml (BIOSYNTH_CONFIG overrides the
    /// path; a missing file means defaults), then environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }

        let path = std::env::var("BIOSYNTH_CONFIG")
            .unwrap_or_else(|_| "biosynth.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            Self::from_file(Path::new(&path))?
        } else {
            tracing::info!(path = %path, "No config file found, using defaults");
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(k) = lookup("CLAUDE_API_KEY").or_else(|| lookup("ANTHROPIC_API_KEY")) {
            self.credentials.anthropic_api_key = Some(k);
        }
        if let Some(k) = lookup("GEMINI_API_KEY") {
            self.credentials.gemini_api_key = Some(k);
        }
        if let Some(k) = lookup("NCBI_API_KEY") {
            self.credentials.ncbi_api_key = Some(k);
        }
        if let Some(email) = lookup("NCBI_EMAIL") {
            self.credentials.ncbi_email = email;
        }
        if let Some(url) = lookup("REDIS_URL") {
            self.cache.redis_url = Some(url);
        }
        // One lifetime for cached results and for results retained by id.
        if let Some(v) = lookup("CACHE_TTL") {
            let ttl = parse_env("CACHE_TTL", v)?;
            self.cache.ttl_secs = ttl;
            self.cache.result_ttl_secs = ttl;
        }
        if let Some(v) = lookup("MAX_SEQUENCE_LENGTH") {
            self.pipeline.max_sequence_length = parse_env("MAX_SEQUENCE_LENGTH", v)?;
        }
        if let Some(v) = lookup("BIOSYNTH_SEED") {
            self.pipeline.simulation_seed = parse_env("BIOSYNTH_SEED", v)?;
        }
        if let Some(v) = lookup("BIOSYNTH_PORT") {
            self.server.port = parse_env("BIOSYNTH_PORT", v)?;
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv { key: key.to_string(), value })
}
