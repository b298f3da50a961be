//! TOML-based configuration for multiscout
//!
//! This module provides declarative configuration for the server, the LLM
//! endpoint, the search provider and research behaviour via a TOML file
//! (`multiscout.toml`). Secrets are never stored in the file: the config
//! names the environment variables that hold them.
//!
//! # Hot Reloading
//!
//! Configuration changes are automatically detected and applied at runtime.
//! Use `ConfigManager` for thread-safe access to the current configuration.

use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::activity::StreamSettings;
use crate::types::ModelInfo;

/// Root configuration structure loaded from multiscout.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MultiscoutConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub research: ResearchConfig,

    #[serde(default)]
    pub activity: ActivityConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    #[serde(default)]
    pub json_logs: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable holding the API key expected in `X-API-Key`.
    /// Research endpoints are open when the variable is unset.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_api_key_env() -> String {
    "API_SECRET".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
        }
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible chat completions API
    #[serde(default = "default_llm_api_base")]
    pub api_base: String,

    /// Environment variable containing the API key
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_planner_max_tokens")]
    pub planner_max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub planner_temperature: f32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Models callers may select per request
    #[serde(default = "default_models")]
    pub models: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_model_provider")]
    pub provider: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl From<&ModelEntry> for ModelInfo {
    fn from(entry: &ModelEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            description: entry.description.clone(),
            provider: entry.provider.clone(),
            max_tokens: entry.max_tokens,
        }
    }
}

fn default_llm_api_base() -> String {
    "https://api.cerebras.ai/v1".to_string()
}

fn default_llm_api_key_env() -> String {
    "CEREBRAS_API_KEY".to_string()
}

fn default_model() -> String {
    "gpt-oss-120b".to_string()
}

fn default_model_provider() -> String {
    "Cerebras".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.2
}

fn default_planner_max_tokens() -> u32 {
    1500
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_models() -> Vec<ModelEntry> {
    vec![ModelEntry {
        id: default_model(),
        name: "GPT OSS 120B".to_string(),
        description: "Open-weight reasoning model".to_string(),
        provider: default_model_provider(),
        max_tokens: default_max_tokens(),
    }]
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_llm_api_base(),
            api_key_env: default_llm_api_key_env(),
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            planner_max_tokens: default_planner_max_tokens(),
            planner_temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            models: default_models(),
        }
    }
}

// ============= Search Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProviderKind {
    /// Exa neural search API (requires an API key)
    Exa,
    /// DuckDuckGo web search, no key required
    Web,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_provider")]
    pub provider: SearchProviderKind,

    #[serde(default = "default_search_api_base")]
    pub api_base: String,

    /// Environment variable containing the Exa API key
    #[serde(default = "default_search_api_key_env")]
    pub api_key_env: String,

    /// Characters of page text requested per result
    #[serde(default = "default_max_characters")]
    pub max_characters: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_search_provider() -> SearchProviderKind {
    SearchProviderKind::Exa
}

fn default_search_api_base() -> String {
    "https://api.exa.ai".to_string()
}

fn default_search_api_key_env() -> String {
    "EXA_API_KEY".to_string()
}

fn default_max_characters() -> usize {
    1000
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: default_search_provider(),
            api_base: default_search_api_base(),
            api_key_env: default_search_api_key_env(),
            max_characters: default_max_characters(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// ============= Research Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    #[serde(default = "default_results_per_agent")]
    pub default_results_per_agent: usize,

    /// Run subagent searches concurrently instead of one after another
    #[serde(default = "default_true")]
    pub parallel_subagents: bool,

    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,

    /// Trimmed text must be longer than this to count as a source
    #[serde(default = "default_min_source_chars")]
    pub min_source_chars: usize,

    /// Stored source content is cut to this many characters
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

fn default_results_per_agent() -> usize {
    2
}

fn default_true() -> bool {
    true
}

fn default_run_timeout_secs() -> u64 {
    300
}

fn default_min_source_chars() -> usize {
    30
}

fn default_max_content_chars() -> usize {
    300
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            default_results_per_agent: default_results_per_agent(),
            parallel_subagents: default_true(),
            run_timeout_secs: default_run_timeout_secs(),
            min_source_chars: default_min_source_chars(),
            max_content_chars: default_max_content_chars(),
        }
    }
}

// ============= Activity Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    #[serde(default = "default_stream_poll_ms")]
    pub stream_poll_ms: u64,

    #[serde(default = "default_stream_idle_timeout_secs")]
    pub stream_idle_timeout_secs: u64,
}

fn default_stream_poll_ms() -> u64 {
    500
}

fn default_stream_idle_timeout_secs() -> u64 {
    120
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            stream_poll_ms: default_stream_poll_ms(),
            stream_idle_timeout_secs: default_stream_idle_timeout_secs(),
        }
    }
}

impl ActivityConfig {
    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings {
            poll_interval: Duration::from_millis(self.stream_poll_ms),
            idle_timeout: Duration::from_secs(self.stream_idle_timeout_secs),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

impl MultiscoutConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: MultiscoutConfig = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate value ranges and cross-references
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.models.is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.models must list at least one model".to_string(),
            ));
        }

        if self.find_model(&self.llm.default_model).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "llm.default_model '{}' is not listed in llm.models",
                self.llm.default_model
            )));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature)
            || !(0.0..=2.0).contains(&self.llm.planner_temperature)
        {
            return Err(ConfigError::ValidationError(
                "llm temperatures must be between 0.0 and 2.0".to_string(),
            ));
        }

        if !(1..=5).contains(&self.research.default_results_per_agent) {
            return Err(ConfigError::ValidationError(
                "research.default_results_per_agent must be between 1 and 5".to_string(),
            ));
        }

        if self.research.max_content_chars == 0 {
            return Err(ConfigError::ValidationError(
                "research.max_content_chars must be positive".to_string(),
            ));
        }

        if self.research.run_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "research.run_timeout_secs must be positive".to_string(),
            ));
        }

        if self.activity.stream_poll_ms == 0 {
            return Err(ConfigError::ValidationError(
                "activity.stream_poll_ms must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Like [`validate`](Self::validate), but also require the secrets the
    /// configured providers need to be present in the environment.
    pub fn validate_env(&self) -> Result<(), ConfigError> {
        self.validate()?;
        self.require_env(&self.llm.api_key_env)?;
        if self.search.provider == SearchProviderKind::Exa {
            self.require_env(&self.search.api_key_env)?;
        }
        Ok(())
    }

    fn require_env(&self, name: &str) -> Result<(), ConfigError> {
        self.resolve_env(name)
            .map(|_| ())
            .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|v| !v.is_empty())
    }

    /// API key protecting the research endpoints, if one is configured
    pub fn api_key(&self) -> Option<String> {
        self.resolve_env(&self.auth.api_key_env)
    }

    pub fn find_model(&self, id: &str) -> Option<&ModelEntry> {
        self.llm.models.iter().find(|m| m.id == id)
    }

    pub fn model_infos(&self) -> Vec<ModelInfo> {
        self.llm.models.iter().map(ModelInfo::from).collect()
    }
}

// ============= Hot Reloading Configuration Manager =============

/// Thread-safe configuration manager with hot reloading support
pub struct ConfigManager {
    config: Arc<ArcSwap<MultiscoutConfig>>,
    config_path: PathBuf,
    watcher: RwLock<Option<RecommendedWatcher>>,
}

impl ConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // Absolute path for reliable file watching
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = MultiscoutConfig::load(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
            watcher: RwLock::new(None),
        })
    }

    /// Create a config manager directly from a config (useful for testing).
    /// This won't have file watching capabilities.
    pub fn from_config(config: MultiscoutConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from("multiscout.toml"),
            watcher: RwLock::new(None),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<MultiscoutConfig> {
        self.config.load_full()
    }

    /// Manually reload the configuration from disk
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = MultiscoutConfig::load(&self.config_path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Start watching for configuration file changes
    pub fn start_watching(&mut self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let config_arc = Arc::clone(&self.config);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        // Debounced in the receiver
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        // Watch the parent directory so editors that replace the file are seen
        if let Some(parent) = self.config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        *self.watcher.write() = Some(watcher);

        let config_path = self.config_path.clone();
        tokio::spawn(async move {
            let mut last_reload = std::time::Instant::now();
            let debounce_duration = Duration::from_millis(500);

            while rx.recv().await.is_some() {
                if last_reload.elapsed() < debounce_duration {
                    continue;
                }

                // Let the writer finish
                tokio::time::sleep(Duration::from_millis(100)).await;

                match MultiscoutConfig::load(&config_path) {
                    Ok(new_config) => {
                        config_arc.store(Arc::new(new_config));
                        info!("Configuration hot-reloaded successfully");
                        last_reload = std::time::Instant::now();
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }

}

impl Clone for ConfigManager {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            config_path: self.config_path.clone(),
            watcher: RwLock::new(None), // Watcher is not cloned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_test_config() -> String {
        r#"
[server]
host = "0.0.0.0"
port = 9000
log_level = "debug"

[auth]
api_key_env = "MULTISCOUT_TEST_API_KEY"

[llm]
api_base = "http://localhost:8080/v1"
api_key_env = "MULTISCOUT_TEST_LLM_KEY"
default_model = "fast"
max_tokens = 800

[[llm.models]]
id = "fast"
name = "Fast model"
description = "Quick answers"
provider = "Local"

[[llm.models]]
id = "deep"
name = "Deep model"
max_tokens = 4000

[search]
provider = "web"

[research]
default_results_per_agent = 3
parallel_subagents = false
run_timeout_secs = 60
"#
        .to_string()
    }

    #[test]
    fn test_parse_config() {
        let config: MultiscoutConfig = toml::from_str(&create_test_config()).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.llm.default_model, "fast");
        assert_eq!(config.llm.max_tokens, 800);
        assert_eq!(config.llm.models.len(), 2);
        assert_eq!(config.llm.models[1].provider, "Cerebras");
        assert_eq!(config.llm.models[1].max_tokens, 4000);
        assert_eq!(config.search.provider, SearchProviderKind::Web);
        assert_eq!(config.research.default_results_per_agent, 3);
        assert!(!config.research.parallel_subagents);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config: MultiscoutConfig = toml::from_str("").unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.default_model, "gpt-oss-120b");
        assert_eq!(config.llm.max_tokens, 1000);
        assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.search.provider, SearchProviderKind::Exa);
        assert_eq!(config.search.max_characters, 1000);
        assert_eq!(config.research.min_source_chars, 30);
        assert_eq!(config.research.max_content_chars, 300);
        assert!(config.research.parallel_subagents);
        assert_eq!(config.activity.stream_poll_ms, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_unknown_default_model() {
        let mut config = MultiscoutConfig::default();
        config.llm.default_model = "missing".to_string();

        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::ValidationError(msg)) if msg.contains("missing")));
    }

    #[test]
    fn test_validation_results_per_agent_range() {
        let mut config = MultiscoutConfig::default();
        config.research.default_results_per_agent = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_env_reports_missing_key() {
        let mut config = MultiscoutConfig::default();
        config.llm.api_key_env = "MULTISCOUT_SURELY_UNSET_LLM_KEY".to_string();

        let result = config.validate_env();
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(name)) if name == "MULTISCOUT_SURELY_UNSET_LLM_KEY")
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(create_test_config().as_bytes()).unwrap();

        let config = MultiscoutConfig::load(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert!(config.find_model("deep").is_some());
        assert_eq!(config.model_infos().len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = MultiscoutConfig::load("/definitely/not/here/multiscout.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_config_manager_reload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(create_test_config().as_bytes()).unwrap();

        let manager = ConfigManager::new(file.path()).unwrap();
        let shared = manager.clone();
        assert_eq!(manager.config().server.port, 9000);

        let updated = create_test_config().replace("port = 9000", "port = 9100");
        fs::write(file.path(), updated).unwrap();
        manager.reload().unwrap();

        assert_eq!(manager.config().server.port, 9100);
        assert_eq!(shared.config().server.port, 9100);
    }

    #[test]
    fn test_search_section_keys() {
        let table = toml::Value::try_from(SearchConfig::default()).unwrap();
        let mut keys: Vec<&str> = table
            .as_table()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "api_base",
                "api_key_env",
                "max_characters",
                "provider",
                "request_timeout_secs"
            ]
        );
    }

    #[test]
    fn test_config_manager_from_config() {
        let manager = ConfigManager::from_config(MultiscoutConfig::default());
        let clone = manager.clone();
        assert_eq!(clone.config().llm.default_model, "gpt-oss-120b");
    }
}
