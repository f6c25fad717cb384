use serde::Deserialize;
use strum::{Display, EnumString};

/// Default location of the optional config file (extension inferred).
pub const DEFAULT_CONFIG_FILE: &str = "config/recommend";

/// Root application configuration. Loaded from an optional config file and
/// environment variables with the prefix `RECOMMEND_API__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub counters: CounterConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub recommendations: RecommendationConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_urls")]
    pub urls: Vec<String>,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

/// Which shared map holds the hit counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CounterBackend {
    /// Redis, shared by every node of the cluster.
    Redis,
    /// In-process map; single node only.
    Local,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CounterConfig {
    #[serde(default = "default_counter_backend")]
    pub backend: CounterBackend,
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Use the store's atomic increment for global hit counters instead of
    /// read-then-write.
    #[serde(default)]
    pub atomic_increments: bool,
    #[serde(default = "default_maintenance_interval_secs")]
    pub maintenance_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// JSON list of `{name, type}` loaded into an empty catalog at startup.
    #[serde(default)]
    pub seed_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default functions
fn default_node_id() -> String {
    "node-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_redis_urls() -> Vec<String> {
    vec!["redis://localhost:6379".to_string()]
}
fn default_key_prefix() -> String {
    "recommend".to_string()
}
fn default_connect_timeout_ms() -> u64 {
    5000
}
fn default_counter_backend() -> CounterBackend {
    CounterBackend::Redis
}
fn default_session_ttl_secs() -> u64 {
    1800
}
fn default_maintenance_interval_secs() -> u64 {
    60
}
fn default_database_path() -> String {
    "data/catalog.db".to_string()
}
fn default_limit() -> usize {
    10
}
fn default_max_limit() -> usize {
    100
}
fn default_metrics_port() -> u16 {
    9091
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            urls: default_redis_urls(),
            key_prefix: default_key_prefix(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            backend: default_counter_backend(),
            session_ttl_secs: default_session_ttl_secs(),
            atomic_increments: false,
            maintenance_interval_secs: default_maintenance_interval_secs(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            seed_path: None,
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            redis: RedisConfig::default(),
            counters: CounterConfig::default(),
            catalog: CatalogConfig::default(),
            recommendations: RecommendationConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl RecommendationConfig {
    /// Resolve a requested limit: default when absent, capped at `max_limit`.
    pub fn resolve_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

impl AppConfig {
    /// Load configuration from the default config file (if present) and
    /// environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    pub fn load_from(file: &str) -> Result<Self, config::ConfigError> {
        tracing::debug!(file = file, "Loading configuration");
        let builder = config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(
                config::Environment::with_prefix("RECOMMEND_API")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("redis.urls"),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.http_port, 8080);
        assert_eq!(config.counters.backend, CounterBackend::Redis);
        assert!(!config.counters.atomic_increments);
        assert_eq!(config.recommendations.default_limit, 10);
    }

    #[test]
    fn test_resolve_limit() {
        let recs = RecommendationConfig::default();
        assert_eq!(recs.resolve_limit(None), 10);
        assert_eq!(recs.resolve_limit(Some(3)), 3);
        assert_eq!(recs.resolve_limit(Some(0)), 0);
        assert_eq!(recs.resolve_limit(Some(10_000)), 100);
    }

    #[test]
    fn test_counter_backend_parse() {
        assert_eq!(CounterBackend::from_str("local").unwrap(), CounterBackend::Local);
        assert_eq!(CounterBackend::Redis.to_string(), "redis");
        assert!(CounterBackend::from_str("memcached").is_err());
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = AppConfig::load_from("does/not/exist").unwrap();
        assert_eq!(config.recommendations.max_limit, 100);
        assert_eq!(config.redis.key_prefix, "recommend");
    }

    #[test]
    fn test_load_default_file_is_optional() {
        let config = AppConfig::load().unwrap();
        assert_eq!(config.counters.session_ttl_secs, 1800);
        assert_eq!(config.catalog.database_path, "data/catalog.db");
    }
}
