use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config as cfg;
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string (required).
    #[serde(default)]
    pub url: String,
    #[serde(default = "DatabaseConfig::default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "DatabaseConfig::default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "DatabaseConfig::default_max_lifetime_seconds")]
    pub max_lifetime_seconds: u64,
}

impl DatabaseConfig {
    fn default_max_connections() -> u32 {
        25
    }

    fn default_min_connections() -> u32 {
        5
    }

    fn default_max_lifetime_seconds() -> u64 {
        300
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: Self::default_max_connections(),
            min_connections: Self::default_min_connections(),
            max_lifetime_seconds: Self::default_max_lifetime_seconds(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Redis connection string (required).
    #[serde(default = "CacheConfig::default_url")]
    pub url: String,
    #[serde(default = "CacheConfig::default_catalog_ttl")]
    pub catalog_ttl_seconds: u64,
    #[serde(default = "CacheConfig::default_usage_ttl")]
    pub usage_ttl_seconds: u64,
}

impl CacheConfig {
    fn default_url() -> String {
        "redis://localhost:6379".into()
    }

    fn default_catalog_ttl() -> u64 {
        1800
    }

    fn default_usage_ttl() -> u64 {
        300
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            catalog_ttl_seconds: Self::default_catalog_ttl(),
            usage_ttl_seconds: Self::default_usage_ttl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "RateLimitConfig::default_window_seconds")]
    pub window_seconds: u64,
    #[serde(default = "RateLimitConfig::default_max_requests")]
    pub max_requests: u32,
    #[serde(default = "RateLimitConfig::default_skip_premium")]
    pub skip_premium: bool,
}

impl RateLimitConfig {
    fn default_window_seconds() -> u64 {
        60
    }

    fn default_max_requests() -> u32 {
        10
    }

    fn default_skip_premium() -> bool {
        true
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_seconds: Self::default_window_seconds(),
            max_requests: Self::default_max_requests(),
            skip_premium: Self::default_skip_premium(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuotaConfig {
    #[serde(default = "QuotaConfig::default_weekly_limit_free")]
    pub weekly_limit_free: i32,
}

impl QuotaConfig {
    fn default_weekly_limit_free() -> i32 {
        5
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            weekly_limit_free: Self::default_weekly_limit_free(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Absent key disables premium enrichment entirely.
    #[serde(default)]
    pub api_key: Option<SecretString>,
    #[serde(default = "LlmConfig::default_model")]
    pub model: String,
    #[serde(default = "LlmConfig::default_base_url")]
    pub base_url: String,
}

impl LlmConfig {
    fn default_model() -> String {
        "gpt-3.5-turbo".into()
    }

    fn default_base_url() -> String {
        "https://api.openai.com/v1".into()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: Self::default_model(),
            base_url: Self::default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: Option<SecretString>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "Settings::default_env")]
    pub env: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: Self::default_env(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            quota: QuotaConfig::default(),
            llm: LlmConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    fn default_env() -> String {
        env::var("APP_ENV")
            .ok()
            .or_else(|| env::var("RUST_ENV").ok())
            .unwrap_or_else(|| "development".to_string())
    }

    /// Layered load: default.toml, {env}.toml, local.toml, then COLLISION__* env vars.
    pub fn load(config_dir: Option<PathBuf>) -> Result<Self> {
        let env_name = Self::default_env();
        let dir = config_dir.unwrap_or_else(Self::default_config_dir);
        Self::load_from_sources(&dir, &env_name)
    }

    pub fn default_config_dir() -> PathBuf {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let project_config = cwd.join("config");
        if project_config.exists() {
            return project_config;
        }
        cwd
    }

    pub fn load_from_sources(config_dir: &Path, env_name: &str) -> Result<Self> {
        let settings: Settings = cfg::Config::builder()
            .add_source(cfg::File::from(config_dir.join("default.toml")).required(false))
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.toml", env_name))).required(false),
            )
            .add_source(cfg::File::from(config_dir.join("local.toml")).required(false))
            .add_source(cfg::Environment::with_prefix("COLLISION").separator("__"))
            .build()
            .context("building configuration")?
            .try_deserialize()
            .context("deserializing configuration")?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.server.host.trim().is_empty(),
            "server.host cannot be empty"
        );
        anyhow::ensure!(self.server.port > 0, "server.port must be > 0");
        anyhow::ensure!(
            !self.database.url.trim().is_empty(),
            "database.url is required"
        );
        anyhow::ensure!(!self.cache.url.trim().is_empty(), "cache.url is required");
        anyhow::ensure!(
            self.rate_limit.window_seconds > 0,
            "rate_limit.window_seconds must be > 0"
        );
        anyhow::ensure!(
            self.rate_limit.max_requests > 0,
            "rate_limit.max_requests must be > 0"
        );
        anyhow::ensure!(
            self.quota.weekly_limit_free > 0,
            "quota.weekly_limit_free must be > 0"
        );
        Ok(())
    }

    pub fn llm_enabled(&self) -> bool {
        self.llm.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.rate_limit.window_seconds, 60);
        assert_eq!(settings.rate_limit.max_requests, 10);
        assert!(settings.rate_limit.skip_premium);
        assert_eq!(settings.quota.weekly_limit_free, 5);
        assert_eq!(settings.cache.catalog_ttl_seconds, 1800);
        assert_eq!(settings.cache.usage_ttl_seconds, 300);
        assert_eq!(settings.database.max_connections, 25);
        assert_eq!(settings.database.min_connections, 5);
        assert_eq!(settings.database.max_lifetime_seconds, 300);
        assert!(!settings.llm_enabled());
    }

    #[test]
    fn validate_requires_database_url() {
        let settings = Settings::default();
        assert!(settings.validate().is_err());

        let mut ok = Settings::default();
        ok.database.url = "postgres://localhost/collisions".into();
        assert!(ok.validate().is_ok());
    }
}
