use config::{ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub compliance: ComplianceConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub enabled: bool,
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_minute: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ComplianceConfig {
    /// Ownership share (percent) at which a natural person counts as a UBO
    pub ubo_threshold_percent: f64,
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        ComplianceConfig {
            ubo_threshold_percent: 25.0,
            default_page_size: 50,
            max_page_size: 500,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let mut builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8090)?
            .set_default("server.workers", 4)?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 5)?
            .set_default("database.run_migrations", true)?
            .set_default("storage.backend", "postgres")?
            .set_default("auth.enabled", false)?
            .set_default("auth.jwt_secret", "")?
            .set_default("rate_limit.enabled", false)?
            .set_default("rate_limit.requests_per_minute", 600)?
            .set_default("compliance.ubo_threshold_percent", 25.0)?
            .set_default("compliance.default_page_size", 50)?
            .set_default("compliance.max_page_size", 500)?;

        if let Ok(config_file) = env::var("CONFIG_FILE") {
            builder = builder.add_source(File::with_name(&config_file).required(false));
        } else {
            builder = builder.add_source(
                File::with_name(&format!("config/{}", environment)).required(false),
            );
        }

        builder = builder.add_source(Environment::with_prefix("KYC_ENGINE").separator("__"));

        if let Ok(db_url) = env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", db_url)?;
        }

        if let Ok(port) = env::var("KYC_ENGINE_PORT") {
            builder = builder.set_override("server.port", port)?;
        }

        if let Ok(secret) = env::var("JWT_SECRET") {
            builder = builder.set_override("auth.jwt_secret", secret)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port cannot be 0".to_string());
        }

        if self.server.workers == 0 {
            return Err("Server needs at least one worker".to_string());
        }

        if self.storage.backend == StorageBackend::Postgres && self.database.url.is_empty() {
            return Err("Database URL is required for the postgres storage backend".to_string());
        }

        if self.auth.enabled && self.auth.jwt_secret.is_empty() {
            return Err("JWT secret is required when authentication is enabled".to_string());
        }

        if self.rate_limit.enabled && self.rate_limit.requests_per_minute == 0 {
            return Err("Rate limit must allow at least one request per minute".to_string());
        }

        let threshold = self.compliance.ubo_threshold_percent;
        if !(threshold > 0.0 && threshold <= 100.0) {
            return Err(format!(
                "UBO threshold must be within (0, 100], got {}",
                threshold
            ));
        }

        if self.compliance.default_page_size < 1
            || self.compliance.default_page_size > self.compliance.max_page_size
        {
            return Err("Default page size must be between 1 and the max page size".to_string());
        }

        Ok(())
    }
}
