//! Configuration module
//!
//! Settings are read from the environment (a `.env` file is honoured via
//! `dotenvy`). Unset or unparsable numeric values fall back to defaults.

use std::env;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_MAX_DOCUMENT_SIZE_MB, DEFAULT_MAX_IMAGE_SIZE_MB, DEFAULT_RETENTION_DAYS, MIB,
};
use crate::validation::{SizeLimits, Validator};

const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Server-level settings.
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Media engine configuration.
#[derive(Clone, Debug)]
pub struct AssetConfig {
    pub base: BaseConfig,
    pub database_url: String,
    pub storage_path: PathBuf,
    pub public_base_url: String,
    pub max_image_size_mb: u64,
    pub max_document_size_mb: u64,
    pub cleanup_retention_days: i64,
    /// Seconds between in-process cleanup passes. 0 = disabled.
    pub cleanup_interval_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AssetConfig>);

impl Config {
    fn as_asset(&self) -> &AssetConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_asset().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = AssetConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_asset().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_asset().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_asset().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_asset().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_asset().base.db_timeout_seconds
    }

    pub fn environment(&self) -> &str {
        &self.as_asset().base.environment
    }

    pub fn database_url(&self) -> &str {
        &self.as_asset().database_url
    }

    pub fn storage_path(&self) -> &std::path::Path {
        &self.as_asset().storage_path
    }

    pub fn public_base_url(&self) -> &str {
        &self.as_asset().public_base_url
    }

    pub fn cleanup_retention_days(&self) -> i64 {
        self.as_asset().cleanup_retention_days
    }

    pub fn cleanup_interval_secs(&self) -> u64 {
        self.as_asset().cleanup_interval_secs
    }

    pub fn size_limits(&self) -> SizeLimits {
        SizeLimits {
            image_bytes: self.as_asset().max_image_size_mb * MIB,
            document_bytes: self.as_asset().max_document_size_mb * MIB,
        }
    }

    pub fn validator(&self) -> Validator {
        Validator::new(self.size_limits())
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

impl AssetConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .unwrap_or(SERVER_PORT);

        let base = BaseConfig {
            server_port,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}/uploads", server_port));

        Ok(AssetConfig {
            base,
            database_url,
            storage_path: PathBuf::from(
                env::var("STORAGE_PATH").unwrap_or_else(|_| "./uploads".to_string()),
            ),
            public_base_url,
            max_image_size_mb: env::var("MAX_IMAGE_SIZE_MB")
                .unwrap_or_else(|_| DEFAULT_MAX_IMAGE_SIZE_MB.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_IMAGE_SIZE_MB),
            max_document_size_mb: env::var("MAX_DOCUMENT_SIZE_MB")
                .unwrap_or_else(|_| DEFAULT_MAX_DOCUMENT_SIZE_MB.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_DOCUMENT_SIZE_MB),
            cleanup_retention_days: env::var("CLEANUP_RETENTION_DAYS")
                .unwrap_or_else(|_| DEFAULT_RETENTION_DAYS.to_string())
                .parse()
                .unwrap_or(DEFAULT_RETENTION_DAYS),
            cleanup_interval_secs: env::var("CLEANUP_INTERVAL_SECS")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .unwrap_or(0),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.max_image_size_mb == 0 || self.max_document_size_mb == 0 {
            return Err(anyhow::anyhow!(
                "MAX_IMAGE_SIZE_MB and MAX_DOCUMENT_SIZE_MB must be greater than 0"
            ));
        }

        if self.cleanup_retention_days < 0 {
            return Err(anyhow::anyhow!("CLEANUP_RETENTION_DAYS cannot be negative"));
        }

        if self.public_base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("PUBLIC_BASE_URL cannot be empty"));
        }

        Ok(())
    }
}
