//! Configuration module
//!
//! This module provides configuration structures for the API and the
//! verification pipeline, loaded from environment variables.

use std::env;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_SUN_BASE_URL: &str = "https://api.sunrise-sunset.org";
const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org";
const DEFAULT_GEOCODE_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_FILE_POLL_INTERVAL_SECS: u64 = 1;
const DEFAULT_FILE_POLL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BATCH_LIMIT: i64 = 10;

/// Base configuration shared by the service binaries
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Verification pipeline configuration
#[derive(Clone, Debug)]
pub struct VerifierConfig {
    /// Total attempts for the model invocation loop (call + parse).
    pub max_attempts: u32,
    /// Interval between remote-file processing-state polls.
    pub file_poll_interval_secs: u64,
    /// Ceiling on remote-file processing wait before the attempt fails.
    pub file_poll_timeout_secs: u64,
    /// Upper bound on records processed by one batch invocation.
    pub batch_limit: i64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            file_poll_interval_secs: DEFAULT_FILE_POLL_INTERVAL_SECS,
            file_poll_timeout_secs: DEFAULT_FILE_POLL_TIMEOUT_SECS,
            batch_limit: DEFAULT_BATCH_LIMIT,
        }
    }
}

/// Application configuration for the verification service.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub database_url: String,
    // Generative AI provider
    pub genai_api_key: String,
    pub genai_model: String,
    pub genai_base_url: String,
    // Context providers
    pub sun_base_url: String,
    pub weather_base_url: String,
    pub weather_api_key: Option<String>,
    pub geocode_base_url: String,
    // Pipeline tunables
    pub verifier: VerifierConfig,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let verifier = VerifierConfig {
            max_attempts: env::var("VERIFY_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
            file_poll_interval_secs: env::var("FILE_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_FILE_POLL_INTERVAL_SECS),
            file_poll_timeout_secs: env::var("FILE_POLL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_FILE_POLL_TIMEOUT_SECS),
            batch_limit: env::var("VERIFY_BATCH_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_BATCH_LIMIT),
        };

        Ok(Config {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            genai_api_key: env::var("GENAI_API_KEY")
                .or_else(|_| env::var("GEMINI_API_KEY"))
                .map_err(|_| anyhow::anyhow!("GENAI_API_KEY must be set"))?,
            genai_model: env::var("GENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            genai_base_url: env::var("GENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GENAI_BASE_URL.to_string()),
            sun_base_url: env::var("SUN_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_SUN_BASE_URL.to_string()),
            weather_base_url: env::var("WEATHER_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_WEATHER_BASE_URL.to_string()),
            weather_api_key: env::var("WEATHER_API_KEY").ok(),
            geocode_base_url: env::var("GEOCODE_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODE_BASE_URL.to_string()),
            verifier,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.genai_api_key.trim().is_empty() {
            anyhow::bail!("GENAI_API_KEY must not be empty");
        }
        if self.verifier.max_attempts == 0 {
            anyhow::bail!("VERIFY_MAX_ATTEMPTS must be at least 1");
        }
        if self.verifier.file_poll_interval_secs == 0 {
            anyhow::bail!("FILE_POLL_INTERVAL_SECS must be at least 1");
        }
        if self.verifier.file_poll_timeout_secs < self.verifier.file_poll_interval_secs {
            anyhow::bail!("FILE_POLL_TIMEOUT_SECS must be >= FILE_POLL_INTERVAL_SECS");
        }
        if self.verifier.batch_limit <= 0 {
            anyhow::bail!("VERIFY_BATCH_LIMIT must be positive");
        }
        Ok(())
    }
}
