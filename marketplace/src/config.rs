//! Configuration management for the marketplace server.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application server configuration
    pub server: ServerConfig,
    /// External ranking service configuration
    pub ranking: RankingConfig,
    /// Stock-photo provider configuration
    pub photos: PhotosConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// External ranking service configuration
///
/// When `url` is unset the recommendation path uses the deterministic
/// local scoring exclusively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Endpoint of the ranking service, if one is deployed
    pub url: Option<String>,
    /// Request timeout in seconds
    pub timeout: u64,
}

/// Stock-photo provider configuration
///
/// When `api_key` is unset, photo search returns empty results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotosConfig {
    /// Provider base URL
    pub base_url: String,
    /// Provider API key
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8080),
                log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
                shutdown_timeout: env::var("SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            },
            ranking: RankingConfig {
                url: env::var("RANKING_SERVICE_URL").ok(),
                timeout: env::var("RANKING_SERVICE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            },
            photos: PhotosConfig {
                base_url: env::var("PHOTOS_BASE_URL")
                    .unwrap_or_else(|_| "https://api.pexels.com/v1".to_string()),
                api_key: env::var("PHOTOS_API_KEY").ok(),
                timeout: env::var("PHOTOS_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            },
        }
    }
}
