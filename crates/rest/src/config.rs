//! Server configuration for the advanced search API.
//!
//! This module provides configuration types for the REST server, supporting
//! both programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MOLTRACK_PORT` | 8080 | Server port |
//! | `MOLTRACK_HOST` | 127.0.0.1 | Host to bind |
//! | `MOLTRACK_LOG_LEVEL` | info | Log level |
//! | `MOLTRACK_MAX_BODY_SIZE` | 10485760 | Max request body (bytes) |
//! | `MOLTRACK_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `MOLTRACK_ENABLE_CORS` | true | Enable CORS |
//! | `MOLTRACK_CORS_ORIGINS` | * | Allowed origins |
//! | `MOLTRACK_MAX_SEARCH_LIMIT` | (none) | Upper bound on returned rows |
//! | `MOLTRACK_DATABASE_URL` | (none) | PostgreSQL URL; `DB_*` variables otherwise |
//!
//! # Example
//!
//! ```rust
//! use moltrack_rest::ServerConfig;
//!
//! // Create from environment
//! let config = ServerConfig::from_env();
//!
//! // Or create programmatically
//! let config = ServerConfig {
//!     port: 3000,
//!     host: "0.0.0.0".to_string(),
//!     max_search_limit: Some(5000),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use clap::Parser;

/// Server configuration for the advanced search API.
///
/// This struct can be constructed from environment variables using [`ServerConfig::from_env`],
/// from command line arguments using [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "moltrack-server")]
#[command(about = "MolTrack advanced search server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "MOLTRACK_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "MOLTRACK_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "MOLTRACK_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Maximum request body size in bytes.
    #[arg(long, env = "MOLTRACK_MAX_BODY_SIZE", default_value = "10485760")]
    pub max_body_size: usize,

    /// Request timeout in seconds.
    #[arg(long, env = "MOLTRACK_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "MOLTRACK_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "MOLTRACK_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Upper bound applied to every search's row limit.
    #[arg(long, env = "MOLTRACK_MAX_SEARCH_LIMIT")]
    pub max_search_limit: Option<u64>,

    /// Database connection string.
    #[arg(long, env = "MOLTRACK_DATABASE_URL")]
    pub database_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            max_body_size: 10 * 1024 * 1024, // 10MB
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            max_search_limit: None,
            database_url: None,
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// This is a convenience method that parses environment variables without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        // Try to parse from environment, falling back to defaults
        Self::try_parse_from(["moltrack-server"]).unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.max_body_size == 0 {
            errors.push("Max body size cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.max_search_limit == Some(0) {
            errors.push("Max search limit cannot be 0".to_string());
        }

        if self.log_level.parse::<tracing::Level>().is_err() {
            errors.push(format!("Unknown log level '{}'", self.log_level));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// This uses ephemeral port 0 and disables features that might interfere
    /// with tests.
    pub fn for_testing() -> Self {
        Self {
            port: 0, // Let OS assign port
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            max_body_size: 1024 * 1024,
            request_timeout: 5, // Shorter timeout for tests
            enable_cors: false,
            cors_origins: "*".to_string(),
            max_search_limit: None,
            database_url: None,
        }
    }
}
