//! Configuration for momentum
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;

/// Momentum - personal productivity tracker API
#[derive(Parser, Debug, Clone)]
#[command(name = "momentum")]
#[command(about = "Personal productivity tracker API - tasks, goals, quotes")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "momentum")]
    pub mongodb_db: String,

    /// JWT secret for token signing (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "3600")]
    pub jwt_expiry_seconds: u64,

    /// Upstream quote API URL
    #[arg(long, env = "QUOTE_API_URL", default_value = "https://zenquotes.io/api/random")]
    pub quote_api_url: String,

    /// Quote cache TTL in seconds
    #[arg(long, env = "QUOTE_CACHE_TTL_SECONDS", default_value = "3600")]
    pub quote_cache_ttl_seconds: u64,

    /// Enable development mode (permits a built-in insecure JWT secret)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Get effective JWT secret (uses default in dev mode)
    pub fn jwt_secret(&self) -> String {
        if self.dev_mode {
            self.jwt_secret
                .clone()
                .unwrap_or_else(|| "dev-only-insecure-secret-do-not-ship-1234".to_string())
        } else {
            self.jwt_secret
                .clone()
                .expect("JWT_SECRET is required in production mode")
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.jwt_secret.is_none() {
            return Err("JWT_SECRET is required in production mode".to_string());
        }

        if self.quote_cache_ttl_seconds == 0 {
            return Err("QUOTE_CACHE_TTL_SECONDS must be greater than zero".to_string());
        }

        Ok(())
    }
}
