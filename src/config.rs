//! Configuration Module
//!
//! Handles loading server configuration from environment variables, with the
//! port optionally overridden on the command line.

use std::env;
use std::time::Duration;

use crate::cache::DEFAULT_TTL;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Server configuration parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Idle time before an unrenewed cache entry is evicted
    pub cache_ttl: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `CACHE_TTL` - Cache TTL in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            cache_ttl: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TTL),
        }
    }

    /// Replaces the port when one was given explicitly.
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.server_port = port;
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_PORT,
            cache_ttl: DEFAULT_TTL,
        }
    }
}
