//! Configuration module for the market data core

use serde::Deserialize;
use std::env;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// SSE endpoint producing listing price events
    pub stream_endpoint: String,

    /// Number of rows per dashboard page
    pub page_size: usize,

    /// Port for the HTTP surface (health, metrics, dashboard state)
    pub http_port: u16,

    /// Connect timeout for the feed, in seconds
    pub connect_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            stream_endpoint: env::var("STREAM_ENDPOINT")
                .unwrap_or_else(|_| "http://127.0.0.1:5000/stream-data".to_string()),
            page_size: env::var("PAGE_SIZE")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "9090".to_string())
                .parse()
                .unwrap_or(9090),
            connect_timeout_secs: env::var("CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
        };

        if config.page_size == 0 {
            anyhow::bail!("PAGE_SIZE must be at least 1");
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stream_endpoint: "http://127.0.0.1:5000/stream-data".to_string(),
            page_size: 5,
            http_port: 9090,
            connect_timeout_secs: 10,
        }
    }
}
