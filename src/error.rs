//! Error types for the market data core

use thiserror::Error;

/// Market data core errors
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("stream connection error: {0}")]
    Connect(String),

    #[error("stream transport error: {0}")]
    Transport(String),

    #[error("stream closed by server")]
    StreamClosed,

    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_builder() {
            FeedError::Connect(err.to_string())
        } else {
            FeedError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::MalformedEvent(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
