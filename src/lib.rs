//! Cardex - Market Data Core Library
//!
//! This crate maintains the incremental state behind the live card-listing
//! dashboard: it ingests the SSE price feed one event at a time and keeps
//! the sorted, paginated view and running aggregates the UI reads.

use std::sync::Arc;
use tokio::sync::RwLock;

pub mod config;
pub mod error;
pub mod market;
pub mod publisher;
pub mod record;
pub mod stream;

pub use config::Config;
pub use error::{FeedError, Result};
pub use market::{
    AggregateSummary, AggregateTracker, Dashboard, DashboardSnapshot, FeedPhase, OrderedView,
    Pager, SortDirection, SortKey,
};
pub use publisher::Publisher;
pub use record::Record;
pub use stream::{SseClient, StreamIngestor};

/// Application state shared across components
pub struct AppState {
    pub dashboard: Arc<RwLock<Dashboard>>,
    pub publisher: Arc<Publisher>,
    pub config: Arc<Config>,
}
