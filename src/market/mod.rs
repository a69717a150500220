//! Dashboard state module
//!
//! Maintains incremental dashboard state from the listing price feed: the
//! sorted paginated view, running aggregates, and the published snapshot.

mod aggregates;
mod dashboard;
mod paging;
mod view;

pub use aggregates::{AggregateSummary, AggregateTracker};
pub use dashboard::Dashboard;
pub use paging::Pager;
pub use view::OrderedView;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::record::Record;

/// Column the view is ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "listingPrice")]
    ListingPrice,
    #[serde(rename = "currentPrice")]
    CurrentPrice,
}

impl FromStr for SortKey {
    type Err = crate::error::FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortKey::Id),
            "name" => Ok(SortKey::Name),
            "listingPrice" => Ok(SortKey::ListingPrice),
            "currentPrice" => Ok(SortKey::CurrentPrice),
            other => Err(crate::error::FeedError::InvalidConfig(format!(
                "unknown sort key: {other}"
            ))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortKey::Id => "id",
            SortKey::Name => "name",
            SortKey::ListingPrice => "listingPrice",
            SortKey::CurrentPrice => "currentPrice",
        };
        f.write_str(name)
    }
}

/// Direction of the view ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Connection phase of the inbound feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedPhase {
    /// Connection requested, nothing received yet
    #[default]
    Connecting,
    /// Feed established and accepting events
    Open,
    /// Feed ended or failed; terminal until externally re-initialized
    Disconnected,
}

/// Dashboard state to be published
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub phase: FeedPhase,
    pub generated_at: DateTime<Utc>,
    pub total_items: usize,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    pub current_page: usize,
    pub page_count: usize,
    pub page: Vec<Record>,
    pub aggregates: AggregateSummary,
    pub last_error: Option<String>,
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        Self {
            phase: FeedPhase::Connecting,
            generated_at: Utc::now(),
            total_items: 0,
            sort_key: SortKey::Id,
            sort_direction: SortDirection::Ascending,
            current_page: 1,
            page_count: 1,
            page: Vec::new(),
            aggregates: AggregateSummary::default(),
            last_error: None,
        }
    }
}
