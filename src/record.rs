//! Wire type for listing price events
//!
//! Handles deserialization of the JSON payloads carried by the SSE feed.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{FeedError, Result};

/// One price observation for a card listing.
///
/// Records are immutable once ingested; the feed is append-only, so a
/// repeated `id` is a new observation rather than an update to an old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Listing identifier
    pub id: u64,

    /// Card name, not required to be unique
    pub name: String,

    /// Price at listing time
    #[serde(rename = "listingPrice", deserialize_with = "deserialize_price")]
    pub listing_price: Decimal,

    /// Current market price
    #[serde(rename = "currentPrice", deserialize_with = "deserialize_price")]
    pub current_price: Decimal,
}

impl Record {
    /// Decode a raw feed payload into a record.
    pub fn decode(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| FeedError::MalformedEvent(e.to_string()))
    }

    /// Gain (or loss) of the listing relative to its listing price.
    pub fn price_delta(&self) -> Decimal {
        self.current_price - self.listing_price
    }
}

/// Custom deserializer for prices: non-negative numbers. Non-finite values
/// cannot be expressed in JSON and are rejected by the decoder itself.
fn deserialize_price<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = <Decimal as Deserialize>::deserialize(deserializer)?;
    if value < Decimal::ZERO {
        return Err(serde::de::Error::custom("price must be non-negative"));
    }
    Ok(value)
}
