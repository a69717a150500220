//! Running aggregate statistics over all ingested records
//!
//! Every statistic updates in O(1) per record, so the dashboard never
//! re-reads history to refresh its stat cards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Incrementally maintained statistics for the stat cards.
#[derive(Debug, Clone, Default)]
pub struct AggregateTracker {
    count: u64,
    sum_delta: Decimal,
    most_extreme: Option<Record>,
    max_delta_floor: Decimal,
}

impl AggregateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the running statistics.
    pub fn update(&mut self, record: &Record) {
        self.count += 1;
        self.sum_delta += record.price_delta();

        // Ties keep the earlier record, so the winner is deterministic
        // regardless of how often equal prices arrive.
        let beats_current = match &self.most_extreme {
            Some(current) => record.current_price > current.current_price,
            None => true,
        };
        if beats_current {
            self.most_extreme = Some(record.clone());
        }

        // Floored at zero: a market where every listing lost value still
        // reports a zero best gain, never a negative one.
        let delta = record.price_delta();
        if delta > self.max_delta_floor {
            self.max_delta_floor = delta;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean price delta over all records, zero before the first record.
    pub fn average_delta(&self) -> Decimal {
        if self.count == 0 {
            Decimal::ZERO
        } else {
            self.sum_delta / Decimal::from(self.count)
        }
    }

    pub fn max_delta_floor(&self) -> Decimal {
        self.max_delta_floor
    }

    /// Record with the highest current price seen so far.
    pub fn most_extreme(&self) -> Option<&Record> {
        self.most_extreme.as_ref()
    }

    /// Current statistics for publishing.
    pub fn summary(&self) -> AggregateSummary {
        AggregateSummary {
            count: self.count,
            average_delta: self.average_delta(),
            max_delta_floor: self.max_delta_floor,
            most_extreme: self.most_extreme.clone(),
        }
    }
}

/// Computed statistics published with each snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSummary {
    /// Number of records ingested
    pub count: u64,

    /// Mean of (current - listing) price over all records
    pub average_delta: Decimal,

    /// Highest (current - listing) price, floored at zero
    pub max_delta_floor: Decimal,

    /// Record with the highest current price, absent before the first event
    pub most_extreme: Option<Record>,
}
