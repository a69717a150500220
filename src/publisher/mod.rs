//! Publisher module for presentation updates
//!
//! Broadcasts dashboard snapshots to in-process subscribers and owns the
//! feed counters exposed on the metrics endpoint.

use prometheus::IntCounter;
use std::sync::OnceLock;
use tokio::sync::watch;
use tracing::debug;

use crate::market::DashboardSnapshot;

/// Publisher for the "view changed" signal. Subscribers always observe the
/// latest committed snapshot; intermediate ones may be skipped.
pub struct Publisher {
    updates: watch::Sender<DashboardSnapshot>,
}

impl Publisher {
    /// Create a new publisher
    pub fn new() -> Self {
        let (updates, _) = watch::channel(DashboardSnapshot::default());
        Self { updates }
    }

    /// Publish a snapshot to all subscribers.
    pub fn publish(&self, snapshot: DashboardSnapshot) {
        debug!(
            total = snapshot.total_items,
            page = snapshot.current_page,
            phase = ?snapshot.phase,
            "Publishing dashboard snapshot"
        );
        self.updates.send_replace(snapshot);
    }

    /// Subscribe to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.updates.subscribe()
    }

    pub fn record_ingested(&self) {
        events_ingested().inc();
    }

    pub fn record_malformed(&self) {
        events_malformed().inc();
    }

    pub fn record_transport_error(&self) {
        transport_errors().inc();
    }
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new()
    }
}

fn feed_counter(name: &str, help: &str) -> IntCounter {
    let counter = IntCounter::new(name, help).unwrap();
    // Registration can only collide if another crate claimed the name; the
    // local clone keeps counting either way.
    let _ = prometheus::default_registry().register(Box::new(counter.clone()));
    counter
}

fn events_ingested() -> &'static IntCounter {
    static COUNTER: OnceLock<IntCounter> = OnceLock::new();
    COUNTER.get_or_init(|| {
        feed_counter(
            "cardex_feed_events_ingested_total",
            "Events decoded and applied to the dashboard",
        )
    })
}

fn events_malformed() -> &'static IntCounter {
    static COUNTER: OnceLock<IntCounter> = OnceLock::new();
    COUNTER.get_or_init(|| {
        feed_counter(
            "cardex_feed_events_malformed_total",
            "Events dropped because their payload failed to decode",
        )
    })
}

fn transport_errors() -> &'static IntCounter {
    static COUNTER: OnceLock<IntCounter> = OnceLock::new();
    COUNTER.get_or_init(|| {
        feed_counter(
            "cardex_feed_transport_errors_total",
            "Transport-level failures reported by the feed connection",
        )
    })
}
