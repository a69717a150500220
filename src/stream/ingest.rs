//! Feed ingestion driver
//!
//! The single entry point for inbound events: decodes each payload, feeds
//! the dashboard, and publishes a fresh snapshot. One malformed event is
//! dropped and reported without disturbing its neighbors.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use super::SseClient;
use crate::error::{FeedError, Result};
use crate::market::FeedPhase;
use crate::record::Record;
use crate::AppState;

/// Drives one feed connection lifecycle into the shared dashboard state.
pub struct StreamIngestor {
    state: Arc<AppState>,
    client: SseClient,
    shutdown: watch::Receiver<bool>,
}

impl StreamIngestor {
    /// Create a new ingestor
    pub fn new(state: Arc<AppState>, shutdown: watch::Receiver<bool>) -> Self {
        let client = SseClient::new(
            &state.config.stream_endpoint,
            Duration::from_secs(state.config.connect_timeout_secs),
        );

        Self {
            state,
            client,
            shutdown,
        }
    }

    /// Run one feed lifecycle: connect, receive until the stream ends, the
    /// transport fails, or shutdown is requested. The connection is
    /// released exactly once on every exit path; reconnection is the
    /// operator's concern, not this component's.
    pub async fn run(mut self) -> Result<()> {
        self.set_phase(FeedPhase::Connecting).await;

        if let Err(e) = self.client.connect().await {
            warn!(error = %e, "Feed connection failed");
            self.note_error(&e).await;
            self.set_phase(FeedPhase::Disconnected).await;
            return Err(e);
        }

        self.set_phase(FeedPhase::Open).await;

        let result = self.process_events().await;

        self.client.close();
        self.set_phase(FeedPhase::Disconnected).await;
        result
    }

    async fn process_events(&mut self) -> Result<()> {
        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    // An explicit stop or the sender dropping both end ingestion.
                    if changed.is_err() || *self.shutdown.borrow() {
                        info!("Shutdown requested, stopping ingestion");
                        return Ok(());
                    }
                }
                received = self.client.recv() => match received {
                    Ok(Some(payload)) => self.on_event(&payload).await,
                    Ok(None) => {
                        // Keep-alive or comment block
                    }
                    Err(FeedError::StreamClosed) => {
                        info!("Feed closed by server");
                        return Ok(());
                    }
                    Err(e) => {
                        self.state.publisher.record_transport_error();
                        self.note_error(&e).await;
                        if !self.client.is_connected() {
                            return Err(e);
                        }
                        // Connection survived; keep receiving.
                        warn!(error = %e, "Feed transport error, connection still open");
                    }
                }
            }
        }
    }

    /// Process a single inbound event payload.
    async fn on_event(&self, payload: &str) {
        match Record::decode(payload) {
            Ok(record) => {
                let snapshot = {
                    let mut dashboard = self.state.dashboard.write().await;
                    dashboard.ingest(record);
                    dashboard.snapshot()
                };
                self.state.publisher.record_ingested();
                self.state.publisher.publish(snapshot);
            }
            Err(e) => {
                warn!(error = %e, payload_len = payload.len(), "Discarding malformed event");
                self.state.publisher.record_malformed();
                let snapshot = {
                    let mut dashboard = self.state.dashboard.write().await;
                    dashboard.note_error(e.to_string());
                    dashboard.snapshot()
                };
                self.state.publisher.publish(snapshot);
            }
        }
    }

    async fn set_phase(&self, phase: FeedPhase) {
        let snapshot = {
            let mut dashboard = self.state.dashboard.write().await;
            dashboard.set_phase(phase);
            dashboard.snapshot()
        };
        self.state.publisher.publish(snapshot);
    }

    async fn note_error(&self, error: &FeedError) {
        let snapshot = {
            let mut dashboard = self.state.dashboard.write().await;
            dashboard.note_error(error.to_string());
            dashboard.snapshot()
        };
        self.state.publisher.publish(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::market::Dashboard;
    use crate::publisher::Publisher;
    use tokio::sync::RwLock;

    fn ingestor() -> StreamIngestor {
        let config = Arc::new(Config::default());
        let state = Arc::new(AppState {
            dashboard: Arc::new(RwLock::new(Dashboard::new(config.page_size).unwrap())),
            publisher: Arc::new(Publisher::new()),
            config,
        });
        let (_tx, rx) = watch::channel(false);
        StreamIngestor::new(state, rx)
    }

    fn payload(id: u64, listing: i64, current: i64) -> String {
        format!(
            r#"{{"id": {id}, "name": "card-{id}", "listingPrice": {listing}, "currentPrice": {current}}}"#
        )
    }

    #[tokio::test]
    async fn test_events_reach_the_dashboard() {
        let ingestor = ingestor();

        ingestor.on_event(&payload(1, 10, 12)).await;
        ingestor.on_event(&payload(2, 20, 18)).await;

        let dashboard = ingestor.state.dashboard.read().await;
        let snapshot = dashboard.snapshot();
        assert_eq!(snapshot.total_items, 2);
        assert_eq!(snapshot.aggregates.count, 2);
        assert_eq!(
            snapshot.aggregates.most_extreme.as_ref().map(|r| r.id),
            Some(2)
        );
    }

    #[tokio::test]
    async fn test_malformed_event_is_isolated() {
        let ingestor = ingestor();

        // 3rd of 5 events is malformed: it must be dropped without
        // disturbing the other four or escaping as an error.
        ingestor.on_event(&payload(1, 10, 12)).await;
        ingestor.on_event(&payload(2, 20, 18)).await;
        ingestor.on_event(r#"{"id": 3, "name": "broken""#).await;
        ingestor.on_event(&payload(4, 5, 9)).await;
        ingestor.on_event(&payload(5, 7, 2)).await;

        let dashboard = ingestor.state.dashboard.read().await;
        let snapshot = dashboard.snapshot();
        assert_eq!(snapshot.aggregates.count, 4);
        assert_eq!(snapshot.total_items, 4);
        assert!(snapshot.last_error.is_some());
    }

    #[tokio::test]
    async fn test_snapshots_are_published_per_event() {
        let ingestor = ingestor();
        let mut updates = ingestor.state.publisher.subscribe();

        ingestor.on_event(&payload(1, 10, 12)).await;

        assert!(updates.has_changed().unwrap());
        let snapshot = updates.borrow_and_update().clone();
        assert_eq!(snapshot.total_items, 1);
    }
}
