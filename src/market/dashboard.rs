//! Dashboard facade
//!
//! Single writer over the ordered view, the running aggregates, and the
//! pager. The ingestion pipeline mutates it one record at a time; the
//! presentation layer reads snapshots and drives sort/page operations.

use chrono::Utc;

use super::{
    AggregateTracker, DashboardSnapshot, FeedPhase, OrderedView, Pager, SortDirection, SortKey,
};
use crate::error::Result;
use crate::record::Record;

pub struct Dashboard {
    view: OrderedView,
    aggregates: AggregateTracker,
    pager: Pager,
    phase: FeedPhase,
    last_error: Option<String>,
}

impl Dashboard {
    pub fn new(page_size: usize) -> Result<Self> {
        Ok(Self {
            view: OrderedView::new(),
            aggregates: AggregateTracker::new(),
            pager: Pager::new(page_size)?,
            phase: FeedPhase::Connecting,
            last_error: None,
        })
    }

    /// Fold one decoded record into the dashboard state.
    pub fn ingest(&mut self, record: Record) {
        self.aggregates.update(&record);
        self.view.insert(record);
        self.pager.clamp(self.view.len());
    }

    /// Select a sort column. Selecting the active column flips the
    /// direction; selecting a new column starts ascending.
    pub fn set_sort(&mut self, key: SortKey) {
        let direction = if key == self.view.sort_key() {
            self.view.direction().toggled()
        } else {
            SortDirection::Ascending
        };
        self.view.reorder(key, direction);
    }

    /// Advance one page; `false` when already on the last page.
    pub fn next_page(&mut self) -> bool {
        self.pager.next(self.view.len())
    }

    /// Go back one page; `false` when already on page 1.
    pub fn prev_page(&mut self) -> bool {
        self.pager.prev()
    }

    pub fn set_phase(&mut self, phase: FeedPhase) {
        self.phase = phase;
    }

    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    /// Record a non-fatal feed problem for the presentation layer.
    pub fn note_error(&mut self, message: String) {
        self.last_error = Some(message);
    }

    pub fn total_items(&self) -> usize {
        self.view.len()
    }

    /// Materialize the current state for publishing.
    pub fn snapshot(&self) -> DashboardSnapshot {
        let total = self.view.len();
        DashboardSnapshot {
            phase: self.phase,
            generated_at: Utc::now(),
            total_items: total,
            sort_key: self.view.sort_key(),
            sort_direction: self.view.direction(),
            current_page: self.pager.current_page(),
            page_count: self.pager.page_count(total),
            page: self.view.slice(self.pager.visible_range(total)),
            aggregates: self.aggregates.summary(),
            last_error: self.last_error.clone(),
        }
    }
}
