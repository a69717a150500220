//! Ordered view over all ingested records
//!
//! Records live in an arrival-ordered arena; the view keeps a separate index
//! vector sorted under the selected key and direction. Each insertion is a
//! binary-search splice rather than a full re-sort, so a long-running feed
//! does not pay O(n log n) per event.

use std::cmp::Ordering;
use std::ops::Range;

use super::{SortDirection, SortKey};
use crate::record::Record;

/// All records seen so far, presented in the currently selected order.
#[derive(Debug, Clone, Default)]
pub struct OrderedView {
    /// Arrival-ordered arena; never reordered, never truncated
    records: Vec<Record>,
    /// Indices into `records`, sorted under (key, direction, arrival)
    ordered: Vec<usize>,
    key: SortKey,
    direction: SortDirection,
}

impl OrderedView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and splice it into the sorted index.
    pub fn insert(&mut self, record: Record) {
        let slot = self.records.len();
        self.records.push(record);

        let pos = self.ordered.partition_point(|&existing| {
            slot_ordering(&self.records, self.key, self.direction, existing, slot)
                != Ordering::Greater
        });
        self.ordered.insert(pos, slot);
    }

    /// Re-sort the view under a new key/direction.
    pub fn reorder(&mut self, key: SortKey, direction: SortDirection) {
        self.key = key;
        self.direction = direction;

        let records = &self.records;
        self.ordered
            .sort_by(|&a, &b| slot_ordering(records, key, direction, a, b));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn sort_key(&self) -> SortKey {
        self.key
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// All records in the current order.
    pub fn iter_ordered(&self) -> impl Iterator<Item = &Record> {
        self.ordered.iter().map(move |&slot| &self.records[slot])
    }

    /// Records at `range` of the current order. The range must already be
    /// clamped to the view bounds (the pager owns that clamp).
    pub fn slice(&self, range: Range<usize>) -> Vec<Record> {
        self.ordered[range]
            .iter()
            .map(|&slot| self.records[slot].clone())
            .collect()
    }
}

/// Total ordering over arena slots: selected key, direction applied, then
/// arrival index. Arrival ties are never reversed, so equal-key runs read
/// the same way in both directions and page slices stay stable.
fn slot_ordering(
    records: &[Record],
    key: SortKey,
    direction: SortDirection,
    a: usize,
    b: usize,
) -> Ordering {
    let by_key = key_ordering(&records[a], &records[b], key);
    let by_key = match direction {
        SortDirection::Ascending => by_key,
        SortDirection::Descending => by_key.reverse(),
    };
    by_key.then(a.cmp(&b))
}

fn key_ordering(a: &Record, b: &Record, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => a.id.cmp(&b.id),
        SortKey::Name => a.name.cmp(&b.name),
        SortKey::ListingPrice => a.listing_price.cmp(&b.listing_price),
        SortKey::CurrentPrice => a.current_price.cmp(&b.current_price),
    }
}
