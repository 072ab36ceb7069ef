//! Settled-offer cache, preventing double commits when a decision message
//! is replayed or duplicated by the channel.
//!
//! This is a bounded FIFO set: when full, the oldest entry is evicted to
//! make room for a new insertion. Lookups are O(1) via a `HashSet`.

use std::collections::{HashSet, VecDeque};
use tablesync_types::OfferId;

/// Default number of settled offer ids the arbitrator remembers.
pub const DEFAULT_SETTLED_CAPACITY: usize = 1024;

/// A bounded set of offer ids the arbitrator has finished handling.
///
/// Every currency offer id is recorded once its decision is processed,
/// whether the outcome was a commit, a validation failure, or a decline.
/// A decision that arrives again for a recorded id is dropped instead of
/// re-entering the commit path.
pub struct SettledOffers {
    set: HashSet<OfferId>,
    order: VecDeque<OfferId>,
    capacity: usize,
}

impl SettledOffers {
    pub fn new(capacity: usize) -> Self {
        Self {
            set: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an offer id, evicting the oldest entry if at capacity.
    pub fn insert(&mut self, id: OfferId) {
        if self.capacity == 0 {
            return;
        }
        if self.set.contains(&id) {
            return;
        }
        if self.order.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.set.remove(&evicted);
            }
        }
        self.set.insert(id);
        self.order.push_back(id);
    }

    /// Check whether an offer id has already been settled.
    pub fn contains(&self, id: &OfferId) -> bool {
        self.set.contains(id)
    }

    /// Number of remembered ids.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

impl Default for SettledOffers {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLED_CAPACITY)
    }
}
