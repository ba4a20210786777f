//! In-process feedback store backed by DashMap. Appends to the same item
//! are serialized by the shard lock held through `entry()`.

use dashmap::DashMap;
use retail_core::{Key, RecoResult};
use tracing::debug;

use crate::record::{FeedbackRecord, FeedbackSignal};
use crate::store::FeedbackStore;

/// Non-durable store for tests, demos and single-session use.
pub struct MemoryFeedbackStore<K: Key> {
    records: DashMap<K, FeedbackRecord>,
}

impl<K: Key> MemoryFeedbackStore<K> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<K: Key> Default for MemoryFeedbackStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key + Send + Sync> FeedbackStore<K> for MemoryFeedbackStore<K> {
    fn record_feedback(&self, item: &K, approve: bool) -> RecoResult<()> {
        self.records
            .entry(item.clone())
            .or_default()
            .push(FeedbackSignal::now(approve));
        metrics::counter!("feedback.recorded").increment(1);
        debug!(item = ?item, approve, "Feedback recorded in memory");
        Ok(())
    }

    fn feedback_record(&self, item: &K) -> RecoResult<Option<FeedbackRecord>> {
        Ok(self.records.get(item).map(|r| r.clone()))
    }
}
