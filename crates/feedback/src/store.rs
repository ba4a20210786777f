use retail_core::RecoResult;

use crate::record::FeedbackRecord;

/// Narrow read/append interface over a durable item -> signals store.
///
/// Appends for the same item must be serialized by the implementation;
/// appends for different items are independent.
pub trait FeedbackStore<K>: Send + Sync {
    /// Append one signal. Returns only after the signal is durable.
    fn record_feedback(&self, item: &K, approve: bool) -> RecoResult<()>;

    /// Full signal history for `item`, `None` if nothing was ever recorded.
    fn feedback_record(&self, item: &K) -> RecoResult<Option<FeedbackRecord>>;

    fn average_approval(&self, item: &K) -> RecoResult<Option<f64>> {
        Ok(self
            .feedback_record(item)?
            .and_then(|record| record.average_approval()))
    }
}
