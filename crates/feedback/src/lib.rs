#![warn(clippy::unwrap_used)]

pub mod json;
pub mod memory;
pub mod record;
pub mod retry;
pub mod store;

pub use json::JsonFeedbackStore;
pub use memory::MemoryFeedbackStore;
pub use record::{FeedbackRecord, FeedbackSignal};
pub use retry::{record_with_retry, RetryPolicy};
pub use store::FeedbackStore;
