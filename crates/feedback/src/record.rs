//! Per-item thumbs up / thumbs down history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One approve/reject submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSignal {
    pub approve: bool,
    pub recorded_at: DateTime<Utc>,
}

impl FeedbackSignal {
    pub fn now(approve: bool) -> Self {
        Self {
            approve,
            recorded_at: Utc::now(),
        }
    }
}

/// Append-only, ordered sequence of signals for a single item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub signals: Vec<FeedbackSignal>,
}

impl FeedbackRecord {
    pub fn push(&mut self, signal: FeedbackSignal) {
        self.signals.push(signal);
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn approvals(&self) -> usize {
        self.signals.iter().filter(|s| s.approve).count()
    }

    /// Fraction of approve signals, or `None` when nothing has been recorded.
    /// An empty history is "no opinion", not a zero rating.
    pub fn average_approval(&self) -> Option<f64> {
        if self.signals.is_empty() {
            return None;
        }
        Some(self.approvals() as f64 / self.signals.len() as f64)
    }
}
