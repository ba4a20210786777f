//! Projects a user's interaction history onto a similarity table.

use retail_core::{Key, ScoreVector};
use std::collections::BTreeSet;
use tracing::debug;

use crate::tables::SimilarityTable;

/// Sum the score vectors of every interacted item the table knows about,
/// then drop the interacted items themselves.
/// Interacted items missing from the table are skipped.
pub fn profile_scores<K: Key>(table: &SimilarityTable<K>, interacted: &BTreeSet<K>) -> ScoreVector<K> {
    let mut totals = ScoreVector::new();
    let mut known = 0usize;

    for item in interacted {
        let Some(scores) = table.score_vector(item) else {
            continue;
        };
        known += 1;
        for (candidate, score) in scores {
            *totals.entry(candidate).or_insert(0.0) += score;
        }
    }

    for item in interacted {
        totals.remove(item);
    }

    debug!(
        interacted = interacted.len(),
        known,
        candidates = totals.len(),
        "Profile scores aggregated"
    );
    totals
}
