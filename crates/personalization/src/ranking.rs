//! Deterministic top-N selection shared by every recommendation path.
//!
//! Ordering is score descending, then id ascending. Floating scores tie
//! often (duplicate items produce identical rows), so the id tie-break is what
//! makes output reproducible across runs and platforms.

use retail_core::{Key, ScoreVector, ScoredItem};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Drop `excluded`, rank the rest and keep the first `n`. Never pads.
pub fn ranked<K: Key>(scores: &ScoreVector<K>, excluded: &BTreeSet<K>, n: usize) -> Vec<ScoredItem<K>> {
    let mut candidates: Vec<ScoredItem<K>> = scores
        .iter()
        .filter(|(item, _)| !excluded.contains(*item))
        .map(|(item, score)| ScoredItem::new(item.clone(), *score))
        .collect();

    candidates.sort_by(compare_ranked);
    candidates.truncate(n);
    candidates
}

/// Ids only, in ranked order.
pub fn top_n<K: Key>(scores: &ScoreVector<K>, excluded: &BTreeSet<K>, n: usize) -> Vec<K> {
    ranked(scores, excluded, n)
        .into_iter()
        .map(|scored| scored.item_id)
        .collect()
}

pub fn compare_ranked<K: Key>(a: &ScoredItem<K>, b: &ScoredItem<K>) -> Ordering {
    sort_key(b.score)
        .total_cmp(&sort_key(a.score))
        .then_with(|| a.item_id.cmp(&b.item_id))
}

// NaN sinks below every real score instead of floating to the top, and
// -0.0 compares equal to 0.0 so the id tie-break still applies.
fn sort_key(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else if score == 0.0 {
        0.0
    } else {
        score
    }
}
