//! Hybrid blending of two score vectors.
//!
//! `PairwiseAverage` merges the two neighbor rows of a single query item,
//! `Weighted` merges two user-profile aggregates. In both, the result covers
//! the union of the input domains and a side that lacks an item contributes
//! 0.0 for it.

use retail_core::{Key, RecoError, RecoResult, ScoreVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_ALPHA: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BlendStrategy {
    /// `(a + b) / 2`
    PairwiseAverage,
    /// `alpha * a + (1 - alpha) * b`
    Weighted { alpha: f64 },
}

impl BlendStrategy {
    pub fn weighted(alpha: f64) -> RecoResult<Self> {
        validate_alpha(alpha)?;
        Ok(BlendStrategy::Weighted { alpha })
    }

    fn weights(&self) -> (f64, f64) {
        match self {
            BlendStrategy::PairwiseAverage => (0.5, 0.5),
            BlendStrategy::Weighted { alpha } => (*alpha, 1.0 - alpha),
        }
    }
}

impl Default for BlendStrategy {
    fn default() -> Self {
        BlendStrategy::Weighted {
            alpha: DEFAULT_ALPHA,
        }
    }
}

pub fn validate_alpha(alpha: f64) -> RecoResult<()> {
    if (0.0..=1.0).contains(&alpha) {
        Ok(())
    } else {
        Err(RecoError::InvalidParameter(format!(
            "alpha must be within [0, 1], got {alpha}"
        )))
    }
}

/// Combine `a` and `b` with `strategy`, then remove `excluded` again: an
/// excluded id can come back through whichever side still scored it.
pub fn blend<K: Key>(
    a: &ScoreVector<K>,
    b: &ScoreVector<K>,
    strategy: BlendStrategy,
    excluded: &BTreeSet<K>,
) -> RecoResult<ScoreVector<K>> {
    if let BlendStrategy::Weighted { alpha } = strategy {
        validate_alpha(alpha)?;
    }
    Ok(combine(a, b, strategy.weights(), excluded))
}

pub fn blend_pairwise<K: Key>(
    a: &ScoreVector<K>,
    b: &ScoreVector<K>,
    excluded: &BTreeSet<K>,
) -> ScoreVector<K> {
    combine(a, b, BlendStrategy::PairwiseAverage.weights(), excluded)
}

pub fn blend_weighted<K: Key>(
    a: &ScoreVector<K>,
    b: &ScoreVector<K>,
    alpha: f64,
    excluded: &BTreeSet<K>,
) -> RecoResult<ScoreVector<K>> {
    blend(a, b, BlendStrategy::weighted(alpha)?, excluded)
}

fn combine<K: Key>(
    a: &ScoreVector<K>,
    b: &ScoreVector<K>,
    (wa, wb): (f64, f64),
    excluded: &BTreeSet<K>,
) -> ScoreVector<K> {
    let mut blended = ScoreVector::with_capacity(a.len().max(b.len()));
    for (item, score) in a {
        *blended.entry(item.clone()).or_insert(0.0) += wa * score;
    }
    for (item, score) in b {
        *blended.entry(item.clone()).or_insert(0.0) += wb * score;
    }
    blended.retain(|item, _| !excluded.contains(item));
    blended
}
