//! Global popularity ranking, independent of any user or item.

use retail_core::{Key, ScoreVector, ScoredItem};
use std::collections::BTreeSet;

use crate::ranking::ranked;
use crate::tables::InteractionTable;

/// Total interaction strength per item across all users.
pub fn trending_scores<K: Key>(interactions: &InteractionTable<K>) -> ScoreVector<K> {
    interactions.item_totals()
}

/// Top `n` items by total strength, paired with that total.
pub fn trending<K: Key>(interactions: &InteractionTable<K>, n: usize) -> Vec<ScoredItem<K>> {
    ranked(&trending_scores(interactions), &BTreeSet::new(), n)
}
