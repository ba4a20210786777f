//! Nearest-neighbor retrieval from a single similarity table.

use retail_core::{Key, ScoredItem};
use std::collections::BTreeSet;
use tracing::debug;

use crate::ranking::ranked;
use crate::tables::SimilarityTable;

/// Top `top_n` neighbors of `item`. The item itself is always excluded, on
/// top of whatever `excluded` names. An unknown item yields an empty list.
pub fn neighbors<K: Key>(
    table: &SimilarityTable<K>,
    item: &K,
    excluded: &BTreeSet<K>,
    top_n: usize,
) -> Vec<ScoredItem<K>> {
    let Some(scores) = table.score_vector(item) else {
        debug!(item = ?item, "Item not in similarity table");
        return Vec::new();
    };

    let mut excluded = excluded.clone();
    excluded.insert(item.clone());
    ranked(&scores, &excluded, top_n)
}

/// `neighbors` with the default exclusion set `{item}`.
pub fn similar_items<K: Key>(table: &SimilarityTable<K>, item: &K, top_n: usize) -> Vec<K> {
    neighbors(table, item, &BTreeSet::new(), top_n)
        .into_iter()
        .map(|scored| scored.item_id)
        .collect()
}
