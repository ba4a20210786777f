//! Identifier and score types shared by the scoring engine and the feedback store.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Opaque item or user identifier. Integer and string keys both qualify;
/// the natural `Ord` of the key is the ranking tie-break order and
/// `Display` is what search and image templates match against.
pub trait Key: Clone + Eq + Hash + Ord + Debug + Display {}

impl<T: Clone + Eq + Hash + Ord + Debug + Display> Key for T {}

/// Transient item -> score mapping produced by retrieval and aggregation.
pub type ScoreVector<K> = HashMap<K, f64>;

/// A ranked candidate with the score it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem<K> {
    pub item_id: K,
    pub score: f64,
}

impl<K> ScoredItem<K> {
    pub fn new(item_id: K, score: f64) -> Self {
        Self { item_id, score }
    }
}
