//! Rating-model contract for black-box collaborative predictors.
//!
//! Only the contract matters here: given a user and an item, return a scalar
//! score. `LatentFactorModel` scores from factors produced by an external
//! training job; this crate never fits them.

use retail_core::{Key, RecoError, RecoResult, ScoreVector};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub trait RatingModel<K>: Send + Sync {
    /// Estimated score of `item` for `user`.
    fn predict(&self, user: &K, item: &K) -> f64;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorEntry {
    #[serde(default)]
    pub bias: f64,
    pub factors: Vec<f64>,
}

/// Biased matrix-factorization predictor:
/// `global_mean + user_bias + item_bias + <user_factors, item_factors>`.
///
/// Unknown users or items contribute nothing beyond the global mean, the
/// same baseline a trained SVD falls back to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize",
    deserialize = "K: Ord + Deserialize<'de>"
))]
pub struct LatentFactorModel<K> {
    pub global_mean: f64,
    pub dimensions: usize,
    #[serde(default)]
    pub users: BTreeMap<K, FactorEntry>,
    #[serde(default)]
    pub items: BTreeMap<K, FactorEntry>,
}

impl<K: Key> LatentFactorModel<K> {
    pub fn new(global_mean: f64, dimensions: usize) -> Self {
        Self {
            global_mean,
            dimensions,
            users: BTreeMap::new(),
            items: BTreeMap::new(),
        }
    }

    pub fn insert_user(&mut self, user: K, bias: f64, factors: Vec<f64>) -> RecoResult<()> {
        let entry = FactorEntry { bias, factors };
        self.check_entry(&user, &entry)?;
        self.users.insert(user, entry);
        Ok(())
    }

    pub fn insert_item(&mut self, item: K, bias: f64, factors: Vec<f64>) -> RecoResult<()> {
        let entry = FactorEntry { bias, factors };
        self.check_entry(&item, &entry)?;
        self.items.insert(item, entry);
        Ok(())
    }

    /// Check a deserialized model: finite numbers, one dimensionality.
    pub fn validate(&self) -> RecoResult<()> {
        if !self.global_mean.is_finite() {
            return Err(RecoError::InvalidParameter(
                "global_mean must be finite".to_string(),
            ));
        }
        for (key, entry) in self.users.iter().chain(self.items.iter()) {
            self.check_entry(key, entry)?;
        }
        Ok(())
    }

    fn check_entry(&self, key: &K, entry: &FactorEntry) -> RecoResult<()> {
        if entry.factors.len() != self.dimensions {
            return Err(RecoError::InvalidParameter(format!(
                "{key:?} has {} factors, model expects {}",
                entry.factors.len(),
                self.dimensions
            )));
        }
        if !entry.bias.is_finite() || entry.factors.iter().any(|f| !f.is_finite()) {
            return Err(RecoError::InvalidParameter(format!(
                "{key:?} has non-finite factors"
            )));
        }
        Ok(())
    }
}

impl<K: Key + Send + Sync> RatingModel<K> for LatentFactorModel<K> {
    fn predict(&self, user: &K, item: &K) -> f64 {
        let user_entry = self.users.get(user);
        let item_entry = self.items.get(item);

        let mut estimate = self.global_mean;
        if let Some(u) = user_entry {
            estimate += u.bias;
        }
        if let Some(i) = item_entry {
            estimate += i.bias;
        }
        if let (Some(u), Some(i)) = (user_entry, item_entry) {
            estimate += u
                .factors
                .iter()
                .zip(&i.factors)
                .map(|(a, b)| a * b)
                .sum::<f64>();
        }
        estimate
    }
}

/// Model estimates for every candidate not in `excluded`.
pub fn predicted_scores<'a, K, M>(
    model: &M,
    user: &K,
    candidates: impl IntoIterator<Item = &'a K>,
    excluded: &BTreeSet<K>,
) -> ScoreVector<K>
where
    K: Key + 'a,
    M: RatingModel<K> + ?Sized,
{
    candidates
        .into_iter()
        .filter(|item| !excluded.contains(*item))
        .map(|item| (item.clone(), model.predict(user, item)))
        .collect()
}
