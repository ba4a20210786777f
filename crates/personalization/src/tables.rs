//! Immutable similarity and interaction lookups, loaded once per serving
//! session and shared read-only across requests.

use retail_core::config::TableOrientation;
use retail_core::{Key, RecoError, RecoResult, ScoreVector};
use std::collections::{BTreeMap, BTreeSet};

/// Square item x item score lookup.
///
/// The table is stored row-major. Column-major input is transposed once at
/// construction, so `score_vector` always means "the scores associated with
/// this item" no matter how the pipeline serialized the matrix.
#[derive(Debug, Clone)]
pub struct SimilarityTable<K: Key> {
    rows: BTreeMap<K, BTreeMap<K, f64>>,
    /// Every id seen as a row or as a column.
    domain: BTreeSet<K>,
}

impl<K: Key> SimilarityTable<K> {
    pub fn from_rows(rows: BTreeMap<K, BTreeMap<K, f64>>) -> RecoResult<Self> {
        let mut domain = BTreeSet::new();
        for (item, row) in &rows {
            domain.insert(item.clone());
            for (other, score) in row {
                if !score.is_finite() {
                    return Err(RecoError::InvalidParameter(format!(
                        "non-finite similarity {score} between {item:?} and {other:?}"
                    )));
                }
                domain.insert(other.clone());
            }
        }
        Ok(Self { rows, domain })
    }

    pub fn from_columns(columns: BTreeMap<K, BTreeMap<K, f64>>) -> RecoResult<Self> {
        let mut rows: BTreeMap<K, BTreeMap<K, f64>> = BTreeMap::new();
        for (column, entries) in columns {
            rows.entry(column.clone()).or_default();
            for (row, score) in entries {
                rows.entry(row).or_default().insert(column.clone(), score);
            }
        }
        Self::from_rows(rows)
    }

    pub fn with_orientation(
        data: BTreeMap<K, BTreeMap<K, f64>>,
        orientation: TableOrientation,
    ) -> RecoResult<Self> {
        match orientation {
            TableOrientation::Rows => Self::from_rows(data),
            TableOrientation::Columns => Self::from_columns(data),
        }
    }

    /// Whether `item` is in the table's index. Unknown and "known with all
    /// zero scores" are different states.
    pub fn contains(&self, item: &K) -> bool {
        self.rows.contains_key(item)
    }

    /// Indexed items in ascending order.
    pub fn items(&self) -> impl Iterator<Item = &K> {
        self.rows.keys()
    }

    pub fn domain(&self) -> &BTreeSet<K> {
        &self.domain
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stored score between `item` and `other`, `None` if either side is missing.
    pub fn score(&self, item: &K, other: &K) -> Option<f64> {
        self.rows.get(item)?.get(other).copied()
    }

    /// Scores between `item` and every item in the domain. Entries the
    /// table does not store read as 0.0. `None` for an unknown item.
    pub fn score_vector(&self, item: &K) -> Option<ScoreVector<K>> {
        let row = self.rows.get(item)?;
        Some(
            self.domain
                .iter()
                .map(|other| (other.clone(), row.get(other).copied().unwrap_or(0.0)))
                .collect(),
        )
    }
}

/// Sparse user x item interaction strengths. A strength of zero and an
/// absent entry both mean "no interaction".
#[derive(Debug, Clone, Default)]
pub struct InteractionTable<K: Key> {
    users: BTreeMap<K, BTreeMap<K, f64>>,
}

impl<K: Key> InteractionTable<K> {
    pub fn from_users(users: BTreeMap<K, BTreeMap<K, f64>>) -> RecoResult<Self> {
        for (user, items) in &users {
            for (item, strength) in items {
                if !strength.is_finite() || *strength < 0.0 {
                    return Err(RecoError::InvalidParameter(format!(
                        "interaction strength must be finite and non-negative, got {strength} for {user:?}/{item:?}"
                    )));
                }
            }
        }
        Ok(Self { users })
    }

    pub fn contains_user(&self, user: &K) -> bool {
        self.users.contains_key(user)
    }

    pub fn users(&self) -> impl Iterator<Item = &K> {
        self.users.keys()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn strength(&self, user: &K, item: &K) -> f64 {
        self.users
            .get(user)
            .and_then(|items| items.get(item))
            .copied()
            .unwrap_or(0.0)
    }

    /// Items with a positive strength for `user`. Empty for unknown users.
    pub fn interacted_items(&self, user: &K) -> BTreeSet<K> {
        self.users
            .get(user)
            .map(|items| {
                items
                    .iter()
                    .filter(|(_, strength)| **strength > 0.0)
                    .map(|(item, _)| item.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The lowest id the user interacted with, `None` for unknown or idle
    /// users.
    pub fn first_interacted_item(&self, user: &K) -> Option<K> {
        self.users
            .get(user)?
            .iter()
            .find(|(_, strength)| **strength > 0.0)
            .map(|(item, _)| item.clone())
    }

    /// Total strength per item across all users. Items nobody interacted
    /// with are absent rather than zero.
    pub fn item_totals(&self) -> ScoreVector<K> {
        let mut totals: BTreeMap<K, f64> = BTreeMap::new();
        for items in self.users.values() {
            for (item, strength) in items {
                if *strength > 0.0 {
                    *totals.entry(item.clone()).or_insert(0.0) += strength;
                }
            }
        }
        totals.into_iter().collect()
    }
}
