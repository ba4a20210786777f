//! Product recommendation engine — content-based, collaborative, hybrid,
//! model-predicted and trending recommendations over immutable tables.

use chrono::{DateTime, Utc};
use retail_core::config::{CatalogConfig, EngineConfig};
use retail_core::{Key, RecoError, RecoResult, ScoreVector, ScoredItem};
use retail_feedback::{record_with_retry, FeedbackStore, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::blend::{blend_pairwise, blend_weighted, validate_alpha};
use crate::catalog::{ItemCatalog, ItemMetadata};
use crate::model::{predicted_scores, RatingModel};
use crate::neighbors::neighbors;
use crate::profile::profile_scores;
use crate::ranking::ranked;
use crate::tables::{InteractionTable, SimilarityTable};
use crate::trending::trending_scores;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStrategy {
    ContentBased,
    Collaborative,
    Hybrid,
    Predicted,
    Trending,
}

impl RecommendationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationStrategy::ContentBased => "content_based",
            RecommendationStrategy::Collaborative => "collaborative",
            RecommendationStrategy::Hybrid => "hybrid",
            RecommendationStrategy::Predicted => "predicted",
            RecommendationStrategy::Trending => "trending",
        }
    }
}

/// Who or what the recommendations are for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject<K> {
    /// "Similar to this item".
    Item(K),
    /// "For this user", from their interaction history.
    User(K),
    Global,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ranking order of the strategy.
    #[default]
    Default,
    /// Re-order by average approval; items without feedback count as 0.
    HighestApproval,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest<K> {
    pub subject: Subject<K>,
    pub strategy: RecommendationStrategy,
    pub limit: usize,
    /// Weight of the collaborative side for user hybrids; config default if unset.
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub exclude_ids: Vec<K>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl<K> RecommendationRequest<K> {
    pub fn new(subject: Subject<K>, strategy: RecommendationStrategy, limit: usize) -> Self {
        Self {
            subject,
            strategy,
            limit,
            alpha: None,
            exclude_ids: Vec::new(),
            sort: SortOrder::Default,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationItem<K> {
    pub item_id: K,
    pub score: f64,
    pub reason: String,
    pub approval: Option<f64>,
    pub image_url: String,
    pub summary: String,
    pub metadata: Option<ItemMetadata>,
}

/// A catalog search hit, decorated like a recommendation but unscored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry<K> {
    pub item_id: K,
    pub approval: Option<f64>,
    pub image_url: String,
    pub summary: String,
    pub metadata: Option<ItemMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse<K> {
    pub request_id: Uuid,
    pub subject: Subject<K>,
    pub strategy: RecommendationStrategy,
    pub items: Vec<RecommendationItem<K>>,
    pub generated_at: DateTime<Utc>,
    pub model_version: String,
}

/// Holds the session's tables and dispatches requests to the scoring
/// components. Tables are never mutated; the feedback store is the only
/// mutable collaborator and is written through `record_feedback`.
pub struct RecommendationEngine<K: Key> {
    content: Arc<SimilarityTable<K>>,
    collaborative: Arc<SimilarityTable<K>>,
    interactions: Arc<InteractionTable<K>>,
    catalog: Arc<ItemCatalog<K>>,
    model: Option<Arc<dyn RatingModel<K>>>,
    feedback: Option<Arc<dyn FeedbackStore<K>>>,
    retry: RetryPolicy,
    config: EngineConfig,
}

impl<K: Key> RecommendationEngine<K> {
    pub fn new(
        content: Arc<SimilarityTable<K>>,
        collaborative: Arc<SimilarityTable<K>>,
        interactions: Arc<InteractionTable<K>>,
        config: EngineConfig,
    ) -> RecoResult<Self> {
        validate_alpha(config.hybrid_alpha)?;
        Ok(Self {
            content,
            collaborative,
            interactions,
            catalog: Arc::new(ItemCatalog::new(
                CatalogConfig::default().placeholder_image_url,
            )),
            model: None,
            feedback: None,
            retry: RetryPolicy::default(),
            config,
        })
    }

    pub fn with_catalog(mut self, catalog: Arc<ItemCatalog<K>>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_model(mut self, model: Arc<dyn RatingModel<K>>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_feedback(mut self, store: Arc<dyn FeedbackStore<K>>, retry: RetryPolicy) -> Self {
        self.feedback = Some(store);
        self.retry = retry;
        self
    }

    pub fn content_table(&self) -> &SimilarityTable<K> {
        &self.content
    }

    pub fn collaborative_table(&self) -> &SimilarityTable<K> {
        &self.collaborative
    }

    pub fn interactions(&self) -> &InteractionTable<K> {
        &self.interactions
    }

    pub fn catalog(&self) -> &ItemCatalog<K> {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn content_neighbors(&self, item: &K, limit: usize) -> Vec<ScoredItem<K>> {
        neighbors(&self.content, item, &BTreeSet::new(), limit)
    }

    pub fn collaborative_neighbors(&self, item: &K, limit: usize) -> Vec<ScoredItem<K>> {
        neighbors(&self.collaborative, item, &BTreeSet::new(), limit)
    }

    /// Pairwise average of the item's content and collaborative rows.
    pub fn hybrid_neighbors(&self, item: &K, limit: usize) -> Vec<ScoredItem<K>> {
        self.hybrid_item_scores(item, &BTreeSet::new(), limit)
    }

    pub fn collaborative_for_user(&self, user: &K, limit: usize) -> Vec<ScoredItem<K>> {
        self.collaborative_user_scores(user, &BTreeSet::new(), limit)
    }

    pub fn content_for_user(&self, user: &K, limit: usize) -> Vec<ScoredItem<K>> {
        self.content_user_scores(user, &BTreeSet::new(), limit)
    }

    /// `alpha * collaborative + (1 - alpha) * content` over the user's profile.
    pub fn hybrid_for_user(
        &self,
        user: &K,
        alpha: Option<f64>,
        limit: usize,
    ) -> RecoResult<Vec<ScoredItem<K>>> {
        self.hybrid_user_scores(user, alpha, &BTreeSet::new(), limit)
    }

    pub fn predicted_for_user(&self, user: &K, limit: usize) -> RecoResult<Vec<ScoredItem<K>>> {
        self.predicted_user_scores(user, &BTreeSet::new(), limit)
    }

    pub fn trending(&self, limit: usize) -> Vec<ScoredItem<K>> {
        ranked(&trending_scores(&self.interactions), &BTreeSet::new(), limit)
    }

    pub fn recommend(
        &self,
        request: &RecommendationRequest<K>,
    ) -> RecoResult<RecommendationResponse<K>> {
        use RecommendationStrategy as S;

        let extra: BTreeSet<K> = request.exclude_ids.iter().cloned().collect();
        let limit = request.limit;

        let scored = match (&request.subject, request.strategy) {
            (_, S::Trending) => ranked(&trending_scores(&self.interactions), &extra, limit),
            (Subject::Item(item), S::ContentBased) => neighbors(&self.content, item, &extra, limit),
            (Subject::Item(item), S::Collaborative) => {
                neighbors(&self.collaborative, item, &extra, limit)
            }
            (Subject::Item(item), S::Hybrid) => self.hybrid_item_scores(item, &extra, limit),
            (Subject::User(user), S::ContentBased) => self.content_user_scores(user, &extra, limit),
            (Subject::User(user), S::Collaborative) => {
                self.collaborative_user_scores(user, &extra, limit)
            }
            (Subject::User(user), S::Hybrid) => {
                self.hybrid_user_scores(user, request.alpha, &extra, limit)?
            }
            (Subject::User(user), S::Predicted) => self.predicted_user_scores(user, &extra, limit)?,
            (subject, strategy) => {
                return Err(RecoError::InvalidParameter(format!(
                    "strategy {} is not defined for subject {subject:?}",
                    strategy.as_str()
                )));
            }
        };

        let mut items: Vec<RecommendationItem<K>> = scored
            .into_iter()
            .map(|scored| RecommendationItem {
                approval: self.approval_or_none(&scored.item_id),
                image_url: self.catalog.image_url(&scored.item_id),
                summary: self.catalog.summary(&scored.item_id),
                metadata: self.catalog.get(&scored.item_id).cloned(),
                reason: reason_for(&request.subject, request.strategy).to_string(),
                item_id: scored.item_id,
                score: scored.score,
            })
            .collect();

        if request.sort == SortOrder::HighestApproval {
            // Stable: equal approvals keep their ranking order.
            items.sort_by(|a, b| {
                b.approval
                    .unwrap_or(0.0)
                    .total_cmp(&a.approval.unwrap_or(0.0))
            });
        }

        metrics::counter!("recommendations.served", "strategy" => request.strategy.as_str())
            .increment(1);
        info!(
            subject = ?request.subject,
            strategy = request.strategy.as_str(),
            limit,
            items = items.len(),
            "Recommendations generated"
        );

        Ok(RecommendationResponse {
            request_id: Uuid::new_v4(),
            subject: request.subject.clone(),
            strategy: request.strategy,
            items,
            generated_at: Utc::now(),
            model_version: self.config.model_version.clone(),
        })
    }

    /// Browse known items by id or title, optionally narrowed to ids or
    /// categories mentioning one of `categories`. Results are in id order.
    pub fn search(&self, query: &str, categories: &[String], limit: usize) -> Vec<CatalogEntry<K>> {
        let mut known: BTreeSet<&K> = self.content.items().collect();
        known.extend(self.collaborative.items());
        known.extend(self.catalog.items());

        let matches = self.catalog.search(known, query);
        let matches = self.catalog.filter_by_categories(&matches, categories);
        debug!(query, categories = ?categories, matches = matches.len(), "Catalog search");

        matches
            .into_iter()
            .take(limit)
            .map(|item_id| CatalogEntry {
                approval: self.approval_or_none(&item_id),
                image_url: self.catalog.image_url(&item_id),
                summary: self.catalog.summary(&item_id),
                metadata: self.catalog.get(&item_id).cloned(),
                item_id,
            })
            .collect()
    }

    /// Append one approve/reject signal, retrying per the engine's policy.
    pub fn record_feedback(&self, item: &K, approve: bool) -> RecoResult<()> {
        let store = self.feedback_store()?;
        record_with_retry(store.as_ref(), item, approve, &self.retry)
    }

    pub fn average_approval(&self, item: &K) -> RecoResult<Option<f64>> {
        self.feedback_store()?.average_approval(item)
    }

    fn feedback_store(&self) -> RecoResult<&Arc<dyn FeedbackStore<K>>> {
        self.feedback.as_ref().ok_or_else(|| {
            RecoError::InvalidParameter("no feedback store attached to the engine".to_string())
        })
    }

    // Feedback is annotation only; a failing store must not fail the response.
    fn approval_or_none(&self, item: &K) -> Option<f64> {
        let store = self.feedback.as_ref()?;
        match store.average_approval(item) {
            Ok(approval) => approval,
            Err(e) => {
                warn!(item = ?item, error = %e, "Feedback read failed, leaving approval empty");
                None
            }
        }
    }

    fn hybrid_item_scores(&self, item: &K, extra: &BTreeSet<K>, limit: usize) -> Vec<ScoredItem<K>> {
        let content = self.content.score_vector(item);
        let collaborative = self.collaborative.score_vector(item);
        if content.is_none() && collaborative.is_none() {
            debug!(item = ?item, "Item unknown to both similarity tables");
            return Vec::new();
        }

        let mut excluded = extra.clone();
        excluded.insert(item.clone());
        let blended = blend_pairwise(
            &content.unwrap_or_default(),
            &collaborative.unwrap_or_default(),
            &excluded,
        );
        ranked(&blended, &excluded, limit)
    }

    fn collaborative_user_scores(
        &self,
        user: &K,
        extra: &BTreeSet<K>,
        limit: usize,
    ) -> Vec<ScoredItem<K>> {
        let interacted = self.interactions.interacted_items(user);
        if interacted.is_empty() {
            debug!(user = ?user, "User has no interactions");
            return Vec::new();
        }
        let scores = profile_scores(&self.collaborative, &interacted);
        ranked(&scores, &union(&interacted, extra), limit)
    }

    /// Neighbors of the user's first interacted item in id order, minus
    /// everything the user already interacted with.
    fn content_user_scores(&self, user: &K, extra: &BTreeSet<K>, limit: usize) -> Vec<ScoredItem<K>> {
        let Some(anchor) = self.interactions.first_interacted_item(user) else {
            debug!(user = ?user, "User has no interactions");
            return Vec::new();
        };
        let interacted = self.interactions.interacted_items(user);
        neighbors(&self.content, &anchor, &union(&interacted, extra), limit)
    }

    fn hybrid_user_scores(
        &self,
        user: &K,
        alpha: Option<f64>,
        extra: &BTreeSet<K>,
        limit: usize,
    ) -> RecoResult<Vec<ScoredItem<K>>> {
        let alpha = alpha.unwrap_or(self.config.hybrid_alpha);
        validate_alpha(alpha)?;

        let interacted = self.interactions.interacted_items(user);
        if interacted.is_empty() {
            debug!(user = ?user, "User has no interactions");
            return Ok(Vec::new());
        }
        let excluded = union(&interacted, extra);
        let collaborative = profile_scores(&self.collaborative, &interacted);
        let content = profile_scores(&self.content, &interacted);
        let blended = blend_weighted(&collaborative, &content, alpha, &excluded)?;
        Ok(ranked(&blended, &excluded, limit))
    }

    fn predicted_user_scores(
        &self,
        user: &K,
        extra: &BTreeSet<K>,
        limit: usize,
    ) -> RecoResult<Vec<ScoredItem<K>>> {
        let model = self.model.as_ref().ok_or_else(|| {
            RecoError::InvalidParameter("no rating model attached to the engine".to_string())
        })?;

        let mut candidates: BTreeSet<&K> = self.content.domain().iter().collect();
        candidates.extend(self.collaborative.domain().iter());
        candidates.extend(self.catalog.items());

        let excluded = union(&self.interactions.interacted_items(user), extra);
        let scores: ScoreVector<K> =
            predicted_scores(model.as_ref(), user, candidates, &excluded);
        Ok(ranked(&scores, &excluded, limit))
    }
}

fn union<K: Key>(a: &BTreeSet<K>, b: &BTreeSet<K>) -> BTreeSet<K> {
    a.union(b).cloned().collect()
}

fn reason_for<K>(subject: &Subject<K>, strategy: RecommendationStrategy) -> &'static str {
    match (subject, strategy) {
        (_, RecommendationStrategy::Trending) => "Trending now",
        (Subject::Item(_), RecommendationStrategy::ContentBased) => "Similar product details",
        (Subject::Item(_), RecommendationStrategy::Collaborative) => {
            "Customers who interacted with this also interacted with these"
        }
        (Subject::Item(_), _) => "Similar by content and customer behavior",
        (_, RecommendationStrategy::ContentBased) => "Similar to an item you interacted with",
        (_, RecommendationStrategy::Collaborative) => "Based on your interaction history",
        (_, RecommendationStrategy::Predicted) => "Predicted to match your taste",
        (_, RecommendationStrategy::Hybrid) => "Blended from your history",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LatentFactorModel;
    use crate::tables::fixtures::{abc_table, interactions, rows};
    use retail_feedback::{FeedbackRecord, MemoryFeedbackStore};

    fn collaborative_table() -> SimilarityTable<String> {
        SimilarityTable::from_rows(rows(&[
            ("A", &[("B", 0.1), ("C", 0.8), ("D", 0.6)]),
            ("B", &[("A", 0.1), ("C", 0.2)]),
            ("C", &[("A", 0.8), ("B", 0.2)]),
            ("D", &[("A", 0.6)]),
        ]))
        .unwrap()
    }

    fn engine() -> RecommendationEngine<String> {
        let interactions = interactions(&[
            ("u1", &[("A", 1.0)]),
            ("u2", &[("A", 2.0), ("B", 4.0), ("D", 0.0)]),
            ("u3", &[("C", 1.0), ("D", 3.0)]),
        ]);
        RecommendationEngine::new(
            Arc::new(abc_table()),
            Arc::new(collaborative_table()),
            Arc::new(interactions),
            EngineConfig::default(),
        )
        .unwrap()
    }

    fn ids(items: &[ScoredItem<String>]) -> Vec<&str> {
        items.iter().map(|s| s.item_id.as_str()).collect()
    }

    fn request(subject: Subject<String>, strategy: RecommendationStrategy) -> RecommendationRequest<String> {
        RecommendationRequest::new(subject, strategy, 5)
    }

    #[test]
    fn test_content_neighbors() {
        let engine = engine();
        assert_eq!(ids(&engine.content_neighbors(&"A".to_string(), 2)), vec!["B", "C"]);
        assert!(engine.content_neighbors(&"Z".to_string(), 2).is_empty());
    }

    #[test]
    fn test_collaborative_neighbors() {
        let engine = engine();
        assert_eq!(
            ids(&engine.collaborative_neighbors(&"A".to_string(), 5)),
            vec!["C", "D", "B"]
        );
    }

    #[test]
    fn test_hybrid_neighbors_average_both_tables() {
        let engine = engine();
        let result = engine.hybrid_neighbors(&"A".to_string(), 5);
        // B: (0.9 + 0.1) / 2, C: (0.4 + 0.8) / 2, D: (0 + 0.6) / 2
        assert_eq!(ids(&result), vec!["C", "B", "D"]);
        assert!((result[0].score - 0.6).abs() < 1e-12);
        assert!((result[1].score - 0.5).abs() < 1e-12);
        assert!((result[2].score - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_hybrid_neighbors_known_on_one_side_only() {
        let engine = engine();
        // D only has a collaborative row.
        let result = engine.hybrid_neighbors(&"D".to_string(), 5);
        assert_eq!(result[0].item_id, "A");
        assert!((result[0].score - 0.3).abs() < 1e-12);
        assert!(engine.hybrid_neighbors(&"nowhere".to_string(), 5).is_empty());
    }

    #[test]
    fn test_collaborative_for_user_excludes_history() {
        let engine = engine();
        let result = engine.collaborative_for_user(&"u2".to_string(), 5);
        // A + B rows: C = 0.8 + 0.2, D = 0.6 + 0.0
        assert_eq!(ids(&result), vec!["C", "D"]);
        assert!(engine.collaborative_for_user(&"ghost".to_string(), 5).is_empty());
    }

    #[test]
    fn test_content_for_user_anchors_on_first_interacted_item() {
        let engine = engine();
        // u2 anchors on A, not on its stronger B; both are excluded as seen.
        assert_eq!(ids(&engine.content_for_user(&"u2".to_string(), 5)), vec!["C"]);
        // u3 anchors on C although D carries more strength.
        assert_eq!(ids(&engine.content_for_user(&"u3".to_string(), 5)), vec!["A", "B"]);
    }

    #[test]
    fn test_hybrid_for_user_weights() {
        let engine = engine();
        let collab_only = engine.hybrid_for_user(&"u1".to_string(), Some(1.0), 5).unwrap();
        assert_eq!(ids(&collab_only), vec!["C", "D", "B"]);

        let content_only = engine.hybrid_for_user(&"u1".to_string(), Some(0.0), 5).unwrap();
        assert_eq!(ids(&content_only), vec!["B", "C", "D"]);
        assert_eq!(content_only[2].score, 0.0);
    }

    #[test]
    fn test_hybrid_for_user_rejects_bad_alpha() {
        let engine = engine();
        let result = engine.hybrid_for_user(&"u1".to_string(), Some(1.5), 5);
        assert!(matches!(result, Err(RecoError::InvalidParameter(_))));
    }

    #[test]
    fn test_trending() {
        let engine = engine();
        let top = engine.trending(2);
        assert_eq!(ids(&top), vec!["B", "A"]);
        assert_eq!(top[0].score, 4.0);
        assert_eq!(top[1].score, 3.0);
    }

    #[test]
    fn test_recommend_applies_request_exclusions() {
        let engine = engine();
        let mut req = request(Subject::Item("A".to_string()), RecommendationStrategy::Hybrid);
        req.exclude_ids = vec!["C".to_string()];
        let resp = engine.recommend(&req).unwrap();
        let got: Vec<&str> = resp.items.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(got, vec!["B", "D"]);
        assert_eq!(resp.model_version, "v1.0");
        assert_eq!(resp.items[0].reason, "Similar by content and customer behavior");
    }

    #[test]
    fn test_recommend_unsupported_combination() {
        let engine = engine();
        let req = request(Subject::Global, RecommendationStrategy::ContentBased);
        assert!(matches!(engine.recommend(&req), Err(RecoError::InvalidParameter(_))));

        let req = request(Subject::Item("A".to_string()), RecommendationStrategy::Predicted);
        assert!(engine.recommend(&req).is_err());
    }

    #[test]
    fn test_trending_ignores_subject() {
        let engine = engine();
        let req = request(Subject::User("u1".to_string()), RecommendationStrategy::Trending);
        let resp = engine.recommend(&req).unwrap();
        assert_eq!(resp.items[0].item_id, "B");
        assert_eq!(resp.items[0].reason, "Trending now");
    }

    #[test]
    fn test_predicted_requires_model() {
        let engine = engine();
        let result = engine.predicted_for_user(&"u1".to_string(), 3);
        assert!(matches!(result, Err(RecoError::InvalidParameter(_))));
    }

    #[test]
    fn test_predicted_with_model() {
        let mut model = LatentFactorModel::new(1.0, 1);
        model.insert_user("u1".to_string(), 0.0, vec![1.0]).unwrap();
        model.insert_item("A".to_string(), 0.0, vec![5.0]).unwrap();
        model.insert_item("D".to_string(), 0.0, vec![2.0]).unwrap();
        let engine = engine().with_model(Arc::new(model));

        let result = engine.predicted_for_user(&"u1".to_string(), 2).unwrap();
        // A is already seen by u1.
        assert_eq!(ids(&result), vec!["D", "B"]);
        assert_eq!(result[0].score, 3.0);
    }

    #[test]
    fn test_feedback_requires_store() {
        let engine = engine();
        assert!(engine.record_feedback(&"A".to_string(), true).is_err());
    }

    #[test]
    fn test_feedback_round_trip_and_approval_sort() {
        let store: Arc<MemoryFeedbackStore<String>> = Arc::new(MemoryFeedbackStore::new());
        let engine = engine().with_feedback(store.clone(), RetryPolicy::default());

        assert_eq!(engine.average_approval(&"X".to_string()).unwrap(), None);
        engine.record_feedback(&"X".to_string(), true).unwrap();
        engine.record_feedback(&"X".to_string(), false).unwrap();
        assert_eq!(engine.average_approval(&"X".to_string()).unwrap(), Some(0.5));

        engine.record_feedback(&"D".to_string(), true).unwrap();
        let mut req = request(Subject::Item("A".to_string()), RecommendationStrategy::Hybrid);
        req.sort = SortOrder::HighestApproval;
        let resp = engine.recommend(&req).unwrap();
        let got: Vec<&str> = resp.items.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(got, vec!["D", "C", "B"]);
        assert_eq!(resp.items[0].approval, Some(1.0));
        assert_eq!(resp.items[1].approval, None);
    }

    struct BrokenStore;

    impl FeedbackStore<String> for BrokenStore {
        fn record_feedback(&self, _item: &String, _approve: bool) -> RecoResult<()> {
            Err(RecoError::Storage("offline".to_string()))
        }

        fn feedback_record(&self, _item: &String) -> RecoResult<Option<FeedbackRecord>> {
            Err(RecoError::Storage("offline".to_string()))
        }
    }

    #[test]
    fn test_broken_feedback_store_does_not_fail_recommendations() {
        let engine = engine().with_feedback(
            Arc::new(BrokenStore),
            RetryPolicy::new(2, std::time::Duration::from_millis(1)),
        );
        let mut req = request(Subject::Item("A".to_string()), RecommendationStrategy::ContentBased);
        req.sort = SortOrder::HighestApproval;
        let resp = engine.recommend(&req).unwrap();
        assert_eq!(resp.items.len(), 2);
        assert!(resp.items.iter().all(|i| i.approval.is_none()));

        let err = engine.record_feedback(&"A".to_string(), true).unwrap_err();
        assert!(matches!(err, RecoError::Storage(_)));
    }

    #[test]
    fn test_catalog_metadata_attached() {
        let mut catalog = ItemCatalog::new("img/{item}");
        catalog.insert(
            "B".to_string(),
            ItemMetadata {
                title: Some("Bookshelf".to_string()),
                ..Default::default()
            },
        );
        let engine = engine().with_catalog(Arc::new(catalog));
        let resp = engine
            .recommend(&request(Subject::Item("A".to_string()), RecommendationStrategy::ContentBased))
            .unwrap();
        assert_eq!(
            resp.items[0].metadata.as_ref().and_then(|m| m.title.as_deref()),
            Some("Bookshelf")
        );
        assert!(resp.items[1].metadata.is_none());
    }

    #[test]
    fn test_items_carry_image_and_summary() {
        let mut catalog = ItemCatalog::new("img/{item}");
        catalog.insert(
            "B".to_string(),
            ItemMetadata {
                category: Some("furniture".to_string()),
                available: Some(true),
                image_url: Some("img/shelf.png".to_string()),
                ..Default::default()
            },
        );
        let engine = engine().with_catalog(Arc::new(catalog));
        let resp = engine
            .recommend(&request(Subject::Item("A".to_string()), RecommendationStrategy::ContentBased))
            .unwrap();
        assert_eq!(resp.items[0].image_url, "img/shelf.png");
        assert_eq!(resp.items[0].summary, "Category: furniture | Available: yes");
        assert_eq!(resp.items[1].image_url, "img/C");
        assert_eq!(resp.items[1].summary, "Category: Unknown | Available: Unknown");
    }

    #[test]
    fn test_default_placeholder_image_without_catalog() {
        let engine = engine();
        let resp = engine
            .recommend(&request(Subject::Item("A".to_string()), RecommendationStrategy::ContentBased))
            .unwrap();
        assert_eq!(
            resp.items[0].image_url,
            "https://via.placeholder.com/150?text=Item+B"
        );
    }

    #[test]
    fn test_search_by_id_title_and_category() {
        let mut catalog = ItemCatalog::new("img/{item}");
        catalog.insert(
            "toy-9".to_string(),
            ItemMetadata {
                title: Some("Wooden Train".to_string()),
                category: Some("toys".to_string()),
                ..Default::default()
            },
        );
        let engine = engine().with_catalog(Arc::new(catalog));

        let ids_of = |entries: Vec<CatalogEntry<String>>| -> Vec<String> {
            entries.into_iter().map(|e| e.item_id).collect()
        };
        // Table ids are searchable without catalog entries.
        assert_eq!(ids_of(engine.search("c", &[], 10)), vec!["C"]);
        assert_eq!(ids_of(engine.search("train", &[], 10)), vec!["toy-9"]);
        assert_eq!(ids_of(engine.search("", &["toys".to_string()], 10)), vec!["toy-9"]);
        assert_eq!(engine.search("", &[], 2).len(), 2);

        let hit = &engine.search("train", &[], 1)[0];
        assert_eq!(hit.image_url, "img/toy-9");
        assert_eq!(hit.summary, "Category: toys | Available: Unknown");
    }

    #[test]
    fn test_invalid_config_alpha_rejected() {
        let config = EngineConfig {
            hybrid_alpha: -1.0,
            ..EngineConfig::default()
        };
        let result = RecommendationEngine::new(
            Arc::new(abc_table()),
            Arc::new(collaborative_table()),
            Arc::new(InteractionTable::default()),
            config,
        );
        assert!(result.is_err());
    }
}
