//! Item catalog — display metadata referenced by recommendation responses.
//! Scoring never reads it.

use retail_core::Key;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

pub struct ItemCatalog<K: Key> {
    items: BTreeMap<K, ItemMetadata>,
    /// Image URL template for items without one; `{item}` is replaced by the id.
    placeholder_image_url: String,
}

impl<K: Key> ItemCatalog<K> {
    pub fn new(placeholder_image_url: impl Into<String>) -> Self {
        Self {
            items: BTreeMap::new(),
            placeholder_image_url: placeholder_image_url.into(),
        }
    }

    pub fn from_items(
        items: BTreeMap<K, ItemMetadata>,
        placeholder_image_url: impl Into<String>,
    ) -> Self {
        Self {
            items,
            placeholder_image_url: placeholder_image_url.into(),
        }
    }

    pub fn insert(&mut self, item: K, metadata: ItemMetadata) {
        self.items.insert(item, metadata);
    }

    pub fn get(&self, item: &K) -> Option<&ItemMetadata> {
        self.items.get(item)
    }

    pub fn items(&self) -> impl Iterator<Item = &K> {
        self.items.keys()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn image_url(&self, item: &K) -> String {
        self.items
            .get(item)
            .and_then(|m| m.image_url.clone())
            .unwrap_or_else(|| {
                self.placeholder_image_url
                    .replace("{item}", &item.to_string())
            })
    }

    /// One-line "Category: .. | Available: .." summary, "Unknown" for gaps.
    pub fn summary(&self, item: &K) -> String {
        let meta = self.items.get(item);
        let category = meta
            .and_then(|m| m.category.as_deref())
            .unwrap_or("Unknown");
        let available = match meta.and_then(|m| m.available) {
            Some(true) => "yes",
            Some(false) => "no",
            None => "Unknown",
        };
        format!("Category: {category} | Available: {available}")
    }

    /// Candidates whose id or catalog title contains `query`, case-insensitive.
    /// An empty query matches everything.
    pub fn search<'a>(&self, candidates: impl IntoIterator<Item = &'a K>, query: &str) -> Vec<K>
    where
        K: 'a,
    {
        let needle = query.to_lowercase();
        candidates
            .into_iter()
            .filter(|item| {
                item.to_string().to_lowercase().contains(&needle)
                    || self
                        .items
                        .get(*item)
                        .and_then(|m| m.title.as_deref())
                        .is_some_and(|t| t.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }

    /// Keep the candidates whose category or id mentions any keyword.
    /// No keywords means no filtering.
    pub fn filter_by_categories(&self, candidates: &[K], keywords: &[String]) -> Vec<K> {
        if keywords.is_empty() {
            return candidates.to_vec();
        }
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        candidates
            .iter()
            .filter(|item| {
                let id = item.to_string().to_lowercase();
                let category = self
                    .items
                    .get(*item)
                    .and_then(|m| m.category.as_deref())
                    .map(str::to_lowercase)
                    .unwrap_or_default();
                keywords
                    .iter()
                    .any(|k| id.contains(k.as_str()) || category.contains(k.as_str()))
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ItemCatalog<String> {
        let mut catalog = ItemCatalog::new("https://img.example/{item}.jpg");
        catalog.insert(
            "lamp-1".to_string(),
            ItemMetadata {
                title: Some("Desk Lamp".to_string()),
                category: Some("Home".to_string()),
                available: Some(true),
                ..Default::default()
            },
        );
        catalog.insert(
            "book-7".to_string(),
            ItemMetadata {
                title: Some("Rust in Action".to_string()),
                category: Some("books".to_string()),
                image_url: Some("https://img.example/custom.png".to_string()),
                ..Default::default()
            },
        );
        catalog
    }

    #[test]
    fn test_image_url_placeholder() {
        let catalog = catalog();
        assert_eq!(
            catalog.image_url(&"lamp-1".to_string()),
            "https://img.example/lamp-1.jpg"
        );
        assert_eq!(
            catalog.image_url(&"book-7".to_string()),
            "https://img.example/custom.png"
        );
        assert_eq!(catalog.image_url(&"x".to_string()), "https://img.example/x.jpg");
    }

    #[test]
    fn test_summary_fills_unknowns() {
        let catalog = catalog();
        assert_eq!(
            catalog.summary(&"lamp-1".to_string()),
            "Category: Home | Available: yes"
        );
        assert_eq!(
            catalog.summary(&"ghost".to_string()),
            "Category: Unknown | Available: Unknown"
        );
    }

    #[test]
    fn test_search_matches_id_and_title() {
        let catalog = catalog();
        let candidates = ["book-7".to_string(), "lamp-1".to_string(), "toys-3".to_string()];
        assert_eq!(catalog.search(&candidates, "LAMP"), vec!["lamp-1".to_string()]);
        assert_eq!(catalog.search(&candidates, "rust"), vec!["book-7".to_string()]);
        assert_eq!(catalog.search(&candidates, "toys"), vec!["toys-3".to_string()]);
        assert_eq!(catalog.search(&candidates, "").len(), 3);
        assert!(catalog.search(&candidates, "sofa").is_empty());
    }

    #[test]
    fn test_filter_by_categories() {
        let catalog = catalog();
        let candidates = vec!["lamp-1".to_string(), "book-7".to_string(), "toys-3".to_string()];
        let filtered = catalog.filter_by_categories(&candidates, &["home".to_string(), "toys".to_string()]);
        assert_eq!(filtered, vec!["lamp-1".to_string(), "toys-3".to_string()]);
        assert_eq!(catalog.filter_by_categories(&candidates, &[]).len(), 3);
    }
}
