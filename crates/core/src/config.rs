use serde::Deserialize;

use crate::error::{RecoError, RecoResult};

/// Root application configuration. Loaded from environment variables
/// with the prefix `RETAIL_RECOMMENDER__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Physical orientation of the serialized similarity tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableOrientation {
    /// `{ item: { neighbor: score } }`
    Rows,
    /// `{ neighbor: { item: score } }`
    Columns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_content_similarity_path")]
    pub content_similarity_path: String,
    #[serde(default = "default_collaborative_similarity_path")]
    pub collaborative_similarity_path: String,
    #[serde(default = "default_interactions_path")]
    pub interactions_path: String,
    #[serde(default)]
    pub catalog_path: Option<String>,
    #[serde(default)]
    pub latent_factors_path: Option<String>,
    #[serde(default = "default_orientation")]
    pub orientation: TableOrientation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,
    #[serde(default = "default_hybrid_alpha")]
    pub hybrid_alpha: f64,
    #[serde(default = "default_trending_limit")]
    pub trending_limit: usize,
    #[serde(default = "default_model_version")]
    pub model_version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default = "default_feedback_path")]
    pub path: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_placeholder_image_url")]
    pub placeholder_image_url: String,
}

// Default functions
fn default_content_similarity_path() -> String {
    "data/content_similarity.json".to_string()
}
fn default_collaborative_similarity_path() -> String {
    "data/item_similarity.json".to_string()
}
fn default_interactions_path() -> String {
    "data/user_item_matrix.json".to_string()
}
fn default_orientation() -> TableOrientation {
    TableOrientation::Rows
}
fn default_top_n() -> usize {
    5
}
fn default_hybrid_alpha() -> f64 {
    0.5
}
fn default_trending_limit() -> usize {
    5
}
fn default_model_version() -> String {
    "v1.0".to_string()
}
fn default_feedback_path() -> String {
    "ratings.json".to_string()
}
fn default_max_attempts() -> u32 {
    3
}
fn default_retry_backoff_ms() -> u64 {
    50
}
fn default_placeholder_image_url() -> String {
    "https://via.placeholder.com/150?text=Item+{item}".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            content_similarity_path: default_content_similarity_path(),
            collaborative_similarity_path: default_collaborative_similarity_path(),
            interactions_path: default_interactions_path(),
            catalog_path: None,
            latent_factors_path: None,
            orientation: default_orientation(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_top_n: default_top_n(),
            hybrid_alpha: default_hybrid_alpha(),
            trending_limit: default_trending_limit(),
            model_version: default_model_version(),
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            path: default_feedback_path(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            placeholder_image_url: default_placeholder_image_url(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            engine: EngineConfig::default(),
            feedback: FeedbackConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional config file, then environment
    /// variables (which take precedence).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("RETAIL_RECOMMENDER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Reject values that indicate a misconfiguration rather than a data condition.
    pub fn validate(&self) -> RecoResult<()> {
        let alpha = self.engine.hybrid_alpha;
        if !(0.0..=1.0).contains(&alpha) {
            return Err(RecoError::Config(format!(
                "engine.hybrid_alpha must be within [0, 1], got {alpha}"
            )));
        }
        if self.feedback.max_attempts == 0 {
            return Err(RecoError::Config(
                "feedback.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
