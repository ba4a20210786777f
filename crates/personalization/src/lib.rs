//! Recommendation scoring engine — nearest-neighbor retrieval, profile
//! aggregation, hybrid blending, deterministic top-N, trending, and the
//! engine facade that ties them to an item catalog and a feedback store.

pub mod blend;
pub mod catalog;
pub mod loader;
pub mod model;
pub mod neighbors;
pub mod profile;
pub mod ranking;
pub mod recommendations;
pub mod tables;
pub mod trending;

pub use blend::{blend, blend_pairwise, blend_weighted, BlendStrategy};
pub use catalog::{ItemCatalog, ItemMetadata};
pub use model::{LatentFactorModel, RatingModel};
pub use neighbors::{neighbors, similar_items};
pub use profile::profile_scores;
pub use ranking::{ranked, top_n};
pub use recommendations::{
    CatalogEntry, RecommendationEngine, RecommendationItem, RecommendationRequest,
    RecommendationResponse, RecommendationStrategy, SortOrder, Subject,
};
pub use tables::{InteractionTable, SimilarityTable};
pub use trending::trending;
