pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{RecoError, RecoResult};
pub use types::{Key, ScoreVector, ScoredItem};
