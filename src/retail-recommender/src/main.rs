//! Retail Recommender — command-line front end for the recommendation engine.
//!
//! Loads the similarity and interaction tables named in the configuration,
//! serves one request per invocation and prints the result as JSON.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use retail_core::config::AppConfig;
use retail_feedback::{JsonFeedbackStore, RetryPolicy};
use retail_personalization::loader::{
    load_catalog, load_interaction_table, load_latent_factors, load_similarity_table,
};
use retail_personalization::{
    RecommendationEngine, RecommendationRequest, RecommendationStrategy, SortOrder, Subject,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "retail-recommender")]
#[command(about = "Content-based, collaborative and hybrid product recommendations")]
#[command(version)]
struct Cli {
    /// Configuration file (environment variables take precedence)
    #[arg(long, env = "RETAIL_RECOMMENDER_CONFIG")]
    config: Option<String>,

    /// Feedback document path (overrides config)
    #[arg(long, env = "RETAIL_RECOMMENDER__FEEDBACK__PATH")]
    feedback_path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Items similar to a given item
    Similar {
        #[arg(long)]
        item: String,
        #[arg(long, value_enum, default_value_t = ItemStrategy::Content)]
        strategy: ItemStrategy,
        #[arg(long)]
        top_n: Option<usize>,
        #[arg(long, value_enum, default_value_t = SortArg::Default)]
        sort: SortArg,
    },
    /// Recommendations from a user's interaction history
    ForUser {
        #[arg(long)]
        user: String,
        #[arg(long, value_enum, default_value_t = UserStrategy::Hybrid)]
        strategy: UserStrategy,
        /// Weight of the collaborative side for the hybrid strategy
        #[arg(long)]
        alpha: Option<f64>,
        #[arg(long)]
        top_n: Option<usize>,
        #[arg(long, value_enum, default_value_t = SortArg::Default)]
        sort: SortArg,
    },
    /// Items with the highest total interaction strength
    Trending {
        #[arg(long)]
        top_n: Option<usize>,
    },
    /// Record an approve or reject signal for an item
    Rate {
        #[arg(long)]
        item: String,
        #[arg(long, conflicts_with = "reject", required_unless_present = "reject")]
        approve: bool,
        #[arg(long)]
        reject: bool,
    },
    /// Average approval of an item
    Approval {
        #[arg(long)]
        item: String,
    },
    /// Find items by id or title, optionally by category keyword
    Search {
        #[arg(long, default_value = "")]
        query: String,
        /// Category keyword; repeat to match any of several
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ItemStrategy {
    Content,
    Collaborative,
    Hybrid,
}

impl From<ItemStrategy> for RecommendationStrategy {
    fn from(value: ItemStrategy) -> Self {
        match value {
            ItemStrategy::Content => RecommendationStrategy::ContentBased,
            ItemStrategy::Collaborative => RecommendationStrategy::Collaborative,
            ItemStrategy::Hybrid => RecommendationStrategy::Hybrid,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum UserStrategy {
    Content,
    Collaborative,
    Hybrid,
    Predicted,
}

impl From<UserStrategy> for RecommendationStrategy {
    fn from(value: UserStrategy) -> Self {
        match value {
            UserStrategy::Content => RecommendationStrategy::ContentBased,
            UserStrategy::Collaborative => RecommendationStrategy::Collaborative,
            UserStrategy::Hybrid => RecommendationStrategy::Hybrid,
            UserStrategy::Predicted => RecommendationStrategy::Predicted,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortArg {
    Default,
    Approval,
}

impl From<SortArg> for SortOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Default => SortOrder::Default,
            SortArg::Approval => SortOrder::HighestApproval,
        }
    }
}

#[derive(Serialize)]
struct ApprovalOutput<'a> {
    item_id: &'a str,
    approval: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the JSON result.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "retail_recommender=info,retail_personalization=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;

    if let Some(path) = cli.feedback_path {
        config.feedback.path = path;
    }
    config.validate()?;

    info!(
        content = %config.data.content_similarity_path,
        collaborative = %config.data.collaborative_similarity_path,
        interactions = %config.data.interactions_path,
        hybrid_alpha = config.engine.hybrid_alpha,
        "Configuration loaded"
    );

    let engine = build_engine(&config)?;

    match cli.command {
        Command::Similar {
            item,
            strategy,
            top_n,
            sort,
        } => {
            let mut request = RecommendationRequest::new(
                Subject::Item(item),
                strategy.into(),
                top_n.unwrap_or(config.engine.default_top_n),
            );
            request.sort = sort.into();
            print_json(&engine.recommend(&request)?)?;
        }
        Command::ForUser {
            user,
            strategy,
            alpha,
            top_n,
            sort,
        } => {
            let mut request = RecommendationRequest::new(
                Subject::User(user),
                strategy.into(),
                top_n.unwrap_or(config.engine.default_top_n),
            );
            request.alpha = alpha;
            request.sort = sort.into();
            print_json(&engine.recommend(&request)?)?;
        }
        Command::Trending { top_n } => {
            let request = RecommendationRequest::new(
                Subject::Global,
                RecommendationStrategy::Trending,
                top_n.unwrap_or(config.engine.trending_limit),
            );
            print_json(&engine.recommend(&request)?)?;
        }
        Command::Rate { item, approve, .. } => {
            engine.record_feedback(&item, approve)?;
            print_json(&ApprovalOutput {
                item_id: &item,
                approval: engine.average_approval(&item)?,
            })?;
        }
        Command::Approval { item } => {
            print_json(&ApprovalOutput {
                item_id: &item,
                approval: engine.average_approval(&item)?,
            })?;
        }
        Command::Search {
            query,
            categories,
            limit,
        } => {
            print_json(&engine.search(&query, &categories, limit))?;
        }
    }

    Ok(())
}

/// An explicit config file must load; without one, environment problems
/// fall back to defaults.
fn load_config(path: Option<&str>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => {
            AppConfig::load(Some(path)).with_context(|| format!("loading config file {path}"))
        }
        None => Ok(AppConfig::load(None).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        })),
    }
}

fn build_engine(config: &AppConfig) -> anyhow::Result<RecommendationEngine<String>> {
    let data = &config.data;
    let content = load_similarity_table(&data.content_similarity_path, data.orientation)
        .context("loading content similarity table")?;
    let collaborative = load_similarity_table(&data.collaborative_similarity_path, data.orientation)
        .context("loading collaborative similarity table")?;
    let interactions =
        load_interaction_table(&data.interactions_path).context("loading interaction table")?;

    let feedback = JsonFeedbackStore::open(&config.feedback.path)
        .with_context(|| format!("opening feedback store {}", config.feedback.path))?;

    let mut engine = RecommendationEngine::new(
        Arc::new(content),
        Arc::new(collaborative),
        Arc::new(interactions),
        config.engine.clone(),
    )?
    .with_feedback(
        Arc::new(feedback),
        RetryPolicy::from_config(&config.feedback),
    );

    if let Some(path) = &data.catalog_path {
        let catalog = load_catalog(path, &config.catalog.placeholder_image_url)
            .context("loading item catalog")?;
        engine = engine.with_catalog(Arc::new(catalog));
    }
    if let Some(path) = &data.latent_factors_path {
        let model = load_latent_factors(path).context("loading latent factor model")?;
        engine = engine.with_model(Arc::new(model));
    }

    Ok(engine)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
