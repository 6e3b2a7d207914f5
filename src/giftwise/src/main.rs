//! GiftWise — personalized gift recommendations from sparse ratings.
//!
//! Trains a biased matrix factorization model over user-product ratings,
//! then ranks catalog products for a gifting scenario under relationship,
//! occasion, and budget rules.

mod dataset;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use giftwise_core::config::AppConfig;
use giftwise_core::types::{Product, ScoredProduct};
use giftwise_factor::FactorModel;
use giftwise_personalization::{SelectionCriteria, TopNSelector};
use std::path::Path;
use tracing::info;

#[derive(Parser)]
#[command(name = "giftwise")]
#[command(about = "Personalized gift recommendations from user-product ratings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend gifts for a single scenario
    Recommend(RecommendArgs),

    /// Replay the five reference gifting scenarios
    Demo(DemoArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Ratings CSV path (user_idx,product_idx,rating; overrides config)
    #[arg(long, env = "GIFTWISE__DATA__RATINGS_PATH")]
    ratings: Option<String>,

    /// Products CSV path (product_id,title,category,price; overrides config)
    #[arg(long, env = "GIFTWISE__DATA__PRODUCTS_PATH")]
    products: Option<String>,

    /// Training epochs (overrides config)
    #[arg(long, env = "GIFTWISE__MODEL__EPOCHS")]
    epochs: Option<usize>,

    /// Latent factor count (overrides config)
    #[arg(long, env = "GIFTWISE__MODEL__NUM_FACTORS")]
    factors: Option<usize>,

    /// Seed for reproducible factor initialization
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct RecommendArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Recipient's user index in the ratings data
    #[arg(long, default_value_t = 0)]
    user: usize,

    /// Relationship to the recipient (partner, parent, child, friend, colleague)
    #[arg(long)]
    relationship: String,

    /// Gifting occasion (birthday, christmas, anniversary, housewarming, thank_you)
    #[arg(long)]
    occasion: String,

    /// Budget ceiling in euros
    #[arg(long)]
    budget: f64,

    /// Maximum recommendations to return (overrides config)
    #[arg(long)]
    top_n: Option<usize>,

    /// Maximum picks sharing one category (overrides config)
    #[arg(long)]
    max_per_category: Option<usize>,

    /// Emit the picks as JSON instead of the text report
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args)]
struct DemoArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Recipient user index used for every scenario
    #[arg(long, default_value_t = 0)]
    user: usize,
}

/// Reference scenarios: relationship, occasion, budget.
const DEMO_SCENARIOS: &[(&str, &str, f64)] = &[
    ("partner", "anniversary", 250.0),
    ("child", "birthday", 50.0),
    ("colleague", "thank_you", 30.0),
    ("friend", "birthday", 80.0),
    ("parent", "christmas", 120.0),
];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "giftwise=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    match cli.command {
        Commands::Recommend(args) => cmd_recommend(config, args),
        Commands::Demo(args) => cmd_demo(config, args),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_recommend(mut config: AppConfig, args: RecommendArgs) -> Result<()> {
    apply_common_overrides(&mut config, &args.common);
    if let Some(top_n) = args.top_n {
        config.selection.top_n = top_n;
    }
    if let Some(cap) = args.max_per_category {
        config.selection.max_per_category = cap;
    }

    let (model, catalog) = build_model(&config)?;
    let criteria = SelectionCriteria::for_gift(
        &args.relationship,
        &args.occasion,
        args.budget,
        &config.selection,
    );
    let picks = TopNSelector::new(&model).select(args.user, &criteria, &catalog)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&picks)?);
    } else {
        print_scenario_report(&args.relationship, &args.occasion, args.budget, &picks);
    }
    Ok(())
}

fn cmd_demo(mut config: AppConfig, args: DemoArgs) -> Result<()> {
    apply_common_overrides(&mut config, &args.common);

    let (model, catalog) = build_model(&config)?;
    let selector = TopNSelector::new(&model);

    for &(relationship, occasion, budget) in DEMO_SCENARIOS {
        let criteria =
            SelectionCriteria::for_gift(relationship, occasion, budget, &config.selection);
        let picks = selector.select(args.user, &criteria, &catalog)?;
        print_scenario_report(relationship, occasion, budget, &picks);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pipeline helpers
// ---------------------------------------------------------------------------

fn apply_common_overrides(config: &mut AppConfig, common: &CommonArgs) {
    if let Some(path) = &common.ratings {
        config.data.ratings_path = path.clone();
    }
    if let Some(path) = &common.products {
        config.data.products_path = path.clone();
    }
    if let Some(epochs) = common.epochs {
        config.model.epochs = epochs;
    }
    if let Some(factors) = common.factors {
        config.model.num_factors = factors;
    }
    if common.seed.is_some() {
        config.model.seed = common.seed;
    }
}

/// Load both CSV files and train the model on the full ratings set.
fn build_model(config: &AppConfig) -> Result<(FactorModel, Vec<Product>)> {
    let (observations, num_users, num_items) =
        dataset::load_ratings(Path::new(&config.data.ratings_path))?;
    let catalog = dataset::load_products(Path::new(&config.data.products_path))?;

    let mut model = FactorModel::new(num_users, num_items, &config.model)?;
    model.train(&observations, config.model.epochs)?;
    let mae = model.evaluate(&observations)?;
    info!(mae, "model trained");

    Ok((model, catalog))
}

fn print_scenario_report(
    relationship: &str,
    occasion: &str,
    budget: f64,
    picks: &[ScoredProduct],
) {
    println!();
    println!("Scenario: {relationship} | {occasion} | budget €{budget}");
    if picks.is_empty() {
        println!("  (no eligible gifts)");
        return;
    }
    for pick in picks {
        println!(
            "  {} ({}) | €{} | score {:.2}",
            pick.product.title, pick.product.category, pick.product.price, pick.score
        );
    }
}
