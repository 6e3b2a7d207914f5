use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `GIFTWISE__`; command-line flags override fields.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub data: DataConfig,
}

/// Hyperparameters for the matrix factorization model.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_num_factors")]
    pub num_factors: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_regularization")]
    pub regularization: f64,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    /// Seed for factor initialization. Unset means fresh entropy per run.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Re-shuffle the observation order at the start of every epoch.
    #[serde(default)]
    pub shuffle: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_max_per_category")]
    pub max_per_category: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_ratings_path")]
    pub ratings_path: String,
    #[serde(default = "default_products_path")]
    pub products_path: String,
}

// Default functions
fn default_num_factors() -> usize {
    10
}
fn default_learning_rate() -> f64 {
    0.01
}
fn default_regularization() -> f64 {
    0.02
}
fn default_epochs() -> usize {
    20
}
fn default_top_n() -> usize {
    5
}
fn default_max_per_category() -> usize {
    2
}
fn default_ratings_path() -> String {
    "data/ratings.csv".to_string()
}
fn default_products_path() -> String {
    "data/products.csv".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            num_factors: default_num_factors(),
            learning_rate: default_learning_rate(),
            regularization: default_regularization(),
            epochs: default_epochs(),
            seed: None,
            shuffle: false,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            max_per_category: default_max_per_category(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            ratings_path: default_ratings_path(),
            products_path: default_products_path(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            selection: SelectionConfig::default(),
            data: DataConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("GIFTWISE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
