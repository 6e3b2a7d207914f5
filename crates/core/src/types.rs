use serde::{Deserialize, Serialize};

/// One explicit rating: a user's score for a product.
///
/// Both indices are dense and zero-based, assigned by the data preparation
/// step. The engine never sees raw user or product identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingObservation {
    pub user: usize,
    pub item: usize,
    pub rating: f64,
}

/// A catalog product eligible for recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Dense item index used to query the factor model, assigned in
    /// catalog file order.
    pub index: usize,
    pub id: String,
    pub title: String,
    pub category: String,
    pub price: f64,
}

/// A product paired with its predicted affinity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProduct {
    pub product: Product,
    pub score: f64,
}

/// Inclusive price bounds attached to a gifting occasion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceWindow {
    pub min: f64,
    pub max: f64,
}

impl PriceWindow {
    /// A window that accepts any price.
    pub fn unrestricted() -> Self {
        Self {
            min: 0.0,
            max: f64::INFINITY,
        }
    }

    /// Whether `price` falls inside the window, both bounds inclusive.
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}
