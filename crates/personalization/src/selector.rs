//! Constrained top-N gift selection.
//!
//! The selector filters a product catalog down to gift-appropriate
//! candidates, scores the survivors with the factor model, and walks the
//! ranking greedily while capping how many picks may share a category.

use giftwise_core::config::SelectionConfig;
use giftwise_core::error::GiftwiseResult;
use giftwise_core::types::{PriceWindow, Product, ScoredProduct};
use giftwise_factor::FactorModel;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::rules;

/// Business constraints for one selection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionCriteria {
    /// Product categories the recipient may receive. Case-sensitive;
    /// an empty set makes every product ineligible.
    pub allowed_categories: HashSet<String>,
    /// Inclusive price band for the occasion.
    pub price_window: PriceWindow,
    /// Hard ceiling on what the giver will spend.
    pub max_budget: f64,
    /// Maximum number of recommendations returned.
    pub top_n: usize,
    /// Maximum results allowed to share one category.
    pub max_per_category: usize,
}

impl SelectionCriteria {
    /// Compose criteria from the rule tables for a gifting scenario.
    pub fn for_gift(
        relationship: &str,
        occasion: &str,
        max_budget: f64,
        selection: &SelectionConfig,
    ) -> Self {
        Self {
            allowed_categories: rules::categories_for(relationship),
            price_window: rules::price_window_for(occasion),
            max_budget,
            top_n: selection.top_n,
            max_per_category: selection.max_per_category,
        }
    }
}

/// Ranks eligible catalog products by predicted affinity.
pub struct TopNSelector<'a> {
    model: &'a FactorModel,
}

impl<'a> TopNSelector<'a> {
    pub fn new(model: &'a FactorModel) -> Self {
        Self { model }
    }

    /// Select up to `criteria.top_n` gifts for `user`.
    ///
    /// Candidates must be in an allowed category, cost no more than the
    /// budget, and fall inside the price window. Products whose titles
    /// collide case-insensitively are deduplicated, first catalog
    /// occurrence wins. Survivors are ranked by predicted score, ties
    /// keeping catalog order, then admitted greedily while their category
    /// stays under `criteria.max_per_category`.
    pub fn select(
        &self,
        user: usize,
        criteria: &SelectionCriteria,
        catalog: &[Product],
    ) -> GiftwiseResult<Vec<ScoredProduct>> {
        let mut seen_titles: HashSet<String> = HashSet::new();
        let mut scored: Vec<ScoredProduct> = Vec::new();

        for product in catalog {
            if !criteria.allowed_categories.contains(&product.category) {
                continue;
            }
            if product.price > criteria.max_budget {
                continue;
            }
            if !criteria.price_window.contains(product.price) {
                continue;
            }
            if !seen_titles.insert(product.title.to_lowercase()) {
                continue;
            }
            let score = self.model.predict(user, product.index)?;
            scored.push(ScoredProduct {
                product: product.clone(),
                score,
            });
        }

        debug!(
            user,
            catalog = catalog.len(),
            eligible = scored.len(),
            "catalog filtered"
        );

        // Stable sort keeps catalog order for equal scores.
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut category_counts: HashMap<String, usize> = HashMap::new();
        let mut picks: Vec<ScoredProduct> = Vec::new();
        for candidate in scored {
            if picks.len() >= criteria.top_n {
                break;
            }
            let count = category_counts
                .entry(candidate.product.category.clone())
                .or_insert(0);
            if *count >= criteria.max_per_category {
                continue;
            }
            *count += 1;
            picks.push(candidate);
        }

        Ok(picks)
    }
}
