//! Gift eligibility rules — relationship-to-category and
//! occasion-to-price-window tables.
//!
//! The tables are plain data so the selector stays free of business
//! literals. Unknown labels never fail: an unknown relationship maps to
//! an empty category set (nothing is eligible) and an unknown occasion
//! maps to an unrestricted window (only the overall budget applies).

use giftwise_core::types::PriceWindow;
use std::collections::HashSet;

/// Categories considered appropriate per recipient relationship.
const RELATIONSHIP_CATEGORIES: &[(&str, &[&str])] = &[
    ("partner", &["Electronics", "Clothing & Jewelry"]),
    ("parent", &["Home & Kitchen", "Electronics"]),
    ("child", &["Toys & Games"]),
    ("friend", &["Electronics", "Home & Kitchen", "Toys & Games"]),
    ("colleague", &["Home & Kitchen"]),
];

/// Customary spend bands per gifting occasion, in euros.
const OCCASION_WINDOWS: &[(&str, f64, f64)] = &[
    ("birthday", 20.0, 100.0),
    ("christmas", 30.0, 150.0),
    ("anniversary", 60.0, 300.0),
    ("housewarming", 20.0, 80.0),
    ("thank_you", 10.0, 40.0),
];

/// Allowed product categories for a relationship label.
pub fn categories_for(relationship: &str) -> HashSet<String> {
    RELATIONSHIP_CATEGORIES
        .iter()
        .find(|(label, _)| *label == relationship)
        .map(|(_, categories)| categories.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default()
}

/// Inclusive price window for an occasion label.
pub fn price_window_for(occasion: &str) -> PriceWindow {
    OCCASION_WINDOWS
        .iter()
        .find(|(label, _, _)| *label == occasion)
        .map(|&(_, min, max)| PriceWindow { min, max })
        .unwrap_or_else(PriceWindow::unrestricted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_relationships_map_to_their_categories() {
        let partner = categories_for("partner");
        assert_eq!(partner.len(), 2);
        assert!(partner.contains("Electronics"));
        assert!(partner.contains("Clothing & Jewelry"));

        let child = categories_for("child");
        assert_eq!(child.len(), 1);
        assert!(child.contains("Toys & Games"));
    }

    #[test]
    fn test_unknown_relationship_yields_empty_set() {
        assert!(categories_for("acquaintance").is_empty());
        // Lookup is case-sensitive; labels arrive pre-normalized.
        assert!(categories_for("Partner").is_empty());
    }

    #[test]
    fn test_known_occasions_map_to_their_windows() {
        let birthday = price_window_for("birthday");
        assert_eq!(birthday.min, 20.0);
        assert_eq!(birthday.max, 100.0);

        let anniversary = price_window_for("anniversary");
        assert_eq!(anniversary.min, 60.0);
        assert_eq!(anniversary.max, 300.0);
    }

    #[test]
    fn test_unknown_occasion_yields_unrestricted_window() {
        let window = price_window_for("graduation");
        assert_eq!(window.min, 0.0);
        assert!(window.contains(9999.0));
    }
}
