//! CSV ingestion for ratings and the product catalog.
//!
//! `ratings.csv` carries `user_idx,product_idx,rating` rows with dense
//! zero-based indices produced by the data preparation step.
//! `products.csv` carries `product_id,title,category,price`; the loader
//! assigns each row its dense item index in file order, so the catalog
//! must cover the same item space the ratings were indexed against.

use anyhow::{Context, Result};
use giftwise_core::types::{Product, RatingObservation};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct RatingRecord {
    user_idx: usize,
    product_idx: usize,
    rating: f64,
}

/// Load rating observations plus the exclusive user and item index bounds
/// (`max index + 1`) the model needs at construction.
pub fn load_ratings(path: &Path) -> Result<(Vec<RatingObservation>, usize, usize)> {
    let file = File::open(path)
        .with_context(|| format!("opening ratings file {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut observations = Vec::new();
    let mut num_users = 0;
    let mut num_items = 0;

    for (row, record) in reader.deserialize().enumerate() {
        let record: RatingRecord =
            record.with_context(|| format!("parsing ratings row {}", row + 1))?;
        num_users = num_users.max(record.user_idx + 1);
        num_items = num_items.max(record.product_idx + 1);
        observations.push(RatingObservation {
            user: record.user_idx,
            item: record.product_idx,
            rating: record.rating,
        });
    }

    info!(
        observations = observations.len(),
        num_users,
        num_items,
        path = %path.display(),
        "ratings loaded"
    );
    Ok((observations, num_users, num_items))
}

/// Load the product catalog, assigning dense indices in file order.
///
/// Rows with fewer than four fields are skipped rather than rejected; the
/// upstream export occasionally emits ragged rows. A price that fails to
/// parse is still an error.
pub fn load_products(path: &Path) -> Result<Vec<Product>> {
    let file = File::open(path)
        .with_context(|| format!("opening products file {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let mut products = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("reading products row {}", row + 1))?;
        if record.len() < 4 {
            continue;
        }
        let price: f64 = record[3].trim().parse().with_context(|| {
            format!("parsing price {:?} at products row {}", &record[3], row + 1)
        })?;
        products.push(Product {
            index: products.len(),
            id: record[0].to_string(),
            title: record[1].to_string(),
            category: record[2].to_string(),
            price,
        });
    }

    info!(products = products.len(), path = %path.display(), "catalog loaded");
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_ratings_computes_index_bounds() {
        let file = write_temp("user_idx,product_idx,rating\n0,0,5.0\n2,4,3.5\n1,1,2.0\n");
        let (observations, num_users, num_items) = load_ratings(file.path()).unwrap();
        assert_eq!(observations.len(), 3);
        assert_eq!(num_users, 3);
        assert_eq!(num_items, 5);
        assert_eq!(observations[1].rating, 3.5);
    }

    #[test]
    fn test_load_ratings_rejects_malformed_rows() {
        let file = write_temp("user_idx,product_idx,rating\n0,0,not_a_number\n");
        assert!(load_ratings(file.path()).is_err());
    }

    #[test]
    fn test_load_products_assigns_dense_indices_and_skips_short_rows() {
        let file = write_temp(
            "product_id,title,category,price\n\
             B001,\"Mug, Blue\",Home & Kitchen,12.5\n\
             oops\n\
             B002,Lego Set,Toys & Games,45.0\n",
        );
        let products = load_products(file.path()).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].index, 0);
        assert_eq!(products[0].title, "Mug, Blue");
        assert_eq!(products[0].price, 12.5);
        assert_eq!(products[1].index, 1);
        assert_eq!(products[1].id, "B002");
    }

    #[test]
    fn test_load_products_rejects_unparseable_price() {
        let file = write_temp("product_id,title,category,price\nB001,Mug,Home & Kitchen,cheap\n");
        assert!(load_products(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_ratings(Path::new("/nonexistent/ratings.csv")).is_err());
        assert!(load_products(Path::new("/nonexistent/products.csv")).is_err());
    }
}
