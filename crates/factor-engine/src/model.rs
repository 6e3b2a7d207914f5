//! Biased matrix factorization trained with stochastic gradient descent.
//!
//! The model decomposes the sparse user-product rating matrix into dense
//! latent factor matrices plus per-user and per-item bias terms around a
//! global mean. A predicted rating is
//!
//! ```text
//! r̂(u, i) = μ + b_u + b_i + p_u · q_i
//! ```
//!
//! Training runs plain SGD over the observations, one rating at a time.
//! All learned state lives in this struct; nothing is persisted to disk.

use giftwise_core::config::ModelConfig;
use giftwise_core::error::{GiftwiseError, GiftwiseResult, IndexAxis};
use giftwise_core::types::RatingObservation;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// A latent-factor rating model with user and item biases.
///
/// Construction fixes the dimensions; `train` refines the parameters in
/// place and may be called repeatedly with new observation batches.
pub struct FactorModel {
    num_users: usize,
    num_items: usize,
    num_factors: usize,
    user_factors: Array2<f64>,
    item_factors: Array2<f64>,
    user_bias: Vec<f64>,
    item_bias: Vec<f64>,
    global_mean: f64,
    learning_rate: f64,
    regularization: f64,
    shuffle: bool,
    rng: StdRng,
}

impl FactorModel {
    /// Build an untrained model for the given entity counts.
    ///
    /// Factor entries are drawn uniformly from `[0, 0.1)`; biases and the
    /// global mean start at zero, so an untrained model predicts only the
    /// small random factor dot product. With `config.seed` set the
    /// initialization is reproducible run to run; unset, each model draws
    /// a fresh entropy seed.
    pub fn new(num_users: usize, num_items: usize, config: &ModelConfig) -> GiftwiseResult<Self> {
        if num_users == 0 || num_items == 0 {
            return Err(GiftwiseError::Config(format!(
                "model needs at least one user and one item (got {} users, {} items)",
                num_users, num_items
            )));
        }
        if config.num_factors == 0 {
            return Err(GiftwiseError::Config(
                "num_factors must be at least 1".to_string(),
            ));
        }
        if !(config.learning_rate > 0.0) {
            return Err(GiftwiseError::Config(format!(
                "learning_rate must be positive (got {})",
                config.learning_rate
            )));
        }
        if !(config.regularization >= 0.0) {
            return Err(GiftwiseError::Config(format!(
                "regularization must be non-negative (got {})",
                config.regularization
            )));
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let num_factors = config.num_factors;
        let user_factors =
            Array2::from_shape_fn((num_users, num_factors), |_| rng.gen::<f64>() * 0.1);
        let item_factors =
            Array2::from_shape_fn((num_items, num_factors), |_| rng.gen::<f64>() * 0.1);

        info!(num_users, num_items, num_factors, "factor model initialized");

        Ok(Self {
            num_users,
            num_items,
            num_factors,
            user_factors,
            item_factors,
            user_bias: vec![0.0; num_users],
            item_bias: vec![0.0; num_items],
            global_mean: 0.0,
            learning_rate: config.learning_rate,
            regularization: config.regularization,
            shuffle: config.shuffle,
            rng,
        })
    }

    /// Run `epochs` SGD passes over `observations`.
    ///
    /// The global mean is recomputed once per call from this batch, then
    /// every epoch visits each observation and nudges the two bias terms
    /// and the two factor rows involved. Observations are processed in
    /// input order unless the model was configured to shuffle per epoch.
    ///
    /// All indices are validated before any parameter is touched, so a
    /// failed call leaves the model exactly as it was.
    pub fn train(
        &mut self,
        observations: &[RatingObservation],
        epochs: usize,
    ) -> GiftwiseResult<()> {
        if observations.is_empty() {
            return Err(GiftwiseError::EmptyTrainingSet);
        }
        for obs in observations {
            self.check_bounds(obs.user, obs.item)?;
        }

        let total: f64 = observations.iter().map(|o| o.rating).sum();
        self.global_mean = total / observations.len() as f64;

        info!(
            observations = observations.len(),
            epochs,
            global_mean = self.global_mean,
            "training started"
        );

        let mut order: Vec<usize> = (0..observations.len()).collect();

        for epoch in 0..epochs {
            if self.shuffle {
                order.shuffle(&mut self.rng);
            }

            let mut sse = 0.0;
            for &k in &order {
                let RatingObservation { user, item, rating } = observations[k];
                let error = rating - self.score(user, item);
                sse += error * error;

                // Biases update from their pre-step values.
                let bu = self.user_bias[user];
                let bi = self.item_bias[item];
                self.user_bias[user] = bu + self.learning_rate * (error - self.regularization * bu);
                self.item_bias[item] = bi + self.learning_rate * (error - self.regularization * bi);

                // Paired factor step: snapshot both rows first so each
                // gradient sees the other side's pre-step value.
                for f in 0..self.num_factors {
                    let pu = self.user_factors[[user, f]];
                    let qi = self.item_factors[[item, f]];
                    self.user_factors[[user, f]] =
                        pu + self.learning_rate * (error * qi - self.regularization * pu);
                    self.item_factors[[item, f]] =
                        qi + self.learning_rate * (error * pu - self.regularization * qi);
                }
            }

            let rmse = (sse / observations.len() as f64).sqrt();
            debug!(epoch = epoch + 1, rmse, "epoch complete");
        }

        info!(epochs, "training complete");
        Ok(())
    }

    /// Predicted rating for a user-item pair.
    ///
    /// The output is on the training rating scale but is not clamped;
    /// callers only compare scores, so out-of-scale values are harmless.
    pub fn predict(&self, user: usize, item: usize) -> GiftwiseResult<f64> {
        self.check_bounds(user, item)?;
        Ok(self.score(user, item))
    }

    /// Mean absolute error of the current parameters over `observations`.
    pub fn evaluate(&self, observations: &[RatingObservation]) -> GiftwiseResult<f64> {
        if observations.is_empty() {
            return Err(GiftwiseError::EmptyTrainingSet);
        }
        let mut total = 0.0;
        for obs in observations {
            self.check_bounds(obs.user, obs.item)?;
            total += (obs.rating - self.score(obs.user, obs.item)).abs();
        }
        Ok(total / observations.len() as f64)
    }

    pub fn num_users(&self) -> usize {
        self.num_users
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }

    pub fn num_factors(&self) -> usize {
        self.num_factors
    }

    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    fn score(&self, user: usize, item: usize) -> f64 {
        let dot = self.user_factors.row(user).dot(&self.item_factors.row(item));
        self.global_mean + self.user_bias[user] + self.item_bias[item] + dot
    }

    fn check_bounds(&self, user: usize, item: usize) -> GiftwiseResult<()> {
        if user >= self.num_users {
            return Err(GiftwiseError::IndexOutOfRange {
                axis: IndexAxis::User,
                index: user,
                bound: self.num_users,
            });
        }
        if item >= self.num_items {
            return Err(GiftwiseError::IndexOutOfRange {
                axis: IndexAxis::Item,
                index: item,
                bound: self.num_items,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_config() -> ModelConfig {
        ModelConfig {
            num_factors: 4,
            seed: Some(42),
            ..ModelConfig::default()
        }
    }

    fn sample_ratings() -> Vec<RatingObservation> {
        vec![
            RatingObservation { user: 0, item: 0, rating: 5.0 },
            RatingObservation { user: 1, item: 1, rating: 3.0 },
            RatingObservation { user: 2, item: 2, rating: 4.0 },
            RatingObservation { user: 0, item: 1, rating: 2.0 },
            RatingObservation { user: 1, item: 0, rating: 1.0 },
        ]
    }

    #[test]
    fn test_new_initializes_factors_in_range_and_biases_at_zero() {
        let model = FactorModel::new(3, 3, &seeded_config()).unwrap();
        for &value in model.user_factors.iter().chain(model.item_factors.iter()) {
            assert!((0.0..0.1).contains(&value), "factor {value} out of range");
        }
        assert!(model.user_bias.iter().all(|&b| b == 0.0));
        assert!(model.item_bias.iter().all(|&b| b == 0.0));
        assert_eq!(model.global_mean(), 0.0);
    }

    #[test]
    fn test_new_rejects_degenerate_dimensions() {
        assert!(matches!(
            FactorModel::new(0, 3, &seeded_config()),
            Err(GiftwiseError::Config(_))
        ));
        assert!(matches!(
            FactorModel::new(3, 0, &seeded_config()),
            Err(GiftwiseError::Config(_))
        ));
    }

    #[test]
    fn test_new_rejects_bad_hyperparameters() {
        let mut config = seeded_config();
        config.num_factors = 0;
        assert!(FactorModel::new(3, 3, &config).is_err());

        let mut config = seeded_config();
        config.learning_rate = 0.0;
        assert!(FactorModel::new(3, 3, &config).is_err());

        let mut config = seeded_config();
        config.regularization = -0.5;
        assert!(FactorModel::new(3, 3, &config).is_err());
    }

    #[test]
    fn test_same_seed_same_data_same_predictions() {
        let ratings = sample_ratings();
        let mut a = FactorModel::new(3, 3, &seeded_config()).unwrap();
        let mut b = FactorModel::new(3, 3, &seeded_config()).unwrap();
        a.train(&ratings, 50).unwrap();
        b.train(&ratings, 50).unwrap();

        for user in 0..3 {
            for item in 0..3 {
                assert_eq!(
                    a.predict(user, item).unwrap(),
                    b.predict(user, item).unwrap(),
                    "prediction diverged at ({user}, {item})"
                );
            }
        }
    }

    #[test]
    fn test_shuffled_training_is_reproducible_under_a_seed() {
        let ratings = sample_ratings();
        let config = ModelConfig {
            num_factors: 4,
            seed: Some(7),
            shuffle: true,
            ..ModelConfig::default()
        };
        let mut a = FactorModel::new(3, 3, &config).unwrap();
        let mut b = FactorModel::new(3, 3, &config).unwrap();
        a.train(&ratings, 30).unwrap();
        b.train(&ratings, 30).unwrap();

        assert_eq!(a.predict(0, 2).unwrap(), b.predict(0, 2).unwrap());
        assert_eq!(a.predict(2, 0).unwrap(), b.predict(2, 0).unwrap());
    }

    #[test]
    fn test_training_reduces_mean_absolute_error() {
        let ratings = sample_ratings();
        let mut model = FactorModel::new(3, 3, &seeded_config()).unwrap();
        let before = model.evaluate(&ratings).unwrap();
        model.train(&ratings, 200).unwrap();
        let after = model.evaluate(&ratings).unwrap();
        assert!(
            after < before,
            "MAE did not improve: before {before}, after {after}"
        );
    }

    #[test]
    fn test_global_mean_recomputed_each_train_call() {
        let mut model = FactorModel::new(3, 3, &seeded_config()).unwrap();
        model.train(&sample_ratings(), 1).unwrap();
        assert_eq!(model.global_mean(), 3.0);

        let second_batch = vec![RatingObservation { user: 2, item: 2, rating: 2.0 }];
        model.train(&second_batch, 1).unwrap();
        assert_eq!(model.global_mean(), 2.0);
    }

    #[test]
    fn test_empty_training_set_is_an_error() {
        let mut model = FactorModel::new(3, 3, &seeded_config()).unwrap();
        assert!(matches!(
            model.train(&[], 10),
            Err(GiftwiseError::EmptyTrainingSet)
        ));
        assert!(matches!(
            model.evaluate(&[]),
            Err(GiftwiseError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn test_predict_rejects_out_of_range_indices() {
        let model = FactorModel::new(3, 4, &seeded_config()).unwrap();
        assert!(matches!(
            model.predict(3, 0),
            Err(GiftwiseError::IndexOutOfRange { axis: IndexAxis::User, index: 3, bound: 3 })
        ));
        assert!(matches!(
            model.predict(0, 4),
            Err(GiftwiseError::IndexOutOfRange { axis: IndexAxis::Item, index: 4, bound: 4 })
        ));
        assert!(model.predict(2, 3).is_ok());
    }

    #[test]
    fn test_train_validates_before_mutating() {
        let mut model = FactorModel::new(3, 3, &seeded_config()).unwrap();
        let untouched = model.predict(0, 0).unwrap();

        let bad_batch = vec![
            RatingObservation { user: 0, item: 0, rating: 5.0 },
            RatingObservation { user: 9, item: 0, rating: 4.0 },
        ];
        assert!(matches!(
            model.train(&bad_batch, 5),
            Err(GiftwiseError::IndexOutOfRange { axis: IndexAxis::User, .. })
        ));

        assert_eq!(model.predict(0, 0).unwrap(), untouched);
        assert_eq!(model.global_mean(), 0.0);
    }

    #[test]
    fn test_prediction_combines_mean_biases_and_factors() {
        let ratings = vec![
            RatingObservation { user: 0, item: 0, rating: 5.0 },
            RatingObservation { user: 1, item: 1, rating: 1.0 },
        ];
        let mut model = FactorModel::new(2, 2, &seeded_config()).unwrap();
        model.train(&ratings, 200).unwrap();

        // After convergence the fitted pairs should sit near their targets
        // and on opposite sides of the 3.0 global mean.
        let high = model.predict(0, 0).unwrap();
        let low = model.predict(1, 1).unwrap();
        assert!(high > 4.0, "fitted high rating too low: {high}");
        assert!(low < 2.0, "fitted low rating too high: {low}");
    }
}
