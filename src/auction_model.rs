//! Two-stage linear model that learns to approximate the second-price mechanism.
//!
//! The allocation layer maps user features to a bidder-feature sized hidden vector and the
//! payment layer maps that to an auctioneer-feature sized output, read as `[allocation, payment]`.
//! Training is online: one example per bidder, with the layers updated after every bidder.

use ndarray::{arr1, Array1};
use rand::Rng;

use crate::auction::{second_price_auction, AuctionOutcome};
use crate::config::ModelConfig;
use crate::entities::{AuctioneerPreferences, BidderPreferences, Population, UserPreferences};
use crate::errors::SimulationError;
use crate::features::Features;
use crate::linear_layer::LinearLayer;
use crate::logger::{LogEvent, Logger};
use crate::logln;

/// Position of the payment component in the model output
const PAYMENT_COMPONENT: usize = 1;

/// Lifecycle of the model, `predict` is only defined once trained
#[derive(Debug, Clone, PartialEq)]
pub enum ModelState {
    Untrained,
    /// Holds the ground truth of the latest training round
    Trained { outcome: AuctionOutcome },
}

/// Output of `AuctionModel::predict`
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub winner: usize,
    /// One-hot, 1.0 at the predicted winner
    pub allocation: Vec<f64>,
    /// Predicted payment at the winner, zero elsewhere
    pub payment: Vec<f64>,
    /// `1 - error_i / sum(errors)` per bidder. Not a distribution: it sums to `n - 1`.
    pub item_probability: Vec<f64>,
    /// Absolute difference between each bidder's valuation and the predicted payment
    pub errors: Vec<f64>,
}

/// Index of the first occurrence of the minimum value
fn first_min_index(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if value >= best_value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

pub struct AuctionModel<'a> {
    population: &'a Population,
    pub allocation_layer: LinearLayer,
    pub payment_layer: LinearLayer,
    state: ModelState,
}

impl<'a> AuctionModel<'a> {
    /// Create an untrained model; allocation weights are drawn before payment weights
    pub fn new<R: Rng + ?Sized>(population: &'a Population, config: &ModelConfig, rng: &mut R, logger: &mut Logger) -> Result<Self, SimulationError> {
        let allocation_layer = LinearLayer::new(
            "allocation",
            UserPreferences::schema().len(),
            BidderPreferences::schema().len(),
            config,
            rng,
        );
        let payment_layer = LinearLayer::new(
            "payment",
            BidderPreferences::schema().len(),
            AuctioneerPreferences::schema().len(),
            config,
            rng,
        );
        logln!(logger, LogEvent::Training, "Initial weights allocation:\n{:.4}", allocation_layer.weights);
        logln!(logger, LogEvent::Training, "Initial weights payment:\n{:.4}", payment_layer.weights);
        Self::with_layers(population, allocation_layer, payment_layer)
    }

    /// Create an untrained model from prepared layers
    pub fn with_layers(population: &'a Population, allocation_layer: LinearLayer, payment_layer: LinearLayer) -> Result<Self, SimulationError> {
        population.lead_user()?;
        population.lead_auctioneer()?;
        if population.bidders.is_empty() {
            return Err(SimulationError::InsufficientPopulation { kind: "bidder" });
        }
        Ok(Self {
            population,
            allocation_layer,
            payment_layer,
            state: ModelState::Untrained,
        })
    }

    /// Forward user features through both layers
    fn forward(&self, user_features: &[f64]) -> Result<Array1<f64>, SimulationError> {
        let hidden = self.allocation_layer.forward(user_features)?;
        self.payment_layer.forward(&hidden.to_vec())
    }

    /// One training pass.
    ///
    /// Runs the auction once for ground truth, then for each bidder in order fits the shared
    /// user-0 features to `[allocation[i], payment[i]]` under squared error. Later bidders see the
    /// weights already updated by earlier ones.
    pub fn train<R: Rng + ?Sized>(&mut self, rng: &mut R, logger: &mut Logger) -> Result<AuctionOutcome, SimulationError> {
        let outcome = second_price_auction(&self.population.bidders, &self.population.auctioneers, rng, logger)?;
        let user_features = self.population.lead_user()?.preferences.to_vector();

        for bidder_id in 0..self.population.bidders.len() {
            let hidden = self.allocation_layer.forward(&user_features)?.to_vec();
            let predicted = self.payment_layer.forward(&hidden)?;

            let target = arr1(&[outcome.allocation[bidder_id], outcome.payment[bidder_id]]);
            let error = &predicted - &target;
            let grad_output = &error * 2.0;

            let grad_hidden = self.payment_layer.backward(&hidden, &grad_output.to_vec())?;
            self.allocation_layer.backward(&user_features, &grad_hidden.into_raw_vec())?;

            if logger.is_enabled(LogEvent::Training) {
                let loss: f64 = error.iter().map(|e| e * e).sum();
                logln!(logger, LogEvent::Training, "bidder {} loss {:.6}", bidder_id, loss);
            }
        }

        self.state = ModelState::Trained {
            outcome: outcome.clone(),
        };
        Ok(outcome)
    }

    /// Predict the winner, its payment and per-bidder win scores.
    ///
    /// The winner is the bidder whose valuation from the last training round is closest to the
    /// predicted payment. Its payment comes from a second forward pass, which equals the first
    /// one since neither weights nor input change in between.
    pub fn predict(&self) -> Result<Prediction, SimulationError> {
        let outcome = match &self.state {
            ModelState::Untrained => {
                return Err(SimulationError::InvalidState("predict called before train".to_string()));
            }
            ModelState::Trained { outcome } => outcome,
        };
        let user_features = self.population.lead_user()?.preferences.to_vector();

        let mut errors = Vec::with_capacity(outcome.valuations.len());
        for &valuation in &outcome.valuations {
            let predicted = self.forward(&user_features)?;
            errors.push((valuation - predicted[PAYMENT_COMPONENT]).abs());
        }

        let winner = first_min_index(&errors).ok_or(SimulationError::InsufficientPopulation { kind: "bidder" })?;
        let mut allocation = vec![0.0; errors.len()];
        allocation[winner] = 1.0;

        let predicted = self.forward(&user_features)?;
        let mut payment = vec![0.0; errors.len()];
        payment[winner] = predicted[PAYMENT_COMPONENT];

        // all-zero errors would divide 0 by 0, every bidder is then a perfect match
        let total_error: f64 = errors.iter().sum();
        let item_probability = errors
            .iter()
            .map(|&error| {
                let normalized = if total_error == 0.0 { 0.0 } else { error / total_error };
                1.0 - normalized
            })
            .collect();

        Ok(Prediction {
            winner,
            allocation,
            payment,
            item_probability,
            errors,
        })
    }
}
