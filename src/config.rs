//! Configuration for the simulation.
//!
//! All values are plain data, built once and passed by reference. Entities copy the
//! numbers they need at construction so nothing is shared between them afterwards.

/// Parameters of the Entity Generator
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Bidder budget ceiling, also the upper bound of the sampled bid
    pub max_budget: f64,
    pub auction_participate_cost: f64,
    pub auction_host_cost: f64,
    /// Shape parameters (alpha, beta) of the privacy threshold Beta distribution
    pub privacy_alpha: f64,
    pub privacy_beta: f64,
    /// Valuation a bidder carries before any auction has run
    pub unset_valuation: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_budget: 1.0,
            auction_participate_cost: 0.05,
            auction_host_cost: 0.05,
            privacy_alpha: 3.0,
            privacy_beta: 2.0,
            unset_valuation: 0.0,
        }
    }
}

/// Hyperparameters shared by both layers of the auction model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub learning_rate: f64,
    pub regularization_rate: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            regularization_rate: 0.1,
        }
    }
}

/// Configuration of the driving loop
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Scenario descriptor in the `<n>Ux<n>Ax<n>B` form
    pub scenario: String,
    pub iterations: u64,
    /// Seed of the first iteration, iteration i uses `start_seed + i`
    pub start_seed: u64,
    pub generator: GeneratorConfig,
    pub model: ModelConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scenario: "1Ux1Ax2B".to_string(),
            iterations: 500,
            start_seed: 0,
            generator: GeneratorConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.scenario, "1Ux1Ax2B");
        assert_eq!(config.iterations, 500);
        assert_eq!(config.generator.max_budget, 1.0);
        assert_eq!(config.generator.auction_participate_cost, 0.05);
        assert_eq!(config.generator.auction_host_cost, 0.05);
        assert_eq!(config.model.learning_rate, 0.01);
        assert_eq!(config.model.regularization_rate, 0.1);
    }
}
