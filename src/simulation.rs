//! Driving loop: runs one scenario many times, reseeding the generator per iteration,
//! and keeps every outcome for the reports.

use rand::{rngs::StdRng, SeedableRng};

use crate::config::SimulationConfig;
use crate::errors::SimulationError;
use crate::logger::{LogEvent, Logger};
use crate::logln;
use crate::scenario::Scenario;
use crate::scenario_run::{run_scenario, ScenarioOutcome};

/// Outcome of one iteration together with the seed that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    pub seed: u64,
    pub outcome: ScenarioOutcome,
}

impl IterationRecord {
    /// Index of the predicted winner
    pub fn predicted_winner(&self) -> Option<usize> {
        self.outcome.allocation.iter().position(|&a| a == 1.0)
    }

    /// Payment of the predicted winner
    pub fn winner_payout(&self) -> Option<f64> {
        self.predicted_winner().map(|winner| self.outcome.payment[winner])
    }

    /// CSV line matching `Simulation::csv_header`
    pub fn csv_line(&self) -> String {
        let mut fields = vec![
            self.seed.to_string(),
            self.predicted_winner().map(|w| w.to_string()).unwrap_or_default(),
            self.outcome.auction.winner.to_string(),
            format!("{:.6}", self.winner_payout().unwrap_or(0.0)),
        ];
        let min_bid = self.outcome.population.auctioneers.first().map(|a| a.preferences.min_bid);
        fields.push(min_bid.map(|m| format!("{:.6}", m)).unwrap_or_default());
        let privacy = self.outcome.population.users.first().map(|u| u.preferences.privacy_threshold);
        fields.push(privacy.map(|p| format!("{:.6}", p)).unwrap_or_default());
        for valuation in &self.outcome.auction.valuations {
            fields.push(format!("{:.6}", valuation));
        }
        for probability in &self.outcome.item_probability {
            fields.push(format!("{:.6}", probability));
        }
        fields.join(",")
    }
}

/// All iterations of one simulation
pub struct Simulation {
    pub scenario: Scenario,
    pub records: Vec<IterationRecord>,
}

impl Simulation {
    /// Run `config.iterations` iterations, iteration `i` seeded with `config.start_seed + i`.
    ///
    /// Seeds wrap around at `u64::MAX`.
    pub fn run(config: &SimulationConfig, logger: &mut Logger) -> Result<Self, SimulationError> {
        let scenario: Scenario = config.scenario.parse()?;
        let mut records = Vec::new();

        logln!(logger, LogEvent::Iteration, "{}", Self::csv_header(scenario.n_bidders));
        for i in 0..config.iterations {
            let seed = config.start_seed.wrapping_add(i);
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = run_scenario(&scenario, &config.generator, &config.model, &mut rng, logger)?;
            let record = IterationRecord { seed, outcome };
            logln!(logger, LogEvent::Iteration, "{}", record.csv_line());
            records.push(record);
        }

        Ok(Self { scenario, records })
    }

    /// Header of the per-iteration CSV
    pub fn csv_header(n_bidders: usize) -> String {
        let mut fields: Vec<String> = ["seed", "predicted_winner", "auction_winner", "payout", "min_bid", "privacy_threshold"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        fields.extend((0..n_bidders).map(|i| format!("valuation_{}", i)));
        fields.extend((0..n_bidders).map(|i| format!("probability_{}", i)));
        fields.join(",")
    }
}
