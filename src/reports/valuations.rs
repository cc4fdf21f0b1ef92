//! Predicted payment compared with what the bidders were willing to pay.

use std::error::Error;

use crate::logger::{LogEvent, Logger};
use crate::logln;
use crate::simulation::Simulation;
use super::{mean, require_records};

inventory::submit!(super::ReportEntry {
    short_name: "valuations",
    description: "predicted payment vs bidder valuations",
    run,
});

#[derive(Debug, Clone, PartialEq)]
pub struct ValuationSummary {
    pub mean_total_payment: f64,
    pub mean_valuations: Vec<f64>,
    pub mean_min_bid: f64,
    /// Fraction of iterations where the total payment stayed below the winner's valuation
    pub below_winner_valuation: f64,
}

pub fn summarize(simulation: &Simulation) -> ValuationSummary {
    let n_bidders = simulation.scenario.n_bidders;
    let mut totals = Vec::with_capacity(simulation.records.len());
    let mut valuations: Vec<Vec<f64>> = vec![Vec::new(); n_bidders];
    let mut min_bids = Vec::new();
    let mut below = 0usize;

    for record in &simulation.records {
        let outcome = &record.outcome;
        let total: f64 = outcome.payment.iter().sum();
        totals.push(total);
        for (bidder, per_bidder) in outcome.population.bidders.iter().zip(valuations.iter_mut()) {
            per_bidder.push(bidder.preferences.valuation);
        }
        if let Some(auctioneer) = outcome.population.auctioneers.first() {
            min_bids.push(auctioneer.preferences.min_bid);
        }
        if let Some(winner) = record.predicted_winner() {
            if total < outcome.population.bidders[winner].preferences.valuation {
                below += 1;
            }
        }
    }

    ValuationSummary {
        mean_total_payment: mean(&totals),
        mean_valuations: valuations.iter().map(|v| mean(v)).collect(),
        mean_min_bid: mean(&min_bids),
        below_winner_valuation: below as f64 / simulation.records.len().max(1) as f64,
    }
}

pub fn run(simulation: &Simulation, logger: &mut Logger) -> Result<(), Box<dyn Error>> {
    require_records(simulation)?;
    let summary = summarize(simulation);

    logln!(logger, LogEvent::Report, "\n=== Payment vs Valuations ({}) ===", simulation.scenario);
    logln!(logger, LogEvent::Report, "Mean predicted payment: {:.4}", summary.mean_total_payment);
    logln!(logger, LogEvent::Report, "Mean auctioneer min bid: {:.4}", summary.mean_min_bid);
    for (i, valuation) in summary.mean_valuations.iter().enumerate() {
        logln!(logger, LogEvent::Report, "Mean valuation of bidder {}: {:.4}", i, valuation);
    }
    logln!(logger, LogEvent::Report, "Payment below winner valuation: {:.1}%", summary.below_winner_valuation * 100.0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;

    #[test]
    fn test_summary_bounds() {
        let config = SimulationConfig {
            scenario: "1Ux1Ax3B".to_string(),
            iterations: 30,
            ..SimulationConfig::default()
        };
        let simulation = Simulation::run(&config, &mut Logger::new()).unwrap();
        let summary = summarize(&simulation);

        assert_eq!(summary.mean_valuations.len(), 3);
        for valuation in &summary.mean_valuations {
            // valuations never drop below ctr * max_budget, and ctr is positive
            assert!(*valuation > 0.0 && *valuation <= 1.0);
        }
        assert!((0.0..=1.0).contains(&summary.mean_min_bid));
        assert!((0.0..=1.0).contains(&summary.below_winner_valuation));
        assert!(summary.mean_total_payment.is_finite());
        assert!(run(&simulation, &mut Logger::new()).is_ok());
    }
}
