//! Item probability scores per bidder, and how often the model's pick matches the auction.

use std::error::Error;

use crate::logger::{LogEvent, Logger};
use crate::logln;
use crate::simulation::Simulation;
use super::{mean, require_records};

inventory::submit!(super::ReportEntry {
    short_name: "probabilities",
    description: "item probability per bidder and agreement with the auction winner",
    run,
});

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilitySummary {
    pub mean_probability: Vec<f64>,
    pub mean_sum: f64,
    pub winner_agreement: f64,
}

pub fn summarize(simulation: &Simulation) -> ProbabilitySummary {
    let n_bidders = simulation.scenario.n_bidders;
    let mut per_bidder: Vec<Vec<f64>> = vec![Vec::new(); n_bidders];
    let mut sums: Vec<f64> = Vec::with_capacity(simulation.records.len());
    let mut agree = 0usize;

    for record in &simulation.records {
        let probabilities = &record.outcome.item_probability;
        for (values, &p) in per_bidder.iter_mut().zip(probabilities) {
            values.push(p);
        }
        sums.push(probabilities.iter().sum());
        if record.predicted_winner() == Some(record.outcome.auction.winner) {
            agree += 1;
        }
    }

    ProbabilitySummary {
        mean_probability: per_bidder.iter().map(|v| mean(v)).collect(),
        mean_sum: mean(&sums),
        winner_agreement: agree as f64 / simulation.records.len().max(1) as f64,
    }
}

pub fn run(simulation: &Simulation, logger: &mut Logger) -> Result<(), Box<dyn Error>> {
    require_records(simulation)?;
    let summary = summarize(simulation);

    logln!(logger, LogEvent::Report, "\n=== Item Probabilities ({}) ===", simulation.scenario);
    for (i, p) in summary.mean_probability.iter().enumerate() {
        logln!(logger, LogEvent::Report, "Bidder {}: mean probability {:.4}", i, p);
    }
    logln!(logger, LogEvent::Report, "Mean probability sum: {:.4}", summary.mean_sum);
    logln!(logger, LogEvent::Report, "Predicted winner matches auction: {:.1}%", summary.winner_agreement * 100.0);
    Ok(())
}
