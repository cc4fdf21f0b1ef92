//! User privacy threshold against bidder payouts, grouped by the predicted winner.
//!
//! For every bidder that won at least once: how often it won, the mean privacy threshold of
//! the lead user in those iterations, and the mean and range of its payouts.

use std::error::Error;

use crate::logger::{LogEvent, Logger};
use crate::logln;
use crate::simulation::Simulation;
use super::{mean, require_records};

inventory::submit!(super::ReportEntry {
    short_name: "payouts",
    description: "user privacy threshold vs winning bidder payouts",
    run,
});

#[derive(Debug, Clone, PartialEq)]
pub struct PayoutStat {
    pub bidder: usize,
    pub wins: usize,
    pub mean_privacy_threshold: f64,
    pub mean_payout: f64,
    pub min_payout: f64,
    pub max_payout: f64,
}

/// Per-winner statistics, ordered by bidder index
pub fn summarize(simulation: &Simulation) -> Vec<PayoutStat> {
    let n_bidders = simulation.scenario.n_bidders;
    let mut privacy_by_winner: Vec<Vec<f64>> = vec![Vec::new(); n_bidders];
    let mut payout_by_winner: Vec<Vec<f64>> = vec![Vec::new(); n_bidders];

    for record in &simulation.records {
        let (Some(winner), Some(payout)) = (record.predicted_winner(), record.winner_payout()) else {
            continue;
        };
        let Some(user) = record.outcome.population.users.first() else {
            continue;
        };
        privacy_by_winner[winner].push(user.preferences.privacy_threshold);
        payout_by_winner[winner].push(payout);
    }

    privacy_by_winner
        .iter()
        .zip(&payout_by_winner)
        .enumerate()
        .filter(|(_, (_, payouts))| !payouts.is_empty())
        .map(|(bidder, (privacy, payouts))| PayoutStat {
            bidder,
            wins: payouts.len(),
            mean_privacy_threshold: mean(privacy),
            mean_payout: mean(payouts),
            min_payout: payouts.iter().copied().fold(f64::INFINITY, f64::min),
            max_payout: payouts.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
        .collect()
}

pub fn run(simulation: &Simulation, logger: &mut Logger) -> Result<(), Box<dyn Error>> {
    require_records(simulation)?;
    let stats = summarize(simulation);

    logln!(logger, LogEvent::Report, "\n=== User Privacy Threshold vs Bidder Payouts ({}) ===", simulation.scenario);
    for stat in &stats {
        logln!(logger, LogEvent::Report, "Winning bidder {}", stat.bidder);
        logln!(logger, LogEvent::Report, "  Wins: {} / {}", stat.wins, simulation.records.len());
        logln!(logger, LogEvent::Report, "  Mean user privacy threshold: {:.4}", stat.mean_privacy_threshold);
        logln!(logger, LogEvent::Report, "  Payout (mean/min/max): {:.4} / {:.4} / {:.4}", stat.mean_payout, stat.min_payout, stat.max_payout);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;

    #[test]
    fn test_wins_add_up() {
        let config = SimulationConfig {
            iterations: 40,
            ..SimulationConfig::default()
        };
        let simulation = Simulation::run(&config, &mut Logger::new()).unwrap();
        let stats = summarize(&simulation);

        assert!(!stats.is_empty());
        assert_eq!(stats.iter().map(|s| s.wins).sum::<usize>(), 40);
        for stat in &stats {
            assert!(stat.bidder < 2);
            assert!(stat.min_payout <= stat.mean_payout && stat.mean_payout <= stat.max_payout);
            assert!((0.0..=1.0).contains(&stat.mean_privacy_threshold));
        }
        assert!(run(&simulation, &mut Logger::new()).is_ok());
    }
}
