//! Second-price auction over the bidders of one scenario.
//!
//! Each bidder's valuation is the larger of a uniform draw between the auctioneer's minimum
//! bid and the bidder's budget, and `ctr * max_budget`. The highest valuation wins and pays the
//! second highest one, or the minimum bid when it is the only bidder.

use rand::Rng;

use crate::entities::{Auctioneer, Bidder};
use crate::errors::SimulationError;
use crate::logger::{LogEvent, Logger};
use crate::{log, logln};

/// Ground truth of one auction round
#[derive(Debug, Clone, PartialEq)]
pub struct AuctionOutcome {
    /// Index of the winning bidder
    pub winner: usize,
    /// One-hot, 1.0 at the winner
    pub allocation: Vec<f64>,
    /// Zero except at the winner
    pub payment: Vec<f64>,
    /// Valuation of every bidder, in bidder order
    pub valuations: Vec<f64>,
}

/// Uniform draw on [low, high), also defined when low >= high
fn uniform<R: Rng + ?Sized>(low: f64, high: f64, rng: &mut R) -> f64 {
    low + (high - low) * rng.gen::<f64>()
}

/// Index of the first occurrence of the maximum value
///
/// Ties go to the earliest bidder in iteration order; there is no secondary criterion.
pub fn first_max_index(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

/// Clear an auction from already computed valuations
pub fn clear(valuations: Vec<f64>, min_bid: f64) -> Result<AuctionOutcome, SimulationError> {
    let winner = first_max_index(&valuations).ok_or(SimulationError::InsufficientPopulation { kind: "bidder" })?;

    let mut sorted_bids = valuations.clone();
    sorted_bids.sort_by(|a, b| b.total_cmp(a));
    let price = if sorted_bids.len() > 1 { sorted_bids[1] } else { min_bid };

    let mut allocation = vec![0.0; valuations.len()];
    let mut payment = vec![0.0; valuations.len()];
    allocation[winner] = 1.0;
    payment[winner] = price;

    Ok(AuctionOutcome {
        winner,
        allocation,
        payment,
        valuations,
    })
}

/// Run one second-price auction round.
///
/// Only the first auctioneer is consulted for the minimum bid. The generator advances once per bidder.
pub fn second_price_auction<R: Rng + ?Sized>(bidders: &[Bidder], auctioneers: &[Auctioneer], rng: &mut R, logger: &mut Logger) -> Result<AuctionOutcome, SimulationError> {
    if bidders.is_empty() {
        return Err(SimulationError::InsufficientPopulation { kind: "bidder" });
    }
    let auctioneer = auctioneers
        .first()
        .ok_or(SimulationError::InsufficientPopulation { kind: "auctioneer" })?;
    let min_bid = auctioneer.preferences.min_bid;

    let valuations: Vec<f64> = bidders
        .iter()
        .map(|bidder| {
            let bid_uniform = uniform(min_bid, bidder.preferences.max_budget, rng);
            let bid_ctr = bidder.preferences.ctr * bidder.preferences.max_budget;
            bid_uniform.max(bid_ctr)
        })
        .collect();

    let outcome = clear(valuations, min_bid)?;

    if logger.is_enabled(LogEvent::Auction) {
        log!(logger, LogEvent::Auction, "{:.4},{},{:.4}", min_bid, outcome.winner, outcome.payment[outcome.winner]);
        for valuation in &outcome.valuations {
            log!(logger, LogEvent::Auction, ",{:.4}", valuation);
        }
        logln!(logger, LogEvent::Auction, "");
    }

    Ok(outcome)
}
