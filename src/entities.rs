use rand::Rng;
use rand_distr::{Beta, Distribution, StandardNormal};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::config::GeneratorConfig;
use crate::errors::SimulationError;
use crate::features::{describe, Features};
use crate::logger::{LogEvent, Logger};
use crate::logln;
use crate::scenario::Scenario;

/// Preferences of a user, sampled once at creation
#[derive(Debug, Clone, PartialEq)]
pub struct UserPreferences {
    /// CDF of a standard normal sample, uniform on [0, 1]
    pub trust_score: f64,
    pub relevance_score: f64,
    /// Beta(3, 2) sample, concentrated towards 1
    pub privacy_threshold: f64,
}

impl Features for UserPreferences {
    const NAMES: &'static [&'static str] = &["trust_score", "relevance_score", "privacy_threshold"];

    fn to_vector(&self) -> Vec<f64> {
        vec![self.trust_score, self.relevance_score, self.privacy_threshold]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub idn: usize,
    pub preferences: UserPreferences,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BidderPreferences {
    pub max_budget: f64,
    /// Click-through-rate proxy, `gamma * user_impact`
    pub ctr: f64,
    pub auction_participate_cost: f64,
    /// Unset until an auction outcome is written back with `Population::apply_valuations`
    pub valuation: f64,
}

impl Features for BidderPreferences {
    const NAMES: &'static [&'static str] = &["max_budget", "ctr", "auction_participate_cost", "valuation"];

    fn to_vector(&self) -> Vec<f64> {
        vec![self.max_budget, self.ctr, self.auction_participate_cost, self.valuation]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bidder {
    pub idn: usize,
    /// Random multiplier fixed for the bidder's lifetime
    pub gamma: f64,
    pub preferences: BidderPreferences,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuctioneerPreferences {
    pub min_bid: f64,
    pub auction_host_cost: f64,
}

impl Features for AuctioneerPreferences {
    const NAMES: &'static [&'static str] = &["min_bid", "auction_host_cost"];

    fn to_vector(&self) -> Vec<f64> {
        vec![self.min_bid, self.auction_host_cost]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Auctioneer {
    pub idn: usize,
    pub preferences: AuctioneerPreferences,
}

/// Distributions used to sample user preferences
pub struct UserDistributions {
    standard_normal: Normal,
    privacy: Beta<f64>,
}

impl UserDistributions {
    pub fn new(config: &GeneratorConfig) -> Result<Self, SimulationError> {
        let standard_normal = Normal::new(0.0, 1.0).map_err(|e| SimulationError::Distribution(e.to_string()))?;
        let privacy = Beta::new(config.privacy_alpha, config.privacy_beta)
            .map_err(|e| SimulationError::Distribution(format!("privacy threshold Beta: {}", e)))?;
        Ok(Self { standard_normal, privacy })
    }
}

impl User {
    /// Sample a user. Draw order: normal sample for trust, uniform relevance, Beta privacy.
    pub fn sample<R: Rng + ?Sized>(idn: usize, distributions: &UserDistributions, rng: &mut R) -> Self {
        let normal_sample: f64 = rng.sample(StandardNormal);
        let trust_score = distributions.standard_normal.cdf(normal_sample);
        let relevance_score = rng.gen::<f64>();
        let privacy_threshold = distributions.privacy.sample(rng);
        Self {
            idn,
            preferences: UserPreferences {
                trust_score,
                relevance_score,
                privacy_threshold,
            },
        }
    }
}

/// Aggregate impact of the user population on click-through:
/// `(mean(trust) * mean(relevance)) / sqrt(mean(privacy))`
pub fn user_impact(users: &[User]) -> Result<f64, SimulationError> {
    if users.is_empty() {
        return Err(SimulationError::InsufficientPopulation { kind: "user" });
    }
    let n = users.len() as f64;
    let avg_trust = users.iter().map(|u| u.preferences.trust_score).sum::<f64>() / n;
    let avg_relevance = users.iter().map(|u| u.preferences.relevance_score).sum::<f64>() / n;
    let avg_privacy = users.iter().map(|u| u.preferences.privacy_threshold).sum::<f64>() / n;
    Ok((avg_trust * avg_relevance) / avg_privacy.sqrt())
}

impl Bidder {
    /// Build a bidder from an already drawn `gamma`
    pub fn with_gamma(idn: usize, gamma: f64, users: &[User], config: &GeneratorConfig) -> Result<Self, SimulationError> {
        let impact = user_impact(users)?;
        Ok(Self {
            idn,
            gamma,
            preferences: BidderPreferences {
                max_budget: config.max_budget,
                ctr: gamma * impact,
                auction_participate_cost: config.auction_participate_cost,
                valuation: config.unset_valuation,
            },
        })
    }

    /// Sample a bidder; `gamma` is uniform on [0, 1)
    pub fn sample<R: Rng + ?Sized>(idn: usize, users: &[User], config: &GeneratorConfig, rng: &mut R) -> Result<Self, SimulationError> {
        let gamma = rng.gen::<f64>();
        Self::with_gamma(idn, gamma, users, config)
    }
}

impl Auctioneer {
    pub fn sample<R: Rng + ?Sized>(idn: usize, config: &GeneratorConfig, rng: &mut R) -> Self {
        Self {
            idn,
            preferences: AuctioneerPreferences {
                min_bid: rng.gen::<f64>(),
                auction_host_cost: config.auction_host_cost,
            },
        }
    }
}

/// All entities of one scenario run
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    pub users: Vec<User>,
    pub bidders: Vec<Bidder>,
    pub auctioneers: Vec<Auctioneer>,
}

impl Population {
    /// Generate a fresh population for the scenario.
    ///
    /// Users are created first since bidder ctr depends on them, then bidders, then auctioneers.
    pub fn generate<R: Rng + ?Sized>(scenario: &Scenario, config: &GeneratorConfig, rng: &mut R, logger: &mut Logger) -> Result<Self, SimulationError> {
        let scenario = Scenario::new(scenario.n_users, scenario.n_auctioneers, scenario.n_bidders)?;
        let distributions = UserDistributions::new(config)?;

        if logger.is_enabled(LogEvent::Entity) {
            logln!(logger, LogEvent::Entity, "User schema: {}", UserPreferences::schema());
            logln!(logger, LogEvent::Entity, "Bidder schema: {}", BidderPreferences::schema());
            logln!(logger, LogEvent::Entity, "Auctioneer schema: {}", AuctioneerPreferences::schema());
        }

        let users: Vec<User> = (0..scenario.n_users)
            .map(|idn| User::sample(idn, &distributions, rng))
            .collect();
        for user in &users {
            logln!(logger, LogEvent::Entity, "User {}\n{}", user.idn, describe(&user.preferences));
        }

        logln!(logger, LogEvent::Entity, "user_impact: {:.4}", user_impact(&users)?);
        let mut bidders = Vec::with_capacity(scenario.n_bidders);
        for idn in 0..scenario.n_bidders {
            let bidder = Bidder::sample(idn, &users, config, rng)?;
            logln!(logger, LogEvent::Entity, "Bidder {} (gamma {:.4})\n{}", bidder.idn, bidder.gamma, describe(&bidder.preferences));
            bidders.push(bidder);
        }

        let auctioneers: Vec<Auctioneer> = (0..scenario.n_auctioneers)
            .map(|idn| Auctioneer::sample(idn, config, rng))
            .collect();
        for auctioneer in &auctioneers {
            logln!(logger, LogEvent::Entity, "Auctioneer {}\n{}", auctioneer.idn, describe(&auctioneer.preferences));
        }

        Ok(Self {
            users,
            bidders,
            auctioneers,
        })
    }

    /// The single auctioneer whose `min_bid` drives the scenario
    pub fn lead_auctioneer(&self) -> Result<&Auctioneer, SimulationError> {
        self.auctioneers
            .first()
            .ok_or(SimulationError::InsufficientPopulation { kind: "auctioneer" })
    }

    /// The user whose features are fed to the model
    pub fn lead_user(&self) -> Result<&User, SimulationError> {
        self.users.first().ok_or(SimulationError::InsufficientPopulation { kind: "user" })
    }

    /// Write the valuations computed by an auction back into the bidder records
    pub fn apply_valuations(&mut self, valuations: &[f64]) -> Result<(), SimulationError> {
        if valuations.len() != self.bidders.len() {
            return Err(SimulationError::InvalidState(format!(
                "expected {} valuations, got {}",
                self.bidders.len(),
                valuations.len()
            )));
        }
        for (bidder, &valuation) in self.bidders.iter_mut().zip(valuations) {
            bidder.preferences.valuation = valuation;
        }
        Ok(())
    }
}
