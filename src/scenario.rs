use std::fmt;
use std::str::FromStr;

use crate::errors::SimulationError;

/// Population sizes of one scenario, parsed from descriptors such as `1Ux1Ax2B`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub n_users: usize,
    pub n_auctioneers: usize,
    pub n_bidders: usize,
}

impl Scenario {
    pub fn new(n_users: usize, n_auctioneers: usize, n_bidders: usize) -> Result<Self, SimulationError> {
        let scenario = Self {
            n_users,
            n_auctioneers,
            n_bidders,
        };
        let checks = [("user", n_users), ("auctioneer", n_auctioneers), ("bidder", n_bidders)];
        for (kind, count) in checks {
            if count == 0 {
                return Err(SimulationError::InvalidScenario {
                    descriptor: scenario.to_string(),
                    reason: format!("{} count must be positive", kind),
                });
            }
        }
        Ok(scenario)
    }
}

/// Parse one `<n><suffix>` part of the descriptor
fn parse_count(descriptor: &str, part: &str, suffix: char, kind: &str) -> Result<usize, SimulationError> {
    let invalid = |reason: String| SimulationError::InvalidScenario {
        descriptor: descriptor.to_string(),
        reason,
    };

    let digits = part
        .strip_suffix(suffix)
        .ok_or_else(|| invalid(format!("expected '<n>{}' for the {} count, got '{}'", suffix, kind, part)))?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid(format!("{} count '{}' is not a number", kind, digits)));
    }
    digits
        .parse()
        .map_err(|_| invalid(format!("{} count '{}' is out of range", kind, digits)))
}

impl FromStr for Scenario {
    type Err = SimulationError;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = descriptor.trim().split('x').collect();
        if parts.len() != 3 {
            return Err(SimulationError::InvalidScenario {
                descriptor: descriptor.to_string(),
                reason: format!("expected three 'x'-separated parts, got {}", parts.len()),
            });
        }

        Self::new(
            parse_count(descriptor, parts[0], 'U', "user")?,
            parse_count(descriptor, parts[1], 'A', "auctioneer")?,
            parse_count(descriptor, parts[2], 'B', "bidder")?,
        )
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Ux{}Ax{}B", self.n_users, self.n_auctioneers, self.n_bidders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_scenario() {
        let scenario: Scenario = "1Ux1Ax2B".parse().unwrap();
        assert_eq!(scenario, Scenario { n_users: 1, n_auctioneers: 1, n_bidders: 2 });
        assert_eq!(scenario.to_string(), "1Ux1Ax2B");
    }

    #[test]
    fn test_parse_multi_digit_counts() {
        let scenario: Scenario = "12Ux3Ax10B".parse().unwrap();
        assert_eq!(scenario.n_users, 12);
        assert_eq!(scenario.n_auctioneers, 3);
        assert_eq!(scenario.n_bidders, 10);
    }

    #[test]
    fn test_zero_users_is_invalid() {
        let result = "0Ux1Ax2B".parse::<Scenario>();
        assert!(matches!(result, Err(SimulationError::InvalidScenario { .. })));
    }

    #[test]
    fn test_malformed_descriptors() {
        for descriptor in ["", "1Ux1A", "1Ux1Ax2B x", "1Ax1Ux2B", "aUx1Ax2B", "1Ux1Ax-2B", "1Ux1Ax2Bx1U"] {
            let result = descriptor.parse::<Scenario>();
            assert!(
                matches!(result, Err(SimulationError::InvalidScenario { .. })),
                "descriptor '{}' should be rejected",
                descriptor
            );
        }
    }

    #[test]
    fn test_new_rejects_zero_counts() {
        assert!(Scenario::new(1, 1, 2).is_ok());
        assert!(matches!(Scenario::new(1, 0, 2), Err(SimulationError::InvalidScenario { .. })));
        assert!(matches!(Scenario::new(1, 1, 0), Err(SimulationError::InvalidScenario { .. })));
    }
}
