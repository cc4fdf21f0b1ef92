use thiserror::Error;

/// Errors raised by the simulation core
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    /// Scenario descriptor could not be parsed into three positive counts
    #[error("invalid scenario '{descriptor}': {reason}")]
    InvalidScenario { descriptor: String, reason: String },

    /// An operation needs at least one entity of a kind and got none
    #[error("insufficient population: at least one {kind} is required")]
    InsufficientPopulation { kind: &'static str },

    /// Operation called in a state where it is not defined
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Input buffer does not fit the layer dimensions
    #[error("shape mismatch in layer '{layer}': expected a multiple of {expected} values, got {actual}")]
    ShapeMismatch {
        layer: String,
        expected: usize,
        actual: usize,
    },

    /// Distribution could not be constructed from its parameters
    #[error("distribution error: {0}")]
    Distribution(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SimulationError::InsufficientPopulation { kind: "bidder" };
        assert_eq!(err.to_string(), "insufficient population: at least one bidder is required");

        let err = SimulationError::InvalidScenario {
            descriptor: "0Ux1Ax2B".to_string(),
            reason: "user count must be positive".to_string(),
        };
        assert_eq!(err.to_string(), "invalid scenario '0Ux1Ax2B': user count must be positive");
    }
}
