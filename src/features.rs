//! Ordered feature schemas for preference records.
//!
//! Preference values are fed to the linear layers as plain vectors, so the order of
//! the features is part of the contract: `to_vector` must follow `NAMES` exactly.

use std::fmt;

/// One named feature and the value it holds before sampling
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDefault {
    pub name: &'static str,
    pub default: f64,
}

/// Ordered mapping from feature name to default value for one entity kind
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    pub features: Vec<FeatureDefault>,
}

impl FeatureSchema {
    pub fn len(&self) -> usize {
        self.features.len()
    }
}

/// Renders as `name=default` pairs in schema order
impl fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .features
            .iter()
            .map(|feature| format!("{}={}", feature.name, feature.default))
            .collect();
        write!(f, "{}", pairs.join(", "))
    }
}

/// Trait for preference records that can be flattened into a numeric vector
pub trait Features {
    /// Feature names in flattening order
    const NAMES: &'static [&'static str];

    /// Values in the order of `NAMES`
    fn to_vector(&self) -> Vec<f64>;

    /// Schema with every feature defaulted to 0.0
    fn schema() -> FeatureSchema {
        FeatureSchema {
            features: Self::NAMES
                .iter()
                .map(|&name| FeatureDefault { name, default: 0.0 })
                .collect(),
        }
    }

    /// Pairs of (name, value), mostly for logging
    fn named_values(&self) -> Vec<(&'static str, f64)> {
        Self::NAMES.iter().copied().zip(self.to_vector()).collect()
    }
}

/// Render a record as `name: value` lines
pub fn describe<F: Features>(record: &F) -> String {
    record
        .named_values()
        .iter()
        .map(|(name, value)| format!("  {}: {:.4}", name, value))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        first: f64,
        second: f64,
    }

    impl Features for Pair {
        const NAMES: &'static [&'static str] = &["first", "second"];

        fn to_vector(&self) -> Vec<f64> {
            vec![self.first, self.second]
        }
    }

    #[test]
    fn test_schema_follows_names() {
        let schema = Pair::schema();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.to_string(), "first=0, second=0");
    }

    #[test]
    fn test_named_values_and_describe() {
        let pair = Pair { first: 0.25, second: 0.5 };
        assert_eq!(pair.named_values(), vec![("first", 0.25), ("second", 0.5)]);
        assert_eq!(describe(&pair), "  first: 0.2500\n  second: 0.5000");
    }
}
