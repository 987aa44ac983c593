use serde::{Deserialize, Serialize};

/// Configuration for a [`Differ`](crate::Differ).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Maximum value nesting the differ and applier will descend into.
    pub max_depth: usize,
    /// Run the composer over every patch the differ produces.
    pub normalize: bool,
    /// Re-apply every produced patch to the old value and fail with
    /// `RoundTripMismatch` unless it reproduces the new value.
    pub verify_round_trip: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            max_depth: 256,
            normalize: false,
            verify_round_trip: false,
        }
    }
}

impl DiffConfig {
    /// Normalizing, self-verifying configuration.
    pub fn strict() -> Self {
        Self {
            normalize: true,
            verify_round_trip: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = DiffConfig::default();
        assert_eq!(c.max_depth, 256);
        assert!(!c.normalize);
        assert!(!c.verify_round_trip);
    }

    #[test]
    fn strict_config() {
        let c = DiffConfig::strict();
        assert!(c.normalize);
        assert!(c.verify_round_trip);
        assert_eq!(c.max_depth, DiffConfig::default().max_depth);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let c: DiffConfig = toml::from_str("max_depth = 16").unwrap();
        assert_eq!(c.max_depth, 16);
        assert!(!c.normalize);
    }

    #[test]
    fn toml_roundtrip() {
        let c = DiffConfig::strict();
        let text = toml::to_string(&c).unwrap();
        let back: DiffConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, c);
    }
}
