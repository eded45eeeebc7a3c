//! Password composition policy.

use crate::constants;
use serde::{Deserialize, Serialize};

/// Composition rules for generated passwords.
///
/// Each group contributes a count drawn from `[min, max]`; the upper bound is
/// clamped to the group's alphabet size at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorPolicy {
    pub letters_min: usize,
    pub letters_max: usize,
    pub digits_min: usize,
    pub digits_max: usize,
    pub symbols_min: usize,
    pub symbols_max: usize,
    /// Symbol alphabet. Duplicate characters are ignored.
    pub symbols: String,
    /// Hard cap on the total password length.
    pub max_length: usize,
}

impl Default for GeneratorPolicy {
    fn default() -> Self {
        Self {
            letters_min: constants::LETTERS_RANGE.0,
            letters_max: constants::LETTERS_RANGE.1,
            digits_min: constants::DIGITS_RANGE.0,
            digits_max: constants::DIGITS_RANGE.1,
            symbols_min: constants::SYMBOLS_RANGE.0,
            symbols_max: constants::SYMBOLS_RANGE.1,
            symbols: constants::SYMBOLS.to_string(),
            max_length: constants::MAX_PASSWORD_LENGTH,
        }
    }
}

impl GeneratorPolicy {
    /// Sum of the per-group minimums: the shortest password the policy allows.
    pub fn min_length(&self) -> usize {
        self.letters_min + self.digits_min + self.symbols_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_classic_ranges() {
        let p = GeneratorPolicy::default();
        assert_eq!((p.letters_min, p.letters_max), (7, 10));
        assert_eq!((p.digits_min, p.digits_max), (2, 10));
        assert_eq!((p.symbols_min, p.symbols_max), (2, 10));
        assert_eq!(p.max_length, 32);
        assert_eq!(p.min_length(), 11);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let p: GeneratorPolicy = toml::from_str("symbols = \"@-_\"\nmax_length = 20\n").unwrap();
        assert_eq!(p.symbols, "@-_");
        assert_eq!(p.max_length, 20);
        assert_eq!(p.letters_min, 7);
    }
}
