//! Random password generation.
//!
//! A password is built from three groups (letters, digits, symbols). Each
//! group draws a random count, samples that many distinct characters from its
//! alphabet, and the combined characters are shuffled. Counts are trimmed
//! toward their minimums before shuffling when the total would exceed the
//! policy's maximum length, so every group is always represented.

use crate::constants;
use crate::models::policy::GeneratorPolicy;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("cannot sample {requested} distinct {group} from an alphabet of {available}")]
    Exhausted {
        group: &'static str,
        requested: usize,
        available: usize,
    },

    #[error("invalid generator policy: {0}")]
    InvalidPolicy(String),
}

#[derive(Debug, Clone)]
struct Group {
    name: &'static str,
    alphabet: Vec<char>,
    min: usize,
    max: usize,
}

impl Group {
    fn new(name: &'static str, chars: &str, min: usize, max: usize) -> Self {
        let mut alphabet: Vec<char> = Vec::new();
        for c in chars.chars() {
            if !alphabet.contains(&c) {
                alphabet.push(c);
            }
        }
        Self {
            name,
            alphabet,
            min,
            max,
        }
    }

    /// Upper bound on the count, limited by the alphabet since sampling
    /// is without replacement.
    fn effective_max(&self) -> usize {
        self.max.min(self.alphabet.len())
    }

    fn check(&self) -> Result<(), GenerateError> {
        if self.alphabet.is_empty() {
            return Err(GenerateError::InvalidPolicy(format!(
                "{} alphabet is empty",
                self.name
            )));
        }
        if self.min == 0 {
            return Err(GenerateError::InvalidPolicy(format!(
                "{} minimum must be at least 1",
                self.name
            )));
        }
        if self.min > self.max {
            return Err(GenerateError::InvalidPolicy(format!(
                "{} range is inverted ({} > {})",
                self.name, self.min, self.max
            )));
        }
        if self.min > self.alphabet.len() {
            return Err(GenerateError::Exhausted {
                group: self.name,
                requested: self.min,
                available: self.alphabet.len(),
            });
        }
        Ok(())
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Result<Vec<char>, GenerateError> {
        if count > self.alphabet.len() {
            return Err(GenerateError::Exhausted {
                group: self.name,
                requested: count,
                available: self.alphabet.len(),
            });
        }
        Ok(self
            .alphabet
            .choose_multiple(rng, count)
            .copied()
            .collect())
    }
}

/// Generates passwords according to a [`GeneratorPolicy`].
#[derive(Debug, Clone)]
pub struct PasswordGenerator {
    groups: [Group; 3],
    max_length: usize,
}

impl Default for PasswordGenerator {
    fn default() -> Self {
        Self::build(&GeneratorPolicy::default())
    }
}

impl PasswordGenerator {
    /// Build a generator, rejecting policies that could never be satisfied.
    pub fn new(policy: &GeneratorPolicy) -> Result<Self, GenerateError> {
        let generator = Self::build(policy);
        generator.validate()?;
        Ok(generator)
    }

    fn build(policy: &GeneratorPolicy) -> Self {
        Self {
            groups: [
                Group::new("letters", constants::LETTERS, policy.letters_min, policy.letters_max),
                Group::new("digits", constants::DIGITS, policy.digits_min, policy.digits_max),
                Group::new("symbols", &policy.symbols, policy.symbols_min, policy.symbols_max),
            ],
            max_length: policy.max_length,
        }
    }

    fn validate(&self) -> Result<(), GenerateError> {
        for group in &self.groups {
            group.check()?;
        }
        let min_total: usize = self.groups.iter().map(|g| g.min).sum();
        if min_total > self.max_length {
            return Err(GenerateError::InvalidPolicy(format!(
                "group minimums need {} characters but max_length is {}",
                min_total, self.max_length
            )));
        }
        Ok(())
    }

    /// Generate one password using the OS CSPRNG.
    pub fn generate(&self) -> Result<String, GenerateError> {
        self.generate_with(&mut OsRng)
    }

    /// Generate one password from the given RNG.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String, GenerateError> {
        self.validate()?;

        let mut counts = [0usize; 3];
        for (count, group) in counts.iter_mut().zip(&self.groups) {
            *count = rng.gen_range(group.min..=group.effective_max());
        }
        self.fit_to_max_length(&mut counts);

        let mut chars = Vec::with_capacity(counts.iter().sum());
        for (count, group) in counts.iter().zip(&self.groups) {
            chars.extend(group.sample(rng, *count)?);
        }
        chars.shuffle(rng);
        Ok(chars.into_iter().collect())
    }

    /// The alphabets a generated password draws from: letters, digits, symbols.
    pub fn alphabets(&self) -> [&[char]; 3] {
        [
            self.groups[0].alphabet.as_slice(),
            self.groups[1].alphabet.as_slice(),
            self.groups[2].alphabet.as_slice(),
        ]
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Remove characters from the largest group still above its minimum
    /// until the total fits. `validate` guarantees the minimums fit.
    fn fit_to_max_length(&self, counts: &mut [usize; 3]) {
        while counts.iter().sum::<usize>() > self.max_length {
            let trimmable = counts
                .iter()
                .zip(&self.groups)
                .enumerate()
                .filter(|(_, (count, group))| **count > group.min)
                .max_by_key(|(_, (count, _))| **count)
                .map(|(i, _)| i);
            match trimmable {
                Some(i) => counts[i] -= 1,
                None => break,
            }
        }
    }
}

/// Generate a password with the default policy.
pub fn generate() -> Result<String, GenerateError> {
    PasswordGenerator::default().generate()
}
