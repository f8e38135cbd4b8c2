//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GENERATOR_SEARCH_LIMIT, DEFAULT_TRANSCRIPT_CAPACITY};
use crate::hash::HashFunction;
use crate::keygen::{KeyGenerator, ProviderKeyGen, ToyKeyGen};

/// Which key-generation strategy an engine uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Standard-sized parameters; `q` size follows from `p_bits`.
    Real { p_bits: usize },
    /// Freely-sized parameters with challenge truncation.
    Toy { p_bits: usize, q_bits: usize },
}

impl Mode {
    pub fn is_toy(&self) -> bool {
        matches!(self, Mode::Toy { .. })
    }

    /// Builds the key generator for this mode.
    pub fn key_generator(&self, generator_search_limit: u64) -> Box<dyn KeyGenerator> {
        match *self {
            Mode::Real { p_bits } => Box::new(
                ProviderKeyGen::new(p_bits).with_generator_search_limit(generator_search_limit),
            ),
            Mode::Toy { p_bits, q_bits } => Box::new(
                ToyKeyGen::new(p_bits, q_bits).with_generator_search_limit(generator_search_limit),
            ),
        }
    }
}

/// Settings for a [`SchnorrEngine`](crate::SchnorrEngine).
///
/// # Example
///
/// ```
/// use dlog_schnorr::{HashFunction, SchnorrConfig};
///
/// let config = SchnorrConfig::toy(20, 8)
///     .with_hash(HashFunction::Blake3)
///     .with_seed([7u8; 32]);
/// assert!(config.mode.is_toy());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchnorrConfig {
    pub mode: Mode,
    /// Maximum transcript length in bytes.
    pub transcript_capacity: usize,
    pub hash: HashFunction,
    /// Maximum number of `h` values tried when searching for a generator.
    pub generator_search_limit: u64,
    /// Seed for the engine's RNG. `None` seeds from the operating system.
    pub seed: Option<[u8; 32]>,
}

impl SchnorrConfig {
    /// Standard-sized parameters with a `p_bits`-bit modulus.
    pub fn real(p_bits: usize) -> Self {
        SchnorrConfig {
            mode: Mode::Real { p_bits },
            ..Self::default()
        }
    }

    /// Toy parameters with a `p_bits`-bit `p` and a `q_bits`-bit `q`.
    pub fn toy(p_bits: usize, q_bits: usize) -> Self {
        SchnorrConfig {
            mode: Mode::Toy { p_bits, q_bits },
            ..Self::default()
        }
    }

    pub fn with_transcript_capacity(mut self, capacity: usize) -> Self {
        self.transcript_capacity = capacity;
        self
    }

    pub fn with_hash(mut self, hash: HashFunction) -> Self {
        self.hash = hash;
        self
    }

    pub fn with_generator_search_limit(mut self, limit: u64) -> Self {
        self.generator_search_limit = limit;
        self
    }

    pub fn with_seed(mut self, seed: [u8; 32]) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for SchnorrConfig {
    fn default() -> Self {
        SchnorrConfig {
            mode: Mode::Real { p_bits: 1024 },
            transcript_capacity: DEFAULT_TRANSCRIPT_CAPACITY,
            hash: HashFunction::Sha256,
            generator_search_limit: DEFAULT_GENERATOR_SEARCH_LIMIT,
            seed: None,
        }
    }
}
