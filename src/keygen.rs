//! Domain-parameter and key-pair generation.
//!
//! Two strategies implement [`KeyGenerator`]:
//!
//! - [`ProviderKeyGen`] produces standard-sized parameters: the caller picks the
//!   modulus length `L` and the sub-prime length `N` follows from it
//!   (160 bits below 2048, 256 bits from 2048 up).
//! - [`ToyKeyGen`] accepts arbitrary `L` and `N`, including sizes far too small
//!   for real use, and is meant for demonstrations and tests.
//!
//! Both build the group the same way: a prime `q`, a prime `p` with
//! `q | p - 1`, and `g = h^((p-1)/q) mod p` for the first small `h` that does
//! not give the identity. The secret key is uniform in `[1, q-1]` and the
//! public key is `g^sk mod p`.

use core::fmt;
use std::time::Instant;

use num_bigint_dig::prime::probably_prime;
use num_bigint_dig::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_GENERATOR_SEARCH_LIMIT, MIN_PRIME_ATTEMPTS, PROVIDER_MIN_P_BITS,
    PROVIDER_P_BITS_STEP, PROVIDER_PRIMALITY_ROUNDS, TOY_PRIMALITY_ROUNDS,
};
use crate::error::{KeyGenFailure, SchnorrError};

/// The group a key pair lives in: a prime modulus `p`, the prime order `q` of
/// the subgroup, and a generator `g` of that subgroup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainParams {
    pub p: BigUint,
    pub q: BigUint,
    pub g: BigUint,
}

impl DomainParams {
    /// Returns `true` if none of `p`, `q`, `g` is zero.
    pub fn is_complete(&self) -> bool {
        !(self.p.is_zero() || self.q.is_zero() || self.g.is_zero())
    }

    /// Checks the subgroup structure: `q | p - 1`, `g != 1` and `g^q = 1 (mod p)`.
    ///
    /// Primality of `p` and `q` is not re-tested.
    pub fn is_consistent(&self) -> bool {
        if !self.is_complete() || self.p <= BigUint::one() {
            return false;
        }
        let p_minus_one = &self.p - 1u32;
        p_minus_one.is_multiple_of(&self.q)
            && !self.g.is_one()
            && self.g.modpow(&self.q, &self.p).is_one()
    }

    /// Encodes the parameters with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SchnorrError> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| SchnorrError::Encoding(e.to_string()))
    }

    /// Decodes parameters produced by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SchnorrError> {
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map(|(params, _)| params)
            .map_err(|e| SchnorrError::Encoding(e.to_string()))
    }
}

/// A secret key and the public key derived from it.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    /// Public key `g^sk mod p`.
    pub public: BigUint,
    /// Secret key in `[1, q-1]`.
    pub secret: BigUint,
}

impl KeyPair {
    /// Draws a fresh secret key below `params.q` and derives its public key.
    ///
    /// Zero draws are rejected and resampled.
    pub fn generate(params: &DomainParams, rng: &mut dyn CryptoRngCore) -> Self {
        let secret = loop {
            let candidate = rng.gen_biguint_below(&params.q);
            if !candidate.is_zero() {
                break candidate;
            }
        };
        Self::from_secret(params, secret)
    }

    /// Derives the key pair for a known secret key.
    pub fn from_secret(params: &DomainParams, secret: BigUint) -> Self {
        let public = params.g.modpow(&secret, &params.p);
        KeyPair { public, secret }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &format_args!("{:X}", self.public))
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Everything a key-generation strategy produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub params: DomainParams,
    pub keys: KeyPair,
}

/// A strategy for producing domain parameters and a key pair.
pub trait KeyGenerator: fmt::Debug {
    /// Generates fresh parameters and keys.
    ///
    /// # Errors
    ///
    /// Returns [`SchnorrError::KeyGeneration`] if the requested sizes are
    /// unsupported or a search runs out of attempts.
    fn generate(&self, rng: &mut dyn CryptoRngCore) -> Result<KeyMaterial, SchnorrError>;

    /// Whether challenges computed under this strategy's parameters are
    /// truncated to the size of `q`.
    fn truncates_challenge(&self) -> bool;
}

/// Standard-sized parameters in the style of a DSA parameter provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderKeyGen {
    p_bits: usize,
    generator_search_limit: u64,
}

impl ProviderKeyGen {
    /// Creates a generator for an `p_bits`-bit modulus.
    pub fn new(p_bits: usize) -> Self {
        ProviderKeyGen {
            p_bits,
            generator_search_limit: DEFAULT_GENERATOR_SEARCH_LIMIT,
        }
    }

    pub fn with_generator_search_limit(mut self, limit: u64) -> Self {
        self.generator_search_limit = limit;
        self
    }

    /// Sub-prime length implied by the modulus length.
    pub fn q_bits(&self) -> usize {
        if self.p_bits >= 2048 { 256 } else { 160 }
    }
}

impl KeyGenerator for ProviderKeyGen {
    fn generate(&self, rng: &mut dyn CryptoRngCore) -> Result<KeyMaterial, SchnorrError> {
        let start = Instant::now();
        let (p_bits, q_bits) = (self.p_bits, self.q_bits());
        if p_bits < PROVIDER_MIN_P_BITS || p_bits % PROVIDER_P_BITS_STEP != 0 {
            return Err(fail(KeyGenFailure::UnsupportedSize { p_bits, q_bits }));
        }

        let params = build_params(
            rng,
            p_bits,
            q_bits,
            PROVIDER_PRIMALITY_ROUNDS,
            4 * p_bits,
            self.generator_search_limit,
        )?;
        let keys = KeyPair::generate(&params, rng);

        tracing::debug!(p_bits, q_bits, elapsed = ?start.elapsed(), "generated provider parameters");
        Ok(KeyMaterial { params, keys })
    }

    fn truncates_challenge(&self) -> bool {
        false
    }
}

/// Small, freely-sized parameters for demonstrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToyKeyGen {
    p_bits: usize,
    q_bits: usize,
    generator_search_limit: u64,
}

impl ToyKeyGen {
    /// Creates a generator for a `p_bits`-bit `p` and a `q_bits`-bit `q`.
    pub fn new(p_bits: usize, q_bits: usize) -> Self {
        ToyKeyGen {
            p_bits,
            q_bits,
            generator_search_limit: DEFAULT_GENERATOR_SEARCH_LIMIT,
        }
    }

    pub fn with_generator_search_limit(mut self, limit: u64) -> Self {
        self.generator_search_limit = limit;
        self
    }
}

impl KeyGenerator for ToyKeyGen {
    fn generate(&self, rng: &mut dyn CryptoRngCore) -> Result<KeyMaterial, SchnorrError> {
        let start = Instant::now();
        let (p_bits, q_bits) = (self.p_bits, self.q_bits);
        // p = 2qm + 1 needs at least one bit more than 2q.
        if q_bits < 2 || p_bits <= q_bits + 1 {
            return Err(fail(KeyGenFailure::UnsupportedSize { p_bits, q_bits }));
        }

        let params = build_params(
            rng,
            p_bits,
            q_bits,
            TOY_PRIMALITY_ROUNDS,
            (4 * p_bits).max(MIN_PRIME_ATTEMPTS),
            self.generator_search_limit,
        )?;
        let keys = KeyPair::generate(&params, rng);

        tracing::debug!(p_bits, q_bits, elapsed = ?start.elapsed(), "generated toy parameters");
        Ok(KeyMaterial { params, keys })
    }

    fn truncates_challenge(&self) -> bool {
        true
    }
}

fn fail(failure: KeyGenFailure) -> SchnorrError {
    tracing::warn!(%failure, "key generation failed");
    SchnorrError::KeyGeneration(failure)
}

fn build_params(
    rng: &mut dyn CryptoRngCore,
    p_bits: usize,
    q_bits: usize,
    rounds: usize,
    p_attempts: usize,
    generator_search_limit: u64,
) -> Result<DomainParams, SchnorrError> {
    let q = random_prime(rng, q_bits, rounds)?;
    let p = random_prime_with_factor(rng, &q, p_bits, rounds, p_attempts)?;
    let g = find_generator(&p, &q, generator_search_limit)?;
    Ok(DomainParams { p, q, g })
}

/// Draws odd `bits`-bit candidates until one is probably prime.
fn random_prime(
    rng: &mut dyn CryptoRngCore,
    bits: usize,
    rounds: usize,
) -> Result<BigUint, SchnorrError> {
    let attempts = (16 * bits).max(MIN_PRIME_ATTEMPTS);
    let (low, high) = bit_range(bits);
    for _ in 0..attempts {
        let mut candidate = rng.gen_biguint_range(&low, &high);
        if candidate.is_even() {
            candidate += 1u32;
        }
        if probably_prime(&candidate, rounds) {
            return Ok(candidate);
        }
    }
    Err(fail(KeyGenFailure::PrimeSearchExhausted { bits, attempts }))
}

/// Searches for a `bits`-bit prime of the form `2qm + 1`.
fn random_prime_with_factor(
    rng: &mut dyn CryptoRngCore,
    q: &BigUint,
    bits: usize,
    rounds: usize,
    attempts: usize,
) -> Result<BigUint, SchnorrError> {
    let step = q << 1usize;
    let (low, high) = bit_range(bits);
    for _ in 0..attempts {
        let x = rng.gen_biguint_range(&low, &high);
        let candidate = &x - (&x % &step) + 1u32;
        if candidate.bits() != bits {
            continue;
        }
        if probably_prime(&candidate, rounds) {
            return Ok(candidate);
        }
    }
    Err(fail(KeyGenFailure::PrimeSearchExhausted { bits, attempts }))
}

/// Finds `g = h^((p-1)/q) mod p != 1`, trying `h = 2, 3, ...`.
///
/// At most `limit` values of `h` are tried, and `h` stays below `p - 1`.
pub fn find_generator(p: &BigUint, q: &BigUint, limit: u64) -> Result<BigUint, SchnorrError> {
    let p_minus_one = p - 1u32;
    let exponent = &p_minus_one / q;
    let mut h = BigUint::from(2u32);
    let mut tried = 0u64;
    while tried < limit && h < p_minus_one {
        let g = h.modpow(&exponent, p);
        if !g.is_one() {
            return Ok(g);
        }
        h += 1u32;
        tried += 1;
    }
    Err(fail(KeyGenFailure::GeneratorSearchExhausted { attempts: tried }))
}

// [2^(bits-1), 2^bits)
fn bit_range(bits: usize) -> (BigUint, BigUint) {
    let low = BigUint::one() << (bits - 1);
    let high = BigUint::one() << bits;
    (low, high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    fn rng(seed: u8) -> ChaCha20Rng {
        ChaCha20Rng::from_seed([seed; 32])
    }

    #[test]
    fn test_toy_parameters_have_subgroup_structure() {
        let mut rng = rng(1);
        let material = ToyKeyGen::new(20, 8).generate(&mut rng).unwrap();
        let params = &material.params;

        assert_eq!(params.p.bits(), 20);
        assert_eq!(params.q.bits(), 8);
        assert!(probably_prime(&params.p, 20));
        assert!(probably_prime(&params.q, 20));
        assert!(params.is_consistent());

        assert!(!material.keys.secret.is_zero());
        assert!(material.keys.secret < params.q);
        assert_eq!(material.keys.public, params.g.modpow(&material.keys.secret, &params.p));
    }

    #[test]
    fn test_toy_rejects_impossible_sizes() {
        let mut rng = rng(2);
        for (p_bits, q_bits) in [(8, 8), (9, 8), (20, 1), (20, 0)] {
            let err = ToyKeyGen::new(p_bits, q_bits).generate(&mut rng).unwrap_err();
            assert_eq!(
                err,
                SchnorrError::KeyGeneration(KeyGenFailure::UnsupportedSize { p_bits, q_bits })
            );
        }
    }

    #[test]
    fn test_toy_smallest_sizes() {
        let mut rng = rng(3);
        let material = ToyKeyGen::new(10, 2).generate(&mut rng).unwrap();
        assert!(material.params.is_consistent());
        assert_eq!(material.params.q.bits(), 2);
    }

    #[test]
    fn test_provider_rejects_nonstandard_sizes() {
        let mut rng = rng(4);
        for p_bits in [256, 1000, 1025] {
            let err = ProviderKeyGen::new(p_bits).generate(&mut rng).unwrap_err();
            assert!(matches!(
                err,
                SchnorrError::KeyGeneration(KeyGenFailure::UnsupportedSize { q_bits: 160, .. })
            ));
        }
    }

    #[test]
    fn test_provider_implied_q_bits() {
        assert_eq!(ProviderKeyGen::new(1024).q_bits(), 160);
        assert_eq!(ProviderKeyGen::new(2048).q_bits(), 256);
        assert_eq!(ProviderKeyGen::new(3072).q_bits(), 256);
    }

    #[test]
    fn test_provider_512_bit_parameters() {
        let mut rng = rng(5);
        let material = ProviderKeyGen::new(512).generate(&mut rng).unwrap();
        assert_eq!(material.params.p.bits(), 512);
        assert_eq!(material.params.q.bits(), 160);
        assert!(material.params.is_consistent());
    }

    #[test]
    fn test_find_generator_exhausts() {
        // (p-1)/q = 1 for p = 3, q = 2 would need h = 2 = p - 1, which is excluded.
        let err = find_generator(&BigUint::from(3u32), &BigUint::from(2u32), 10).unwrap_err();
        assert_eq!(
            err,
            SchnorrError::KeyGeneration(KeyGenFailure::GeneratorSearchExhausted { attempts: 0 })
        );

        // A zero limit stops the search before any h is tried.
        let p = BigUint::from(23u32);
        let q = BigUint::from(11u32);
        assert!(find_generator(&p, &q, 0).is_err());
        let g = find_generator(&p, &q, 1).unwrap();
        assert_eq!(g, BigUint::from(4u32));
    }

    #[test]
    fn test_domain_params_encoding() {
        let params = DomainParams {
            p: BigUint::from(23u32),
            q: BigUint::from(11u32),
            g: BigUint::from(4u32),
        };
        assert!(params.is_consistent());
        let bytes = params.to_bytes().unwrap();
        assert_eq!(DomainParams::from_bytes(&bytes).unwrap(), params);
        assert!(DomainParams::from_bytes(&[0xff]).is_err());
    }

    #[test]
    fn test_keypair_debug_redacts_secret() {
        let params = DomainParams {
            p: BigUint::from(23u32),
            q: BigUint::from(11u32),
            g: BigUint::from(4u32),
        };
        let keys = KeyPair::from_secret(&params, BigUint::from(7u32));
        let rendered = format!("{keys:?}");
        assert!(rendered.contains("<redacted>"));
        assert_eq!(keys.public, BigUint::from(4u32).modpow(&BigUint::from(7u32), &params.p));
    }
}
