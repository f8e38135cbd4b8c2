/*!
 * Schnorr digital signatures over prime-order subgroups of `(Z/pZ)*`.
 *
 * This crate generates domain parameters and key pairs, hashes messages into
 * challenges, and produces and verifies Schnorr signatures using
 * arbitrary-precision integers. Two key-generation strategies are available:
 *
 * - **Real** ([`ProviderKeyGen`]): standard-sized parameters. The caller picks
 *   the modulus length and the sub-prime length follows from it.
 * - **Toy** ([`ToyKeyGen`]): freely-sized parameters, including very small
 *   ones, constructed from scratch. Challenges are truncated to the size of `q`.
 *
 * # Cryptographic Details
 *
 * ## Schnorr Signature Protocol
 *
 * 1. **Key Generation**:
 *    - Choose primes `q` and `p` with `q | p - 1`, and `g` of order `q`
 *    - Choose a random secret key `sk` in `[1, q-1]`
 *    - Compute the public key `pk = g^sk mod p`
 *
 * 2. **Signature Generation**:
 *    - Choose a random nonce `k` in `[1, q-1]`
 *    - Compute the commitment `r = g^k mod p`
 *    - Compute the challenge `e = H(message || r)`
 *    - Compute the response `s = (k + sk·e) mod q`
 *    - Output the signature `(s, e)`
 *
 * 3. **Signature Verification**:
 *    - Compute `v = g^s · pk^-e mod p`
 *    - Compute `e' = H(message || v)`
 *    - Accept if `e' = e`
 *
 * `H` is SHA-256 by default (BLAKE3 is selectable); the digest is read as a
 * big-endian integer. Integers are appended to the transcript as minimal
 * big-endian bytes.
 *
 * ## Security Considerations
 *
 * - Arithmetic is not constant time; this crate is meant for study and testing
 * - Toy parameters offer no security at all
 *
 * # Example
 *
 * ```
 * use dlog_schnorr::{SchnorrConfig, SchnorrEngine, Verification};
 *
 * // The signer generates parameters and keys.
 * let mut alice = SchnorrEngine::new(&SchnorrConfig::toy(64, 32));
 * alice.keygen().unwrap();
 * let signature = alice.sign_message("hello").unwrap();
 *
 * // The verifier receives copies of the public values.
 * let mut bob = SchnorrEngine::new(&SchnorrConfig::toy(64, 32));
 * bob.set_domain_params(&alice.domain_params());
 * bob.set_public_key(alice.public_key());
 * assert_eq!(bob.verify_message("hello", &signature).unwrap(), Verification::Valid);
 * assert_eq!(bob.verify_message("goodbye", &signature).unwrap(), Verification::Invalid);
 * ```
 */

mod arith;
mod assets;
mod config;
mod constants;
mod engine;
mod error;
mod hash;
mod keygen;
mod readiness;
mod signature;
mod transcript;

pub use arith::mod_inverse;
pub use assets::{AssetStore, Slot};
pub use config::{Mode, SchnorrConfig};
pub use constants::{
    DEFAULT_GENERATOR_SEARCH_LIMIT, DEFAULT_TRANSCRIPT_CAPACITY, DIGEST_BITS, DIGEST_BYTES,
    SLOT_COUNT,
};
pub use engine::SchnorrEngine;
pub use error::{KeyGenFailure, Precondition, SchnorrError};
pub use hash::{ChallengeHasher, HashFunction};
pub use keygen::{
    DomainParams, KeyGenerator, KeyMaterial, KeyPair, ProviderKeyGen, ToyKeyGen, find_generator,
};
pub use readiness::Readiness;
pub use signature::{Signature, Verification};
pub use transcript::Transcript;

pub use num_bigint_dig::BigUint;
