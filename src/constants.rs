//! Constants used throughout the signature engine.

/// Number of logical slots held by an [`AssetStore`](crate::AssetStore).
pub const SLOT_COUNT: usize = 11;

/// Default capacity of a [`Transcript`](crate::Transcript) in bytes.
pub const DEFAULT_TRANSCRIPT_CAPACITY: usize = 90_000;

/// Width of the challenge digest in bits.
///
/// Both supported hash functions (SHA-256 and BLAKE3) produce 32-byte digests.
pub const DIGEST_BITS: usize = 256;

/// Width of the challenge digest in bytes.
pub const DIGEST_BYTES: usize = DIGEST_BITS / 8;

/// Default bound on the number of `h` values tried while searching for a generator.
pub const DEFAULT_GENERATOR_SEARCH_LIMIT: u64 = 4096;

/// Smallest modulus accepted by the provider-backed generator.
pub(crate) const PROVIDER_MIN_P_BITS: usize = 512;

/// Provider-backed moduli must be a multiple of this many bits.
pub(crate) const PROVIDER_P_BITS_STEP: usize = 64;

/// Miller-Rabin rounds used for provider-backed parameters.
pub(crate) const PROVIDER_PRIMALITY_ROUNDS: usize = 64;

/// Miller-Rabin rounds used for toy parameters.
pub(crate) const TOY_PRIMALITY_ROUNDS: usize = 20;

/// Minimum number of candidates any bounded prime search will try.
pub(crate) const MIN_PRIME_ATTEMPTS: usize = 1024;
