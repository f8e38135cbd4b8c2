//! Challenge derivation from a transcript.
//!
//! The challenge is the 256-bit digest of the transcript, read as a
//! big-endian unsigned integer. Toy parameters use a `q` far smaller than the
//! digest, so the challenge may be truncated to its high-order bits.

use num_bigint_dig::BigUint;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{DIGEST_BITS, DIGEST_BYTES};
use crate::transcript::Transcript;

/// The hash function used to derive challenges.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashFunction {
    /// SHA-256.
    #[default]
    Sha256,
    /// BLAKE3 with its default 32-byte output.
    Blake3,
}

impl HashFunction {
    /// Hashes `bytes` into a fixed-length digest.
    pub fn digest(self, bytes: &[u8]) -> [u8; DIGEST_BYTES] {
        match self {
            HashFunction::Sha256 => Sha256::digest(bytes).into(),
            HashFunction::Blake3 => *blake3::hash(bytes).as_bytes(),
        }
    }
}

/// Computes challenges over transcripts.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ChallengeHasher {
    function: HashFunction,
    truncate: bool,
}

impl ChallengeHasher {
    /// Creates a hasher. When `truncate` is set, [`challenge`](Self::challenge)
    /// discards low-order bits as requested; otherwise the shift is ignored.
    pub fn new(function: HashFunction, truncate: bool) -> Self {
        ChallengeHasher { function, truncate }
    }

    pub fn function(&self) -> HashFunction {
        self.function
    }

    pub fn truncates(&self) -> bool {
        self.truncate
    }

    pub(crate) fn set_truncate(&mut self, truncate: bool) {
        self.truncate = truncate;
    }

    /// Returns the raw digest of the transcript contents.
    pub fn digest(&self, transcript: &Transcript) -> [u8; DIGEST_BYTES] {
        self.function.digest(transcript.as_bytes())
    }

    /// Returns the digest as an integer, shifted right by `shift` bits when
    /// truncation is enabled.
    pub fn challenge(&self, transcript: &Transcript, shift: usize) -> BigUint {
        let digest = BigUint::from_bytes_be(&self.digest(transcript));
        if self.truncate { digest >> shift } else { digest }
    }

    /// The shift that keeps the top `bits(q)` bits of the digest.
    pub fn shift_for_order(&self, q: &BigUint) -> usize {
        DIGEST_BITS.saturating_sub(q.bits())
    }
}
