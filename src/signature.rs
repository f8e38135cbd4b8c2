//! The signature value and the outcome of verifying it.

use num_bigint_dig::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::SchnorrError;

/// A Schnorr signature consisting of a response and a challenge.
///
/// The signature is only meaningful together with the message it was
/// computed over and the domain parameters of the signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// The response `s = k + sk·e mod q`
    pub s: BigUint,
    /// The challenge `e = H(message || r)`
    pub e: BigUint,
}

impl Signature {
    pub fn new(s: BigUint, e: BigUint) -> Self {
        Signature { s, e }
    }

    /// Encodes the signature with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SchnorrError> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| SchnorrError::Encoding(e.to_string()))
    }

    /// Decodes a signature produced by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SchnorrError> {
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map(|(signature, _)| signature)
            .map_err(|e| SchnorrError::Encoding(e.to_string()))
    }
}

/// Outcome of a completed verification.
///
/// A mismatch is a normal result, distinct from the errors that prevent
/// verification from running at all.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Verification {
    Valid,
    Invalid,
}

impl Verification {
    pub fn is_valid(self) -> bool {
        self == Verification::Valid
    }
}

impl From<bool> for Verification {
    fn from(valid: bool) -> Self {
        if valid {
            Verification::Valid
        } else {
            Verification::Invalid
        }
    }
}
