//! Error types for the signature engine.

use thiserror::Error;

/// The precondition that was not satisfied when an operation was refused.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// No secret key has been generated or set.
    SecretKey,
    /// No public key has been generated or set.
    PublicKey,
    /// No message has been registered.
    Message,
    /// No signature has been produced or received.
    Signature,
    /// One of `p`, `q` or `g` is zero.
    DomainParameters,
}

impl core::fmt::Display for Precondition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Precondition::SecretKey => "secret key",
            Precondition::PublicKey => "public key",
            Precondition::Message => "message",
            Precondition::Signature => "signature",
            Precondition::DomainParameters => "domain parameters",
        };
        f.write_str(name)
    }
}

/// Reasons a key-generation strategy can fail.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyGenFailure {
    /// The requested bit lengths cannot be served by the strategy.
    UnsupportedSize { p_bits: usize, q_bits: usize },
    /// No prime with the required shape was found within the attempt budget.
    PrimeSearchExhausted { bits: usize, attempts: usize },
    /// Every `h` tried produced the identity element.
    GeneratorSearchExhausted { attempts: u64 },
}

impl core::fmt::Display for KeyGenFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            KeyGenFailure::UnsupportedSize { p_bits, q_bits } => {
                write!(f, "unsupported sizes (p: {p_bits} bits, q: {q_bits} bits)")
            }
            KeyGenFailure::PrimeSearchExhausted { bits, attempts } => {
                write!(f, "no {bits}-bit prime found after {attempts} candidates")
            }
            KeyGenFailure::GeneratorSearchExhausted { attempts } => {
                write!(f, "no generator found after {attempts} candidates")
            }
        }
    }
}

/// Errors that can occur while generating keys, signing or verifying.
///
/// A signature that fails to verify is *not* an error; it is reported as
/// [`Verification::Invalid`](crate::Verification::Invalid).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchnorrError {
    /// An operation was invoked before its inputs were available.
    #[error("not ready: missing {0}")]
    NotReady(Precondition),

    /// The key-generation strategy could not produce parameters or keys.
    #[error("key generation failed: {0}")]
    KeyGeneration(KeyGenFailure),

    /// The public key has no inverse modulo `p`.
    #[error("public key is not invertible modulo p")]
    NonInvertible,

    /// A message or appended value would exceed the transcript capacity.
    #[error("transcript overflow: {required} bytes required, capacity is {capacity}")]
    BufferOverflow { capacity: usize, required: usize },

    /// Serializing or deserializing a value failed.
    #[error("encoding failed: {0}")]
    Encoding(String),
}

impl From<KeyGenFailure> for SchnorrError {
    fn from(failure: KeyGenFailure) -> Self {
        SchnorrError::KeyGeneration(failure)
    }
}
