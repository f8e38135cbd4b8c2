//! Precondition gates for engine operations.

use crate::error::{Precondition, SchnorrError};

/// Independent readiness flags for one engine.
///
/// Keys, message and signature can each be (re)established on their own,
/// so readiness is a record of booleans rather than a single state.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Readiness {
    secret_key: bool,
    public_key: bool,
    message: bool,
    signature: bool,
}

impl Readiness {
    pub fn is_secret_key_ready(&self) -> bool {
        self.secret_key
    }

    pub fn is_public_key_ready(&self) -> bool {
        self.public_key
    }

    pub fn is_message_ready(&self) -> bool {
        self.message
    }

    pub fn is_signature_ready(&self) -> bool {
        self.signature
    }

    /// Returns `true` if no flag is set.
    pub fn is_idle(&self) -> bool {
        *self == Readiness::default()
    }

    pub(crate) fn mark_keys(&mut self) {
        self.secret_key = true;
        self.public_key = true;
    }

    pub(crate) fn mark_secret_key(&mut self) {
        self.secret_key = true;
    }

    pub(crate) fn mark_public_key(&mut self) {
        self.public_key = true;
    }

    pub(crate) fn mark_message(&mut self) {
        self.message = true;
    }

    pub(crate) fn mark_signature(&mut self) {
        self.signature = true;
    }

    pub(crate) fn clear(&mut self) {
        *self = Readiness::default();
    }

    /// Checks the flags needed to sign.
    pub(crate) fn require_signing(&self) -> Result<(), SchnorrError> {
        self.require(self.secret_key, Precondition::SecretKey)?;
        self.require(self.message, Precondition::Message)
    }

    /// Checks the flags needed to verify.
    pub(crate) fn require_verification(&self) -> Result<(), SchnorrError> {
        self.require(self.message, Precondition::Message)?;
        self.require(self.public_key, Precondition::PublicKey)?;
        self.require(self.signature, Precondition::Signature)
    }

    pub(crate) fn require_message(&self) -> Result<(), SchnorrError> {
        self.require(self.message, Precondition::Message)
    }

    fn require(&self, flag: bool, missing: Precondition) -> Result<(), SchnorrError> {
        if flag {
            Ok(())
        } else {
            tracing::warn!(%missing, "operation refused");
            Err(SchnorrError::NotReady(missing))
        }
    }
}
