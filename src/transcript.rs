//! Capacity-bounded byte transcript hashed into the challenge.

use crate::constants::DEFAULT_TRANSCRIPT_CAPACITY;
use crate::error::SchnorrError;

/// A growable byte sequence with a hard capacity limit.
///
/// The transcript holds a registered message followed by any auxiliary
/// values appended to it (the commitment while signing, the recomputed
/// verifier while verifying). Writes that would exceed the capacity are
/// rejected with [`SchnorrError::BufferOverflow`] and leave the transcript
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    bytes: Vec<u8>,
    capacity: usize,
}

impl Transcript {
    /// Creates an empty transcript that will hold at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Transcript {
            bytes: Vec::new(),
            capacity,
        }
    }

    /// Replaces the contents with `message`.
    ///
    /// # Errors
    ///
    /// Returns [`SchnorrError::BufferOverflow`] if `message` is longer than the capacity.
    pub fn register(&mut self, message: &[u8]) -> Result<(), SchnorrError> {
        self.check_fits(message.len())?;
        self.bytes.clear();
        self.bytes.extend_from_slice(message);
        Ok(())
    }

    /// Appends `data` after the current contents.
    ///
    /// # Errors
    ///
    /// Returns [`SchnorrError::BufferOverflow`] if the result would exceed the capacity.
    pub fn append(&mut self, data: &[u8]) -> Result<(), SchnorrError> {
        let required = self.bytes.len().saturating_add(data.len());
        self.check_fits(required)?;
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    /// Returns a copy of this transcript extended with `data`.
    ///
    /// `self` is not modified, so the same registered message can seed any
    /// number of sign and verify calls.
    pub fn extended_with(&self, data: &[u8]) -> Result<Transcript, SchnorrError> {
        let mut fork = self.clone();
        fork.append(data)?;
        Ok(fork)
    }

    /// Removes all bytes, keeping the capacity limit.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Maximum number of bytes the transcript accepts.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn check_fits(&self, required: usize) -> Result<(), SchnorrError> {
        if required > self.capacity {
            tracing::warn!(required, capacity = self.capacity, "transcript overflow rejected");
            return Err(SchnorrError::BufferOverflow {
                capacity: self.capacity,
                required,
            });
        }
        Ok(())
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSCRIPT_CAPACITY)
    }
}
