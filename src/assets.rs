//! Storage for the algebraic values of the protocol.

use core::fmt;

use num_bigint_dig::BigUint;
use num_traits::Zero;

use crate::constants::SLOT_COUNT;

/// A named register in the [`AssetStore`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Prime modulus.
    P,
    /// Prime order of the subgroup generated by `g`.
    Q,
    /// Generator of the order-`q` subgroup.
    G,
    /// Signing nonce.
    K,
    /// Commitment `g^k mod p`.
    R,
    /// Response `k + sk * e mod q`.
    S,
    /// Challenge.
    E,
    /// Verifier recomputed during verification.
    V,
    /// Challenge recomputed during verification.
    RecomputedE,
    /// Public key `g^sk mod p`.
    PublicKey,
    /// Secret key.
    SecretKey,
}

impl Slot {
    /// Every slot, in storage order.
    pub const ALL: [Slot; SLOT_COUNT] = [
        Slot::P,
        Slot::Q,
        Slot::G,
        Slot::K,
        Slot::R,
        Slot::S,
        Slot::E,
        Slot::V,
        Slot::RecomputedE,
        Slot::PublicKey,
        Slot::SecretKey,
    ];

    /// Short name used when printing the store.
    pub fn name(self) -> &'static str {
        match self {
            Slot::P => "p",
            Slot::Q => "q",
            Slot::G => "g",
            Slot::K => "k",
            Slot::R => "r",
            Slot::S => "s",
            Slot::E => "e",
            Slot::V => "v",
            Slot::RecomputedE => "e'",
            Slot::PublicKey => "pk",
            Slot::SecretKey => "sk",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A fixed table of arbitrary-precision integers, one per [`Slot`].
///
/// Values are copied in on [`set`](AssetStore::set) and handed out as shared
/// references, so the store is the sole owner of every integer it holds.
/// Every slot starts at zero.
#[derive(Clone, PartialEq, Eq)]
pub struct AssetStore {
    slots: [BigUint; SLOT_COUNT],
}

impl AssetStore {
    /// Creates a store with every slot set to zero.
    pub fn new() -> Self {
        AssetStore {
            slots: core::array::from_fn(|_| BigUint::zero()),
        }
    }

    /// Copies `value` into `slot`.
    pub fn set(&mut self, slot: Slot, value: &BigUint) {
        self.slots[slot.index()].clone_from(value);
    }

    /// Returns the value held in `slot`.
    pub fn get(&self, slot: Slot) -> &BigUint {
        &self.slots[slot.index()]
    }

    /// Sets every slot back to zero.
    pub fn reset(&mut self) {
        for value in self.slots.iter_mut() {
            value.set_zero();
        }
    }

    /// Returns `true` when every slot is zero.
    pub fn is_cleared(&self) -> bool {
        self.slots.iter().all(Zero::is_zero)
    }
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new()
    }
}

// Secret material is redacted; use `Display` for a full dump.
impl fmt::Debug for AssetStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for slot in Slot::ALL {
            match slot {
                Slot::SecretKey | Slot::K => map.entry(&slot.name(), &"<redacted>"),
                _ => map.entry(&slot.name(), &format_args!("{:X}", self.get(slot))),
            };
        }
        map.finish()
    }
}

/// One `name<TAB>HEX` line per slot.
impl fmt::Display for AssetStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in Slot::ALL {
            writeln!(f, "{}\t{:X}", slot.name(), self.get(slot))?;
        }
        Ok(())
    }
}
