//! The signing and verification engine.

use core::fmt;
use std::time::Instant;

use num_bigint_dig::BigUint;
use num_traits::{One, Zero};
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, RngCore, SeedableRng};

use crate::arith::{mod_inverse, random_nonzero_below, to_be_bytes};
use crate::assets::{AssetStore, Slot};
use crate::config::SchnorrConfig;
use crate::constants::DIGEST_BYTES;
use crate::error::{Precondition, SchnorrError};
use crate::hash::ChallengeHasher;
use crate::keygen::{DomainParams, KeyGenerator, KeyMaterial};
use crate::readiness::Readiness;
use crate::signature::{Signature, Verification};
use crate::transcript::Transcript;

/// One party's private signing state.
///
/// The engine owns an [`AssetStore`] with the protocol values, the registered
/// message, and the RNG used for keys and nonces. Values move between engines
/// only by copy, through the getters and setters.
///
/// An engine is not meant to be shared between threads; wrap it in a lock if
/// that is needed.
///
/// # Example
///
/// ```
/// use dlog_schnorr::{SchnorrConfig, SchnorrEngine};
///
/// let mut engine = SchnorrEngine::new(&SchnorrConfig::toy(20, 8));
/// engine.keygen().unwrap();
/// engine.register_message("message 1").unwrap();
///
/// let signature = engine.sign().unwrap();
/// assert!(engine.verify().unwrap().is_valid());
/// assert_eq!(engine.signature(), signature);
/// ```
pub struct SchnorrEngine {
    assets: AssetStore,
    readiness: Readiness,
    message: Transcript,
    hasher: ChallengeHasher,
    generator: Box<dyn KeyGenerator>,
    rng: ChaCha20Rng,
}

impl SchnorrEngine {
    /// Creates an engine using the strategy selected by `config.mode`.
    pub fn new(config: &SchnorrConfig) -> Self {
        let generator = config.mode.key_generator(config.generator_search_limit);
        Self::with_generator(generator, config)
    }

    /// Creates an engine with a caller-supplied key-generation strategy.
    ///
    /// `config.mode` is ignored; every other setting applies.
    pub fn with_generator(generator: Box<dyn KeyGenerator>, config: &SchnorrConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha20Rng::from_seed(seed),
            None => {
                let mut seed = [0u8; 32];
                OsRng.fill_bytes(&mut seed);
                ChaCha20Rng::from_seed(seed)
            }
        };
        SchnorrEngine {
            assets: AssetStore::new(),
            readiness: Readiness::default(),
            message: Transcript::new(config.transcript_capacity),
            hasher: ChallengeHasher::new(config.hash, generator.truncates_challenge()),
            generator,
            rng,
        }
    }

    /// Generates domain parameters and a key pair with the configured strategy.
    ///
    /// On success `p`, `q`, `g`, `pk` and `sk` are replaced and both key flags
    /// are set. On failure nothing changes.
    pub fn keygen(&mut self) -> Result<(), SchnorrError> {
        let material = self.generator.generate(&mut self.rng)?;
        self.load_key_material(&material);
        Ok(())
    }

    /// Installs parameters and keys produced elsewhere, e.g. by a shared generator.
    pub fn load_key_material(&mut self, material: &KeyMaterial) {
        self.set_domain_params(&material.params);
        self.assets.set(Slot::PublicKey, &material.keys.public);
        self.assets.set(Slot::SecretKey, &material.keys.secret);
        self.readiness.mark_keys();
    }

    /// Registers the message to sign or verify, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`SchnorrError::BufferOverflow`] if the message exceeds the
    /// transcript capacity; the previous message stays registered.
    pub fn register_message(&mut self, message: impl AsRef<[u8]>) -> Result<(), SchnorrError> {
        let message = message.as_ref();
        self.message.register(message)?;
        self.readiness.mark_message();
        tracing::debug!(len = message.len(), "registered message");
        Ok(())
    }

    /// Returns the digest of the registered message.
    pub fn hash(&self) -> Result<[u8; DIGEST_BYTES], SchnorrError> {
        self.readiness.require_message()?;
        Ok(self.hasher.digest(&self.message))
    }

    /// Returns the digest of the registered message as an integer.
    ///
    /// In toy mode the value is shifted right by `n` bits; otherwise `n` is ignored.
    pub fn hash_truncated(&self, n: usize) -> Result<BigUint, SchnorrError> {
        self.readiness.require_message()?;
        Ok(self.hasher.challenge(&self.message, n))
    }

    /// Signs the registered message.
    ///
    /// This implements Schnorr signing over the stored group:
    /// 1. Samples a nonce `k` uniformly from `[1, q-1]`
    /// 2. Computes the commitment `r = g^k mod p`
    /// 3. Derives the challenge `e = H(message || r)`
    /// 4. Computes the response `s = (k + sk·e) mod q`
    ///
    /// The registered message itself is left untouched; the commitment is
    /// appended to a copy.
    ///
    /// # Errors
    ///
    /// - [`SchnorrError::NotReady`] if the secret key, message or parameters are missing
    /// - [`SchnorrError::BufferOverflow`] if the message leaves no room for `r`
    pub fn sign(&mut self) -> Result<Signature, SchnorrError> {
        self.readiness.require_signing()?;
        self.require_domain_params()?;
        let start = Instant::now();

        let (k, r, e, s) = {
            let p = self.assets.get(Slot::P);
            let q = self.assets.get(Slot::Q);
            let g = self.assets.get(Slot::G);
            let sk = self.assets.get(Slot::SecretKey);

            let k = random_nonzero_below(&mut self.rng, q);
            let r = g.modpow(&k, p);

            let transcript = self.message.extended_with(&to_be_bytes(&r))?;
            let e = self.hasher.challenge(&transcript, self.hasher.shift_for_order(q));
            let s = (&k + sk * &e) % q;
            (k, r, e, s)
        };

        self.assets.set(Slot::K, &k);
        self.assets.set(Slot::R, &r);
        self.assets.set(Slot::E, &e);
        self.assets.set(Slot::S, &s);
        self.readiness.mark_signature();

        tracing::debug!(elapsed = ?start.elapsed(), "signed message");
        Ok(Signature { s, e })
    }

    /// Verifies the stored signature `(s, e)` against the registered message.
    ///
    /// This recomputes the commitment as `v = g^s · pk^-e mod p`, which equals
    /// `g^k` exactly when the signature is genuine, then checks that
    /// `H(message || v)` reproduces `e`.
    ///
    /// # Returns
    ///
    /// [`Verification::Valid`] or [`Verification::Invalid`]. The recomputed
    /// values are stored in [`Slot::V`] and [`Slot::RecomputedE`].
    ///
    /// # Errors
    ///
    /// - [`SchnorrError::NotReady`] if the message, public key, signature or parameters are missing
    /// - [`SchnorrError::NonInvertible`] if `pk` has no inverse modulo `p`
    /// - [`SchnorrError::BufferOverflow`] if the message leaves no room for `v`
    pub fn verify(&mut self) -> Result<Verification, SchnorrError> {
        self.readiness.require_verification()?;
        self.require_domain_params()?;
        let start = Instant::now();

        let (v, recomputed, verdict) = {
            let p = self.assets.get(Slot::P);
            let q = self.assets.get(Slot::Q);
            let g = self.assets.get(Slot::G);
            let pk = self.assets.get(Slot::PublicKey);
            let s = self.assets.get(Slot::S);
            let e = self.assets.get(Slot::E);

            let u1 = g.modpow(s, p);
            let Some(pk_inverse) = mod_inverse(pk, p) else {
                tracing::warn!("public key has no inverse modulo p");
                return Err(SchnorrError::NonInvertible);
            };
            let u2 = pk_inverse.modpow(e, p);
            let v = (u1 * u2) % p;

            let transcript = self.message.extended_with(&to_be_bytes(&v))?;
            let recomputed = self.hasher.challenge(&transcript, self.hasher.shift_for_order(q));
            let verdict = Verification::from(&recomputed == e);
            (v, recomputed, verdict)
        };

        self.assets.set(Slot::V, &v);
        self.assets.set(Slot::RecomputedE, &recomputed);

        tracing::debug!(?verdict, elapsed = ?start.elapsed(), "verified signature");
        Ok(verdict)
    }

    /// Registers `message` and signs it.
    ///
    /// On failure the previously registered message and readiness flags are
    /// restored, so a refused call leaves the engine as it found it.
    pub fn sign_message(&mut self, message: impl AsRef<[u8]>) -> Result<Signature, SchnorrError> {
        let saved_message = self.message.clone();
        let saved_readiness = self.readiness;

        let result = self.register_message(message).and_then(|()| self.sign());
        if result.is_err() {
            self.message = saved_message;
            self.readiness = saved_readiness;
        }
        result
    }

    /// Registers `message`, installs `signature` and verifies it.
    ///
    /// On failure the previously registered message, signature pair and
    /// readiness flags are restored.
    pub fn verify_message(
        &mut self,
        message: impl AsRef<[u8]>,
        signature: &Signature,
    ) -> Result<Verification, SchnorrError> {
        let saved_message = self.message.clone();
        let saved_readiness = self.readiness;
        let saved_signature = self.signature();

        let result = self.register_message(message).and_then(|()| {
            self.set_signature_pair(signature);
            self.verify()
        });
        if result.is_err() {
            self.message = saved_message;
            self.readiness = saved_readiness;
            self.set_response(&saved_signature.s);
            self.set_challenge(&saved_signature.e);
        }
        result
    }

    /// Zeroes every asset, clears every flag and forgets the registered message.
    pub fn reset(&mut self) {
        self.assets.reset();
        self.readiness.clear();
        self.message.clear();
        tracing::debug!("engine reset");
    }

    fn require_domain_params(&self) -> Result<(), SchnorrError> {
        let p = self.assets.get(Slot::P);
        let q = self.assets.get(Slot::Q);
        let g = self.assets.get(Slot::G);
        // A nonce needs at least one value in [1, q-1].
        if p <= &BigUint::one() || q <= &BigUint::one() || g.is_zero() {
            tracing::warn!("domain parameters missing");
            return Err(SchnorrError::NotReady(Precondition::DomainParameters));
        }
        Ok(())
    }

    pub fn p(&self) -> &BigUint {
        self.assets.get(Slot::P)
    }

    pub fn q(&self) -> &BigUint {
        self.assets.get(Slot::Q)
    }

    pub fn g(&self) -> &BigUint {
        self.assets.get(Slot::G)
    }

    pub fn public_key(&self) -> &BigUint {
        self.assets.get(Slot::PublicKey)
    }

    pub fn secret_key(&self) -> &BigUint {
        self.assets.get(Slot::SecretKey)
    }

    /// The response `s` of the current signature.
    pub fn response(&self) -> &BigUint {
        self.assets.get(Slot::S)
    }

    /// The challenge `e` of the current signature.
    pub fn challenge(&self) -> &BigUint {
        self.assets.get(Slot::E)
    }

    pub fn asset(&self, slot: Slot) -> &BigUint {
        self.assets.get(slot)
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    pub fn domain_params(&self) -> DomainParams {
        DomainParams {
            p: self.p().clone(),
            q: self.q().clone(),
            g: self.g().clone(),
        }
    }

    pub fn signature(&self) -> Signature {
        Signature::new(self.response().clone(), self.challenge().clone())
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// The registered message bytes.
    pub fn message(&self) -> &[u8] {
        self.message.as_bytes()
    }

    pub fn is_toy_mode(&self) -> bool {
        self.hasher.truncates()
    }

    pub fn set_p(&mut self, p: &BigUint) {
        self.assets.set(Slot::P, p);
    }

    pub fn set_q(&mut self, q: &BigUint) {
        self.assets.set(Slot::Q, q);
    }

    pub fn set_g(&mut self, g: &BigUint) {
        self.assets.set(Slot::G, g);
    }

    pub fn set_domain_params(&mut self, params: &DomainParams) {
        self.assets.set(Slot::P, &params.p);
        self.assets.set(Slot::Q, &params.q);
        self.assets.set(Slot::G, &params.g);
    }

    /// Installs a public key, e.g. a peer's key for verification only.
    pub fn set_public_key(&mut self, pk: &BigUint) {
        self.assets.set(Slot::PublicKey, pk);
        self.readiness.mark_public_key();
    }

    pub fn set_secret_key(&mut self, sk: &BigUint) {
        self.assets.set(Slot::SecretKey, sk);
        self.readiness.mark_secret_key();
    }

    pub fn set_response(&mut self, s: &BigUint) {
        self.assets.set(Slot::S, s);
    }

    pub fn set_challenge(&mut self, e: &BigUint) {
        self.assets.set(Slot::E, e);
    }

    /// Installs both halves of a signature and marks it ready for verification.
    pub fn set_signature_pair(&mut self, signature: &Signature) {
        self.set_response(&signature.s);
        self.set_challenge(&signature.e);
        self.readiness.mark_signature();
    }

    /// Turns challenge truncation on or off.
    ///
    /// A verifier receiving toy parameters from a peer must enable this to
    /// reproduce the peer's challenges.
    pub fn set_toy_mode(&mut self, toy: bool) {
        self.hasher.set_truncate(toy);
    }
}

impl fmt::Debug for SchnorrEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchnorrEngine")
            .field("assets", &self.assets)
            .field("readiness", &self.readiness)
            .field("message_len", &self.message.len())
            .field("hasher", &self.hasher)
            .field("generator", &self.generator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::KeyPair;

    fn toy_engine(seed: u8) -> SchnorrEngine {
        SchnorrEngine::new(&SchnorrConfig::toy(20, 8).with_seed([seed; 32]))
    }

    // p = 23, q = 11, g = 4 generates the order-11 subgroup.
    fn tiny_params() -> DomainParams {
        DomainParams {
            p: BigUint::from(23u32),
            q: BigUint::from(11u32),
            g: BigUint::from(4u32),
        }
    }

    #[test]
    fn test_toy_sign_verify() {
        let mut engine = toy_engine(1);
        engine.keygen().unwrap();
        engine.register_message("message 1").unwrap();
        let signature = engine.sign().unwrap();

        engine.register_message("message 1").unwrap();
        assert_eq!(engine.verify().unwrap(), Verification::Valid);
        assert_eq!(engine.asset(Slot::V), engine.asset(Slot::R));
        assert_eq!(engine.asset(Slot::RecomputedE), &signature.e);
    }

    #[test]
    fn test_verify_without_reregistering() {
        let mut engine = toy_engine(2);
        engine.keygen().unwrap();
        engine.register_message("message 1").unwrap();
        engine.sign().unwrap();
        assert!(engine.verify().unwrap().is_valid());
        assert_eq!(engine.message(), b"message 1");
    }

    #[test]
    fn test_sign_is_refused_before_keygen() {
        let mut engine = toy_engine(3);
        engine.register_message("message 1").unwrap();
        assert_eq!(
            engine.sign().unwrap_err(),
            SchnorrError::NotReady(Precondition::SecretKey)
        );
        assert!(engine.assets().is_cleared());
    }

    #[test]
    fn test_sign_is_refused_without_message() {
        let mut engine = toy_engine(4);
        engine.keygen().unwrap();
        let before = engine.assets().clone();
        assert_eq!(
            engine.sign().unwrap_err(),
            SchnorrError::NotReady(Precondition::Message)
        );
        assert_eq!(engine.assets(), &before);
    }

    #[test]
    fn test_verify_is_refused_without_signature() {
        let mut engine = toy_engine(5);
        engine.keygen().unwrap();
        engine.register_message("message 1").unwrap();
        assert_eq!(
            engine.verify().unwrap_err(),
            SchnorrError::NotReady(Precondition::Signature)
        );
    }

    #[test]
    fn test_secret_key_without_params() {
        let mut engine = toy_engine(6);
        engine.set_secret_key(&BigUint::from(3u32));
        engine.register_message("message 1").unwrap();
        assert_eq!(
            engine.sign().unwrap_err(),
            SchnorrError::NotReady(Precondition::DomainParameters)
        );
    }

    #[test]
    fn test_hash_requires_message() {
        let engine = toy_engine(7);
        assert_eq!(
            engine.hash().unwrap_err(),
            SchnorrError::NotReady(Precondition::Message)
        );
    }

    #[test]
    fn test_hash_truncated_in_toy_mode() {
        let mut engine = toy_engine(8);
        engine.register_message("message 1").unwrap();
        let full = engine.hash_truncated(0).unwrap();
        assert_eq!(full, BigUint::from_bytes_be(&engine.hash().unwrap()));
        for n in [1, 8, 100, 248, 256] {
            assert_eq!(engine.hash_truncated(n).unwrap(), &full >> n);
        }

        engine.set_toy_mode(false);
        assert_eq!(engine.hash_truncated(100).unwrap(), full);
    }

    #[test]
    fn test_toy_challenge_fits_q() {
        let mut engine = toy_engine(9);
        engine.keygen().unwrap();
        let signature = engine.sign_message("message 1").unwrap();
        assert!(signature.e.bits() <= engine.q().bits());
        assert!(&signature.s < engine.q());
    }

    #[test]
    fn test_noninvertible_public_key() {
        let mut engine = toy_engine(10);
        engine.set_domain_params(&tiny_params());
        engine.set_public_key(&BigUint::from(46u32));
        engine.set_signature_pair(&Signature::new(BigUint::from(1u32), BigUint::from(1u32)));
        engine.register_message("message 1").unwrap();

        assert_eq!(engine.verify().unwrap_err(), SchnorrError::NonInvertible);
        assert!(engine.asset(Slot::V).is_zero());
        assert!(engine.asset(Slot::RecomputedE).is_zero());
    }

    #[test]
    fn test_fixed_group_signature() {
        let mut engine = toy_engine(11);
        let params = tiny_params();
        let keys = KeyPair::from_secret(&params, BigUint::from(7u32));
        engine.load_key_material(&KeyMaterial {
            params,
            keys: keys.clone(),
        });

        let signature = engine.sign_message(b"fixed group").unwrap();
        let r = engine.asset(Slot::R).clone();
        let k = engine.asset(Slot::K).clone();
        assert_eq!(r, BigUint::from(4u32).modpow(&k, &BigUint::from(23u32)));
        assert_eq!(
            signature.s,
            (&k + &keys.secret * &signature.e) % BigUint::from(11u32)
        );
        assert!(engine.verify().unwrap().is_valid());
    }

    #[test]
    fn test_register_overflow_keeps_previous_message() {
        let mut engine =
            SchnorrEngine::new(&SchnorrConfig::toy(20, 8).with_transcript_capacity(4));
        engine.register_message("abcd").unwrap();
        assert!(matches!(
            engine.register_message("abcde"),
            Err(SchnorrError::BufferOverflow { capacity: 4, required: 5 })
        ));
        assert_eq!(engine.message(), b"abcd");
    }

    #[test]
    fn test_full_transcript_leaves_no_room_for_commitment() {
        let mut engine = SchnorrEngine::new(
            &SchnorrConfig::toy(20, 8)
                .with_transcript_capacity(4)
                .with_seed([12; 32]),
        );
        engine.keygen().unwrap();
        engine.register_message("abcd").unwrap();
        let before = engine.assets().clone();

        assert!(matches!(
            engine.sign(),
            Err(SchnorrError::BufferOverflow { capacity: 4, .. })
        ));
        assert_eq!(engine.assets(), &before);
        assert!(!engine.readiness().is_signature_ready());
    }

    #[test]
    fn test_refused_verify_message_leaves_state_untouched() {
        let mut engine = toy_engine(15);
        let before = engine.assets().clone();
        let readiness = engine.readiness();

        assert_eq!(
            engine
                .verify_message("m", &Signature::new(BigUint::from(5u32), BigUint::from(7u32)))
                .unwrap_err(),
            SchnorrError::NotReady(Precondition::PublicKey)
        );
        assert_eq!(engine.assets(), &before);
        assert_eq!(engine.readiness(), readiness);
        assert!(!engine.readiness().is_signature_ready());
        assert!(engine.message().is_empty());
    }

    #[test]
    fn test_refused_verify_message_keeps_previous_signature() {
        let mut engine = toy_engine(16);
        engine.set_domain_params(&tiny_params());
        engine.set_public_key(&BigUint::from(46u32));
        engine.register_message("earlier").unwrap();
        let installed = Signature::new(BigUint::from(2u32), BigUint::from(3u32));
        engine.set_signature_pair(&installed);
        let readiness = engine.readiness();

        assert_eq!(
            engine
                .verify_message("later", &Signature::new(BigUint::from(5u32), BigUint::from(7u32)))
                .unwrap_err(),
            SchnorrError::NonInvertible
        );
        assert_eq!(engine.signature(), installed);
        assert_eq!(engine.readiness(), readiness);
        assert_eq!(engine.message(), b"earlier");
    }

    #[test]
    fn test_refused_sign_message_leaves_state_untouched() {
        let mut engine = toy_engine(17);
        let before = engine.assets().clone();

        assert_eq!(
            engine.sign_message("m").unwrap_err(),
            SchnorrError::NotReady(Precondition::SecretKey)
        );
        assert_eq!(engine.assets(), &before);
        assert!(engine.readiness().is_idle());
        assert!(engine.message().is_empty());

        engine.register_message("earlier").unwrap();
        let readiness = engine.readiness();
        assert!(engine.sign_message("later").is_err());
        assert_eq!(engine.message(), b"earlier");
        assert_eq!(engine.readiness(), readiness);
    }

    #[test]
    fn test_individual_domain_setters() {
        let mut engine = toy_engine(18);
        let params = tiny_params();
        engine.set_p(&params.p);
        engine.set_q(&params.q);
        engine.set_g(&params.g);
        assert_eq!(engine.domain_params(), params);
        assert_eq!(engine.p(), &BigUint::from(23u32));
        assert_eq!(engine.q(), &BigUint::from(11u32));
        assert_eq!(engine.g(), &BigUint::from(4u32));
        assert!(!engine.readiness().is_secret_key_ready());
    }

    #[test]
    fn test_reset() {
        let mut engine = toy_engine(13);
        engine.keygen().unwrap();
        engine.sign_message("message 1").unwrap();
        assert!(!engine.assets().is_cleared());

        engine.reset();
        assert!(engine.readiness().is_idle());
        assert!(engine.assets().is_cleared());
        assert!(engine.message().is_empty());

        engine.reset();
        assert!(engine.readiness().is_idle());
        assert!(engine.assets().is_cleared());
    }

    #[test]
    fn test_seeded_engines_agree() {
        let mut a = toy_engine(14);
        let mut b = toy_engine(14);
        a.keygen().unwrap();
        b.keygen().unwrap();
        assert_eq!(a.domain_params(), b.domain_params());
        assert_eq!(a.sign_message("same").unwrap(), b.sign_message("same").unwrap());
    }
}
