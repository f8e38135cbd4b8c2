//! Two parties exchanging parameters, a public key and a signature.
//!
//! Every value crosses between the parties as encoded bytes; neither party
//! ever holds a reference into the other's state.

use dlog_schnorr::{DomainParams, SchnorrConfig, SchnorrEngine, SchnorrError, Signature};
use tracing_subscriber::EnvFilter;

/// Carries encoded values from one party to another.
#[derive(Default)]
struct Communicator {
    params: Vec<u8>,
    public_key: Vec<u8>,
    message: Vec<u8>,
    signature: Vec<u8>,
}

impl Communicator {
    fn send(&mut self, signer: &SchnorrEngine, signature: &Signature) -> Result<(), SchnorrError> {
        self.params = signer.domain_params().to_bytes()?;
        self.public_key = signer.public_key().to_bytes_be();
        self.message = signer.message().to_vec();
        self.signature = signature.to_bytes()?;
        Ok(())
    }

    fn deliver(&self, verifier: &mut SchnorrEngine) -> Result<Signature, SchnorrError> {
        verifier.set_domain_params(&DomainParams::from_bytes(&self.params)?);
        verifier.set_public_key(&dlog_schnorr::BigUint::from_bytes_be(&self.public_key));
        verifier.register_message(&self.message)?;
        let signature = Signature::from_bytes(&self.signature)?;
        verifier.set_signature_pair(&signature);
        Ok(signature)
    }
}

fn main() -> Result<(), SchnorrError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = SchnorrConfig::toy(20, 8);
    let mut alice = SchnorrEngine::new(&config);
    let mut bob = SchnorrEngine::new(&config);

    alice.keygen()?;
    let signature = alice.sign_message("message 1")?;

    let mut channel = Communicator::default();
    channel.send(&alice, &signature)?;
    channel.deliver(&mut bob)?;

    let verdict = bob.verify()?;
    tracing::info!(?verdict, "bob verified alice's signature");

    bob.register_message("message 2")?;
    let verdict = bob.verify()?;
    tracing::info!(?verdict, "bob verified the signature against another message");
    Ok(())
}
