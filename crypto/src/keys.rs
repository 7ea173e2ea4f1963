//! Ed25519 key generation for the identity attester.

use bela_types::{KeyPair, PrivateKey, PublicKey};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

/// Generate a new Ed25519 key pair from a secure random source.
pub fn generate_keypair() -> KeyPair {
    keypair_from_signing_key(SigningKey::generate(&mut OsRng))
}

/// Derive the public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    PublicKey(SigningKey::from_bytes(&private.0).verifying_key().to_bytes())
}

/// Reconstruct a full key pair from a private key.
pub fn keypair_from_private(private: PrivateKey) -> KeyPair {
    let public = public_from_private(&private);
    KeyPair { public, private }
}

/// Derive a key pair from a 32-byte seed (deterministic; used by test attesters).
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    keypair_from_signing_key(SigningKey::from_bytes(seed))
}

fn keypair_from_signing_key(signing_key: SigningKey) -> KeyPair {
    KeyPair {
        public: PublicKey(signing_key.verifying_key().to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}
