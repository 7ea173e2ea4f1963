//! Cryptographic primitives for the BelaChain reward ledger.
//!
//! - **Ed25519** for attestation signing and verification
//! - **Blake2b-256** for attestation digests and snapshot integrity hashes

pub mod hash;
pub mod keys;
pub mod sign;

pub use hash::{blake2b_256, blake2b_256_multi};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature};
