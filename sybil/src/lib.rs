//! Anti-sybil registry.
//!
//! The execution substrate cannot observe a caller's network address, so the
//! address arrives as an [`IdentityAttestation`] signed by a trusted off-chain
//! attester. The registry:
//! 1. **Verifies** attestations (signature, subject, freshness window).
//! 2. **Binds** one identity per account, at most `max_accounts_per_identity` accounts per identity.
//! 3. **Blacklists** addresses and identities; an identity ban covers every bound account.
//!
//! The registry is consulted by the ledger, never the other way around.

pub mod attestation;
pub mod error;
pub mod registry;

pub use attestation::{sign_attestation, AttestationVerifier, Ed25519AttestationVerifier, IdentityAttestation};
pub use error::SybilError;
pub use registry::{AntiSybilRegistry, RegistryStats};
