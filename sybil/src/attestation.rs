//! Signed identity attestations.
//!
//! The attester signs `Blake2b-256(DOMAIN ‖ subject ‖ identity ‖ issued_at_le)`.
//! Binding the subject address into the digest stops an attestation issued for
//! one account being replayed by another; `issued_at` bounds replay in time.

use crate::error::SybilError;
use bela_crypto::{blake2b_256_multi, sign_message, verify_signature};
use bela_types::{AccountAddress, NetworkIdentity, PrivateKey, PublicKey, Signature, Timestamp};
use serde::{Deserialize, Serialize};

const DOMAIN: &[u8] = b"bela-identity-attestation-v1";

/// Proof from the attester that `identity` belongs to the session of `subject`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityAttestation {
    pub subject: AccountAddress,
    pub identity: NetworkIdentity,
    pub issued_at: Timestamp,
    pub signature: Signature,
}

impl IdentityAttestation {
    /// The digest the attester signs.
    pub fn digest(subject: &AccountAddress, identity: &NetworkIdentity, issued_at: Timestamp) -> [u8; 32] {
        blake2b_256_multi(&[
            DOMAIN,
            subject.as_str().as_bytes(),
            identity.as_bytes(),
            &issued_at.as_secs().to_le_bytes(),
        ])
    }

    pub fn signing_digest(&self) -> [u8; 32] {
        Self::digest(&self.subject, &self.identity, self.issued_at)
    }
}

/// Produce a signed attestation. Used by the attester service and in tests.
pub fn sign_attestation(
    subject: AccountAddress,
    identity: NetworkIdentity,
    issued_at: Timestamp,
    attester_key: &PrivateKey,
) -> IdentityAttestation {
    let digest = IdentityAttestation::digest(&subject, &identity, issued_at);
    IdentityAttestation {
        subject,
        identity,
        issued_at,
        signature: sign_message(&digest, attester_key),
    }
}

/// Trait for checking that an attestation was produced by the trusted attester.
///
/// Freshness is the registry's concern; implementations only check authenticity.
pub trait AttestationVerifier: Send + Sync {
    fn verify(&self, attestation: &IdentityAttestation) -> Result<(), SybilError>;

    /// Human-readable name of this verifier.
    fn name(&self) -> &str;
}

/// Verifies Ed25519 signatures against a single configured attester key.
#[derive(Clone, Debug)]
pub struct Ed25519AttestationVerifier {
    attester: PublicKey,
}

impl Ed25519AttestationVerifier {
    pub fn new(attester: PublicKey) -> Self {
        Self { attester }
    }

    pub fn attester(&self) -> &PublicKey {
        &self.attester
    }
}

impl AttestationVerifier for Ed25519AttestationVerifier {
    fn verify(&self, attestation: &IdentityAttestation) -> Result<(), SybilError> {
        if verify_signature(&attestation.signing_digest(), &attestation.signature, &self.attester) {
            Ok(())
        } else {
            Err(SybilError::InvalidAttestation("bad attester signature".into()))
        }
    }

    fn name(&self) -> &str {
        "ed25519"
    }
}
