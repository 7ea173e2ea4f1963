//! Nullable attester: signs identity attestations with a fixed key.

use bela_crypto::keypair_from_seed;
use bela_sybil::{sign_attestation, Ed25519AttestationVerifier, IdentityAttestation};
use bela_types::{AccountAddress, KeyPair, NetworkIdentity, PublicKey, Timestamp};
use std::net::IpAddr;

/// Stands in for the off-chain observer that attests client IPs.
pub struct NullAttester {
    keypair: KeyPair,
}

impl NullAttester {
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            keypair: keypair_from_seed(&seed),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public
    }

    /// A verifier that trusts this attester.
    pub fn verifier(&self) -> Ed25519AttestationVerifier {
        Ed25519AttestationVerifier::new(self.keypair.public)
    }

    pub fn attest(&self, subject: &AccountAddress, identity: NetworkIdentity, issued_at: Timestamp) -> IdentityAttestation {
        sign_attestation(subject.clone(), identity, issued_at, &self.keypair.private)
    }

    pub fn attest_ip(&self, subject: &AccountAddress, ip: IpAddr, issued_at: Timestamp) -> IdentityAttestation {
        self.attest(subject, NetworkIdentity::from_ip(ip), issued_at)
    }
}

impl Default for NullAttester {
    fn default() -> Self {
        Self::new([0xA7; 32])
    }
}
