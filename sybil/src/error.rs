use bela_types::{AccountAddress, NetworkIdentity, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SybilError {
    #[error("identity registry is paused")]
    Paused,

    #[error("invalid attestation: {0}")]
    InvalidAttestation(String),

    #[error("attestation issued at {issued_at} is outside the validity window at {now}")]
    AttestationExpired { issued_at: Timestamp, now: Timestamp },

    #[error("account {0} already has a bound identity")]
    AlreadyBound(AccountAddress),

    #[error("identity {identity} already has {cap} accounts")]
    IdentityCapExceeded { identity: NetworkIdentity, cap: u32 },

    #[error("account {0} is blacklisted")]
    AccountBlacklisted(AccountAddress),

    #[error("identity {0} is blacklisted")]
    IdentityBlacklisted(NetworkIdentity),

    #[error("accounts-per-identity cap must be at least 1")]
    InvalidCap,
}
