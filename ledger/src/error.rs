use crate::schedule::Slot;
use bela_sybil::SybilError;
use bela_types::{AccountAddress, NativeAmount, Timestamp, UsdtAmount};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::Token;

/// Failure categories exposed to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Malformed input or a request that can never succeed as phrased.
    Validation,
    /// The request conflicts with state already recorded.
    StateConflict,
    /// The caller is not allowed to perform the operation right now.
    Authorization,
    /// A limit, balance or external dependency prevents the operation.
    Resource,
    /// The identity attestation is not acceptable.
    Attestation,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // ── Validation ───────────────────────────────────────────────────────
    #[error("an account cannot refer itself")]
    SelfReferral,

    #[error("referrer {0} has no account")]
    UnknownReferrer(AccountAddress),

    #[error("binding {referrer} as referrer of {account} would create a cycle")]
    ReferralCycle {
        account: AccountAddress,
        referrer: AccountAddress,
    },

    #[error("level {0} does not exist")]
    InvalidLevel(u8),

    // ── State conflicts ──────────────────────────────────────────────────
    #[error("account {0} is already registered")]
    AlreadyRegistered(AccountAddress),

    #[error("level {0} already claimed")]
    AlreadyClaimed(u8),

    #[error("level {level} not reached (contribution {contribution})")]
    NotReached { level: u8, contribution: u64 },

    #[error("{slot} slot already used today")]
    SlotAlreadyClaimed { slot: Slot },

    // ── Authorization ────────────────────────────────────────────────────
    #[error("caller {0} is not the owner")]
    NotOwner(AccountAddress),

    #[error("ledger is paused")]
    Paused,

    #[error("account {0} has no bound network identity")]
    IdentityRequired(AccountAddress),

    // ── Resources ────────────────────────────────────────────────────────
    #[error("fee {paid} is below the minimum {required}")]
    InsufficientFee {
        paid: NativeAmount,
        required: NativeAmount,
    },

    #[error("nothing to withdraw")]
    NothingToWithdraw,

    #[error("pending {pending} is below the withdrawal minimum {minimum}")]
    BelowMinimum {
        pending: UsdtAmount,
        minimum: UsdtAmount,
    },

    #[error("price oracle unavailable: {0}")]
    OracleUnavailable(#[from] OracleError),

    #[error("token ledger: {0}")]
    Token(#[from] TokenError),

    // ── Registry ─────────────────────────────────────────────────────────
    #[error(transparent)]
    Sybil(#[from] SybilError),
}

impl LedgerError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::SelfReferral
            | Self::UnknownReferrer(_)
            | Self::ReferralCycle { .. }
            | Self::InvalidLevel(_) => ErrorClass::Validation,

            Self::AlreadyRegistered(_)
            | Self::AlreadyClaimed(_)
            | Self::NotReached { .. }
            | Self::SlotAlreadyClaimed { .. } => ErrorClass::StateConflict,

            Self::NotOwner(_) | Self::Paused | Self::IdentityRequired(_) => ErrorClass::Authorization,

            Self::BelowMinimum { .. }
            | Self::NothingToWithdraw
            | Self::InsufficientFee { .. }
            | Self::OracleUnavailable(_)
            | Self::Token(_) => ErrorClass::Resource,

            Self::Sybil(e) => match e {
                SybilError::Paused
                | SybilError::AccountBlacklisted(_)
                | SybilError::IdentityBlacklisted(_) => ErrorClass::Authorization,
                SybilError::InvalidAttestation(_) | SybilError::AttestationExpired { .. } => {
                    ErrorClass::Attestation
                }
                SybilError::AlreadyBound(_) => ErrorClass::StateConflict,
                SybilError::IdentityCapExceeded { .. } => ErrorClass::Resource,
                SybilError::InvalidCap => ErrorClass::Validation,
            },
        }
    }

    /// Whether the failure is a blacklist hit on the account or its identity.
    pub fn is_blacklisted(&self) -> bool {
        matches!(
            self,
            Self::Sybil(SybilError::AccountBlacklisted(_) | SybilError::IdentityBlacklisted(_))
        )
    }
}

/// Errors reported by a [`crate::TokenLedger`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("{token} balance of {holder} is {available}, needed {needed}")]
    InsufficientBalance {
        token: Token,
        holder: AccountAddress,
        needed: u128,
        available: u128,
    },

    #[error("balance overflow for {0}")]
    Overflow(AccountAddress),

    #[error("token ledger rejected the operation: {0}")]
    Rejected(String),
}

/// Errors reported by a [`crate::PriceOracle`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("no rate available: {0}")]
    Unavailable(String),

    #[error("rate updated at {updated_at} is stale at {now}")]
    Stale { updated_at: Timestamp, now: Timestamp },

    #[error("rate {numerator}/{denominator} cannot price a fee")]
    InvalidRate { numerator: u128, denominator: u128 },
}

/// Errors from snapshot encoding, decoding and verification.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot encoding failed: {0}")]
    Encode(#[source] bincode::Error),

    #[error("snapshot decoding failed: {0}")]
    Decode(#[source] bincode::Error),

    #[error("snapshot hash mismatch")]
    HashMismatch,

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}
