//! Fundamental types for the BelaChain reward ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account addresses, network identities, token amounts, timestamps, key material,
//! ledger parameters, and the immutable reward tables.

pub mod address;
pub mod amount;
pub mod error;
pub mod identity;
pub mod keys;
pub mod params;
pub mod tables;
pub mod time;

pub use address::AccountAddress;
pub use amount::{BgpAmount, NativeAmount, UsdtAmount, BGP_UNIT, USDT_UNIT};
pub use error::TypesError;
pub use identity::NetworkIdentity;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use params::LedgerParams;
pub use tables::{LevelTable, LevelTier, ReferralDepthTable, ReferralTier, MAX_LEVEL, MAX_REFERRAL_DEPTH};
pub use time::Timestamp;
