//! Ledger parameters: every tunable constant of the reward ledger in one place.
//!
//! Parameters are fixed when the ledger is constructed. The only values that
//! change afterwards are the administrative flags held in global state.

use crate::amount::{BgpAmount, UsdtAmount};
use crate::tables::{LevelTable, ReferralDepthTable};
use serde::{Deserialize, Serialize};

/// USD micro-units (1 USD = 1_000_000).
pub const USD_MICROS: u128 = 1_000_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerParams {
    // ── Interaction ──────────────────────────────────────────────────────
    /// BGP minted to the account on every successful interaction.
    pub daily_bgp_reward: BgpAmount,

    /// Contribution credited to the interacting account.
    ///
    /// Scored at the referral table's 100 BGP : 1 ratio, so the default
    /// 2000 BGP reward credits 20, not the nominal 2000. Set this equal to
    /// the whole-BGP reward to credit one point per BGP instead.
    pub interaction_contribution: u64,

    /// USD target of the interaction fee, in micro-dollars. Default 0.70 USD.
    pub interaction_fee_usd_micros: u128,

    /// Oracle rates older than this are refused.
    pub oracle_max_age_secs: u64,

    /// Whether `interact` requires a bound network identity.
    pub require_identity: bool,

    // ── Early bonus ──────────────────────────────────────────────────────
    /// One-time bonus for a first interaction by an account without a referrer.
    pub early_bird_bonus: BgpAmount,

    /// Maximum number of accounts that may ever receive the bonus.
    pub early_bird_limit: u64,

    // ── Withdrawal ───────────────────────────────────────────────────────
    /// Floor for USDT withdrawals.
    pub min_usdt_withdrawal: UsdtAmount,

    // ── Anti-sybil ───────────────────────────────────────────────────────
    /// Accounts allowed per network identity.
    pub max_accounts_per_identity: u32,

    /// Seconds an identity attestation stays valid after issuance.
    pub attestation_validity_secs: u64,

    /// Tolerated attester clock lead (attestations issued "in the future").
    pub attestation_max_skew_secs: u64,

    // ── Tables ───────────────────────────────────────────────────────────
    pub level_table: LevelTable,
    pub referral_table: ReferralDepthTable,
}

impl LedgerParams {
    /// Production defaults.
    pub fn bela_defaults() -> Self {
        Self {
            daily_bgp_reward: BgpAmount::from_whole(2_000),
            interaction_contribution: 20,
            interaction_fee_usd_micros: 700_000, // 0.70 USD
            oracle_max_age_secs: 3_600,
            require_identity: true,

            early_bird_bonus: BgpAmount::from_whole(5_000),
            early_bird_limit: 1_000,

            min_usdt_withdrawal: UsdtAmount::from_whole(10),

            max_accounts_per_identity: 3,
            attestation_validity_secs: 300,
            attestation_max_skew_secs: 60,

            level_table: LevelTable::standard(),
            referral_table: ReferralDepthTable::standard(),
        }
    }
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self::bela_defaults()
    }
}
