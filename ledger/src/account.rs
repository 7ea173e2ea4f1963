//! Per-account ledger record.

use crate::records::RewardRecord;
use crate::schedule::SlotState;
use bela_types::{AccountAddress, BgpAmount, Timestamp, UsdtAmount, MAX_LEVEL};
use serde::{Deserialize, Serialize};

/// Bitset of claimed levels. Bit `L - 1` is level `L`. Bits are never cleared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimedLevels(u16);

impl ClaimedLevels {
    pub fn bits(&self) -> u16 {
        self.0
    }

    /// Whether `level` is claimed. Out-of-range levels read as unclaimed.
    pub fn is_claimed(&self, level: u8) -> bool {
        (1..=MAX_LEVEL).contains(&level) && self.0 & (1 << (level - 1)) != 0
    }

    pub(crate) fn set(&mut self, level: u8) {
        debug_assert!((1..=MAX_LEVEL).contains(&level));
        self.0 |= 1 << (level - 1);
    }

    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Claimed levels in ascending order.
    pub fn levels(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=MAX_LEVEL).filter(|l| self.is_claimed(*l))
    }
}

/// An account that bound this account as its referrer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectReferral {
    pub account: AccountAddress,
    pub bound_at: Timestamp,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Set at most once.
    pub referrer: Option<AccountAddress>,
    pub direct_referral_count: u64,
    /// Accounts bound anywhere within referral depth below this one.
    pub team_size: u64,
    pub contribution: u64,
    /// Cached level; may lag `contribution` until the next refresh.
    pub current_level: u8,
    pub claimed_levels: ClaimedLevels,

    pub pending_usdt: UsdtAmount,
    pub total_usdt_withdrawn: UsdtAmount,
    pub pending_level_bgp: BgpAmount,
    pub total_level_bgp: BgpAmount,

    pub total_interaction_bgp: BgpAmount,
    pub total_referral_bgp: BgpAmount,

    pub today_interaction_count: u8,
    pub last_interaction_day: u64,
    /// Slots used on `last_interaction_day`.
    pub slot_mask: u8,
    pub total_interaction_count: u64,
    pub has_claimed_early_bird: bool,

    pub registered_at: Timestamp,
    pub direct_referrals: Vec<DirectReferral>,
    pub records: Vec<RewardRecord>,
}

impl Account {
    pub fn new(now: Timestamp) -> Self {
        Self {
            registered_at: now,
            ..Self::default()
        }
    }

    /// Slot usage brought forward to `now`.
    pub fn slot_state(&self, now: Timestamp) -> SlotState {
        SlotState::advance(self.last_interaction_day, self.slot_mask, now)
    }

    pub(crate) fn add_contribution(&mut self, credit: u64) {
        self.contribution = self.contribution.saturating_add(credit);
    }
}
