//! Reward history and ledger events.

use crate::admin::{Asset, BlacklistTarget};
use crate::ports::Token;
use crate::schedule::Slot;
use bela_types::{AccountAddress, BgpAmount, NativeAmount, NetworkIdentity, Timestamp, UsdtAmount};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardCategory {
    LevelUnlock,
    LevelUsdtWithdraw,
    LevelBgpWithdraw,
    Interaction,
    Referral,
    EarlyBird,
}

/// One entry of an account's reward history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRecord {
    pub category: RewardCategory,
    pub token: Token,
    /// Raw units of `token`.
    pub amount: u128,
    pub at: Timestamp,
    /// The downline account whose interaction paid a referral share.
    pub source: Option<AccountAddress>,
}

impl RewardRecord {
    pub fn new(category: RewardCategory, token: Token, amount: u128, at: Timestamp) -> Self {
        Self {
            category,
            token,
            amount,
            at,
            source: None,
        }
    }

    pub fn with_source(mut self, source: AccountAddress) -> Self {
        self.source = Some(source);
        self
    }
}

/// Notable state changes, queued for the host to drain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    Registered {
        account: AccountAddress,
        referrer: Option<AccountAddress>,
    },
    IdentityBound {
        account: AccountAddress,
        identity: NetworkIdentity,
    },
    Interacted {
        account: AccountAddress,
        slot: Slot,
        reward: BgpAmount,
        fee: NativeAmount,
    },
    EarlyBirdGranted {
        account: AccountAddress,
        bonus: BgpAmount,
    },
    ReferralPaid {
        ancestor: AccountAddress,
        source: AccountAddress,
        depth: u8,
        reward: BgpAmount,
    },
    ReferralSkipped {
        ancestor: AccountAddress,
        source: AccountAddress,
        depth: u8,
    },
    LevelClaimed {
        account: AccountAddress,
        level: u8,
        usdt: UsdtAmount,
        bgp: BgpAmount,
    },
    UsdtWithdrawn {
        account: AccountAddress,
        amount: UsdtAmount,
    },
    LevelBgpWithdrawn {
        account: AccountAddress,
        amount: BgpAmount,
    },
    PausedChanged {
        paused: bool,
    },
    AutoLevelCheckChanged {
        enabled: bool,
    },
    RegistryPausedChanged {
        paused: bool,
    },
    IdentityCapChanged {
        cap: u32,
    },
    BlacklistSet {
        target: BlacklistTarget,
        reason: String,
    },
    BlacklistCleared {
        target: BlacklistTarget,
    },
    EmergencyWithdrawal {
        asset: Asset,
        to: AccountAddress,
        amount: u128,
    },
}
