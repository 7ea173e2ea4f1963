//! Read-only queries.

use crate::account::{Account, ClaimedLevels, DirectReferral};
use crate::global::GlobalStats;
use crate::ledger::RewardLedger;
use crate::ports::Token;
use crate::records::RewardRecord;
use crate::schedule::{InteractionStatus, SlotState};
use bela_sybil::RegistryStats;
use bela_types::{AccountAddress, NetworkIdentity};
use std::collections::BTreeSet;

impl RewardLedger {
    /// Copy of the account record, with the daily counter brought forward
    /// to the current scheduling day.
    pub fn get_account(&self, account: &AccountAddress) -> Option<Account> {
        let now = self.now();
        self.accounts.get(account).map(|a| Account {
            today_interaction_count: a.slot_state(now).today_count(),
            ..a.clone()
        })
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn global_stats(&self) -> GlobalStats {
        GlobalStats {
            total_participants: self.global.total_participants,
            total_interactions: self.global.total_interactions,
            total_registered: self.global.total_registered,
            early_bird_remaining: self
                .params
                .early_bird_limit
                .saturating_sub(self.global.total_registered),
            paused: self.global.paused,
            auto_level_check_enabled: self.global.auto_level_check_enabled,
            fee_pool: self.global.fee_pool,
            registry: self.registry.stats(),
        }
    }

    /// Slot availability for `account` at the current time.
    pub fn check_interaction_status(&self, account: &AccountAddress) -> InteractionStatus {
        let now = self.now();
        let state = self
            .accounts
            .get(account)
            .map_or_else(|| SlotState::advance(0, 0, now), |a| a.slot_state(now));
        let allowed = !self.global.paused && !self.registry.is_blacklisted(account);
        InteractionStatus::from_state(state, now, allowed)
    }

    pub fn level_claim_status(&self, account: &AccountAddress) -> ClaimedLevels {
        self.accounts
            .get(account)
            .map(|a| a.claimed_levels)
            .unwrap_or_default()
    }

    /// Accounts that bound `account` as referrer, in binding order.
    pub fn direct_referrals(&self, account: &AccountAddress) -> &[DirectReferral] {
        self.accounts
            .get(account)
            .map(|a| a.direct_referrals.as_slice())
            .unwrap_or_default()
    }

    pub fn reward_records(&self, account: &AccountAddress) -> &[RewardRecord] {
        self.accounts
            .get(account)
            .map(|a| a.records.as_slice())
            .unwrap_or_default()
    }

    pub fn is_blacklisted(&self, account: &AccountAddress) -> bool {
        self.registry.is_blacklisted(account)
    }

    pub fn lookup_identity(&self, account: &AccountAddress) -> Option<NetworkIdentity> {
        self.registry.lookup_identity(account)
    }

    pub fn lookup_accounts(&self, identity: &NetworkIdentity) -> BTreeSet<AccountAddress> {
        self.registry.lookup_accounts(identity)
    }

    pub fn anti_sybil_stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    /// Balance held by `holder` in the token ledger.
    pub fn token_balance(&self, token: Token, holder: &AccountAddress) -> u128 {
        self.ports.tokens.balance_of(token, holder)
    }
}
