//! One-time level reward claims.

use crate::account::Account;
use crate::error::LedgerError;
use crate::ledger::RewardLedger;
use crate::ports::Token;
use crate::records::{LedgerEvent, RewardCategory, RewardRecord};
use bela_types::{AccountAddress, LevelTable, LevelTier, MAX_LEVEL};

/// Raise the cached level to what `contribution` supports. Never lowers it.
pub(crate) fn refresh_level(account: &mut Account, table: &LevelTable) {
    let computed = table.compute_level(account.contribution);
    if computed > account.current_level {
        account.current_level = computed;
    }
}

impl RewardLedger {
    /// Highest level `contribution` reaches; 0 below the first threshold.
    pub fn compute_level(&self, contribution: u64) -> u8 {
        self.params.level_table.compute_level(contribution)
    }

    /// Claim the rewards of `level` into the pending balances.
    pub fn claim_level_reward(&mut self, account: &AccountAddress, level: u8) -> Result<LevelTier, LedgerError> {
        self.ensure_active(account)?;
        if !(1..=MAX_LEVEL).contains(&level) {
            return Err(LedgerError::InvalidLevel(level));
        }
        let tier = *self
            .params
            .level_table
            .tier(level)
            .ok_or(LedgerError::InvalidLevel(level))?;
        let contribution = self.accounts.get(account).map_or(0, |a| a.contribution);
        if self.compute_level(contribution) < level {
            return Err(LedgerError::NotReached { level, contribution });
        }
        let Some(record) = self.accounts.get_mut(account) else {
            return Err(LedgerError::NotReached { level, contribution });
        };
        if record.claimed_levels.is_claimed(level) {
            return Err(LedgerError::AlreadyClaimed(level));
        }

        let now = self.ports.clock.now();
        record.claimed_levels.set(level);
        record.pending_usdt = record.pending_usdt.saturating_add(tier.usdt_reward);
        record.pending_level_bgp = record.pending_level_bgp.saturating_add(tier.bgp_reward);
        record.records.push(RewardRecord::new(
            RewardCategory::LevelUnlock,
            Token::Usdt,
            tier.usdt_reward.raw(),
            now,
        ));
        record.records.push(RewardRecord::new(
            RewardCategory::LevelUnlock,
            Token::Bgp,
            tier.bgp_reward.raw(),
            now,
        ));
        refresh_level(record, &self.params.level_table);

        tracing::info!(account = %account, level, usdt = %tier.usdt_reward, bgp = %tier.bgp_reward, "level claimed");
        self.emit(LedgerEvent::LevelClaimed {
            account: account.clone(),
            level,
            usdt: tier.usdt_reward,
            bgp: tier.bgp_reward,
        });
        Ok(tier)
    }

    /// The next level `account` has not reached, and its tier.
    pub fn next_level_requirement(&self, account: &AccountAddress) -> Option<(u8, LevelTier)> {
        let contribution = self.accounts.get(account).map_or(0, |a| a.contribution);
        self.params
            .level_table
            .next_requirement(contribution)
            .map(|(level, tier)| (level, *tier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_never_lowers_cached_level() {
        let table = LevelTable::standard();
        let mut account = Account::default();
        account.current_level = 5;
        account.contribution = 100;
        refresh_level(&mut account, &table);
        assert_eq!(account.current_level, 5);
    }

    #[test]
    fn refresh_raises_to_computed_level() {
        let table = LevelTable::standard();
        let mut account = Account::default();
        account.contribution = 3_000;
        refresh_level(&mut account, &table);
        assert_eq!(account.current_level, 5);
    }
}
