//! Moving pending level rewards out through the token ledger.

use crate::error::LedgerError;
use crate::ledger::RewardLedger;
use crate::ports::{Token, TokenBatch};
use crate::records::{LedgerEvent, RewardCategory, RewardRecord};
use bela_types::{AccountAddress, BgpAmount, UsdtAmount};

impl RewardLedger {
    /// Pay out the whole pending USDT balance. Requires at least the
    /// configured minimum.
    pub fn withdraw_usdt(&mut self, account: &AccountAddress) -> Result<UsdtAmount, LedgerError> {
        self.ensure_active(account)?;
        let pending = self
            .accounts
            .get(account)
            .map_or(UsdtAmount::ZERO, |a| a.pending_usdt);
        if pending.is_zero() {
            return Err(LedgerError::NothingToWithdraw);
        }
        if pending < self.params.min_usdt_withdrawal {
            return Err(LedgerError::BelowMinimum {
                pending,
                minimum: self.params.min_usdt_withdrawal,
            });
        }

        let mut batch = TokenBatch::new();
        batch.transfer(Token::Usdt, account, pending.raw());
        self.settle(&batch)?;

        let now = self.now();
        if let Some(record) = self.accounts.get_mut(account) {
            record.pending_usdt = UsdtAmount::ZERO;
            record.total_usdt_withdrawn = record.total_usdt_withdrawn.saturating_add(pending);
            record.records.push(RewardRecord::new(
                RewardCategory::LevelUsdtWithdraw,
                Token::Usdt,
                pending.raw(),
                now,
            ));
        }
        tracing::info!(account = %account, amount = %pending, "usdt withdrawn");
        self.emit(LedgerEvent::UsdtWithdrawn {
            account: account.clone(),
            amount: pending,
        });
        Ok(pending)
    }

    /// Pay out the whole pending level BGP balance. No minimum.
    pub fn withdraw_level_bgp(&mut self, account: &AccountAddress) -> Result<BgpAmount, LedgerError> {
        self.ensure_active(account)?;
        let pending = self
            .accounts
            .get(account)
            .map_or(BgpAmount::ZERO, |a| a.pending_level_bgp);
        if pending.is_zero() {
            return Err(LedgerError::NothingToWithdraw);
        }

        let mut batch = TokenBatch::new();
        batch.transfer(Token::Bgp, account, pending.raw());
        self.settle(&batch)?;

        let now = self.now();
        if let Some(record) = self.accounts.get_mut(account) {
            record.pending_level_bgp = BgpAmount::ZERO;
            record.total_level_bgp = record.total_level_bgp.saturating_add(pending);
            record.records.push(RewardRecord::new(
                RewardCategory::LevelBgpWithdraw,
                Token::Bgp,
                pending.raw(),
                now,
            ));
        }
        tracing::info!(account = %account, amount = %pending, "level bgp withdrawn");
        self.emit(LedgerEvent::LevelBgpWithdrawn {
            account: account.clone(),
            amount: pending,
        });
        Ok(pending)
    }
}
