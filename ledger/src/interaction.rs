//! The rate-limited daily interaction.

use crate::error::LedgerError;
use crate::fee::minimum_fee;
use crate::ledger::RewardLedger;
use crate::levels::refresh_level;
use crate::ports::{Token, TokenBatch};
use crate::records::{LedgerEvent, RewardCategory, RewardRecord};
use crate::referral::Share;
use crate::schedule::{Slot, SlotState};
use bela_types::{AccountAddress, BgpAmount, NativeAmount, Timestamp};
use serde::{Deserialize, Serialize};

/// What a successful interaction paid out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionReceipt {
    pub slot: Slot,
    pub reward: BgpAmount,
    pub early_bird_bonus: Option<BgpAmount>,
    pub contribution: u64,
    /// Ancestors that received a share.
    pub referral_payouts: u8,
    /// Ancestors whose share was dropped.
    pub referral_skipped: u8,
}

impl RewardLedger {
    /// Current minimum interaction fee from the price oracle.
    pub fn minimum_fee(&self) -> Result<NativeAmount, LedgerError> {
        self.minimum_fee_at(self.now())
    }

    fn minimum_fee_at(&self, now: Timestamp) -> Result<NativeAmount, LedgerError> {
        let rate = self.ports.oracle.current_rate()?;
        let fee = minimum_fee(
            &rate,
            self.params.interaction_fee_usd_micros,
            self.params.oracle_max_age_secs,
            now,
        )?;
        tracing::debug!(fee = %fee, numerator = rate.numerator, denominator = rate.denominator, "minimum fee priced");
        Ok(fee)
    }

    /// Perform the daily interaction in the current slot, paying `fee_paid`.
    ///
    /// Fees above the minimum are kept in the fee pool.
    pub fn interact(&mut self, account: &AccountAddress, fee_paid: NativeAmount) -> Result<InteractionReceipt, LedgerError> {
        let now = self.now();
        self.ensure_active(account)?;
        if self.params.require_identity && self.registry.lookup_identity(account).is_none() {
            return Err(LedgerError::IdentityRequired(account.clone()));
        }

        let existing = self.accounts.get(account);
        let state = existing.map_or_else(|| SlotState::advance(0, 0, now), |a| a.slot_state(now));
        let slot = Slot::at(now);
        if state.is_consumed(slot) {
            return Err(LedgerError::SlotAlreadyClaimed { slot });
        }

        let required = self.minimum_fee_at(now)?;
        if fee_paid < required {
            return Err(LedgerError::InsufficientFee {
                paid: fee_paid,
                required,
            });
        }

        let first_interaction = existing.map_or(true, |a| a.total_interaction_count == 0);
        let has_referrer = existing.is_some_and(|a| a.referrer.is_some());
        let already_bonused = existing.is_some_and(|a| a.has_claimed_early_bird);
        let early_bird = first_interaction
            && !has_referrer
            && !already_bonused
            && self.global.total_registered < self.params.early_bird_limit;

        let reward = self.params.daily_bgp_reward;
        let bonus = self.params.early_bird_bonus;
        let shares = self.plan_propagation(account);

        let mut batch = TokenBatch::new();
        batch.mint(Token::Bgp, account, reward.raw());
        if early_bird {
            batch.mint(Token::Bgp, account, bonus.raw());
        }
        Self::queue_propagation(&shares, &mut batch);
        self.settle(&batch)?;

        // Settled: from here on nothing fails.
        let next_state = state.consume(slot);
        let contribution_credit = self.params.interaction_contribution;
        let auto_level = self.global.auto_level_check_enabled;
        let record = self.account_entry(account, now);
        record.total_interaction_bgp = record.total_interaction_bgp.saturating_add(reward);
        record.add_contribution(contribution_credit);
        record.records.push(RewardRecord::new(
            RewardCategory::Interaction,
            Token::Bgp,
            reward.raw(),
            now,
        ));
        if early_bird {
            record.has_claimed_early_bird = true;
            record.records.push(RewardRecord::new(
                RewardCategory::EarlyBird,
                Token::Bgp,
                bonus.raw(),
                now,
            ));
        }
        record.last_interaction_day = next_state.day;
        record.slot_mask = next_state.consumed;
        record.today_interaction_count = next_state.today_count();
        record.total_interaction_count = record.total_interaction_count.saturating_add(1);
        let contribution = record.contribution;

        if auto_level {
            if let Some(record) = self.accounts.get_mut(account) {
                refresh_level(record, &self.params.level_table);
            }
        }

        self.global.total_interactions = self.global.total_interactions.saturating_add(1);
        self.global.fee_pool = self.global.fee_pool.saturating_add(fee_paid);
        if early_bird {
            self.global.total_registered = self.global.total_registered.saturating_add(1);
            self.emit(LedgerEvent::EarlyBirdGranted {
                account: account.clone(),
                bonus,
            });
        }

        let paid = shares
            .iter()
            .filter(|s| matches!(s, Share::Paid { .. }))
            .count() as u8;
        let skipped = shares.len() as u8 - paid;
        self.apply_propagation(account, shares, now);

        tracing::info!(
            account = %account,
            slot = %slot,
            reward = %reward,
            early_bird,
            referral_payouts = paid,
            fee = %fee_paid,
            "interaction recorded"
        );
        self.emit(LedgerEvent::Interacted {
            account: account.clone(),
            slot,
            reward,
            fee: fee_paid,
        });

        Ok(InteractionReceipt {
            slot,
            reward,
            early_bird_bonus: early_bird.then_some(bonus),
            contribution,
            referral_payouts: paid,
            referral_skipped: skipped,
        })
    }
}
