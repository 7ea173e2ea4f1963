//! Referrer binding and multi-level referral payouts.
//!
//! Chains are walked with an explicit parent-pointer loop capped at the
//! depth table's length. Binding refuses cycles, so every chain is finite.

use crate::account::DirectReferral;
use crate::error::LedgerError;
use crate::ledger::RewardLedger;
use crate::levels::refresh_level;
use crate::ports::{Token, TokenBatch};
use crate::records::{LedgerEvent, RewardCategory, RewardRecord};
use bela_sybil::IdentityAttestation;
use bela_types::{AccountAddress, ReferralTier, Timestamp};

/// What one ancestor receives from a downline interaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Share {
    Paid {
        ancestor: AccountAddress,
        depth: u8,
        tier: ReferralTier,
    },
    /// Blacklisted ancestor; the share is dropped.
    Skipped { ancestor: AccountAddress, depth: u8 },
}

impl RewardLedger {
    /// Bind `referrer` as the upline of `account`, creating the account
    /// record if needed. An attestation, if given, is bound in the same step.
    pub fn register(
        &mut self,
        account: &AccountAddress,
        referrer: Option<&AccountAddress>,
        attestation: Option<&IdentityAttestation>,
    ) -> Result<(), LedgerError> {
        self.ensure_active(account)?;
        let now = self.now();

        match self.accounts.get(account) {
            Some(existing) if existing.referrer.is_some() || referrer.is_none() => {
                return Err(LedgerError::AlreadyRegistered(account.clone()));
            }
            _ => {}
        }
        if let Some(referrer) = referrer {
            self.check_referrer(account, referrer)?;
        }
        if let Some(att) = attestation {
            self.registry
                .check_bind(account, att, self.ports.verifier.as_ref(), now)?;
        }

        self.account_entry(account, now);
        if let Some(att) = attestation {
            self.registry.record_binding(account.clone(), att.identity);
            self.emit(LedgerEvent::IdentityBound {
                account: account.clone(),
                identity: att.identity,
            });
        }
        if let Some(referrer) = referrer {
            self.bind_referrer(account, referrer, now);
        }

        tracing::info!(
            account = %account,
            referrer = ?referrer.map(|r| r.as_str()),
            "account registered"
        );
        self.emit(LedgerEvent::Registered {
            account: account.clone(),
            referrer: referrer.cloned(),
        });
        Ok(())
    }

    fn check_referrer(&self, account: &AccountAddress, referrer: &AccountAddress) -> Result<(), LedgerError> {
        if referrer == account {
            return Err(LedgerError::SelfReferral);
        }
        if !self.accounts.contains_key(referrer) {
            return Err(LedgerError::UnknownReferrer(referrer.clone()));
        }
        if self.is_upline_of(account, referrer) {
            return Err(LedgerError::ReferralCycle {
                account: account.clone(),
                referrer: referrer.clone(),
            });
        }
        Ok(())
    }

    /// Whether `candidate` appears on the referrer chain starting at `from`.
    fn is_upline_of(&self, candidate: &AccountAddress, from: &AccountAddress) -> bool {
        let mut current = Some(from);
        for _ in 0..=self.accounts.len() {
            match current {
                Some(addr) if addr == candidate => return true,
                Some(addr) => current = self.accounts.get(addr).and_then(|a| a.referrer.as_ref()),
                None => return false,
            }
        }
        false
    }

    fn bind_referrer(&mut self, account: &AccountAddress, referrer: &AccountAddress, now: Timestamp) {
        if let Some(record) = self.accounts.get_mut(account) {
            record.referrer = Some(referrer.clone());
        }
        if let Some(direct) = self.accounts.get_mut(referrer) {
            direct.direct_referral_count = direct.direct_referral_count.saturating_add(1);
            direct.direct_referrals.push(DirectReferral {
                account: account.clone(),
                bound_at: now,
            });
        }
        for (_, ancestor) in self.upline(account) {
            if let Some(record) = self.accounts.get_mut(&ancestor) {
                record.team_size = record.team_size.saturating_add(1);
            }
        }
    }

    /// `(depth, ancestor)` pairs above `account`, nearest first, at most the
    /// referral table's depth.
    pub fn upline(&self, account: &AccountAddress) -> Vec<(u8, AccountAddress)> {
        let max_depth = self.params.referral_table.depth();
        let mut chain = Vec::with_capacity(max_depth);
        let mut current = self.accounts.get(account).and_then(|a| a.referrer.as_ref());
        for depth in 1..=max_depth {
            let Some(ancestor) = current else { break };
            chain.push((depth as u8, ancestor.clone()));
            current = self.accounts.get(ancestor).and_then(|a| a.referrer.as_ref());
        }
        chain
    }

    /// Shares owed to the upline of `source` for one interaction.
    pub(crate) fn plan_propagation(&self, source: &AccountAddress) -> Vec<Share> {
        self.upline(source)
            .into_iter()
            .filter_map(|(depth, ancestor)| {
                let tier = *self.params.referral_table.tier(depth as usize)?;
                if self.registry.is_blacklisted(&ancestor) {
                    Some(Share::Skipped { ancestor, depth })
                } else {
                    Some(Share::Paid { ancestor, depth, tier })
                }
            })
            .collect()
    }

    pub(crate) fn queue_propagation(shares: &[Share], batch: &mut TokenBatch) {
        for share in shares {
            if let Share::Paid { ancestor, tier, .. } = share {
                batch.mint(Token::Bgp, ancestor, tier.bgp_reward.raw());
            }
        }
    }

    pub(crate) fn apply_propagation(&mut self, source: &AccountAddress, shares: Vec<Share>, now: Timestamp) {
        let auto_level = self.global.auto_level_check_enabled;
        for share in shares {
            match share {
                Share::Paid { ancestor, depth, tier } => {
                    let Some(record) = self.accounts.get_mut(&ancestor) else { continue };
                    record.total_referral_bgp = record.total_referral_bgp.saturating_add(tier.bgp_reward);
                    record.add_contribution(tier.contribution_credit);
                    record.records.push(
                        RewardRecord::new(RewardCategory::Referral, Token::Bgp, tier.bgp_reward.raw(), now)
                            .with_source(source.clone()),
                    );
                    if auto_level {
                        refresh_level(record, &self.params.level_table);
                    }
                    self.emit(LedgerEvent::ReferralPaid {
                        ancestor,
                        source: source.clone(),
                        depth,
                        reward: tier.bgp_reward,
                    });
                }
                Share::Skipped { ancestor, depth } => {
                    tracing::warn!(
                        ancestor = %ancestor,
                        source = %source,
                        depth,
                        "referral share skipped for blacklisted ancestor"
                    );
                    self.emit(LedgerEvent::ReferralSkipped {
                        ancestor,
                        source: source.clone(),
                        depth,
                    });
                }
            }
        }
    }
}
