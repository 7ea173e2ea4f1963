//! Owner-only controls.

use crate::error::LedgerError;
use crate::ledger::RewardLedger;
use crate::ports::{Token, TokenBatch};
use crate::records::LedgerEvent;
use bela_types::{AccountAddress, NativeAmount, NetworkIdentity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed addresses the ledger acts for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRoles {
    /// The only caller allowed through the administrative channel.
    pub owner: AccountAddress,
    /// Destination of emergency withdrawals.
    pub treasury: AccountAddress,
    /// Account holding the tokens that back level-reward withdrawals.
    pub pool: AccountAddress,
}

/// Balances an emergency withdrawal can sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    Bgp,
    Usdt,
    /// Accumulated interaction fees.
    Native,
}

impl Asset {
    pub fn token(self) -> Option<Token> {
        match self {
            Asset::Bgp => Some(Token::Bgp),
            Asset::Usdt => Some(Token::Usdt),
            Asset::Native => None,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token() {
            Some(token) => write!(f, "{token}"),
            None => write!(f, "native"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlacklistTarget {
    Address(AccountAddress),
    Identity(NetworkIdentity),
}

impl fmt::Display for BlacklistTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlacklistTarget::Address(a) => write!(f, "address {a}"),
            BlacklistTarget::Identity(i) => write!(f, "identity {i}"),
        }
    }
}

impl RewardLedger {
    fn ensure_owner(&self, caller: &AccountAddress) -> Result<(), LedgerError> {
        if *caller != self.roles.owner {
            tracing::warn!(caller = %caller, "administrative call from non-owner");
            return Err(LedgerError::NotOwner(caller.clone()));
        }
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.global.paused
    }

    pub fn pause(&mut self, caller: &AccountAddress) -> Result<(), LedgerError> {
        self.set_paused(caller, true)
    }

    pub fn unpause(&mut self, caller: &AccountAddress) -> Result<(), LedgerError> {
        self.set_paused(caller, false)
    }

    fn set_paused(&mut self, caller: &AccountAddress, paused: bool) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        self.global.paused = paused;
        tracing::info!(paused, "ledger pause state changed");
        self.emit(LedgerEvent::PausedChanged { paused });
        Ok(())
    }

    pub fn set_auto_level_check(&mut self, caller: &AccountAddress, enabled: bool) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        self.global.auto_level_check_enabled = enabled;
        tracing::info!(enabled, "auto level check changed");
        self.emit(LedgerEvent::AutoLevelCheckChanged { enabled });
        Ok(())
    }

    /// Sweep a held balance to the treasury. Returns the raw amount moved.
    pub fn emergency_withdraw(&mut self, caller: &AccountAddress, asset: Asset) -> Result<u128, LedgerError> {
        self.ensure_owner(caller)?;
        let treasury = self.roles.treasury.clone();
        let amount = match asset.token() {
            Some(token) => {
                let held = self.ports.tokens.balance_of(token, &self.roles.pool);
                if held == 0 {
                    return Err(LedgerError::NothingToWithdraw);
                }
                let mut batch = TokenBatch::new();
                batch.transfer(token, &treasury, held);
                self.settle(&batch)?;
                held
            }
            None => {
                let held = self.global.fee_pool;
                if held.is_zero() {
                    return Err(LedgerError::NothingToWithdraw);
                }
                self.global.fee_pool = NativeAmount::ZERO;
                held.raw()
            }
        };
        tracing::warn!(asset = %asset, to = %treasury, amount, "emergency withdrawal");
        self.emit(LedgerEvent::EmergencyWithdrawal {
            asset,
            to: treasury,
            amount,
        });
        Ok(amount)
    }

    // ── Blacklists ───────────────────────────────────────────────────────

    /// Blacklist an address or identity. Past rewards stay; future
    /// mutating operations by the target are refused.
    pub fn set_blacklist(
        &mut self,
        caller: &AccountAddress,
        target: BlacklistTarget,
        reason: &str,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        let added = match &target {
            BlacklistTarget::Address(a) => self.registry.blacklist_address(a.clone()),
            BlacklistTarget::Identity(i) => self.registry.blacklist_identity(*i),
        };
        tracing::info!(target = %target, reason, added, "blacklist set");
        self.emit(LedgerEvent::BlacklistSet {
            target,
            reason: reason.to_string(),
        });
        Ok(())
    }

    pub fn clear_blacklist(&mut self, caller: &AccountAddress, target: BlacklistTarget) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        let removed = match &target {
            BlacklistTarget::Address(a) => self.registry.remove_address_from_blacklist(a),
            BlacklistTarget::Identity(i) => self.registry.remove_identity_from_blacklist(i),
        };
        tracing::info!(target = %target, removed, "blacklist cleared");
        self.emit(LedgerEvent::BlacklistCleared { target });
        Ok(())
    }

    pub fn blacklist_address(&mut self, caller: &AccountAddress, account: &AccountAddress) -> Result<(), LedgerError> {
        self.set_blacklist(caller, BlacklistTarget::Address(account.clone()), "")
    }

    pub fn remove_from_blacklist(&mut self, caller: &AccountAddress, account: &AccountAddress) -> Result<(), LedgerError> {
        self.clear_blacklist(caller, BlacklistTarget::Address(account.clone()))
    }

    pub fn blacklist_identity(&mut self, caller: &AccountAddress, identity: NetworkIdentity) -> Result<(), LedgerError> {
        self.set_blacklist(caller, BlacklistTarget::Identity(identity), "")
    }

    // ── Registry ─────────────────────────────────────────────────────────

    pub fn pause_registry(&mut self, caller: &AccountAddress) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        self.registry.pause();
        tracing::info!("identity registry paused");
        self.emit(LedgerEvent::RegistryPausedChanged { paused: true });
        Ok(())
    }

    pub fn unpause_registry(&mut self, caller: &AccountAddress) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        self.registry.unpause();
        tracing::info!("identity registry unpaused");
        self.emit(LedgerEvent::RegistryPausedChanged { paused: false });
        Ok(())
    }

    pub fn set_max_accounts_per_identity(&mut self, caller: &AccountAddress, cap: u32) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        self.registry.set_max_accounts_per_identity(cap)?;
        tracing::info!(cap, "identity cap changed");
        self.emit(LedgerEvent::IdentityCapChanged { cap });
        Ok(())
    }
}
