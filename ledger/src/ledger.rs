//! The reward ledger: account records, global state and the anti-sybil
//! registry behind one owner, with the external capabilities injected.
//!
//! Every mutating operation follows the same shape:
//! 1. validate everything, reading state only
//! 2. collect token effects into a [`TokenBatch`] and settle it
//! 3. apply the state changes, which cannot fail
//!
//! A failure in step 1 or 2 leaves no trace.

use crate::account::Account;
use crate::admin::LedgerRoles;
use crate::error::LedgerError;
use crate::global::GlobalState;
use crate::ports::{Clock, PriceOracle, TokenBatch, TokenLedger};
use crate::records::LedgerEvent;
use bela_sybil::{AntiSybilRegistry, AttestationVerifier, IdentityAttestation};
use bela_types::{AccountAddress, LedgerParams, NetworkIdentity, Timestamp};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// External capabilities the ledger calls into.
#[derive(Clone)]
pub struct LedgerPorts {
    pub tokens: Arc<dyn TokenLedger>,
    pub oracle: Arc<dyn PriceOracle>,
    pub verifier: Arc<dyn AttestationVerifier>,
    pub clock: Arc<dyn Clock>,
}

impl fmt::Debug for LedgerPorts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerPorts")
            .field("tokens", &self.tokens.name())
            .field("oracle", &self.oracle.name())
            .field("verifier", &self.verifier.name())
            .finish()
    }
}

#[derive(Debug)]
pub struct RewardLedger {
    pub(crate) params: LedgerParams,
    pub(crate) roles: LedgerRoles,
    pub(crate) global: GlobalState,
    pub(crate) accounts: BTreeMap<AccountAddress, Account>,
    pub(crate) registry: AntiSybilRegistry,
    pub(crate) events: Vec<LedgerEvent>,
    pub(crate) ports: LedgerPorts,
}

impl RewardLedger {
    pub fn new(params: LedgerParams, roles: LedgerRoles, ports: LedgerPorts) -> Self {
        let registry = AntiSybilRegistry::from_params(&params);
        tracing::info!(
            owner = %roles.owner,
            treasury = %roles.treasury,
            pool = %roles.pool,
            tokens = ports.tokens.name(),
            oracle = ports.oracle.name(),
            verifier = ports.verifier.name(),
            "reward ledger initialised"
        );
        Self {
            params,
            roles,
            global: GlobalState::default(),
            accounts: BTreeMap::new(),
            registry,
            events: Vec::new(),
            ports,
        }
    }

    pub fn params(&self) -> &LedgerParams {
        &self.params
    }

    pub fn roles(&self) -> &LedgerRoles {
        &self.roles
    }

    pub fn registry(&self) -> &AntiSybilRegistry {
        &self.registry
    }

    pub fn now(&self) -> Timestamp {
        self.ports.clock.now()
    }

    /// Take every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Bind the attested network identity to `account`.
    pub fn bind_identity(
        &mut self,
        account: &AccountAddress,
        attestation: &IdentityAttestation,
    ) -> Result<NetworkIdentity, LedgerError> {
        self.ensure_not_paused()?;
        let now = self.now();
        let identity = self
            .registry
            .bind_identity(account, attestation, self.ports.verifier.as_ref(), now)?;
        self.emit(LedgerEvent::IdentityBound {
            account: account.clone(),
            identity,
        });
        Ok(identity)
    }

    // ── Shared helpers ───────────────────────────────────────────────────

    pub(crate) fn ensure_not_paused(&self) -> Result<(), LedgerError> {
        if self.global.paused {
            return Err(LedgerError::Paused);
        }
        Ok(())
    }

    /// Not paused, and neither the account nor its identity is blacklisted.
    pub(crate) fn ensure_active(&self, account: &AccountAddress) -> Result<(), LedgerError> {
        self.ensure_not_paused()?;
        self.registry.ensure_not_blacklisted(account)?;
        Ok(())
    }

    pub(crate) fn settle(&self, batch: &TokenBatch) -> Result<(), LedgerError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.ports.tokens.settle(batch).map_err(|e| {
            tracing::warn!(error = %e, effects = batch.len(), "token settlement failed");
            LedgerError::Token(e)
        })
    }

    /// Get or create the record for `account`, counting new participants.
    pub(crate) fn account_entry(&mut self, account: &AccountAddress, now: Timestamp) -> &mut Account {
        if !self.accounts.contains_key(account) {
            self.global.total_participants = self.global.total_participants.saturating_add(1);
            tracing::debug!(account = %account, "account created");
        }
        self.accounts
            .entry(account.clone())
            .or_insert_with(|| Account::new(now))
    }

    pub(crate) fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }
}
