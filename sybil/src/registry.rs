//! Identity bindings, per-identity caps and blacklists.
//!
//! Every mutation is split into a pure `check_*` step and an infallible apply
//! step so the ledger can validate a whole operation before touching state.

use crate::attestation::{AttestationVerifier, IdentityAttestation};
use crate::error::SybilError;
use bela_types::{AccountAddress, LedgerParams, NetworkIdentity, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Aggregate counters for the admin view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub bound_accounts: u64,
    pub unique_identities: u64,
    pub max_accounts_per_identity: u32,
    pub blacklisted_addresses: u64,
    pub blacklisted_identities: u64,
    pub paused: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntiSybilRegistry {
    identity_to_accounts: BTreeMap<NetworkIdentity, BTreeSet<AccountAddress>>,
    account_to_identity: BTreeMap<AccountAddress, NetworkIdentity>,
    blacklisted_addresses: BTreeSet<AccountAddress>,
    blacklisted_identities: BTreeSet<NetworkIdentity>,
    max_accounts_per_identity: u32,
    validity_secs: u64,
    max_skew_secs: u64,
    paused: bool,
}

impl AntiSybilRegistry {
    pub fn new(max_accounts_per_identity: u32, validity_secs: u64, max_skew_secs: u64) -> Self {
        Self {
            identity_to_accounts: BTreeMap::new(),
            account_to_identity: BTreeMap::new(),
            blacklisted_addresses: BTreeSet::new(),
            blacklisted_identities: BTreeSet::new(),
            max_accounts_per_identity: max_accounts_per_identity.max(1),
            validity_secs,
            max_skew_secs,
            paused: false,
        }
    }

    pub fn from_params(params: &LedgerParams) -> Self {
        Self::new(
            params.max_accounts_per_identity,
            params.attestation_validity_secs,
            params.attestation_max_skew_secs,
        )
    }

    // ── Binding ──────────────────────────────────────────────────────────

    /// Authenticity, subject and freshness of an attestation presented by `account`.
    pub fn check_attestation(
        &self,
        account: &AccountAddress,
        attestation: &IdentityAttestation,
        verifier: &dyn AttestationVerifier,
        now: Timestamp,
    ) -> Result<(), SybilError> {
        if attestation.subject != *account {
            return Err(SybilError::InvalidAttestation(format!(
                "attestation subject {} does not match caller {account}",
                attestation.subject
            )));
        }
        let issued = attestation.issued_at;
        let too_new = issued.as_secs() > now.as_secs().saturating_add(self.max_skew_secs);
        if too_new || issued.has_expired(self.validity_secs, now) {
            return Err(SybilError::AttestationExpired { issued_at: issued, now });
        }
        verifier.verify(attestation)
    }

    /// Every precondition of [`Self::bind_identity`], without mutating.
    pub fn check_bind(
        &self,
        account: &AccountAddress,
        attestation: &IdentityAttestation,
        verifier: &dyn AttestationVerifier,
        now: Timestamp,
    ) -> Result<(), SybilError> {
        if self.paused {
            return Err(SybilError::Paused);
        }
        self.check_attestation(account, attestation, verifier, now)?;
        if self.account_to_identity.contains_key(account) {
            return Err(SybilError::AlreadyBound(account.clone()));
        }
        if self.blacklisted_addresses.contains(account) {
            return Err(SybilError::AccountBlacklisted(account.clone()));
        }
        let identity = attestation.identity;
        if self.blacklisted_identities.contains(&identity) {
            return Err(SybilError::IdentityBlacklisted(identity));
        }
        let occupancy = self.identity_to_accounts.get(&identity).map_or(0, |s| s.len());
        if occupancy >= self.max_accounts_per_identity as usize {
            return Err(SybilError::IdentityCapExceeded {
                identity,
                cap: self.max_accounts_per_identity,
            });
        }
        Ok(())
    }

    /// Record a binding already validated by [`Self::check_bind`].
    pub fn record_binding(&mut self, account: AccountAddress, identity: NetworkIdentity) {
        self.identity_to_accounts
            .entry(identity)
            .or_default()
            .insert(account.clone());
        self.account_to_identity.insert(account, identity);
    }

    /// Verify the attestation and bind its identity to `account`.
    pub fn bind_identity(
        &mut self,
        account: &AccountAddress,
        attestation: &IdentityAttestation,
        verifier: &dyn AttestationVerifier,
        now: Timestamp,
    ) -> Result<NetworkIdentity, SybilError> {
        if let Err(e) = self.check_bind(account, attestation, verifier, now) {
            tracing::warn!(account = %account, error = %e, "identity binding rejected");
            return Err(e);
        }
        self.record_binding(account.clone(), attestation.identity);
        tracing::info!(account = %account, identity = %attestation.identity, "identity bound");
        Ok(attestation.identity)
    }

    // ── Reads ────────────────────────────────────────────────────────────

    /// Whether the account, or the identity bound to it, is blacklisted.
    pub fn is_blacklisted(&self, account: &AccountAddress) -> bool {
        self.blacklisted_addresses.contains(account)
            || self
                .account_to_identity
                .get(account)
                .is_some_and(|id| self.blacklisted_identities.contains(id))
    }

    /// [`Self::is_blacklisted`] as an error.
    pub fn ensure_not_blacklisted(&self, account: &AccountAddress) -> Result<(), SybilError> {
        if self.blacklisted_addresses.contains(account) {
            return Err(SybilError::AccountBlacklisted(account.clone()));
        }
        match self.account_to_identity.get(account) {
            Some(id) if self.blacklisted_identities.contains(id) => {
                Err(SybilError::IdentityBlacklisted(*id))
            }
            _ => Ok(()),
        }
    }

    pub fn is_identity_blacklisted(&self, identity: &NetworkIdentity) -> bool {
        self.blacklisted_identities.contains(identity)
    }

    pub fn lookup_identity(&self, account: &AccountAddress) -> Option<NetworkIdentity> {
        self.account_to_identity.get(account).copied()
    }

    pub fn lookup_accounts(&self, identity: &NetworkIdentity) -> BTreeSet<AccountAddress> {
        self.identity_to_accounts
            .get(identity)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn max_accounts_per_identity(&self) -> u32 {
        self.max_accounts_per_identity
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            bound_accounts: self.account_to_identity.len() as u64,
            unique_identities: self.identity_to_accounts.len() as u64,
            max_accounts_per_identity: self.max_accounts_per_identity,
            blacklisted_addresses: self.blacklisted_addresses.len() as u64,
            blacklisted_identities: self.blacklisted_identities.len() as u64,
            paused: self.paused,
        }
    }

    // ── Administration ───────────────────────────────────────────────────

    /// Returns `true` if the address was not already blacklisted.
    pub fn blacklist_address(&mut self, account: AccountAddress) -> bool {
        self.blacklisted_addresses.insert(account)
    }

    pub fn remove_address_from_blacklist(&mut self, account: &AccountAddress) -> bool {
        self.blacklisted_addresses.remove(account)
    }

    pub fn blacklist_identity(&mut self, identity: NetworkIdentity) -> bool {
        self.blacklisted_identities.insert(identity)
    }

    pub fn remove_identity_from_blacklist(&mut self, identity: &NetworkIdentity) -> bool {
        self.blacklisted_identities.remove(identity)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;
    }

    /// Change the cap. Existing bindings above a lowered cap are kept; the
    /// identity just accepts no further accounts.
    pub fn set_max_accounts_per_identity(&mut self, cap: u32) -> Result<(), SybilError> {
        if cap == 0 {
            return Err(SybilError::InvalidCap);
        }
        self.max_accounts_per_identity = cap;
        Ok(())
    }
}

impl Default for AntiSybilRegistry {
    fn default() -> Self {
        Self::from_params(&LedgerParams::default())
    }
}
