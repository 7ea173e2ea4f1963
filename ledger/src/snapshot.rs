//! Ledger snapshots: the complete ledger state at a point in time.
//!
//! The hash is Blake2b-256 over the bincode encoding of the state. Ledger maps
//! are ordered, so the encoding, and therefore the hash, is deterministic.

use crate::account::Account;
use crate::admin::LedgerRoles;
use crate::error::SnapshotError;
use crate::global::GlobalState;
use crate::ledger::{LedgerPorts, RewardLedger};
use bela_crypto::blake2b_256;
use bela_sybil::AntiSybilRegistry;
use bela_types::{AccountAddress, LedgerParams, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub params: LedgerParams,
    pub roles: LedgerRoles,
    pub global: GlobalState,
    pub accounts: BTreeMap<AccountAddress, Account>,
    pub registry: AntiSybilRegistry,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    pub created_at: Timestamp,
    pub hash: [u8; 32],
    pub state: LedgerState,
}

impl LedgerSnapshot {
    pub fn create(state: LedgerState, created_at: Timestamp) -> Result<Self, SnapshotError> {
        let hash = Self::hash_state(&state)?;
        Ok(Self {
            version: SNAPSHOT_VERSION,
            created_at,
            hash,
            state,
        })
    }

    fn hash_state(state: &LedgerState) -> Result<[u8; 32], SnapshotError> {
        let encoded = bincode::serialize(state).map_err(SnapshotError::Encode)?;
        Ok(blake2b_256(&encoded))
    }

    /// Check version and hash.
    pub fn verify(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        if Self::hash_state(&self.state)? != self.hash {
            return Err(SnapshotError::HashMismatch);
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(SnapshotError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        bincode::deserialize(bytes).map_err(SnapshotError::Decode)
    }

    pub fn account_count(&self) -> usize {
        self.state.accounts.len()
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

impl RewardLedger {
    pub fn snapshot(&self) -> Result<LedgerSnapshot, SnapshotError> {
        let state = LedgerState {
            params: self.params.clone(),
            roles: self.roles.clone(),
            global: self.global.clone(),
            accounts: self.accounts.clone(),
            registry: self.registry.clone(),
        };
        let snapshot = LedgerSnapshot::create(state, self.now())?;
        tracing::info!(accounts = snapshot.account_count(), hash = %snapshot.hash_hex(), "snapshot taken");
        Ok(snapshot)
    }

    /// Rebuild a ledger from a verified snapshot. Pending events are not restored.
    pub fn restore(snapshot: LedgerSnapshot, ports: LedgerPorts) -> Result<Self, SnapshotError> {
        snapshot.verify()?;
        tracing::info!(accounts = snapshot.account_count(), hash = %snapshot.hash_hex(), "restoring snapshot");
        let LedgerState {
            params,
            roles,
            global,
            accounts,
            registry,
        } = snapshot.state;
        Ok(Self {
            params,
            roles,
            global,
            accounts,
            registry,
            events: Vec::new(),
            ports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> LedgerState {
        let owner = AccountAddress::from_bytes([1; 20]);
        let mut accounts = BTreeMap::new();
        let mut account = Account::new(Timestamp::new(10));
        account.contribution = 120;
        accounts.insert(AccountAddress::from_bytes([2; 20]), account);
        LedgerState {
            params: LedgerParams::default(),
            roles: LedgerRoles {
                owner: owner.clone(),
                treasury: owner.clone(),
                pool: owner,
            },
            global: GlobalState::default(),
            accounts,
            registry: AntiSybilRegistry::default(),
        }
    }

    #[test]
    fn snapshot_verifies_after_byte_roundtrip() {
        let snap = LedgerSnapshot::create(state(), Timestamp::new(99)).unwrap();
        let restored = LedgerSnapshot::from_bytes(&snap.to_bytes().unwrap()).unwrap();
        assert!(restored.verify().is_ok());
        assert_eq!(restored.state, snap.state);
        assert_eq!(restored.hash_hex().len(), 64);
    }

    #[test]
    fn tampered_state_fails_verification() {
        let mut snap = LedgerSnapshot::create(state(), Timestamp::new(99)).unwrap();
        snap.state.global.total_interactions += 1;
        assert!(matches!(snap.verify(), Err(SnapshotError::HashMismatch)));
    }

    #[test]
    fn hash_is_deterministic() {
        let a = LedgerSnapshot::create(state(), Timestamp::new(1)).unwrap();
        let b = LedgerSnapshot::create(state(), Timestamp::new(2)).unwrap();
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn unknown_version_rejected() {
        let mut snap = LedgerSnapshot::create(state(), Timestamp::new(1)).unwrap();
        snap.version = 7;
        assert!(matches!(snap.verify(), Err(SnapshotError::UnsupportedVersion(7))));
    }
}
