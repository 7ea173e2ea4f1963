//! The ledger service: one [`RewardLedger`] behind a mutex.
//!
//! Every operation runs inside a single critical section, so concurrent
//! callers observe operations as if they ran one after another and no
//! caller ever sees a half-applied update.

use crate::config::NodeConfig;
use crate::events::EventBus;
use crate::memory::{MemoryTokenLedger, StaticOracle};
use crate::NodeError;
use bela_ledger::{
    Account, Asset, ClaimedLevels, Clock, DirectReferral, GlobalStats, InteractionReceipt,
    InteractionStatus, LedgerError, LedgerEvent, LedgerPorts, LedgerSnapshot, RewardLedger,
    RewardRecord, Token,
};
use bela_sybil::{
    AttestationVerifier, Ed25519AttestationVerifier, IdentityAttestation, RegistryStats,
    SybilError,
};
use bela_types::{
    AccountAddress, BgpAmount, LevelTier, NativeAmount, NetworkIdentity, UsdtAmount,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Verifier used when no attester key is configured: nothing is trusted.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAttester;

impl AttestationVerifier for NoAttester {
    fn verify(&self, _attestation: &IdentityAttestation) -> Result<(), SybilError> {
        Err(SybilError::InvalidAttestation("no attester key configured".into()))
    }

    fn name(&self) -> &str {
        "no-attester"
    }
}

pub struct LedgerService {
    ledger: Mutex<RewardLedger>,
    tokens: Arc<MemoryTokenLedger>,
    bus: EventBus,
    snapshot_path: PathBuf,
}

impl LedgerService {
    /// Build a fresh ledger from `config`, with in-memory token balances
    /// and a static oracle.
    pub fn from_config(config: &NodeConfig, clock: Arc<dyn Clock>) -> Result<Self, NodeError> {
        let roles = config.roles()?;
        let (tokens, ports) = Self::ports(config, &roles.pool, clock)?;
        let ledger = RewardLedger::new(config.ledger_params(), roles, ports);
        Ok(Self::with_ledger_and_tokens(ledger, tokens, config.snapshot_path.clone()))
    }

    /// Restore the ledger from the snapshot file named in `config`.
    ///
    /// Token balances live outside the ledger state and start empty.
    pub fn load_snapshot(config: &NodeConfig, clock: Arc<dyn Clock>) -> Result<Self, NodeError> {
        let bytes = std::fs::read(&config.snapshot_path)?;
        let snapshot = LedgerSnapshot::from_bytes(&bytes)?;
        let (tokens, ports) = Self::ports(config, &snapshot.state.roles.pool, clock)?;
        let ledger = RewardLedger::restore(snapshot, ports)?;
        tracing::info!(
            path = %config.snapshot_path.display(),
            accounts = ledger.account_count(),
            "ledger restored from snapshot"
        );
        Ok(Self::with_ledger_and_tokens(ledger, tokens, config.snapshot_path.clone()))
    }

    pub fn with_ledger_and_tokens(
        ledger: RewardLedger,
        tokens: Arc<MemoryTokenLedger>,
        snapshot_path: PathBuf,
    ) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            tokens,
            bus: EventBus::new(),
            snapshot_path,
        }
    }

    fn ports(
        config: &NodeConfig,
        pool: &AccountAddress,
        clock: Arc<dyn Clock>,
    ) -> Result<(Arc<MemoryTokenLedger>, LedgerPorts), NodeError> {
        let (numerator, denominator) = config.native_per_usd()?;
        let verifier: Arc<dyn AttestationVerifier> = match config.attester_key()? {
            Some(key) => Arc::new(Ed25519AttestationVerifier::new(key)),
            None => {
                tracing::warn!("no attester key configured; identity binding is disabled");
                Arc::new(NoAttester)
            }
        };
        let tokens = Arc::new(MemoryTokenLedger::new(pool.clone()));
        let ports = LedgerPorts {
            tokens: tokens.clone(),
            oracle: Arc::new(StaticOracle::new(numerator, denominator, clock.clone())),
            verifier,
            clock,
        };
        Ok((tokens, ports))
    }

    fn lock(&self) -> MutexGuard<'_, RewardLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the ledger, then hand the events it
    /// queued to the bus before the lock is released.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&mut RewardLedger) -> R) -> R {
        let mut ledger = self.lock();
        let result = f(&mut ledger);
        let events = ledger.drain_events();
        self.bus.publish(&events);
        result
    }

    /// Add a listener for every event the ledger emits from now on.
    pub fn subscribe(&mut self, listener: impl Fn(&LedgerEvent) + Send + Sync + 'static) {
        self.bus.subscribe(listener);
    }

    pub fn tokens(&self) -> &MemoryTokenLedger {
        &self.tokens
    }

    // ── Participant operations ───────────────────────────────────────────

    pub fn register(
        &self,
        account: &AccountAddress,
        referrer: Option<&AccountAddress>,
        attestation: Option<&IdentityAttestation>,
    ) -> Result<(), LedgerError> {
        self.with_ledger(|l| l.register(account, referrer, attestation))
    }

    pub fn bind_identity(
        &self,
        account: &AccountAddress,
        attestation: &IdentityAttestation,
    ) -> Result<NetworkIdentity, LedgerError> {
        self.with_ledger(|l| l.bind_identity(account, attestation))
    }

    pub fn interact(
        &self,
        account: &AccountAddress,
        fee_paid: NativeAmount,
    ) -> Result<InteractionReceipt, LedgerError> {
        self.with_ledger(|l| l.interact(account, fee_paid))
    }

    pub fn claim_level_reward(&self, account: &AccountAddress, level: u8) -> Result<LevelTier, LedgerError> {
        self.with_ledger(|l| l.claim_level_reward(account, level))
    }

    pub fn withdraw_usdt(&self, account: &AccountAddress) -> Result<UsdtAmount, LedgerError> {
        self.with_ledger(|l| l.withdraw_usdt(account))
    }

    pub fn withdraw_level_bgp(&self, account: &AccountAddress) -> Result<BgpAmount, LedgerError> {
        self.with_ledger(|l| l.withdraw_level_bgp(account))
    }

    // ── Admin operations ─────────────────────────────────────────────────

    pub fn pause(&self, caller: &AccountAddress) -> Result<(), LedgerError> {
        self.with_ledger(|l| l.pause(caller))
    }

    pub fn unpause(&self, caller: &AccountAddress) -> Result<(), LedgerError> {
        self.with_ledger(|l| l.unpause(caller))
    }

    pub fn set_auto_level_check(&self, caller: &AccountAddress, enabled: bool) -> Result<(), LedgerError> {
        self.with_ledger(|l| l.set_auto_level_check(caller, enabled))
    }

    pub fn emergency_withdraw(&self, caller: &AccountAddress, asset: Asset) -> Result<u128, LedgerError> {
        self.with_ledger(|l| l.emergency_withdraw(caller, asset))
    }

    pub fn blacklist_address(&self, caller: &AccountAddress, account: &AccountAddress) -> Result<(), LedgerError> {
        self.with_ledger(|l| l.blacklist_address(caller, account))
    }

    pub fn remove_from_blacklist(&self, caller: &AccountAddress, account: &AccountAddress) -> Result<(), LedgerError> {
        self.with_ledger(|l| l.remove_from_blacklist(caller, account))
    }

    pub fn blacklist_identity(&self, caller: &AccountAddress, identity: NetworkIdentity) -> Result<(), LedgerError> {
        self.with_ledger(|l| l.blacklist_identity(caller, identity))
    }

    pub fn pause_registry(&self, caller: &AccountAddress) -> Result<(), LedgerError> {
        self.with_ledger(|l| l.pause_registry(caller))
    }

    pub fn unpause_registry(&self, caller: &AccountAddress) -> Result<(), LedgerError> {
        self.with_ledger(|l| l.unpause_registry(caller))
    }

    pub fn set_max_accounts_per_identity(&self, caller: &AccountAddress, cap: u32) -> Result<(), LedgerError> {
        self.with_ledger(|l| l.set_max_accounts_per_identity(caller, cap))
    }

    // ── Views ────────────────────────────────────────────────────────────

    pub fn get_account(&self, account: &AccountAddress) -> Option<Account> {
        self.lock().get_account(account)
    }

    pub fn global_stats(&self) -> GlobalStats {
        self.lock().global_stats()
    }

    pub fn check_interaction_status(&self, account: &AccountAddress) -> InteractionStatus {
        self.lock().check_interaction_status(account)
    }

    pub fn level_claim_status(&self, account: &AccountAddress) -> ClaimedLevels {
        self.lock().level_claim_status(account)
    }

    pub fn next_level_requirement(&self, account: &AccountAddress) -> Option<(u8, LevelTier)> {
        self.lock().next_level_requirement(account)
    }

    pub fn direct_referrals(&self, account: &AccountAddress) -> Vec<DirectReferral> {
        self.lock().direct_referrals(account).to_vec()
    }

    pub fn reward_records(&self, account: &AccountAddress) -> Vec<RewardRecord> {
        self.lock().reward_records(account).to_vec()
    }

    pub fn upline(&self, account: &AccountAddress) -> Vec<(u8, AccountAddress)> {
        self.lock().upline(account)
    }

    pub fn minimum_fee(&self) -> Result<NativeAmount, LedgerError> {
        self.lock().minimum_fee()
    }

    pub fn is_blacklisted(&self, account: &AccountAddress) -> bool {
        self.lock().is_blacklisted(account)
    }

    pub fn lookup_identity(&self, account: &AccountAddress) -> Option<NetworkIdentity> {
        self.lock().lookup_identity(account)
    }

    pub fn lookup_accounts(&self, identity: &NetworkIdentity) -> BTreeSet<AccountAddress> {
        self.lock().lookup_accounts(identity)
    }

    pub fn anti_sybil_stats(&self) -> RegistryStats {
        self.lock().anti_sybil_stats()
    }

    pub fn token_balance(&self, token: Token, holder: &AccountAddress) -> u128 {
        self.lock().token_balance(token, holder)
    }

    // ── Persistence ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Result<LedgerSnapshot, NodeError> {
        Ok(self.lock().snapshot()?)
    }

    /// Write a snapshot to the configured path.
    pub fn save_snapshot(&self) -> Result<LedgerSnapshot, NodeError> {
        self.save_snapshot_to(&self.snapshot_path)
    }

    /// Write a snapshot to `path`, replacing any previous file atomically.
    pub fn save_snapshot_to(&self, path: &Path) -> Result<LedgerSnapshot, NodeError> {
        let snapshot = self.snapshot()?;
        let bytes = snapshot.to_bytes()?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, &bytes)?;
        std::fs::rename(&tmp, path)?;
        tracing::info!(
            path = %path.display(),
            accounts = snapshot.account_count(),
            hash = %snapshot.hash_hex(),
            "snapshot written"
        );
        Ok(snapshot)
    }
}
