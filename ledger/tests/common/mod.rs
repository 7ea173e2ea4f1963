//! Shared harness: a ledger wired to nullables, plus account helpers.

#![allow(dead_code)]

use bela_ledger::{LedgerPorts, LedgerRoles, RewardLedger, Token};
use bela_nullables::{NullAttester, NullClock, NullOracle, NullTokenLedger};
use bela_types::time::SECS_PER_DAY;
use bela_types::{AccountAddress, LedgerParams, NativeAmount, NetworkIdentity, Timestamp};
use std::sync::Arc;

/// Day 20_000, 01:00 UTC: inside the first slot.
pub const START: u64 = 20_000 * SECS_PER_DAY + 3_600;
pub const HALF_DAY: u64 = SECS_PER_DAY / 2;

/// Minimum fee at the nullable oracle's default rate.
pub const MIN_FEE: u128 = 175_000_000_000_000;

pub struct Harness {
    pub ledger: RewardLedger,
    pub clock: Arc<NullClock>,
    pub tokens: Arc<NullTokenLedger>,
    pub oracle: Arc<NullOracle>,
    pub attester: NullAttester,
    pub owner: AccountAddress,
    pub treasury: AccountAddress,
    pub pool: AccountAddress,
}

pub fn addr(seed: u8) -> AccountAddress {
    AccountAddress::from_bytes([seed; 20])
}

pub fn identity_for(seed: u8) -> NetworkIdentity {
    NetworkIdentity::parse(&format!("10.0.0.{seed}")).unwrap()
}

pub fn fee() -> NativeAmount {
    NativeAmount::new(MIN_FEE)
}

impl Harness {
    pub fn new() -> Self {
        Self::with_params(LedgerParams::default())
    }

    pub fn with_params(params: LedgerParams) -> Self {
        let owner = addr(0xF0);
        let treasury = addr(0xF1);
        let pool = addr(0xF2);
        let clock = Arc::new(NullClock::new(START));
        let tokens = Arc::new(NullTokenLedger::new(pool.clone()));
        let oracle = Arc::new(NullOracle::default_rate(Timestamp::new(START)));
        let attester = NullAttester::default();
        let ports = LedgerPorts {
            tokens: tokens.clone(),
            oracle: oracle.clone(),
            verifier: Arc::new(attester.verifier()),
            clock: clock.clone(),
        };
        let roles = LedgerRoles {
            owner: owner.clone(),
            treasury: treasury.clone(),
            pool: pool.clone(),
        };
        Self {
            ledger: RewardLedger::new(params, roles, ports),
            clock,
            tokens,
            oracle,
            attester,
            owner,
            treasury,
            pool,
        }
    }

    pub fn ports(&self) -> LedgerPorts {
        LedgerPorts {
            tokens: self.tokens.clone(),
            oracle: self.oracle.clone(),
            verifier: Arc::new(self.attester.verifier()),
            clock: self.clock.clone(),
        }
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Advance the clock, keeping the oracle rate fresh.
    pub fn advance(&self, secs: u64) {
        self.clock.advance(secs);
        self.oracle.touch(self.clock.now());
    }

    /// Register `seed` under `referrer` with its own attested identity.
    pub fn join(&mut self, seed: u8, referrer: Option<u8>) -> AccountAddress {
        let account = addr(seed);
        let att = self.attester.attest(&account, identity_for(seed), self.now());
        let referrer = referrer.map(addr);
        self.ledger
            .register(&account, referrer.as_ref(), Some(&att))
            .unwrap();
        account
    }

    /// A referral chain `seeds[0] <- seeds[1] <- ...`; returns the addresses.
    pub fn chain(&mut self, seeds: &[u8]) -> Vec<AccountAddress> {
        let mut out = Vec::new();
        let mut parent = None;
        for &seed in seeds {
            out.push(self.join(seed, parent));
            parent = Some(seed);
        }
        out
    }

    pub fn bgp(&self, account: &AccountAddress) -> u128 {
        self.tokens.balance(Token::Bgp, account)
    }

    pub fn usdt(&self, account: &AccountAddress) -> u128 {
        self.tokens.balance(Token::Usdt, account)
    }
}
