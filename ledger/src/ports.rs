//! Capabilities the ledger calls out to: token balances, the fee price feed
//! and the wall clock.
//!
//! Each is a narrow trait injected at construction, so the state machine can
//! run against the in-memory adapters in `bela-node` or the deterministic
//! fakes in `bela-nullables`.

use crate::error::{OracleError, TokenError};
use bela_types::{AccountAddress, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fungible tokens paid out by the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Token {
    Bgp,
    Usdt,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Bgp => write!(f, "BGP"),
            Token::Usdt => write!(f, "USDT"),
        }
    }
}

/// One balance change requested from the token ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenEffect {
    /// Create new tokens for `to`.
    Mint {
        token: Token,
        to: AccountAddress,
        amount: u128,
    },
    /// Move tokens from the ledger's own pool to `to`.
    Transfer {
        token: Token,
        to: AccountAddress,
        amount: u128,
    },
}

/// The token effects of one ledger operation, settled together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenBatch {
    effects: Vec<TokenEffect>,
}

impl TokenBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a mint. Zero amounts are dropped.
    pub fn mint(&mut self, token: Token, to: &AccountAddress, amount: u128) {
        if amount > 0 {
            self.effects.push(TokenEffect::Mint {
                token,
                to: to.clone(),
                amount,
            });
        }
    }

    /// Queue a pool transfer. Zero amounts are dropped.
    pub fn transfer(&mut self, token: Token, to: &AccountAddress, amount: u128) {
        if amount > 0 {
            self.effects.push(TokenEffect::Transfer {
                token,
                to: to.clone(),
                amount,
            });
        }
    }

    pub fn effects(&self) -> &[TokenEffect] {
        &self.effects
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

/// Trait for the fungible balance store the ledger pays through.
pub trait TokenLedger: Send + Sync {
    fn mint(&self, token: Token, to: &AccountAddress, amount: u128) -> Result<(), TokenError>;

    /// Transfer from the ledger's pool account.
    fn transfer(&self, token: Token, to: &AccountAddress, amount: u128) -> Result<(), TokenError>;

    fn balance_of(&self, token: Token, holder: &AccountAddress) -> u128;

    /// Apply every effect of `batch` or none of them.
    ///
    /// The default applies effects in order and stops at the first failure.
    /// Implementations that can fail after a partial application must
    /// override it.
    fn settle(&self, batch: &TokenBatch) -> Result<(), TokenError> {
        for effect in batch.effects() {
            match effect {
                TokenEffect::Mint { token, to, amount } => self.mint(*token, to, *amount)?,
                TokenEffect::Transfer { token, to, amount } => self.transfer(*token, to, *amount)?,
            }
        }
        Ok(())
    }

    /// Human-readable name of this token ledger.
    fn name(&self) -> &str;
}

/// Native currency per USD, as `numerator / denominator` raw native units
/// per whole USD.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRate {
    pub numerator: u128,
    pub denominator: u128,
    pub updated_at: Timestamp,
}

/// Trait for the external USD/native price feed.
pub trait PriceOracle: Send + Sync {
    fn current_rate(&self) -> Result<OracleRate, OracleError>;

    /// Human-readable name of this oracle.
    fn name(&self) -> &str;
}

/// Source of execution time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
