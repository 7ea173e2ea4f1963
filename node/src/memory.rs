//! In-process implementations of the ledger's external ports.
//!
//! [`MemoryTokenLedger`] keeps BGP and USDT balances in a single locked book
//! and applies each batch against a staged copy, so a failing effect leaves
//! the book untouched. [`StaticOracle`] quotes a configured rate that is
//! always fresh.

use bela_ledger::{Clock, OracleError, OracleRate, PriceOracle, Token, TokenBatch, TokenEffect, TokenError, TokenLedger};
use bela_types::AccountAddress;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone, Debug, Default)]
struct Book {
    balances: BTreeMap<(Token, AccountAddress), u128>,
    supply: BTreeMap<Token, u128>,
}

impl Book {
    fn credit(&mut self, token: Token, to: &AccountAddress, amount: u128) -> Result<(), TokenError> {
        let balance = self.balances.entry((token, to.clone())).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| TokenError::Overflow(to.clone()))?;
        Ok(())
    }

    fn debit(&mut self, token: Token, from: &AccountAddress, amount: u128) -> Result<(), TokenError> {
        let available = self.balance(token, from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                token,
                holder: from.clone(),
                needed: amount,
                available,
            });
        }
        self.balances.insert((token, from.clone()), available - amount);
        Ok(())
    }

    fn mint(&mut self, token: Token, to: &AccountAddress, amount: u128) -> Result<(), TokenError> {
        let supply = self.supply.entry(token).or_default();
        *supply = supply
            .checked_add(amount)
            .ok_or_else(|| TokenError::Overflow(to.clone()))?;
        self.credit(token, to, amount)
    }

    fn balance(&self, token: Token, holder: &AccountAddress) -> u128 {
        self.balances
            .get(&(token, holder.clone()))
            .copied()
            .unwrap_or(0)
    }
}

/// Token balances held in memory, with the pool as transfer source.
#[derive(Debug)]
pub struct MemoryTokenLedger {
    pool: AccountAddress,
    book: Mutex<Book>,
}

impl MemoryTokenLedger {
    pub fn new(pool: AccountAddress) -> Self {
        Self {
            pool,
            book: Mutex::new(Book::default()),
        }
    }

    pub fn pool(&self) -> &AccountAddress {
        &self.pool
    }

    /// Credit the pool with freshly minted tokens (operator top-up).
    pub fn fund_pool(&self, token: Token, amount: u128) -> Result<(), TokenError> {
        let mut book = self.book.lock().unwrap_or_else(PoisonError::into_inner);
        let pool = self.pool.clone();
        book.mint(token, &pool, amount)
    }

    pub fn total_supply(&self, token: Token) -> u128 {
        let book = self.book.lock().unwrap_or_else(PoisonError::into_inner);
        book.supply.get(&token).copied().unwrap_or(0)
    }

    /// Every non-zero balance of `token`, by holder.
    pub fn holders(&self, token: Token) -> BTreeMap<AccountAddress, u128> {
        let book = self.book.lock().unwrap_or_else(PoisonError::into_inner);
        book.balances
            .iter()
            .filter(|((t, _), amount)| *t == token && **amount > 0)
            .map(|((_, holder), amount)| (holder.clone(), *amount))
            .collect()
    }
}

impl TokenLedger for MemoryTokenLedger {
    fn mint(&self, token: Token, to: &AccountAddress, amount: u128) -> Result<(), TokenError> {
        let mut batch = TokenBatch::new();
        batch.mint(token, to, amount);
        self.settle(&batch)
    }

    fn transfer(&self, token: Token, to: &AccountAddress, amount: u128) -> Result<(), TokenError> {
        let mut batch = TokenBatch::new();
        batch.transfer(token, to, amount);
        self.settle(&batch)
    }

    fn balance_of(&self, token: Token, holder: &AccountAddress) -> u128 {
        let book = self.book.lock().unwrap_or_else(PoisonError::into_inner);
        book.balance(token, holder)
    }

    fn settle(&self, batch: &TokenBatch) -> Result<(), TokenError> {
        let mut book = self.book.lock().unwrap_or_else(PoisonError::into_inner);
        let mut staged = book.clone();
        for effect in batch.effects() {
            match effect {
                TokenEffect::Mint { token, to, amount } => staged.mint(*token, to, *amount)?,
                TokenEffect::Transfer { token, to, amount } => {
                    staged.debit(*token, &self.pool, *amount)?;
                    staged.credit(*token, to, *amount)?;
                }
            }
        }
        *book = staged;
        tracing::trace!(effects = batch.len(), "token batch settled");
        Ok(())
    }

    fn name(&self) -> &str {
        "memory-tokens"
    }
}

/// An oracle quoting a fixed native-per-USD rate, stamped with the
/// current clock time so it never goes stale.
pub struct StaticOracle {
    numerator: u128,
    denominator: u128,
    clock: Arc<dyn Clock>,
}

impl StaticOracle {
    pub fn new(numerator: u128, denominator: u128, clock: Arc<dyn Clock>) -> Self {
        Self {
            numerator,
            denominator,
            clock,
        }
    }
}

impl PriceOracle for StaticOracle {
    fn current_rate(&self) -> Result<OracleRate, OracleError> {
        Ok(OracleRate {
            numerator: self.numerator,
            denominator: self.denominator,
            updated_at: self.clock.now(),
        })
    }

    fn name(&self) -> &str {
        "static-oracle"
    }
}
