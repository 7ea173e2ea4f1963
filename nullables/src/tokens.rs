//! Nullable token ledger: in-memory balances with failure injection.

use bela_ledger::{Token, TokenBatch, TokenEffect, TokenError, TokenLedger};
use bela_types::AccountAddress;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

type Book = BTreeMap<(Token, AccountAddress), u128>;

/// An in-memory token ledger for testing.
///
/// Batches settle all-or-nothing. [`NullTokenLedger::fail_next`] makes the
/// next settlement fail without touching balances.
#[derive(Debug)]
pub struct NullTokenLedger {
    pool: AccountAddress,
    balances: Mutex<Book>,
    fail_next: Mutex<Option<TokenError>>,
    settled: Mutex<Vec<TokenEffect>>,
}

impl NullTokenLedger {
    /// Empty ledger whose transfers draw from `pool`.
    pub fn new(pool: AccountAddress) -> Self {
        Self {
            pool,
            balances: Mutex::new(BTreeMap::new()),
            fail_next: Mutex::new(None),
            settled: Mutex::new(Vec::new()),
        }
    }

    pub fn pool(&self) -> &AccountAddress {
        &self.pool
    }

    /// Credit the pool directly.
    pub fn fund_pool(&self, token: Token, amount: u128) {
        let mut book = self.balances.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = book.entry((token, self.pool.clone())).or_default();
        *entry = entry.saturating_add(amount);
    }

    pub fn balance(&self, token: Token, holder: &AccountAddress) -> u128 {
        self.balances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(token, holder.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Make the next mint, transfer or settlement fail with `error`.
    pub fn fail_next(&self, error: TokenError) {
        *self.fail_next.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Every effect applied so far, in order.
    pub fn settled_effects(&self) -> Vec<TokenEffect> {
        self.settled.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn apply(&self, book: &mut Book, effect: &TokenEffect) -> Result<(), TokenError> {
        match effect {
            TokenEffect::Mint { token, to, amount } => credit(book, *token, to, *amount),
            TokenEffect::Transfer { token, to, amount } => {
                let key = (*token, self.pool.clone());
                let available = book.get(&key).copied().unwrap_or(0);
                if available < *amount {
                    return Err(TokenError::InsufficientBalance {
                        token: *token,
                        holder: self.pool.clone(),
                        needed: *amount,
                        available,
                    });
                }
                book.insert(key, available - amount);
                credit(book, *token, to, *amount)
            }
        }
    }
}

fn credit(book: &mut Book, token: Token, to: &AccountAddress, amount: u128) -> Result<(), TokenError> {
    let entry = book.entry((token, to.clone())).or_default();
    *entry = entry
        .checked_add(amount)
        .ok_or_else(|| TokenError::Overflow(to.clone()))?;
    Ok(())
}

impl TokenLedger for NullTokenLedger {
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
        self.balance(token, holder)
    }

    fn settle(&self, batch: &TokenBatch) -> Result<(), TokenError> {
        if let Some(err) = self.fail_next.lock().unwrap_or_else(PoisonError::into_inner).take() {
            return Err(err);
        }
        let mut book = self.balances.lock().unwrap_or_else(PoisonError::into_inner);
        let mut staged = book.clone();
        for effect in batch.effects() {
            self.apply(&mut staged, effect)?;
        }
        *book = staged;
        self.settled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(batch.effects().iter().cloned());
        Ok(())
    }

    fn name(&self) -> &str {
        "null-tokens"
    }
}
