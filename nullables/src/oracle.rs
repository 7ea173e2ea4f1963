//! Nullable price oracle: a settable rate.

use bela_ledger::{OracleError, OracleRate, PriceOracle};
use bela_types::Timestamp;
use std::sync::{Mutex, PoisonError};

/// Native raw units per USD at 4000 USD per whole native unit.
pub const DEFAULT_NUMERATOR: u128 = 250_000_000_000_000;

/// A price oracle returning whatever it was last told.
#[derive(Debug)]
pub struct NullOracle {
    rate: Mutex<Result<OracleRate, OracleError>>,
}

impl NullOracle {
    pub fn new(numerator: u128, denominator: u128, updated_at: Timestamp) -> Self {
        Self {
            rate: Mutex::new(Ok(OracleRate {
                numerator,
                denominator,
                updated_at,
            })),
        }
    }

    /// 4000 USD per native unit, updated at `updated_at`.
    pub fn default_rate(updated_at: Timestamp) -> Self {
        Self::new(DEFAULT_NUMERATOR, 1, updated_at)
    }

    pub fn set_rate(&self, numerator: u128, denominator: u128, updated_at: Timestamp) {
        *self.rate.lock().unwrap_or_else(PoisonError::into_inner) = Ok(OracleRate {
            numerator,
            denominator,
            updated_at,
        });
    }

    /// Move the rate's update time without changing its value.
    pub fn touch(&self, updated_at: Timestamp) {
        let mut rate = self.rate.lock().unwrap_or_else(PoisonError::into_inner);
        if let Ok(r) = rate.as_mut() {
            r.updated_at = updated_at;
        }
    }

    pub fn set_unavailable(&self, reason: &str) {
        *self.rate.lock().unwrap_or_else(PoisonError::into_inner) =
            Err(OracleError::Unavailable(reason.to_string()));
    }
}

impl PriceOracle for NullOracle {
    fn current_rate(&self) -> Result<OracleRate, OracleError> {
        self.rate.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn name(&self) -> &str {
        "null-oracle"
    }
}
