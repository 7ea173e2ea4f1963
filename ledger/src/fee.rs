//! Interaction fee pricing.

use crate::error::OracleError;
use crate::ports::OracleRate;
use bela_types::params::USD_MICROS;
use bela_types::{NativeAmount, Timestamp};

/// Minimum native fee whose USD value is `usd_micros`, rounded up.
///
/// `fee = ceil(usd_micros × numerator / (denominator × 1e6))`. Rates older
/// than `max_age_secs` at `now` are refused.
pub fn minimum_fee(
    rate: &OracleRate,
    usd_micros: u128,
    max_age_secs: u64,
    now: Timestamp,
) -> Result<NativeAmount, OracleError> {
    if rate.updated_at.has_expired(max_age_secs, now) {
        return Err(OracleError::Stale {
            updated_at: rate.updated_at,
            now,
        });
    }
    let invalid = || OracleError::InvalidRate {
        numerator: rate.numerator,
        denominator: rate.denominator,
    };
    if rate.numerator == 0 || rate.denominator == 0 {
        return Err(invalid());
    }
    let scaled = usd_micros.checked_mul(rate.numerator).ok_or_else(invalid)?;
    let divisor = rate.denominator.checked_mul(USD_MICROS).ok_or_else(invalid)?;
    Ok(NativeAmount::new(scaled.div_ceil(divisor)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(numerator: u128, denominator: u128, updated_at: u64) -> OracleRate {
        OracleRate {
            numerator,
            denominator,
            updated_at: Timestamp::new(updated_at),
        }
    }

    #[test]
    fn price_at_4000_usd_per_native() {
        // 1 USD = 1e18 / 4000 raw native.
        let r = rate(1_000_000_000_000_000_000, 4_000, 100);
        let fee = minimum_fee(&r, 700_000, 3_600, Timestamp::new(200)).unwrap();
        assert_eq!(fee.raw(), 175_000_000_000_000);
    }

    #[test]
    fn rounds_up() {
        let r = rate(1, 3, 0);
        let fee = minimum_fee(&r, 1_000_000, 3_600, Timestamp::new(0)).unwrap();
        assert_eq!(fee.raw(), 1);
    }

    #[test]
    fn stale_rate_refused() {
        let r = rate(1, 1, 0);
        let err = minimum_fee(&r, 700_000, 3_600, Timestamp::new(3_601)).unwrap_err();
        assert!(matches!(err, OracleError::Stale { .. }));
    }

    #[test]
    fn zero_rate_refused() {
        let r = rate(0, 1, 0);
        assert!(matches!(
            minimum_fee(&r, 700_000, 3_600, Timestamp::new(0)),
            Err(OracleError::InvalidRate { .. })
        ));
    }

    #[test]
    fn overflow_refused() {
        let r = rate(u128::MAX, 1, 0);
        assert!(minimum_fee(&r, 700_000, 3_600, Timestamp::new(0)).is_err());
    }
}
