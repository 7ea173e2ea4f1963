//! Token amount types for BGP, USDT, and the native fee currency.
//!
//! Amounts are fixed-point integers (u128) to avoid floating-point errors.
//! The smallest unit is 1 raw; the whole-token unit is set per currency.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// Raw units per whole BGP (18 decimals).
pub const BGP_UNIT: u128 = 1_000_000_000_000_000_000;

/// Raw units per whole USDT (6 decimals).
pub const USDT_UNIT: u128 = 1_000_000;

/// Raw units per whole unit of the native fee currency (18 decimals).
pub const NATIVE_UNIT: u128 = 1_000_000_000_000_000_000;

macro_rules! amount_type {
    ($(#[$meta:meta])* $name:ident, $unit:expr, $symbol:literal, $decimals:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(u128);

        impl $name {
            pub const ZERO: Self = Self(0);

            pub const fn new(raw: u128) -> Self {
                Self(raw)
            }

            /// Amount of `whole` tokens expressed in raw units.
            pub const fn from_whole(whole: u128) -> Self {
                Self(whole * $unit)
            }

            /// `numerator / denominator` whole tokens, e.g. `from_ratio(1, 10)` = 0.1.
            pub const fn from_ratio(numerator: u128, denominator: u128) -> Self {
                Self(numerator * $unit / denominator)
            }

            pub fn raw(&self) -> u128 {
                self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0 == 0
            }

            pub fn checked_add(self, other: Self) -> Option<Self> {
                self.0.checked_add(other.0).map(Self)
            }

            pub fn checked_sub(self, other: Self) -> Option<Self> {
                self.0.checked_sub(other.0).map(Self)
            }

            pub fn saturating_add(self, other: Self) -> Self {
                Self(self.0.saturating_add(other.0))
            }

            pub fn saturating_sub(self, other: Self) -> Self {
                Self(self.0.saturating_sub(other.0))
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write_decimal(f, self.0, $unit, $decimals)?;
                write!(f, " {}", $symbol)
            }
        }
    };
}

amount_type!(
    /// BGP amount: the platform's reward token.
    BgpAmount,
    BGP_UNIT,
    "BGP",
    18
);

amount_type!(
    /// USDT amount: stablecoin paid out by level rewards.
    UsdtAmount,
    USDT_UNIT,
    "USDT",
    6
);

amount_type!(
    /// Native-currency amount: the interaction fee.
    NativeAmount,
    NATIVE_UNIT,
    "NATIVE",
    18
);

fn write_decimal(f: &mut fmt::Formatter<'_>, raw: u128, unit: u128, decimals: usize) -> fmt::Result {
    let whole = raw / unit;
    let frac = raw % unit;
    if frac == 0 {
        return write!(f, "{whole}");
    }
    let digits = format!("{frac:0decimals$}");
    write!(f, "{whole}.{}", digits.trim_end_matches('0'))
}
