//! Reward ledger state machine.
//!
//! Accounts perform a rate-limited daily interaction, accumulate contribution,
//! unlock one-time level rewards and earn referral payouts from their downline
//! up to fifteen levels deep. Token movements go through an injected
//! [`TokenLedger`]; the interaction fee is priced by a [`PriceOracle`].
//!
//! The ledger assumes serialized access: callers hold it behind one lock.

pub mod account;
pub mod admin;
pub mod error;
pub mod fee;
pub mod global;
pub mod interaction;
pub mod ledger;
pub mod levels;
pub mod ports;
pub mod records;
pub mod referral;
pub mod schedule;
pub mod snapshot;
pub mod views;
pub mod withdrawal;

pub use account::{Account, ClaimedLevels, DirectReferral};
pub use admin::{Asset, BlacklistTarget, LedgerRoles};
pub use error::{ErrorClass, LedgerError, OracleError, SnapshotError, TokenError};
pub use fee::minimum_fee;
pub use global::{GlobalState, GlobalStats};
pub use interaction::InteractionReceipt;
pub use ledger::{LedgerPorts, RewardLedger};
pub use ports::{Clock, OracleRate, PriceOracle, SystemClock, Token, TokenBatch, TokenEffect, TokenLedger};
pub use records::{LedgerEvent, RewardCategory, RewardRecord};
pub use schedule::{InteractionStatus, Slot, SlotPhase, SlotState, SLOTS_PER_DAY, SLOT_SECS};
pub use snapshot::{LedgerSnapshot, LedgerState, SNAPSHOT_VERSION};
