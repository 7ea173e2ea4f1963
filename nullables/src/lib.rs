//! Nullable infrastructure for deterministic testing.
//!
//! Every capability the reward ledger calls out to (clock, token ledger,
//! price oracle, identity attester) has a test-friendly implementation here
//! that:
//! - Returns deterministic values
//! - Can be controlled programmatically
//! - Never touches the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod attester;
pub mod clock;
pub mod oracle;
pub mod tokens;

pub use attester::NullAttester;
pub use clock::NullClock;
pub use oracle::NullOracle;
pub use tokens::NullTokenLedger;
