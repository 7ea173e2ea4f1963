//! BelaChain ledger node: configuration, logging and the serialized
//! ledger service that fronts a [`bela_ledger::RewardLedger`].

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod memory;
pub mod replay;
pub mod service;

pub use config::NodeConfig;
pub use error::NodeError;
pub use events::EventBus;
pub use logging::{init_logging, LogFormat};
pub use memory::{MemoryTokenLedger, StaticOracle};
pub use replay::{Replay, ScriptOp, StepError, StepOutcome};
pub use service::{LedgerService, NoAttester};
