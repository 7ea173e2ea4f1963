use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("ledger error: {0}")]
    Ledger(#[from] bela_ledger::LedgerError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] bela_ledger::SnapshotError),

    #[error("invalid value: {0}")]
    Types(#[from] bela_types::TypesError),

    #[error("config error: {0}")]
    Config(String),

    #[error("logging already initialised: {0}")]
    Logging(String),

    #[error("script line {line}: {reason}")]
    Script { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
