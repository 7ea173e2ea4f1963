//! Errors raised while constructing or parsing core types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid account address: {0}")]
    InvalidAddress(String),

    #[error("invalid network identity: {0}")]
    InvalidIdentity(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("invalid reward table: {0}")]
    InvalidTable(String),
}
