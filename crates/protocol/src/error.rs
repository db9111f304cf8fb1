//! Protocol error types

use thiserror::Error;

/// Errors raised while building boundary types from raw text
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// Identifier is not exactly four hex digits
    #[error("Invalid hex identifier '{0}', expected four hex digits")]
    InvalidHexId(String),

    /// Identifier pair is not in `VVVV:PPPP` form
    #[error("Invalid identifier pair '{0}', expected VVVV:PPPP")]
    InvalidIdPair(String),
}

/// Type alias for protocol results
pub type Result<T> = std::result::Result<T, ProtocolError>;
