//! Common error types

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("External command '{program}' failed: {reason}")]
    ExternalCommand { program: String, reason: String },

    #[error("External command '{program}' timed out after {after:?}")]
    Timeout { program: String, after: Duration },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
