//! Error types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SluiceError>;

/// The protocol itself cannot fail once wired; everything here is a
/// construction-time contract violation.
#[derive(Debug, Error)]
pub enum SluiceError {
    #[error("config error: {0}")]
    Config(String),
}

impl SluiceError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SluiceError::Config(msg.into())
    }
}
