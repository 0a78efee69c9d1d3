// src/errors.rs

//! Crate-wide error taxonomy and `Result` alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutwatchError {
    /// The matchexpr did not parse as `/body/flags`, or the body failed to
    /// compile as a regular expression.
    #[error("The matchexpr {0} could not be evaluated")]
    InvalidPattern(String),

    /// A positional argument was missing or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, OutwatchError>;

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for OutwatchError {
    fn from(err: tokio::sync::mpsc::error::SendError<T>) -> Self {
        OutwatchError::Other(anyhow::anyhow!("event channel closed: {err}"))
    }
}
