//! Error types for roster input handling

use thiserror::Error;

/// Errors raised while validating or parsing roster input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Unknown application status: {0}")]
    UnknownStatus(String),

    #[error("Unknown communication channel: {0}")]
    UnknownChannel(String),

    #[error("Unknown priority: {0}")]
    UnknownPriority(String),

    #[error("Unknown task kind: {0}")]
    UnknownTaskKind(String),

    #[error("Unknown task status: {0}")]
    UnknownTaskStatus(String),
}
