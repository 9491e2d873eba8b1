//! Protocol error types.

use thiserror::Error;

/// Errors raised while validating an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field is not a finite number: {0}")]
    NonFinite(&'static str),
}
