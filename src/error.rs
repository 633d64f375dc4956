//! Error types for the block canvas engine.
//!
//! None of these are fatal. Transport failures end up as text in a block's
//! output; drag errors leave the gesture idle.

use thiserror::Error;

use crate::model::BlockId;

/// Failure talking to the execution service (network or non-2xx status).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    /// Non-success HTTP status. `detail` comes from the `{detail}` body, or
    /// the status reason when the body has none.
    #[error("Error: {detail}")]
    Status { status: u16, detail: String },

    #[error("{0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

/// Rejected drag transition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DragError {
    #[error("a drag gesture is already in progress")]
    GestureInProgress,

    #[error("block {0} does not exist")]
    UnknownBlock(BlockId),
}

/// Language tag outside the supported set.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("unsupported language: {0}")]
pub struct LanguageParseError(pub String);
