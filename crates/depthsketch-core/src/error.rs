//! Error types for user-facing name and value parsing.

use thiserror::Error;

/// Errors raised when a toolbar or script value cannot be interpreted.
///
/// Runtime interaction never fails loudly: misses and empty stacks are
/// silent no-ops. Only parsing external names produces an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown brush type: {0}")]
    UnknownBrush(String),
    #[error("Unknown primitive: {0}")]
    UnknownPrimitive(String),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}
