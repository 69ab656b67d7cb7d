//! Error taxonomy shared by the dispatcher and the RPC endpoint.

use thiserror::Error;

/// JSON-RPC code for an unparseable request body.
pub const CODE_PARSE_ERROR: i64 = -32700;
/// JSON-RPC code for a request that is not a valid call (bad HTTP method or path).
pub const CODE_INVALID_REQUEST: i64 = -32600;
/// JSON-RPC code for an unrecognised top-level method.
pub const CODE_METHOD_NOT_FOUND: i64 = -32601;
/// JSON-RPC code for failures inside the server itself.
pub const CODE_INTERNAL_ERROR: i64 = -32603;
/// Server-defined code used for foreign-call resolution failures.
pub const CODE_SERVER_ERROR: i64 = -32000;

/// Failures raised while resolving a foreign call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("Method not found")]
    /// The top-level RPC method was not `resolve_foreign_call`.
    MethodNotFound(String),
    #[error("Unknown function: {0}")]
    /// The foreign-call function name has no handler.
    UnknownFunction(String),
    #[error("Malformed input: {0}")]
    /// Inputs were structurally wrong or contained invalid hex.
    MalformedInput(String),
    #[error("Internal error: request timed out")]
    /// Resolution did not finish within the configured request timeout.
    Timeout,
}

impl OracleError {
    /// Builds a [`OracleError::MalformedInput`] from any displayable detail.
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedInput(detail.into())
    }

    /// JSON-RPC error code reported for this failure.
    pub fn code(&self) -> i64 {
        match self {
            OracleError::MethodNotFound(_) => CODE_METHOD_NOT_FOUND,
            OracleError::UnknownFunction(_) | OracleError::MalformedInput(_) => CODE_SERVER_ERROR,
            OracleError::Timeout => CODE_INTERNAL_ERROR,
        }
    }
}
