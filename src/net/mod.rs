//! HTTP transport for the oracle.
//!
//! Gated behind the `net` Cargo feature so the decoding and digest logic can
//! be embedded without pulling in a runtime.

/// HTTP/1.1 request framing and response builders.
pub mod http;
/// Listener, routing and JSON-RPC envelope handling.
pub mod server;

pub use server::{run_oracle_server, OracleServer};
