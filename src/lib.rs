#![deny(missing_docs)]

//! # sha_oracle
//!
//! **sha_oracle** resolves foreign calls issued by constrained programs that
//! need SHA-512 or SHA-384 digests they cannot compute in-circuit.  The caller
//! sends a JSON-RPC `resolve_foreign_call` request whose first param names the
//! oracle function and carries a bounded byte vector; the oracle hashes the
//! logically valid prefix and returns the digest one hex-encoded byte at a
//! time.
//!
//! ## Modules
//!
//! * [`protocol`]: serde models of the request, params and result envelope.
//! * [`bounded_vec`]: storage-plus-length decoding with the caller's
//!   `len mod (capacity + 1)` wraparound rule.
//! * [`digest`]: SHA-2 digests via the `sha2` crate and per-byte hex encoding.
//! * [`dispatch`]: the closed set of oracle functions and request routing.
//! * [`net`] (feature `net`): the HTTP listener serving `POST /` and
//!   `GET /health`.
//!
//! ## Usage
//!
//! ```rust
//! use sha_oracle::{resolve_foreign_call, ForeignCallInfo, ForeignCallParam};
//!
//! let info = ForeignCallInfo {
//!     function: "getSHA512".to_string(),
//!     inputs: vec![
//!         ForeignCallParam::Array(vec!["0x61".into(), "0x62".into(), "0x63".into()]),
//!         ForeignCallParam::Single("0x3".into()),
//!     ],
//! };
//! let result = resolve_foreign_call(&info).unwrap();
//! match &result.values[..] {
//!     [ForeignCallParam::Array(digest)] => {
//!         assert_eq!(digest.len(), 64);
//!         assert_eq!(digest[0], "0xdd");
//!     }
//!     _ => unreachable!(),
//! }
//! ```

pub mod bounded_vec;
pub mod config;
pub mod digest;
pub mod dispatch;
pub mod error;
/// Tracing subscriber setup for the binary.
#[cfg(feature = "net")]
pub mod logging;
/// HTTP transport (feature `net`).
#[cfg(feature = "net")]
pub mod net;
pub mod protocol;

pub use bounded_vec::{effective_len, BoundedVecInput};
pub use config::{ConfigError, OracleConfig};
pub use digest::{encode_bytes, DigestAlgorithm};
pub use dispatch::{handle_request, resolve_foreign_call, OracleFunction};
pub use error::OracleError;
pub use protocol::{
    ForeignCallInfo, ForeignCallParam, ForeignCallRequest, ForeignCallResult,
    RESOLVE_FOREIGN_CALL,
};
