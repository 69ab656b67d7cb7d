//! Foreign-call routing from function names to digest handlers.

use crate::bounded_vec::BoundedVecInput;
use crate::digest::{encode_bytes, DigestAlgorithm};
use crate::error::OracleError;
use crate::protocol::{
    ForeignCallInfo, ForeignCallParam, ForeignCallRequest, ForeignCallResult, RESOLVE_FOREIGN_CALL,
};
use std::fmt;
use std::str::FromStr;

/// Oracle functions callable from the constrained program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OracleFunction {
    /// `getSHA512`: SHA-512 over a bounded byte vector.
    GetSha512,
    /// `getSHA384`: SHA-384 over a bounded byte vector.
    GetSha384,
}

impl OracleFunction {
    /// All supported functions.
    pub const ALL: [OracleFunction; 2] = [OracleFunction::GetSha512, OracleFunction::GetSha384];

    /// Wire name used by the caller.
    pub const fn wire_name(self) -> &'static str {
        match self {
            OracleFunction::GetSha512 => "getSHA512",
            OracleFunction::GetSha384 => "getSHA384",
        }
    }

    /// Digest computed by this function.
    pub const fn algorithm(self) -> DigestAlgorithm {
        match self {
            OracleFunction::GetSha512 => DigestAlgorithm::Sha512,
            OracleFunction::GetSha384 => DigestAlgorithm::Sha384,
        }
    }

    /// Decodes the bounded-vector inputs and returns the encoded digest.
    pub fn call(self, inputs: &[ForeignCallParam]) -> Result<ForeignCallResult, OracleError> {
        let input = BoundedVecInput::from_inputs(inputs)?;
        let bytes = input.decode()?;
        let algorithm = self.algorithm();
        let raw = algorithm.digest(&bytes);
        tracing::debug!(
            target: "oracle::dispatch",
            function = self.wire_name(),
            capacity = input.capacity(),
            effective_len = bytes.len(),
            digest = %hex::encode(&raw),
            "resolved foreign call"
        );
        Ok(ForeignCallResult::single_array(encode_bytes(&raw)))
    }
}

impl FromStr for OracleFunction {
    type Err = OracleError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        OracleFunction::ALL
            .into_iter()
            .find(|f| f.wire_name() == name)
            .ok_or_else(|| OracleError::UnknownFunction(name.to_string()))
    }
}

impl fmt::Display for OracleFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Resolves one foreign call.
pub fn resolve_foreign_call(info: &ForeignCallInfo) -> Result<ForeignCallResult, OracleError> {
    let function: OracleFunction = info.function.parse()?;
    function.call(&info.inputs)
}

/// Validates the top-level method and resolves `params[0]`.
pub fn handle_request(req: &ForeignCallRequest) -> Result<ForeignCallResult, OracleError> {
    if req.method_name() != Some(RESOLVE_FOREIGN_CALL) {
        return Err(OracleError::MethodNotFound(req.method_label()));
    }
    let info = req.call_info()?;
    resolve_foreign_call(&info)
}
