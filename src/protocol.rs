//! Wire types for the foreign-call JSON-RPC contract.
//!
//! The caller frames every oracle query as a JSON-RPC 2.0 request whose
//! `method` is [`RESOLVE_FOREIGN_CALL`] and whose first param describes the
//! call.  Values travel as hex strings: scalars as a single string, arrays as
//! an ordered list of strings.

use crate::error::OracleError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The only top-level RPC method served by the oracle.
pub const RESOLVE_FOREIGN_CALL: &str = "resolve_foreign_call";
/// JSON-RPC protocol tag stamped on every response.
pub const JSONRPC_VERSION: &str = "2.0";

/// Top-level JSON-RPC request envelope.
///
/// Every field is optional on the wire: a missing or non-string `method` is
/// answered as an unknown method, not as a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForeignCallRequest {
    /// RPC method; must be the string [`RESOLVE_FOREIGN_CALL`].
    #[serde(default)]
    pub method: Value,
    /// Raw params, decoded lazily so an unknown method never trips on them.
    #[serde(default)]
    pub params: Value,
    /// Caller-chosen request identifier, echoed verbatim.
    #[serde(default)]
    pub id: Option<Value>,
}

impl ForeignCallRequest {
    /// Builds a request from any JSON document.
    ///
    /// Non-object documents carry neither a method nor an id.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// The method name, when present as a string.
    pub fn method_name(&self) -> Option<&str> {
        self.method.as_str()
    }

    /// Method as reported in logs and errors.
    pub fn method_label(&self) -> String {
        match &self.method {
            Value::String(name) => name.clone(),
            other => other.to_string(),
        }
    }

    /// Identifier to echo back, `null` when the caller omitted one.
    pub fn response_id(&self) -> Value {
        self.id.clone().unwrap_or(Value::Null)
    }

    /// Decodes the first param as a [`ForeignCallInfo`].
    ///
    /// A missing or `null` params field is treated as an empty list.
    pub fn call_info(&self) -> Result<ForeignCallInfo, OracleError> {
        let params = match &self.params {
            Value::Null => Vec::new(),
            Value::Array(items) => items.clone(),
            other => {
                return Err(OracleError::malformed(format!(
                    "params must be an array, got {}",
                    json_kind(other)
                )))
            }
        };
        let first = params
            .into_iter()
            .next()
            .ok_or_else(|| OracleError::malformed("missing foreign call info in params[0]"))?;
        serde_json::from_value(first)
            .map_err(|err| OracleError::malformed(format!("invalid foreign call info: {err}")))
    }
}

/// Description of a single foreign call issued by the constrained program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignCallInfo {
    /// Name of the oracle function being invoked.
    pub function: String,
    /// Positional arguments.
    #[serde(default)]
    pub inputs: Vec<ForeignCallParam>,
}

/// A positional argument or output limb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForeignCallParam {
    /// A scalar value encoded as one hex string.
    Single(String),
    /// An array encoded as ordered hex strings.
    Array(Vec<String>),
}

impl ForeignCallParam {
    /// Returns the scalar string, or `None` for arrays.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            ForeignCallParam::Single(value) => Some(value),
            ForeignCallParam::Array(_) => None,
        }
    }

    /// Returns the array entries, or `None` for scalars.
    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            ForeignCallParam::Single(_) => None,
            ForeignCallParam::Array(values) => Some(values),
        }
    }
}

/// Successful resolution of a foreign call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignCallResult {
    /// Output limbs returned to the caller.
    pub values: Vec<ForeignCallParam>,
}

impl ForeignCallResult {
    /// Wraps a single array limb as the whole result.
    pub fn single_array(values: Vec<String>) -> Self {
        Self {
            values: vec![ForeignCallParam::Array(values)],
        }
    }
}

/// Builds a JSON-RPC success envelope.
pub fn success_body(id: Value, result: &ForeignCallResult) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "result": result,
    })
}

/// Builds a JSON-RPC error envelope.
pub fn error_body(id: Value, code: i64, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": {"code": code, "message": message.into()},
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
