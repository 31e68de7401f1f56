//! Core types for the relayerrors error taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::chain::{JsonRpcError, RelayFailure};

// ─── Category ─────────────────────────────────────────────────────────────────

/// The terminal classification of a relay failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Transport-level failure — the node was never reached or never answered.
    Network,
    /// The node rejected the call before (or without) executing it.
    Rpc,
    /// Contract execution reverted, root cause identified or not.
    Contract,
    /// Malformed caller input.
    Validation,
    /// Unclassifiable.
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Network => "network",
            Self::Rpc => "rpc",
            Self::Contract => "contract",
            Self::Validation => "validation",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

// ─── Error code ───────────────────────────────────────────────────────────────

/// Machine-readable code attached to a classified failure — a JSON-RPC
/// numeric code, an HTTP status, or an upstream string code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Number(i64),
    Text(String),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

// ─── ABI values ───────────────────────────────────────────────────────────────

/// A decoded ABI argument value, tagged with its type so callers can
/// re-serialize or format it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AbiValue {
    Uint(u128),
    BigUint(String),
    Int(i128),
    BigInt(String),
    Bool(bool),
    Bytes(Vec<u8>),
    Str(String),
    Address(String),
    Tuple(Vec<AbiValue>),
    Array(Vec<AbiValue>),
}

impl AbiValue {
    /// Returns the raw bytes if this value carries a byte string of at least
    /// `min_len` bytes — direct `bytes`, or a `0x`-prefixed hex string.
    pub fn as_revert_bytes(&self, min_len: usize) -> Option<Vec<u8>> {
        match self {
            Self::Bytes(b) if b.len() >= min_len => Some(b.clone()),
            Self::Str(s) => {
                let stripped = s.strip_prefix("0x")?;
                let bytes = hex::decode(stripped).ok()?;
                (bytes.len() >= min_len).then_some(bytes)
            }
            _ => None,
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(v) => write!(f, "{v}"),
            Self::BigUint(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Self::Str(s) => write!(f, "{s}"),
            Self::Address(a) => write!(f, "{a}"),
            Self::Tuple(vals) => {
                let parts: Vec<_> = vals.iter().map(|v| v.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
            Self::Array(vals) => {
                let parts: Vec<_> = vals.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

// ─── Decoded records ──────────────────────────────────────────────────────────

/// A revert payload resolved against the interface registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedRevert {
    /// Error name (e.g. `"ERC20InsufficientBalance"`).
    pub name: String,
    /// Canonical signature string the selector was derived from.
    pub signature: String,
    /// 4-byte selector (first 4 bytes of `raw` data).
    pub selector: [u8; 4],
    /// Decoded arguments in declaration order: (param_name, value).
    pub args: Vec<(String, AbiValue)>,
    /// Total byte length of the payload that was consumed.
    pub raw_len: usize,
}

impl DecodedRevert {
    /// Renders `Name(arg0, arg1, ...)` — the form used in user-facing
    /// messages.
    pub fn render(&self) -> String {
        let args: Vec<_> = self.args.iter().map(|(_, v)| v.to_string()).collect();
        format!("{}({})", self.name, args.join(", "))
    }
}

impl fmt::Display for DecodedRevert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// A function call payload resolved against the interface registry.
/// Produced for diagnostics only — never drives control flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedCall {
    /// Function name (e.g. `"execute"`).
    pub function: String,
    /// Canonical signature string the selector was derived from.
    pub signature: String,
    /// 4-byte selector.
    pub selector: [u8; 4],
    /// Decoded inputs in declaration order: (param_name, value).
    pub inputs: Vec<(String, AbiValue)>,
    /// Total byte length of the payload that was consumed.
    pub raw_len: usize,
}

impl fmt::Display for DecodedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<_> = self.inputs.iter().map(|(n, v)| format!("{n}={v}")).collect();
        write!(f, "{}({})", self.function, args.join(", "))
    }
}

// ─── Decode failure ───────────────────────────────────────────────────────────

/// A structured decode miss. Decoding is best-effort: a miss never aborts
/// classification, so this is an ordinary value, not a panic.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DecodeFailure {
    #[error("revert data too short: {len} bytes (need at least 4 for a selector)")]
    TooShort { len: usize },

    #[error("invalid hex: {message}")]
    InvalidHex { message: String },

    #[error("no matching entry for selector 0x{}", hex::encode(.selector))]
    UnknownSelector { selector: [u8; 4], data: Vec<u8> },

    #[error("argument decode truncated for {signature}: {message}")]
    Truncated {
        selector: [u8; 4],
        signature: String,
        message: String,
    },
}

impl DecodeFailure {
    /// The selector, if one was extractable from the payload.
    pub fn selector(&self) -> Option<[u8; 4]> {
        match self {
            Self::TooShort { .. } | Self::InvalidHex { .. } => None,
            Self::UnknownSelector { selector, .. } | Self::Truncated { selector, .. } => {
                Some(*selector)
            }
        }
    }
}

// ─── Unified error record ─────────────────────────────────────────────────────

/// Structured diagnostics attached to a [`UnifiedError`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// 4-byte selector of the effective revert, hex with `0x` prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,

    /// Raw revert data of the effective revert, hex with `0x` prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// The decoded root-cause error.
    #[serde(rename = "decodedError", skip_serializing_if = "Option::is_none")]
    pub decoded: Option<DecodedRevert>,

    /// Nested records from multi-level unwraps (e.g. the discarded outer
    /// wrapper error), outermost first.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub nested: Vec<UnifiedError>,

    /// The originating JSON-RPC error, retained for traceability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc: Option<JsonRpcError>,
}

impl ErrorDetails {
    /// Returns `true` if no field is populated.
    pub fn is_empty(&self) -> bool {
        self.selector.is_none()
            && self.data.is_none()
            && self.decoded.is_none()
            && self.nested.is_empty()
            && self.rpc.is_none()
    }
}

/// The single normalized error record the relay's HTTP layer consumes.
///
/// Classification never fails — the worst case is `category == Unknown`.
/// The original opaque failure is always retained in `source` for logging;
/// it is never rethrown and never serialized to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedError {
    #[serde(rename = "errorType")]
    pub category: ErrorCategory,

    #[serde(rename = "error")]
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,

    #[serde(rename = "errorDetails", skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,

    /// The failure as it arrived, for diagnostics only.
    #[serde(skip)]
    pub source: Option<RelayFailure>,
}

impl UnifiedError {
    /// Create a record with no code, details, or source.
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            code: None,
            details: None,
            source: None,
        }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        if !details.is_empty() {
            self.details = Some(details);
        }
        self
    }

    pub fn with_source(mut self, source: RelayFailure) -> Self {
        self.source = Some(source);
        self
    }

    /// The HTTP status the relay's request layer maps this record to.
    ///
    /// The mapping reads only `category` and `code` — the stable fields of
    /// this record.
    pub fn http_status(&self) -> u16 {
        match self.category {
            ErrorCategory::Validation => 400,
            ErrorCategory::Network => 503,
            ErrorCategory::Rpc => match self.code {
                Some(ErrorCode::Number(-32600)) | Some(ErrorCode::Number(-32602)) => 400,
                _ => 500,
            },
            ErrorCategory::Contract | ErrorCategory::Unknown => 500,
        }
    }
}

impl fmt::Display for UnifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code {code})")?;
        }
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
