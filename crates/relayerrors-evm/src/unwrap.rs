//! Revert unwrap protocol — surfaces the root-cause error hidden inside
//! wrapper reverts.
//!
//! The forwarder reports downstream call failures through a generic
//! `CallFailedWithMessage(bytes)` error whose payload embeds another,
//! more specific error's encoded bytes. The protocol decodes the candidate
//! bytes and, when a wrapper is found, decodes the embedded payload once to
//! surface the true root cause. Nesting deeper than one level is out of
//! scope and falls back to whatever decoded successfully.

use relayerrors_core::registry::InterfaceRegistry;
use relayerrors_core::types::{DecodeFailure, DecodedRevert};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::decoder::decode_error_data;

/// The relay's well-known "call failed with message" wrapper error.
pub const WRAPPER_ERROR_NAME: &str = "CallFailedWithMessage";

/// Minimum payload size worth probing for an embedded error: a selector
/// plus one ABI-encoded dynamic-bytes head (offset word + length word).
const WRAPPER_PROBE_MIN_LEN: usize = 68;

/// Minimum embedded byte-string size that can itself carry a selector.
const NESTED_MIN_BYTES: usize = 4;

/// The outcome of a successful unwrap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnwrappedRevert {
    /// The effective root-cause error.
    pub decoded: DecodedRevert,
    /// The discarded outer wrapper, when one was unwrapped. Diagnostic only.
    pub outer: Option<DecodedRevert>,
    /// The candidate revert bytes the effective error was decoded from.
    pub data: Vec<u8>,
}

/// Normalize a failure's `data` field to a single hex byte string.
///
/// Accepts a direct `0x`-prefixed string, or an object carrying a nested
/// `data` field (the JSON-RPC error payload convention, one extra object
/// level tolerated). Anything else fails extraction.
pub fn extract_revert_data(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.starts_with("0x") => Some(s.clone()),
        Value::Object(map) => match map.get("data")? {
            Value::String(s) if s.starts_with("0x") => Some(s.clone()),
            Value::Object(inner) => match inner.get("data")? {
                Value::String(s) if s.starts_with("0x") => Some(s.clone()),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

/// Decode candidate revert bytes, unwrapping one level of wrapper error.
///
/// 1. Payloads longer than [`WRAPPER_PROBE_MIN_LEN`] are first decoded as a
///    potential wrapper; the decoded arguments are scanned in declaration
///    order and the first one that decodes as another error replaces the
///    outer result (first-successful-decode-wins — a documented policy, not
///    disambiguated further).
/// 2. Otherwise the original bytes are decoded directly.
/// 3. If the effective error is [`WRAPPER_ERROR_NAME`], its first argument
///    gets one more decode pass; on success the inner error becomes
///    effective and the wrapper is kept in [`UnwrappedRevert::outer`].
/// 4. If no decode attempt ever succeeds the caller gets the failure and
///    falls back to the raw RPC/contract message.
pub fn unwrap_revert(
    data: &[u8],
    registry: &InterfaceRegistry,
) -> Result<UnwrappedRevert, DecodeFailure> {
    let mut outer: Option<DecodedRevert> = None;
    let mut effective_data = data.to_vec();

    let probed = if data.len() > WRAPPER_PROBE_MIN_LEN {
        match decode_error_data(data, registry) {
            Ok(outer_decoded) => {
                if let Some((nested_data, nested)) = scan_nested_args(&outer_decoded, registry) {
                    debug!(
                        outer = %outer_decoded.name,
                        inner = %nested.name,
                        "unwrapped nested revert from wrapper arguments"
                    );
                    outer = Some(outer_decoded);
                    effective_data = nested_data;
                    Some(nested)
                } else {
                    Some(outer_decoded)
                }
            }
            Err(_) => None,
        }
    } else {
        None
    };

    let mut decoded = match probed {
        Some(d) => d,
        None => decode_error_data(data, registry)?,
    };

    // One extra pass for the named wrapper: argument 0 is the embedded
    // revert bytes. On decode failure the wrapper itself stands.
    if decoded.name == WRAPPER_ERROR_NAME {
        if let Some(inner_data) = decoded
            .args
            .first()
            .and_then(|(_, v)| v.as_revert_bytes(NESTED_MIN_BYTES))
        {
            match decode_error_data(&inner_data, registry) {
                Ok(inner) => {
                    debug!(inner = %inner.name, "unwrapped {WRAPPER_ERROR_NAME} payload");
                    outer = Some(decoded);
                    effective_data = inner_data;
                    decoded = inner;
                }
                Err(e) => {
                    debug!(error = %e, "wrapper payload did not decode; keeping wrapper");
                }
            }
        }
    }

    Ok(UnwrappedRevert {
        decoded,
        outer,
        data: effective_data,
    })
}

/// Scan a decoded error's arguments in order for the first byte string that
/// decodes as another declared error.
fn scan_nested_args(
    outer: &DecodedRevert,
    registry: &InterfaceRegistry,
) -> Option<(Vec<u8>, DecodedRevert)> {
    for (_, value) in &outer.args {
        if let Some(bytes) = value.as_revert_bytes(NESTED_MIN_BYTES) {
            if let Ok(inner) = decode_error_data(&bytes, registry) {
                return Some((bytes, inner));
            }
        }
    }
    None
}
