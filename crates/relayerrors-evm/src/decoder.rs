//! Selector decoder — resolves raw call/revert bytes against the interface
//! registry.
//!
//! Encoded payloads are `selector(4 bytes)` ++ `ABI-encoded arguments`,
//! where `selector = keccak256("Name(type1,type2,...)")[:4]`.
//!
//! Both entry points are pure functions: same bytes + same registry give
//! the same result, with no side effects — safe to call concurrently, used
//! both for user-facing messages and best-effort debug logging.

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use relayerrors_core::registry::{InterfaceEntry, InterfaceRegistry};
use relayerrors_core::types::{AbiValue, DecodeFailure, DecodedCall, DecodedRevert};

/// Decode revert data against the registry's declared errors.
pub fn decode_error_data(
    data: &[u8],
    registry: &InterfaceRegistry,
) -> Result<DecodedRevert, DecodeFailure> {
    let (selector, payload) = split_selector(data)?;
    let entry = registry
        .error_by_selector(selector)
        .ok_or_else(|| DecodeFailure::UnknownSelector {
            selector,
            data: data.to_vec(),
        })?;
    let args = decode_args(entry, payload)?;
    Ok(DecodedRevert {
        name: entry.name.clone(),
        signature: entry.signature.clone(),
        selector,
        args,
        raw_len: data.len(),
    })
}

/// Decode function calldata against the registry's declared functions.
/// Used by the diagnostics layer only — never for control flow.
pub fn decode_call_data(
    data: &[u8],
    registry: &InterfaceRegistry,
) -> Result<DecodedCall, DecodeFailure> {
    let (selector, payload) = split_selector(data)?;
    let entry = registry
        .function_by_selector(selector)
        .ok_or_else(|| DecodeFailure::UnknownSelector {
            selector,
            data: data.to_vec(),
        })?;
    let inputs = decode_args(entry, payload)?;
    Ok(DecodedCall {
        function: entry.name.clone(),
        signature: entry.signature.clone(),
        selector,
        inputs,
        raw_len: data.len(),
    })
}

/// Convenience: decode revert data from a hex string (with or without `0x`).
pub fn decode_error_hex(
    hex_str: &str,
    registry: &InterfaceRegistry,
) -> Result<DecodedRevert, DecodeFailure> {
    decode_error_data(&hex_to_bytes(hex_str)?, registry)
}

/// Convenience: decode calldata from a hex string (with or without `0x`).
pub fn decode_call_hex(
    hex_str: &str,
    registry: &InterfaceRegistry,
) -> Result<DecodedCall, DecodeFailure> {
    decode_call_data(&hex_to_bytes(hex_str)?, registry)
}

pub(crate) fn hex_to_bytes(hex_str: &str) -> Result<Vec<u8>, DecodeFailure> {
    let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    hex::decode(stripped).map_err(|e| DecodeFailure::InvalidHex {
        message: e.to_string(),
    })
}

fn split_selector(data: &[u8]) -> Result<([u8; 4], &[u8]), DecodeFailure> {
    if data.len() < 4 {
        return Err(DecodeFailure::TooShort { len: data.len() });
    }
    let selector: [u8; 4] = data[..4].try_into().expect("length checked");
    Ok((selector, &data[4..]))
}

/// ABI-decode the post-selector payload as the entry's parameter tuple.
fn decode_args(
    entry: &InterfaceEntry,
    payload: &[u8],
) -> Result<Vec<(String, AbiValue)>, DecodeFailure> {
    if entry.inputs.is_empty() {
        return Ok(vec![]);
    }

    let types = entry
        .inputs
        .iter()
        .map(|p| {
            p.ty.parse::<DynSolType>()
                .map_err(|e| DecodeFailure::Truncated {
                    selector: entry.selector,
                    signature: entry.signature.clone(),
                    message: format!("cannot resolve type '{}': {e}", p.ty),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let tuple_type = DynSolType::Tuple(types);
    let decoded = tuple_type
        .abi_decode_params(payload)
        .map_err(|e| DecodeFailure::Truncated {
            selector: entry.selector,
            signature: entry.signature.clone(),
            message: e.to_string(),
        })?;

    let values = match decoded {
        DynSolValue::Tuple(vals) => vals,
        single => vec![single],
    };

    let pairs = entry
        .inputs
        .iter()
        .enumerate()
        .zip(values.iter())
        .map(|((i, param), val)| {
            let name = if param.name.is_empty() {
                format!("arg{i}")
            } else {
                param.name.clone()
            };
            (name, normalize(val))
        })
        .collect();

    Ok(pairs)
}

/// Lower a dynamically-typed alloy value into the crate's tagged value form.
fn normalize(val: &DynSolValue) -> AbiValue {
    match val {
        DynSolValue::Uint(v, _) => match u128::try_from(*v) {
            Ok(small) => AbiValue::Uint(small),
            Err(_) => AbiValue::BigUint(v.to_string()),
        },
        DynSolValue::Int(v, _) => match i128::try_from(*v) {
            Ok(small) => AbiValue::Int(small),
            Err(_) => AbiValue::BigInt(v.to_string()),
        },
        DynSolValue::Bool(b) => AbiValue::Bool(*b),
        DynSolValue::Address(a) => AbiValue::Address(format!("{a:#x}")),
        DynSolValue::String(s) => AbiValue::Str(s.clone()),
        DynSolValue::Bytes(b) => AbiValue::Bytes(b.clone()),
        DynSolValue::FixedBytes(fb, size) => AbiValue::Bytes(fb[..*size].to_vec()),
        DynSolValue::Tuple(vals) => AbiValue::Tuple(vals.iter().map(normalize).collect()),
        DynSolValue::Array(vals) | DynSolValue::FixedArray(vals) => {
            AbiValue::Array(vals.iter().map(normalize).collect())
        }
        _ => AbiValue::Bytes(vec![]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};
    use relayerrors_core::registry::{
        ContractInterface, InterfaceItem, InterfaceParam, InterfaceRegistry,
    };

    fn registry() -> InterfaceRegistry {
        InterfaceRegistry::build(&[ContractInterface {
            contract: "Test".into(),
            items: vec![
                InterfaceItem::error(
                    "InsufficientBalance",
                    vec![
                        InterfaceParam::new("account", "address"),
                        InterfaceParam::new("needed", "uint256"),
                    ],
                ),
                InterfaceItem::error("EnforcedPause", vec![]),
                InterfaceItem::error("Reason", vec![InterfaceParam::new("message", "string")]),
                InterfaceItem::function(
                    "transfer",
                    vec![
                        InterfaceParam::new("to", "address"),
                        InterfaceParam::new("amount", "uint256"),
                    ],
                ),
            ],
        }])
        .unwrap()
    }

    fn encode(selector: [u8; 4], args: &[DynSolValue]) -> Vec<u8> {
        let mut out = selector.to_vec();
        out.extend_from_slice(&DynSolValue::Tuple(args.to_vec()).abi_encode_params());
        out
    }

    fn addr() -> Address {
        Address::from([0x11u8; 20])
    }

    #[test]
    fn error_round_trip() {
        let reg = registry();
        let sel = reg.by_name("InsufficientBalance").unwrap().selector;
        let data = encode(
            sel,
            &[
                DynSolValue::Address(addr()),
                DynSolValue::Uint(U256::from(42u64), 256),
            ],
        );

        let decoded = decode_error_data(&data, &reg).unwrap();
        assert_eq!(decoded.name, "InsufficientBalance");
        assert_eq!(decoded.selector, sel);
        assert_eq!(decoded.raw_len, data.len());
        assert_eq!(decoded.args[0].0, "account");
        assert_eq!(decoded.args[1], ("needed".into(), AbiValue::Uint(42)));
        assert_eq!(decoded.render(), format!("InsufficientBalance({:#x}, 42)", addr()));
    }

    #[test]
    fn zero_arg_error() {
        let reg = registry();
        let sel = reg.by_name("EnforcedPause").unwrap().selector;
        let decoded = decode_error_data(&sel, &reg).unwrap();
        assert_eq!(decoded.render(), "EnforcedPause()");
    }

    #[test]
    fn dynamic_string_argument() {
        let reg = registry();
        let sel = reg.by_name("Reason").unwrap().selector;
        let data = encode(sel, &[DynSolValue::String("not allowed".into())]);
        let decoded = decode_error_data(&data, &reg).unwrap();
        assert_eq!(decoded.args[0].1, AbiValue::Str("not allowed".into()));
    }

    #[test]
    fn too_short_data_is_a_failure_not_a_panic() {
        let reg = registry();
        let err = decode_error_data(&[0x08, 0xc3], &reg).unwrap_err();
        assert!(matches!(err, DecodeFailure::TooShort { len: 2 }));
        assert_eq!(err.selector(), None);
    }

    #[test]
    fn unknown_selector_carries_the_selector() {
        let reg = registry();
        let data = [0xde, 0xad, 0xbe, 0xef, 0x00, 0x01];
        let err = decode_call_data(&data, &reg).unwrap_err();
        assert_eq!(err.selector(), Some([0xde, 0xad, 0xbe, 0xef]));
        match err {
            DecodeFailure::UnknownSelector { data: raw, .. } => assert_eq!(raw, data.to_vec()),
            other => panic!("expected UnknownSelector, got {other:?}"),
        }
    }

    #[test]
    fn truncated_payload_is_reported() {
        let reg = registry();
        let sel = reg.by_name("InsufficientBalance").unwrap().selector;
        // One word instead of the two the signature requires.
        let mut data = sel.to_vec();
        data.extend_from_slice(&[0u8; 32]);
        let err = decode_error_data(&data, &reg).unwrap_err();
        assert!(matches!(err, DecodeFailure::Truncated { .. }));
        assert_eq!(err.selector(), Some(sel));
    }

    #[test]
    fn call_decode_matches_function_entries_only() {
        let reg = registry();
        let sel = reg.by_name("transfer").unwrap().selector;
        let data = encode(
            sel,
            &[
                DynSolValue::Address(addr()),
                DynSolValue::Uint(U256::from(1_000_000u64), 256),
            ],
        );

        let call = decode_call_data(&data, &reg).unwrap();
        assert_eq!(call.function, "transfer");
        assert_eq!(call.inputs[1], ("amount".into(), AbiValue::Uint(1_000_000)));

        // The same bytes are not a declared error.
        assert!(decode_error_data(&data, &reg).is_err());
    }

    #[test]
    fn hex_wrappers_strip_prefix_and_reject_garbage() {
        let reg = registry();
        let sel = reg.by_name("EnforcedPause").unwrap().selector;
        let decoded = decode_error_hex(&format!("0x{}", hex::encode(sel)), &reg).unwrap();
        assert_eq!(decoded.name, "EnforcedPause");

        assert!(matches!(
            decode_error_hex("0xzz", &reg),
            Err(DecodeFailure::InvalidHex { .. })
        ));
    }

    #[test]
    fn big_uint_spills_to_string() {
        let reg = registry();
        let sel = reg.by_name("InsufficientBalance").unwrap().selector;
        let data = encode(
            sel,
            &[
                DynSolValue::Address(addr()),
                DynSolValue::Uint(U256::MAX, 256),
            ],
        );
        let decoded = decode_error_data(&data, &reg).unwrap();
        assert!(matches!(&decoded.args[1].1, AbiValue::BigUint(s) if s.starts_with("1157920892")));
    }

    #[test]
    fn determinism_same_bytes_same_result() {
        let reg = registry();
        let sel = reg.by_name("Reason").unwrap().selector;
        let data = encode(sel, &[DynSolValue::String("x".into())]);
        let a = decode_error_data(&data, &reg).unwrap();
        let b = decode_error_data(&data, &reg).unwrap();
        assert_eq!(a, b);
    }
}
