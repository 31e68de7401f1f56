//! Bundled interface descriptions for the contracts the relay integrates
//! with, plus a loader for standard Ethereum ABI JSON.
//!
//! The bundled set covers the trusted forwarder the relay fronts, the
//! Solidity built-in error shapes, and the OpenZeppelin errors commonly
//! surfaced by the token contracts behind it. Registration order matters:
//! lookups are first-match-wins, so the forwarder (including the
//! `CallFailedWithMessage` wrapper) registers first.

use alloy_json_abi::JsonAbi;
use relayerrors_core::registry::{
    ContractInterface, InterfaceItem, InterfaceParam, InterfaceRegistry,
};

use crate::unwrap::WRAPPER_ERROR_NAME;

/// Build a [`ContractInterface`] from a standard Ethereum ABI JSON string.
pub fn interface_from_abi_json(
    contract: &str,
    abi_json: &str,
) -> Result<ContractInterface, serde_json::Error> {
    let abi: JsonAbi = serde_json::from_str(abi_json)?;

    let mut items = Vec::new();
    for func in abi.functions() {
        let inputs = func
            .inputs
            .iter()
            .map(|p| InterfaceParam::new(p.name.clone(), p.selector_type().into_owned()))
            .collect();
        items.push(InterfaceItem::function(func.name.clone(), inputs));
    }
    for err in abi.errors() {
        let inputs = err
            .inputs
            .iter()
            .map(|p| InterfaceParam::new(p.name.clone(), p.selector_type().into_owned()))
            .collect();
        items.push(InterfaceItem::error(err.name.clone(), inputs));
    }

    Ok(ContractInterface {
        contract: contract.to_string(),
        items,
    })
}

/// Interface descriptions for every contract the relay talks to.
pub fn bundled_interfaces() -> Vec<ContractInterface> {
    fn p(name: &str, ty: &str) -> InterfaceParam {
        InterfaceParam::new(name, ty)
    }

    let forward_request_ty = "(address,address,uint256,uint256,uint48,bytes)";

    vec![
        // Solidity built-in error shapes.
        ContractInterface {
            contract: "Solidity".into(),
            items: vec![
                InterfaceItem::error("Error", vec![p("message", "string")]),
                InterfaceItem::error("Panic", vec![p("code", "uint256")]),
            ],
        },
        // The trusted forwarder (ERC-2771 style) the relay submits to.
        ContractInterface {
            contract: "Forwarder".into(),
            items: vec![
                InterfaceItem::function(
                    "execute",
                    vec![p("request", forward_request_ty), p("signature", "bytes")],
                ),
                InterfaceItem::function(
                    "verify",
                    vec![p("request", forward_request_ty), p("signature", "bytes")],
                ),
                InterfaceItem::function("nonces", vec![p("owner", "address")]),
                // The generic wrapper: a failed downstream call's revert
                // bytes ride in `reason`.
                InterfaceItem::error(WRAPPER_ERROR_NAME, vec![p("reason", "bytes")]),
                InterfaceItem::error(
                    "ForwarderInvalidSigner",
                    vec![p("signer", "address"), p("from", "address")],
                ),
                InterfaceItem::error("ForwarderExpiredRequest", vec![p("deadline", "uint48")]),
                InterfaceItem::error(
                    "ForwarderUntrustfulTarget",
                    vec![p("target", "address"), p("forwarder", "address")],
                ),
                InterfaceItem::error(
                    "ForwarderMismatchedValue",
                    vec![p("requestedValue", "uint256"), p("msgValue", "uint256")],
                ),
                InterfaceItem::error(
                    "InvalidNonce",
                    vec![p("account", "address"), p("nonce", "uint256")],
                ),
            ],
        },
        // Token contracts behind the forwarder.
        ContractInterface {
            contract: "ERC20".into(),
            items: vec![
                InterfaceItem::function(
                    "transfer",
                    vec![p("to", "address"), p("amount", "uint256")],
                ),
                InterfaceItem::function(
                    "transferFrom",
                    vec![p("from", "address"), p("to", "address"), p("amount", "uint256")],
                ),
                InterfaceItem::function(
                    "approve",
                    vec![p("spender", "address"), p("amount", "uint256")],
                ),
                InterfaceItem::error(
                    "ERC20InsufficientBalance",
                    vec![
                        p("sender", "address"),
                        p("balance", "uint256"),
                        p("needed", "uint256"),
                    ],
                ),
                InterfaceItem::error(
                    "ERC20InsufficientAllowance",
                    vec![
                        p("spender", "address"),
                        p("allowance", "uint256"),
                        p("needed", "uint256"),
                    ],
                ),
                InterfaceItem::error("ERC20InvalidSender", vec![p("sender", "address")]),
                InterfaceItem::error("ERC20InvalidReceiver", vec![p("receiver", "address")]),
            ],
        },
        // OpenZeppelin access/pausing errors surfaced by integrated contracts.
        ContractInterface {
            contract: "AccessControl".into(),
            items: vec![
                InterfaceItem::error(
                    "OwnableUnauthorizedAccount",
                    vec![p("account", "address")],
                ),
                InterfaceItem::error("OwnableInvalidOwner", vec![p("owner", "address")]),
                InterfaceItem::error(
                    "AccessControlUnauthorizedAccount",
                    vec![p("account", "address"), p("neededRole", "bytes32")],
                ),
                InterfaceItem::error("EnforcedPause", vec![]),
                InterfaceItem::error("ExpectedPause", vec![]),
            ],
        },
    ]
}

/// The registry over [`bundled_interfaces`], built fresh.
pub fn bundled_registry() -> InterfaceRegistry {
    InterfaceRegistry::build(&bundled_interfaces()).expect("bundled interface data is well-formed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use relayerrors_core::registry::{selector_of, InterfaceKind};

    #[test]
    fn bundled_registry_builds() {
        let reg = bundled_registry();
        assert!(!reg.is_empty());
        assert!(reg.by_name(WRAPPER_ERROR_NAME).is_some());
    }

    #[test]
    fn bundled_solidity_builtins_have_canonical_selectors() {
        let reg = bundled_registry();
        let error = reg.by_name("Error").unwrap();
        assert_eq!(hex::encode(error.selector), "08c379a0");
        let panic = reg.by_name("Panic").unwrap();
        assert_eq!(hex::encode(panic.selector), "4e487b71");
    }

    #[test]
    fn forwarder_execute_uses_tuple_canonical_type() {
        let reg = bundled_registry();
        let execute = reg.by_name("execute").unwrap();
        assert_eq!(
            execute.signature,
            "execute((address,address,uint256,uint256,uint48,bytes),bytes)"
        );
        assert_eq!(execute.kind, InterfaceKind::Function);
    }

    #[test]
    fn abi_json_loader_round_trips_selectors() {
        let abi = r#"[
            {
                "name": "transfer",
                "type": "function",
                "inputs": [
                    {"name": "to", "type": "address"},
                    {"name": "amount", "type": "uint256"}
                ],
                "outputs": [{"name": "", "type": "bool"}],
                "stateMutability": "nonpayable"
            },
            {
                "name": "Unauthorized",
                "type": "error",
                "inputs": [{"name": "caller", "type": "address"}]
            }
        ]"#;

        let iface = interface_from_abi_json("Token", abi).unwrap();
        let reg = InterfaceRegistry::build(&[iface]).unwrap();

        let transfer = reg.by_name("transfer").unwrap();
        assert_eq!(transfer.selector, selector_of("transfer(address,uint256)"));
        let unauthorized = reg.by_name("Unauthorized").unwrap();
        assert_eq!(unauthorized.kind, InterfaceKind::Error);
        assert_eq!(unauthorized.signature, "Unauthorized(address)");
    }

    #[test]
    fn invalid_abi_json_is_rejected() {
        assert!(interface_from_abi_json("X", "not json").is_err());
    }
}
