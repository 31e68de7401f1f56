//! Interface registry — canonical signatures and 4-byte selectors for every
//! contract the relay talks to.
//!
//! Built once at process start from contract descriptions, immutable
//! thereafter. Selectors are **not** guaranteed unique across merged
//! contracts; lookup deterministically returns the first match in
//! registration order (first-match-wins is a deliberate, tested policy).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tiny_keccak::{Hasher, Keccak};

// ─── Contract descriptions (registry input) ───────────────────────────────────

/// Whether an interface entry is a function or a declared error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKind {
    Function,
    Error,
}

/// A single typed parameter of a function or error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceParam {
    /// Parameter name (may be empty for unnamed params).
    pub name: String,
    /// Canonical Solidity type string (e.g. `"address"`, `"uint256"`,
    /// `"bytes"`, `"(address,uint256)"`, `"uint256[]"`).
    pub ty: String,
}

impl InterfaceParam {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self { name: name.into(), ty: ty.into() }
    }
}

/// One function or error declaration from a contract description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceItem {
    pub kind: InterfaceKind,
    pub name: String,
    pub inputs: Vec<InterfaceParam>,
}

impl InterfaceItem {
    pub fn function(name: impl Into<String>, inputs: Vec<InterfaceParam>) -> Self {
        Self { kind: InterfaceKind::Function, name: name.into(), inputs }
    }

    pub fn error(name: impl Into<String>, inputs: Vec<InterfaceParam>) -> Self {
        Self { kind: InterfaceKind::Error, name: name.into(), inputs }
    }
}

/// The interface description of one contract the relay integrates with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractInterface {
    /// Contract name, used in diagnostics only.
    pub contract: String,
    pub items: Vec<InterfaceItem>,
}

// ─── Registry entries ─────────────────────────────────────────────────────────

/// An interface declaration with its derived canonical signature and
/// selector. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceEntry {
    pub kind: InterfaceKind,
    pub name: String,
    pub inputs: Vec<InterfaceParam>,
    /// Canonical signature string: `name(type1,type2,...)`.
    pub signature: String,
    /// First 4 bytes of keccak256 of the signature.
    pub selector: [u8; 4],
    /// The contract this entry came from.
    pub contract: String,
}

/// Malformed contract description — a startup-time fatal condition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("contract '{contract}' declares an entry with no name")]
    MissingName { contract: String },

    #[error("entry '{name}' in contract '{contract}' has a parameter with an empty type")]
    MissingType { contract: String, name: String },
}

/// Canonical signature string for an entry: `name(type1,type2,...)`.
pub fn canonical_signature(name: &str, inputs: &[InterfaceParam]) -> String {
    let types: Vec<&str> = inputs.iter().map(|p| p.ty.as_str()).collect();
    format!("{}({})", name, types.join(","))
}

/// First 4 bytes of keccak256 of a canonical signature string.
pub fn selector_of(signature: &str) -> [u8; 4] {
    let mut k = Keccak::v256();
    k.update(signature.as_bytes());
    let mut out = [0u8; 32];
    k.finalize(&mut out);
    [out[0], out[1], out[2], out[3]]
}

// ─── Registry ─────────────────────────────────────────────────────────────────

/// Ordered, immutable collection of [`InterfaceEntry`] values aggregated
/// from every contract the relay talks to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterfaceRegistry {
    entries: Vec<InterfaceEntry>,
}

impl InterfaceRegistry {
    /// Build a registry from contract descriptions. Pure and deterministic.
    ///
    /// Fails only on a malformed description (missing entry name or
    /// parameter type) — a startup-time fatal condition, never a runtime
    /// one.
    pub fn build(contracts: &[ContractInterface]) -> Result<Self, RegistryError> {
        let mut entries = Vec::new();
        for contract in contracts {
            for item in &contract.items {
                if item.name.is_empty() {
                    return Err(RegistryError::MissingName {
                        contract: contract.contract.clone(),
                    });
                }
                if item.inputs.iter().any(|p| p.ty.is_empty()) {
                    return Err(RegistryError::MissingType {
                        contract: contract.contract.clone(),
                        name: item.name.clone(),
                    });
                }
                let signature = canonical_signature(&item.name, &item.inputs);
                let selector = selector_of(&signature);
                entries.push(InterfaceEntry {
                    kind: item.kind,
                    name: item.name.clone(),
                    inputs: item.inputs.clone(),
                    signature,
                    selector,
                    contract: contract.contract.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// First entry (in registration order) matching the selector, any kind.
    pub fn by_selector(&self, selector: [u8; 4]) -> Option<&InterfaceEntry> {
        self.entries.iter().find(|e| e.selector == selector)
    }

    /// First error entry matching the selector.
    pub fn error_by_selector(&self, selector: [u8; 4]) -> Option<&InterfaceEntry> {
        self.entries
            .iter()
            .find(|e| e.kind == InterfaceKind::Error && e.selector == selector)
    }

    /// First function entry matching the selector.
    pub fn function_by_selector(&self, selector: [u8; 4]) -> Option<&InterfaceEntry> {
        self.entries
            .iter()
            .find(|e| e.kind == InterfaceKind::Function && e.selector == selector)
    }

    /// First entry with the given name.
    pub fn by_name(&self, name: &str) -> Option<&InterfaceEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entries(&self) -> &[InterfaceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn erc20() -> ContractInterface {
        ContractInterface {
            contract: "ERC20".into(),
            items: vec![
                InterfaceItem::function(
                    "transfer",
                    vec![
                        InterfaceParam::new("to", "address"),
                        InterfaceParam::new("amount", "uint256"),
                    ],
                ),
                InterfaceItem::error(
                    "ERC20InsufficientBalance",
                    vec![
                        InterfaceParam::new("sender", "address"),
                        InterfaceParam::new("balance", "uint256"),
                        InterfaceParam::new("needed", "uint256"),
                    ],
                ),
            ],
        }
    }

    #[test]
    fn selector_derivation_matches_known_values() {
        // keccak256("transfer(address,uint256)")[..4]
        assert_eq!(hex::encode(selector_of("transfer(address,uint256)")), "a9059cbb");
        // keccak256("Error(string)")[..4]
        assert_eq!(hex::encode(selector_of("Error(string)")), "08c379a0");
        // keccak256("Panic(uint256)")[..4]
        assert_eq!(hex::encode(selector_of("Panic(uint256)")), "4e487b71");
    }

    #[test]
    fn build_derives_signatures_and_selectors() {
        let reg = InterfaceRegistry::build(&[erc20()]).unwrap();
        assert_eq!(reg.len(), 2);

        let transfer = reg.by_name("transfer").unwrap();
        assert_eq!(transfer.signature, "transfer(address,uint256)");
        assert_eq!(hex::encode(transfer.selector), "a9059cbb");
        assert_eq!(transfer.kind, InterfaceKind::Function);
    }

    #[test]
    fn lookup_is_first_match_in_registration_order() {
        // Two contracts declaring the same signature: identical selector,
        // different owning contract. First registration must win, every time.
        let a = ContractInterface {
            contract: "First".into(),
            items: vec![InterfaceItem::error(
                "Shared",
                vec![InterfaceParam::new("x", "uint256")],
            )],
        };
        let b = ContractInterface {
            contract: "Second".into(),
            items: vec![InterfaceItem::error(
                "Shared",
                vec![InterfaceParam::new("y", "uint256")],
            )],
        };
        let reg = InterfaceRegistry::build(&[a, b]).unwrap();
        let sel = selector_of("Shared(uint256)");

        for _ in 0..8 {
            let hit = reg.by_selector(sel).unwrap();
            assert_eq!(hit.contract, "First");
            assert_eq!(hit.inputs[0].name, "x");
        }
    }

    #[test]
    fn kind_filtered_lookup() {
        let reg = InterfaceRegistry::build(&[erc20()]).unwrap();
        let transfer_sel = selector_of("transfer(address,uint256)");
        assert!(reg.function_by_selector(transfer_sel).is_some());
        assert!(reg.error_by_selector(transfer_sel).is_none());
    }

    #[test]
    fn unknown_selector_returns_none() {
        let reg = InterfaceRegistry::build(&[erc20()]).unwrap();
        assert!(reg.by_selector([0xde, 0xad, 0xbe, 0xef]).is_none());
    }

    #[test]
    fn malformed_descriptions_fail_build() {
        let unnamed = ContractInterface {
            contract: "Bad".into(),
            items: vec![InterfaceItem::error("", vec![])],
        };
        assert!(matches!(
            InterfaceRegistry::build(&[unnamed]),
            Err(RegistryError::MissingName { .. })
        ));

        let untyped = ContractInterface {
            contract: "Bad".into(),
            items: vec![InterfaceItem::error(
                "Foo",
                vec![InterfaceParam::new("x", "")],
            )],
        };
        assert!(matches!(
            InterfaceRegistry::build(&[untyped]),
            Err(RegistryError::MissingType { .. })
        ));
    }

    #[test]
    fn zero_arg_signature_has_empty_parens() {
        assert_eq!(canonical_signature("EnforcedPause", &[]), "EnforcedPause()");
    }
}
