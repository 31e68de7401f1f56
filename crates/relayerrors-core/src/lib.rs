//! relayerrors-core — foundation types for the relay failure classifier.
//!
//! This crate defines:
//! - [`ErrorCategory`] / [`UnifiedError`] — the normalized error taxonomy
//! - [`FailureNode`] / [`walk`] — the chain-of-causes model and its walker
//! - [`InterfaceRegistry`] — selectors and signatures for every contract
//!   the relay talks to
//! - [`DecodedRevert`] / [`DecodeFailure`] — decode results and misses

pub mod chain;
pub mod registry;
pub mod types;

pub use chain::{walk, FailureKind, FailureNode, JsonRpcError, RelayFailure, MAX_CAUSE_DEPTH};
pub use registry::{
    canonical_signature, selector_of, ContractInterface, InterfaceEntry, InterfaceItem,
    InterfaceKind, InterfaceParam, InterfaceRegistry, RegistryError,
};
pub use types::{
    AbiValue, DecodeFailure, DecodedCall, DecodedRevert, ErrorCategory, ErrorCode, ErrorDetails,
    UnifiedError,
};
