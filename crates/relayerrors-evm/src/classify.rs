//! Unified error classifier — one normalized record per opaque failure.
//!
//! Classification never fails: every path terminates in exactly one of the
//! five categories, worst case `unknown`, and the original failure rides
//! along in [`UnifiedError::source`] for logging.

use std::sync::Arc;

use relayerrors_core::chain::{walk, FailureKind, FailureNode, JsonRpcError, RelayFailure};
use relayerrors_core::registry::InterfaceRegistry;
use relayerrors_core::types::{ErrorCategory, ErrorCode, ErrorDetails, UnifiedError};
use tracing::debug;

use crate::decoder::hex_to_bytes;
use crate::interfaces::bundled_registry;
use crate::unwrap::{extract_revert_data, unwrap_revert, UnwrappedRevert};

/// Classifies opaque relay failures against an immutable interface
/// registry.
///
/// The registry is built once at process start; the classifier itself is
/// stateless beyond that shared reference and safe to call from any number
/// of in-flight request handlers.
pub struct RelayErrorClassifier {
    registry: Arc<InterfaceRegistry>,
}

impl RelayErrorClassifier {
    pub fn new(registry: Arc<InterfaceRegistry>) -> Self {
        Self { registry }
    }

    /// Classifier over the bundled forwarder/token interface set.
    pub fn with_bundled_interfaces() -> Self {
        Self::new(Arc::new(bundled_registry()))
    }

    pub fn registry(&self) -> &InterfaceRegistry {
        &self.registry
    }

    /// Classify whatever the transaction-submission stack raised.
    pub fn classify(&self, failure: RelayFailure) -> UnifiedError {
        let record = match &failure {
            RelayFailure::Node(node) => self.classify_node(node),
            RelayFailure::Message(message) => classify_message(message),
            RelayFailure::Value(_) => {
                UnifiedError::new(ErrorCategory::Unknown, failure.message())
            }
        };
        debug!(category = %record.category, message = %record.message, "classified relay failure");
        record.with_source(failure)
    }

    /// Walk the chain with the canonical predicates in precedence order:
    /// network, then rpc, then contract-revert, then execution-revert, then
    /// generic has-data. Contract-level detail must dominate the generic
    /// RPC envelope, so the ordering is load-bearing.
    fn classify_node(&self, node: &FailureNode) -> UnifiedError {
        if let Some(hit) = walk(node, FailureNode::is_network_transport) {
            if let FailureKind::Transport { status, .. } = &hit.kind {
                return UnifiedError::new(ErrorCategory::Network, "network request failed")
                    .with_code(ErrorCode::Number(i64::from(*status)));
            }
        }

        if let Some(hit) = walk(node, FailureNode::is_json_rpc) {
            if let FailureKind::JsonRpc(rpc) = &hit.kind {
                return self.classify_rpc(rpc);
            }
        }

        if let Some(hit) = walk(node, FailureNode::is_contract_revert) {
            if let FailureKind::ContractRevert { reason, data } = &hit.kind {
                return self.classify_contract_revert(reason.as_deref(), data.as_deref());
            }
        }

        if let Some(hit) = walk(node, FailureNode::is_execution_revert) {
            return self.classify_execution_revert(hit);
        }

        if let Some(hit) = walk(node, FailureNode::has_hex_revert_data) {
            if let Some(unwrapped) = self.try_unwrap_node_data(hit) {
                return self.contract_record(
                    format!("Transaction reverted: {}", unwrapped.decoded.render()),
                    &unwrapped,
                    None,
                );
            }
            // Data that does not decode falls through to the generic case.
        }

        UnifiedError::new(ErrorCategory::Unknown, node.message())
    }

    fn classify_rpc(&self, rpc: &JsonRpcError) -> UnifiedError {
        if let Some(unwrapped) = rpc
            .data
            .as_ref()
            .and_then(|d| extract_revert_data(d))
            .and_then(|hex_str| self.try_unwrap_hex(&hex_str))
        {
            return self.contract_record(
                format!("Transaction reverted: {}", unwrapped.decoded.render()),
                &unwrapped,
                Some(rpc),
            );
        }

        debug!(code = rpc.code, "rpc error carried no decodable revert");
        let message = if rpc.message.is_empty() {
            "RPC request failed".to_string()
        } else {
            rpc.message.clone()
        };
        UnifiedError::new(ErrorCategory::Rpc, message)
            .with_code(ErrorCode::Number(rpc.code))
            .with_details(ErrorDetails {
                rpc: Some(rpc.clone()),
                ..Default::default()
            })
    }

    fn classify_contract_revert(
        &self,
        reason: Option<&str>,
        data: Option<&str>,
    ) -> UnifiedError {
        // A built-in human-readable reason wins outright; no decode needed.
        if let Some(reason) = reason {
            return UnifiedError::new(
                ErrorCategory::Contract,
                format!("Contract reverted: {reason}"),
            );
        }

        if let Some(unwrapped) = data.and_then(|d| self.try_unwrap_hex(d)) {
            return self.contract_record(
                format!("Contract reverted: {}", unwrapped.decoded.render()),
                &unwrapped,
                None,
            );
        }

        UnifiedError::new(ErrorCategory::Contract, "Contract reverted with unknown error")
    }

    fn classify_execution_revert(&self, hit: &FailureNode) -> UnifiedError {
        // Revert bytes may sit on this node or further down its chain.
        let unwrapped = walk(hit, FailureNode::has_hex_revert_data)
            .and_then(|n| self.try_unwrap_node_data(n));

        if let Some(unwrapped) = unwrapped {
            return self.contract_record(
                format!("Execution reverted: {}", unwrapped.decoded.name),
                &unwrapped,
                None,
            );
        }

        let message = match &hit.kind {
            FailureKind::ExecutionRevert {
                message: Some(m), ..
            } => m.clone(),
            _ => "Execution reverted".to_string(),
        };
        UnifiedError::new(ErrorCategory::Contract, message)
    }

    fn try_unwrap_node_data(&self, node: &FailureNode) -> Option<UnwrappedRevert> {
        let hex_str = node.data_value().and_then(|v| extract_revert_data(&v))?;
        self.try_unwrap_hex(&hex_str)
    }

    fn try_unwrap_hex(&self, hex_str: &str) -> Option<UnwrappedRevert> {
        let bytes = hex_to_bytes(hex_str).ok()?;
        match unwrap_revert(&bytes, &self.registry) {
            Ok(unwrapped) => Some(unwrapped),
            Err(e) => {
                debug!(error = %e, "revert data did not decode");
                None
            }
        }
    }

    /// Assemble the `contract` record: message from the effective decode,
    /// details carrying selector, raw data, the decoded error, the
    /// discarded wrapper (if any), and the originating RPC envelope.
    fn contract_record(
        &self,
        message: String,
        unwrapped: &UnwrappedRevert,
        rpc: Option<&JsonRpcError>,
    ) -> UnifiedError {
        let nested = unwrapped
            .outer
            .as_ref()
            .map(|outer| {
                vec![UnifiedError::new(
                    ErrorCategory::Contract,
                    outer.render(),
                )
                .with_details(ErrorDetails {
                    selector: Some(format!("0x{}", hex::encode(outer.selector))),
                    decoded: Some(outer.clone()),
                    ..Default::default()
                })]
            })
            .unwrap_or_default();

        UnifiedError::new(ErrorCategory::Contract, message).with_details(ErrorDetails {
            selector: Some(format!("0x{}", hex::encode(unwrapped.decoded.selector))),
            data: Some(format!("0x{}", hex::encode(&unwrapped.data))),
            decoded: Some(unwrapped.decoded.clone()),
            nested,
            rpc: rpc.cloned(),
        })
    }
}

/// Classify a plain (non-chain) error by its message text.
fn classify_message(message: &str) -> UnifiedError {
    let lower = message.to_lowercase();
    if lower.contains("fetch") || lower.contains("network") {
        UnifiedError::new(ErrorCategory::Network, message)
    } else if message.contains("Missing required fields") || message.contains("Invalid") {
        UnifiedError::new(ErrorCategory::Validation, message)
    } else {
        UnifiedError::new(ErrorCategory::Unknown, message)
    }
}
