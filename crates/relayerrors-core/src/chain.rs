//! Failure-chain model — a tagged union of failure kinds linked by `cause`.
//!
//! Failures produced by the transaction-submission stack arrive as a chain
//! of underlying causes (transport error wrapping an RPC error wrapping an
//! execution error). The chain is modeled explicitly rather than through
//! runtime type inspection: each node carries a [`FailureKind`] and an
//! optional boxed `cause`, and [`walk`] is a bounded loop over that
//! adjacency.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Maximum number of `cause` hops [`walk`] will follow before giving up.
pub const MAX_CAUSE_DEPTH: usize = 16;

// ─── JSON-RPC error ───────────────────────────────────────────────────────────

/// A JSON-RPC 2.0 error object as returned by the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

// ─── Failure kinds ────────────────────────────────────────────────────────────

/// What a single node in the failure chain represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// Network transport failure: an HTTP-style status, no JSON-RPC code.
    Transport { status: u16, message: String },

    /// The node answered with a JSON-RPC error envelope.
    JsonRpc(JsonRpcError),

    /// An explicit contract revert, with an optional built-in human reason
    /// (`require(cond, "reason")`) and optional raw revert data.
    ContractRevert {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<String>,
    },

    /// A lower-level "execution reverted" signal. Revert bytes, if any, may
    /// sit on this node or on a node further down the chain.
    ExecutionRevert {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<String>,
    },

    /// Anything else error-shaped.
    Other {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
}

// ─── Failure node ─────────────────────────────────────────────────────────────

/// One node in a failure chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureNode {
    #[serde(flatten)]
    pub kind: FailureKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cause: Option<Box<FailureNode>>,
}

impl FailureNode {
    pub fn new(kind: FailureKind) -> Self {
        Self { kind, cause: None }
    }

    pub fn with_cause(mut self, cause: FailureNode) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// The node's short/primary message.
    pub fn message(&self) -> String {
        match &self.kind {
            FailureKind::Transport { message, .. } => message.clone(),
            FailureKind::JsonRpc(e) => e.message.clone(),
            FailureKind::ContractRevert { reason, .. } => {
                reason.clone().unwrap_or_else(|| "contract reverted".into())
            }
            FailureKind::ExecutionRevert { message, .. } => {
                message.clone().unwrap_or_else(|| "execution reverted".into())
            }
            FailureKind::Other { message, .. } => message.clone(),
        }
    }

    /// The node's `data` field, if it carries one, as a JSON value.
    /// String-shaped data is returned as `Value::String`.
    pub fn data_value(&self) -> Option<Value> {
        match &self.kind {
            FailureKind::Transport { .. } => None,
            FailureKind::JsonRpc(e) => e.data.clone(),
            FailureKind::ContractRevert { data, .. }
            | FailureKind::ExecutionRevert { data, .. } => {
                data.as_ref().map(|d| Value::String(d.clone()))
            }
            FailureKind::Other { data, .. } => data.clone(),
        }
    }

    // ── Canonical predicates (checked by the classifier in precedence order:
    //    network, rpc, contract-revert, execution-revert, has-data) ──────────

    pub fn is_network_transport(&self) -> bool {
        matches!(self.kind, FailureKind::Transport { .. })
    }

    pub fn is_json_rpc(&self) -> bool {
        matches!(self.kind, FailureKind::JsonRpc(_))
    }

    pub fn is_contract_revert(&self) -> bool {
        matches!(self.kind, FailureKind::ContractRevert { .. })
    }

    pub fn is_execution_revert(&self) -> bool {
        matches!(self.kind, FailureKind::ExecutionRevert { .. })
    }

    /// Does this node expose a `data` field that is a `0x`-prefixed string?
    pub fn has_hex_revert_data(&self) -> bool {
        matches!(self.data_value(), Some(Value::String(s)) if s.starts_with("0x"))
    }
}

/// Returns the first node, starting from `start` and following `cause`
/// links, for which `pred` holds. Traversal is capped at
/// [`MAX_CAUSE_DEPTH`] hops; past the cap the chain is treated as
/// exhausted.
pub fn walk<'a>(
    start: &'a FailureNode,
    pred: impl Fn(&FailureNode) -> bool,
) -> Option<&'a FailureNode> {
    let mut node = start;
    for _ in 0..MAX_CAUSE_DEPTH {
        if pred(node) {
            return Some(node);
        }
        match &node.cause {
            Some(next) => node = next,
            None => return None,
        }
    }
    None
}

// ─── Opaque relay failure ─────────────────────────────────────────────────────

/// Whatever the transaction-submission collaborator raised.
///
/// Chain-walkable failures carry a [`FailureNode`]; plain errors carry only
/// their message; anything else (an arbitrary thrown value) is kept as raw
/// JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayFailure {
    Node(FailureNode),
    Message(String),
    Value(Value),
}

impl RelayFailure {
    /// The failure's short string representation.
    pub fn message(&self) -> String {
        match self {
            Self::Node(n) => n.message(),
            Self::Message(s) => s.clone(),
            Self::Value(v) => match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        }
    }
}

impl fmt::Display for RelayFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn rpc_error(code: i64, message: &str, data: Option<Value>) -> FailureKind {
        FailureKind::JsonRpc(JsonRpcError {
            code,
            message: message.into(),
            data,
        })
    }

    #[test]
    fn walk_finds_inner_rpc_node() {
        let chain = FailureNode::new(FailureKind::Other {
            message: "call raised an exception".into(),
            data: None,
        })
        .with_cause(
            FailureNode::new(FailureKind::Transport {
                status: 500,
                message: "server error".into(),
            })
            .with_cause(FailureNode::new(rpc_error(-32000, "execution reverted", None))),
        );

        let hit = walk(&chain, FailureNode::is_json_rpc).expect("rpc node");
        assert!(matches!(&hit.kind, FailureKind::JsonRpc(e) if e.code == -32000));
    }

    #[test]
    fn walk_exhausted_chain_returns_none() {
        let chain = FailureNode::new(FailureKind::Other {
            message: "outer".into(),
            data: None,
        });
        assert!(walk(&chain, FailureNode::is_contract_revert).is_none());
    }

    #[test]
    fn walk_is_depth_capped() {
        let mut chain = FailureNode::new(rpc_error(-32000, "innermost", None));
        for i in 0..(MAX_CAUSE_DEPTH + 4) {
            chain = FailureNode::new(FailureKind::Other {
                message: format!("layer {i}"),
                data: None,
            })
            .with_cause(chain);
        }
        // The rpc node sits past the cap.
        assert!(walk(&chain, FailureNode::is_json_rpc).is_none());
        // Nodes inside the cap are still reachable.
        assert!(walk(&chain, |n| n.message() == format!("layer {}", MAX_CAUSE_DEPTH + 3)).is_some());
    }

    #[test]
    fn has_hex_revert_data_predicate() {
        let with_data = FailureNode::new(FailureKind::ExecutionRevert {
            message: None,
            data: Some("0x08c379a0".into()),
        });
        assert!(with_data.has_hex_revert_data());

        let rpc_string_data =
            FailureNode::new(rpc_error(3, "reverted", Some(Value::String("0xdead".into()))));
        assert!(rpc_string_data.has_hex_revert_data());

        let no_prefix = FailureNode::new(FailureKind::ExecutionRevert {
            message: None,
            data: Some("08c379a0".into()),
        });
        assert!(!no_prefix.has_hex_revert_data());

        let none = FailureNode::new(FailureKind::Transport {
            status: 503,
            message: "unavailable".into(),
        });
        assert!(!none.has_hex_revert_data());
    }

    #[test]
    fn failure_chain_deserializes_from_json() {
        let json = r#"{
            "kind": "json_rpc",
            "code": -32000,
            "message": "execution reverted",
            "data": "0x08c379a0",
            "cause": { "kind": "other", "message": "socket closed" }
        }"#;
        let node: FailureNode = serde_json::from_str(json).unwrap();
        assert!(node.is_json_rpc());
        assert!(node.has_hex_revert_data());
        assert_eq!(node.cause.as_ref().unwrap().message(), "socket closed");
    }

    #[test]
    fn relay_failure_untagged_forms() {
        let as_node: RelayFailure =
            serde_json::from_str(r#"{"kind":"transport","status":503,"message":"down"}"#).unwrap();
        assert!(matches!(as_node, RelayFailure::Node(_)));

        let as_message: RelayFailure = serde_json::from_str(r#""plain error""#).unwrap();
        assert!(matches!(as_message, RelayFailure::Message(_)));

        let as_value: RelayFailure = serde_json::from_str("[1,2,3]").unwrap();
        assert_eq!(as_value.message(), "[1,2,3]");
    }
}
