//! relayerrors-evm — ABI revert decoding and unified failure
//! classification, built on alloy-rs.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use relayerrors_core::RelayFailure;
//! use relayerrors_evm::RelayErrorClassifier;
//!
//! let classifier = RelayErrorClassifier::with_bundled_interfaces();
//! let record = classifier.classify(RelayFailure::Message(
//!     "Missing required fields: to and data".into(),
//! ));
//! println!("{record}"); // "[validation] Missing required fields: to and data"
//! ```

pub mod classify;
pub mod decoder;
pub mod interfaces;
pub mod unwrap;

pub use classify::RelayErrorClassifier;
pub use decoder::{decode_call_data, decode_call_hex, decode_error_data, decode_error_hex};
pub use interfaces::{bundled_interfaces, bundled_registry, interface_from_abi_json};
pub use unwrap::{extract_revert_data, unwrap_revert, UnwrappedRevert, WRAPPER_ERROR_NAME};
