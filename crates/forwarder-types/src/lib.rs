//! Common types for the trusted-forwarder system.
//!
//! This crate defines the data model shared by the token issuance,
//! verification, and dispatch components: addresses, signatures, forward
//! requests, authorization tokens, receipts, and relay events, plus the
//! small utility and configuration-validation layers built on top of them.

/// Addresses and signatures.
pub mod account;
/// Policy constants for gas ceilings and failure classification.
pub mod constants;
/// Relay events published on the dispatch event bus.
pub mod events;
/// Forward requests, authorization tokens, and token identities.
pub mod request;
/// Receipt handles and execution receipts.
pub mod receipt;
/// Hex and identifier formatting helpers.
pub mod utils;
/// TOML configuration validation.
pub mod validation;

pub use account::{Address, Signature, SignatureParseError};
pub use constants::{
	AUTH_FAILURE_MARKER, DEFAULT_CALL_GAS, MIN_VALID_RECOVERY_BYTE, SUBMISSION_GAS_CEILING,
};
pub use events::RelayEvent;
pub use receipt::{ExecutionReceipt, ReceiptHandle};
pub use request::{AuthorizationToken, Call, ForwardRequest, TokenIdentity};
pub use utils::{quantity_hex, truncate_id, with_0x_prefix, without_0x_prefix};
pub use validation::{ConfigSchema, Field, FieldType, Schema, ValidationError};
