//! Forward requests, authorization tokens, and token identities.

use crate::account::{Address, Signature};
use alloy_primitives::{keccak256, B256, U256};
use serde::{Deserialize, Serialize};

/// A signed authorization produced once by the token issuer.
///
/// The token is immutable and may back any number of forwarded calls while
/// its session window (if any) remains open. `session_expiry == 0` means the
/// token never expires by height alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationToken {
	/// Normalized 65-byte signature over the canonical authorization text.
	pub signature: Signature,
	/// Ledger height asserted in the signed text, one behind the height
	/// observed at signing time.
	pub issued_at: u64,
	/// Sliding session window in heights; zero disables expiry.
	pub session_expiry: u64,
}

impl AuthorizationToken {
	/// The identity tuple this token keys session and revocation state under.
	pub fn identity(&self, signer: &Address, relayer: &Address) -> TokenIdentity {
		TokenIdentity {
			signer: signer.clone(),
			relayer: relayer.clone(),
			issued_at: self.issued_at,
			session_expiry: self.session_expiry,
		}
	}
}

/// A single forwarded call as consumed by the execution surface.
///
/// Constructed fresh per dispatch; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardRequest {
	/// Call destination.
	pub to: Address,
	/// The signer on whose behalf the call executes.
	pub from: Address,
	/// Call payload bytes.
	pub data: Vec<u8>,
	/// Gas ceiling for the inner call.
	pub gas: u64,
	/// Native value forwarded with the call.
	pub value: U256,
	/// Session window copied from the backing token.
	pub session_expiry: u64,
	/// Issuance height copied from the backing token.
	pub issued_at: u64,
}

/// An explicit call descriptor handed to the dispatcher.
///
/// Destination and payload are always named; gas and value are optional and
/// fall back to the dispatcher's gas policy. There is no positional or
/// trailing-options calling shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
	/// Call destination.
	pub to: Address,
	/// Call payload bytes.
	pub data: Vec<u8>,
	/// Optional gas ceiling; policy default applies when absent.
	pub gas: Option<u64>,
	/// Native value to forward; defaults to zero.
	pub value: U256,
}

impl Call {
	/// Creates a descriptor with policy-default gas and zero value.
	pub fn new(to: Address, data: Vec<u8>) -> Self {
		Self {
			to,
			data,
			gas: None,
			value: U256::ZERO,
		}
	}

	/// Sets an explicit gas ceiling for this call.
	pub fn with_gas(mut self, gas: u64) -> Self {
		self.gas = Some(gas);
		self
	}

	/// Sets the native value forwarded with this call.
	pub fn with_value(mut self, value: U256) -> Self {
		self.value = value;
		self
	}
}

/// The (signer, relayer, issuedAt, sessionLength) tuple keying all session
/// and revocation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenIdentity {
	/// Account that signed the authorization.
	pub signer: Address,
	/// Relaying party named in the authorization.
	pub relayer: Address,
	/// Issuance height asserted in the signed text.
	pub issued_at: u64,
	/// Session window in heights; zero for no expiry.
	pub session_expiry: u64,
}

impl TokenIdentity {
	/// Keccak hash of the packed tuple, used as the lookup key for session
	/// and revocation records. Both parties derive it identically from
	/// public fields; it carries no secret.
	pub fn hash(&self) -> B256 {
		let mut packed = Vec::with_capacity(20 + 20 + 8 + 8);
		packed.extend_from_slice(&self.signer.0);
		packed.extend_from_slice(&self.relayer.0);
		packed.extend_from_slice(&self.issued_at.to_be_bytes());
		packed.extend_from_slice(&self.session_expiry.to_be_bytes());
		keccak256(&packed)
	}
}
