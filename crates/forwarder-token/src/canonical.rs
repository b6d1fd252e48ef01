//! Canonical authorization text construction.
//!
//! The canonical message is the exact byte sequence the signer signs and the
//! verifier independently reconstructs. Construction is pure: identical
//! inputs produce byte-identical output in any process, which is what lets
//! two parties agree without trusting a stored copy of the text.

use alloy_primitives::U256;
use forwarder_types::{quantity_hex, Address};

/// Whether a session length is part of the signed text.
///
/// Single source of truth for the conditional last line: issuance and
/// verification both go through [`SigningInput::canonical_message`], so the
/// predicate cannot drift between the two.
pub fn session_line_applies(session_expiry: u64) -> bool {
	session_expiry > 0
}

/// Inputs to canonical message construction.
///
/// Service metadata comes from the forwarder's ledger surface; the height
/// nonce binds the text to one specific ledger height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningInput {
	/// Service name shown in the sign-in line.
	pub service: String,
	/// Human-readable statement the signer agrees to.
	pub statement: String,
	/// Service URI.
	pub uri: String,
	/// Message format version.
	pub version: String,
	/// Ledger chain identifier.
	pub chain_id: u64,
	/// Account signing the authorization.
	pub signer: Address,
	/// Opaque per-height nonce at `issued_at`.
	pub height_nonce: U256,
	/// Ledger height the authorization is bound to.
	pub issued_at: u64,
	/// Relaying party the authorization names.
	pub relayer: Address,
	/// Sliding session window in heights; zero for no expiry.
	pub session_expiry: u64,
}

impl SigningInput {
	/// Builds the canonical authorization text.
	///
	/// Line order and separators are fixed; addresses render lowercased and
	/// the nonce renders as minimal even-length hex. The Session Length
	/// line appears only when the window is nonzero.
	pub fn canonical_message(&self) -> String {
		let mut message = format!(
			"{} wants you to sign in with your Ethereum account: {}\n\n{}\n\nURI: {}\nVersion: {}\nChain Id: {}\nNonce: {}\nIssued At: {}\nRequest ID: {}",
			self.service,
			self.signer.to_lowercase_hex(),
			self.statement,
			self.uri,
			self.version,
			self.chain_id,
			quantity_hex(self.height_nonce),
			self.issued_at,
			self.relayer.to_lowercase_hex(),
		);
		if session_line_applies(self.session_expiry) {
			message.push_str(&format!("\nSession Length: {}", self.session_expiry));
		}
		message
	}
}
