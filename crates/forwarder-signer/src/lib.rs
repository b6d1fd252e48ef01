//! Signing capability for the trusted-forwarder system.
//!
//! The token issuer treats the signer as a black box: an address plus a
//! `sign(bytes) -> signature` operation, typically backed by a wallet that
//! prompts a human. This crate defines that boundary and a local private-key
//! implementation used for services and tests.

use async_trait::async_trait;
use forwarder_types::{Address, Signature};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

pub use implementations::local::{create_signer, LocalWallet, LocalWalletSchema};

/// Errors that can occur during signing operations.
#[derive(Debug, Error)]
pub enum SignerError {
	/// The signing operation itself failed (user rejection, device error).
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// A cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}

/// The signer's black-box capability: an address and message signing.
///
/// `sign_message` may take human latency to resolve (a wallet prompt) and is
/// the only interactive step of token issuance. Implementations sign with
/// the standard Ethereum personal-message envelope; the recovery byte they
/// report may be raw parity, which the issuer normalizes.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait SigningCapability: Send + Sync {
	/// The account address this capability signs for.
	async fn address(&self) -> Result<Address, SignerError>;

	/// Signs an arbitrary message with the personal-message envelope.
	async fn sign_message(&self, message: &[u8]) -> Result<Signature, SignerError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_signer_error_display() {
		let err = SignerError::SigningFailed("rejected by user".to_string());
		assert_eq!(err.to_string(), "Signing failed: rejected by user");

		let err = SignerError::InvalidKey("bad key".to_string());
		assert_eq!(err.to_string(), "Invalid key: bad key");
	}
}
