//! Local private-key signing implementation.
//!
//! Backed by Alloy's in-process signer. Suitable for relayer-side service
//! accounts and tests; interactive wallets plug in through the same
//! [`SigningCapability`] trait.

use crate::{SignerError, SigningCapability};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use forwarder_types::{Address, ConfigSchema, Field, FieldType, Schema, Signature};

/// Signing capability backed by a locally held private key.
#[derive(Debug)]
pub struct LocalWallet {
	signer: PrivateKeySigner,
}

impl LocalWallet {
	/// Creates a wallet from a hex-encoded private key, with or without a
	/// 0x prefix.
	pub fn new(private_key_hex: &str) -> Result<Self, SignerError> {
		let signer = private_key_hex
			.parse::<PrivateKeySigner>()
			.map_err(|e| SignerError::InvalidKey(format!("Invalid private key: {}", e)))?;
		Ok(Self { signer })
	}
}

#[async_trait]
impl SigningCapability for LocalWallet {
	async fn address(&self) -> Result<Address, SignerError> {
		Ok(self.signer.address().into())
	}

	async fn sign_message(&self, message: &[u8]) -> Result<Signature, SignerError> {
		// Alloy applies the EIP-191 envelope internally.
		let signature = self
			.signer
			.sign_message(message)
			.await
			.map_err(|e| SignerError::SigningFailed(format!("Failed to sign message: {}", e)))?;
		Ok(signature.into())
	}
}

/// Configuration schema for [`LocalWallet`].
pub struct LocalWalletSchema;

impl LocalWalletSchema {
	/// Static validation method for use before instance creation.
	pub fn validate_config(config: &toml::Value) -> Result<(), forwarder_types::ValidationError> {
		let instance = Self;
		instance.validate(config)
	}
}

impl ConfigSchema for LocalWalletSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), forwarder_types::ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("private_key", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(key) => {
							let key_without_prefix = key.strip_prefix("0x").unwrap_or(key);
							if key_without_prefix.len() != 64 {
								return Err(
									"Private key must be 64 hex characters (32 bytes)".to_string()
								);
							}
							if hex::decode(key_without_prefix).is_err() {
								return Err("Private key must be valid hexadecimal".to_string());
							}
							Ok(())
						},
						None => Err("Expected string value for private_key".to_string()),
					}
				}),
			],
			vec![],
		);
		schema.validate(config)
	}
}

/// Creates a signing capability from validated TOML configuration.
///
/// # Errors
///
/// Returns an error if `private_key` is missing, malformed, or fails wallet
/// construction.
pub fn create_signer(config: &toml::Value) -> Result<Box<dyn SigningCapability>, SignerError> {
	LocalWalletSchema::validate_config(config)
		.map_err(|e| SignerError::InvalidKey(format!("Invalid configuration: {}", e)))?;

	let private_key = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.expect("private_key already validated");

	Ok(Box::new(LocalWallet::new(private_key)?))
}
