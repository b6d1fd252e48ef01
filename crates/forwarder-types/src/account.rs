//! Addresses and signatures.
//!
//! Both types store raw bytes and serialize as 0x-prefixed hex strings so
//! they can travel through JSON request bodies unchanged.

use crate::constants::MIN_VALID_RECOVERY_BYTE;
use crate::with_0x_prefix;
use alloy_primitives::{Address as AlloyAddress, Signature as PrimitiveSignature, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// A 20-byte account address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(pub Vec<u8>);

impl Address {
	/// Lowercase hex rendering with 0x prefix, as embedded in canonical
	/// authorization text.
	pub fn to_lowercase_hex(&self) -> String {
		with_0x_prefix(&hex::encode(&self.0))
	}
}

impl From<AlloyAddress> for Address {
	fn from(addr: AlloyAddress) -> Self {
		Address(addr.as_slice().to_vec())
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(&self.0))
	}
}

impl Serialize for Address {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.to_lowercase_hex())
	}
}

impl<'de> Deserialize<'de> for Address {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		let bytes = hex::decode(s.trim_start_matches("0x"))
			.map_err(|e| serde::de::Error::custom(format!("Invalid hex address: {}", e)))?;
		if bytes.len() != 20 {
			return Err(serde::de::Error::custom(format!(
				"Invalid address length: expected 20 bytes, got {}",
				bytes.len()
			)));
		}
		Ok(Address(bytes))
	}
}

/// Errors raised when interpreting raw signature bytes.
#[derive(Debug, Error)]
pub enum SignatureParseError {
	/// The byte string is not the 65-byte r || s || v layout.
	#[error("Signature must be 65 bytes, got {0}")]
	Length(usize),
	/// The recovery byte is outside both the 0/1 and 27/28 ranges.
	#[error("Invalid recovery byte: {0}")]
	RecoveryByte(u8),
}

/// A 65-byte secp256k1 signature in r || s || v layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(pub Vec<u8>);

impl Signature {
	/// Lifts a 0/1 recovery byte into the canonical 27/28 range.
	///
	/// Some signing implementations (hardware wallets behind browser
	/// extensions, notably) report the raw parity instead of the canonical
	/// value. Applying this to an already-canonical signature returns it
	/// unchanged, so callers may normalize unconditionally.
	pub fn normalized(&self) -> Signature {
		let mut bytes = self.0.clone();
		if let Some(v) = bytes.last_mut() {
			if *v < MIN_VALID_RECOVERY_BYTE {
				*v += MIN_VALID_RECOVERY_BYTE;
			}
		}
		Signature(bytes)
	}

	/// Parses the raw bytes into an alloy signature for address recovery.
	pub fn to_primitive(&self) -> Result<PrimitiveSignature, SignatureParseError> {
		if self.0.len() != 65 {
			return Err(SignatureParseError::Length(self.0.len()));
		}
		let r = U256::from_be_slice(&self.0[0..32]);
		let s = U256::from_be_slice(&self.0[32..64]);
		let parity = match self.0[64] {
			0 | 27 => false,
			1 | 28 => true,
			v => return Err(SignatureParseError::RecoveryByte(v)),
		};
		Ok(PrimitiveSignature::new(r, s, parity))
	}
}

impl From<PrimitiveSignature> for Signature {
	fn from(sig: PrimitiveSignature) -> Self {
		let mut bytes = Vec::with_capacity(65);
		bytes.extend_from_slice(&sig.r().to_be_bytes::<32>());
		bytes.extend_from_slice(&sig.s().to_be_bytes::<32>());
		bytes.push(if sig.v() { 28 } else { 27 });
		Signature(bytes)
	}
}

impl fmt::Display for Signature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(&self.0))
	}
}

impl Serialize for Signature {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&with_0x_prefix(&hex::encode(&self.0)))
	}
}

impl<'de> Deserialize<'de> for Signature {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		let bytes = hex::decode(s.trim_start_matches("0x"))
			.map_err(|e| serde::de::Error::custom(format!("Invalid hex signature: {}", e)))?;
		Ok(Signature(bytes))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn test_signature(v: u8) -> Signature {
		let mut bytes = vec![0u8; 65];
		bytes[31] = 1; // r = 1
		bytes[63] = 2; // s = 2
		bytes[64] = v;
		Signature(bytes)
	}

	#[test]
	fn test_address_display_lowercase() {
		let addr = Address(vec![0xAB; 20]);
		assert_eq!(
			addr.to_string(),
			"0xabababababababababababababababababababab"
		);
	}

	#[test]
	fn test_address_serde_round_trip() {
		let addr = Address(vec![0x11; 20]);
		let json = serde_json::to_string(&addr).unwrap();
		assert_eq!(json, "\"0x1111111111111111111111111111111111111111\"");
		let back: Address = serde_json::from_str(&json).unwrap();
		assert_eq!(back, addr);
	}

	#[test]
	fn test_address_deserialize_rejects_bad_length() {
		let result: Result<Address, _> = serde_json::from_str("\"0x1234\"");
		assert!(result.is_err());
	}

	#[test]
	fn test_normalized_lifts_raw_parity() {
		assert_eq!(test_signature(0).normalized().0[64], 27);
		assert_eq!(test_signature(1).normalized().0[64], 28);
	}

	#[test]
	fn test_normalized_is_idempotent() {
		let sig = test_signature(1).normalized();
		assert_eq!(sig.normalized(), sig);

		let canonical = test_signature(28);
		assert_eq!(canonical.normalized(), canonical);
	}

	#[test]
	fn test_to_primitive_accepts_both_ranges() {
		for (v, parity) in [(0u8, false), (1, true), (27, false), (28, true)] {
			let primitive = test_signature(v).to_primitive().unwrap();
			assert_eq!(primitive.v(), parity);
			assert_eq!(primitive.r(), U256::from(1));
			assert_eq!(primitive.s(), U256::from(2));
		}
	}

	#[test]
	fn test_to_primitive_rejects_bad_length() {
		let result = Signature(vec![0u8; 64]).to_primitive();
		assert!(matches!(result, Err(SignatureParseError::Length(64))));
	}

	#[test]
	fn test_to_primitive_rejects_bad_recovery_byte() {
		let result = test_signature(5).to_primitive();
		assert!(matches!(result, Err(SignatureParseError::RecoveryByte(5))));
	}

	#[test]
	fn test_signature_from_primitive_canonical_v() {
		let primitive = PrimitiveSignature::new(U256::from(1), U256::from(2), true);
		let sig = Signature::from(primitive);
		assert_eq!(sig.0.len(), 65);
		assert_eq!(sig.0[64], 28);
	}
}
