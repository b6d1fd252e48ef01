//! Hex and identifier formatting helpers.

use alloy_primitives::U256;

/// Adds a "0x" prefix to a hex string unless one is already present.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.to_lowercase().starts_with("0x") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Strips a "0x" or "0X" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Truncates an identifier to its first 8 characters for log output.
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 8 {
		id.to_string()
	} else {
		format!("{}..", &id[..8])
	}
}

/// Renders a quantity as minimal even-length lowercase hex with 0x prefix.
///
/// Zero renders as "0x00". This is the rendering the canonical authorization
/// text uses for the height nonce, so it must stay byte-stable: the verifier
/// reproduces the signed text from scratch and any drift here invalidates
/// every outstanding token.
pub fn quantity_hex(value: U256) -> String {
	let bytes = value.to_be_bytes::<32>();
	let first = bytes.iter().position(|&b| b != 0).unwrap_or(31);
	format!("0x{}", hex::encode(&bytes[first..]))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_with_0x_prefix() {
		assert_eq!(with_0x_prefix("abcd"), "0xabcd");
		assert_eq!(with_0x_prefix("0xabcd"), "0xabcd");
		assert_eq!(with_0x_prefix("0Xabcd"), "0Xabcd");
	}

	#[test]
	fn test_without_0x_prefix() {
		assert_eq!(without_0x_prefix("0xabcd"), "abcd");
		assert_eq!(without_0x_prefix("0Xabcd"), "abcd");
		assert_eq!(without_0x_prefix("abcd"), "abcd");
	}

	#[test]
	fn test_truncate_id() {
		assert_eq!(truncate_id("short"), "short");
		assert_eq!(truncate_id("0123456789abcdef"), "01234567..");
	}

	#[test]
	fn test_quantity_hex_minimal_even_length() {
		assert_eq!(quantity_hex(U256::ZERO), "0x00");
		assert_eq!(quantity_hex(U256::from(0xffu64)), "0xff");
		assert_eq!(quantity_hex(U256::from(0x1000u64)), "0x1000");
		assert_eq!(quantity_hex(U256::from(0x01_0203u64)), "0x010203");
	}
}
