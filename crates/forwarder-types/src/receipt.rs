//! Receipt handles and execution receipts.

use crate::account::Address;
use crate::with_0x_prefix;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a submitted execution, returned at submission time.
///
/// Holding a handle means the call was accepted into the pending queue, not
/// that it succeeded; the final outcome arrives through the receipt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReceiptHandle(pub Vec<u8>);

impl fmt::Display for ReceiptHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", with_0x_prefix(&hex::encode(&self.0)))
	}
}

/// Final settlement outcome of a submitted execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
	/// Handle of the settled submission.
	pub handle: ReceiptHandle,
	/// Ledger height at which the execution settled.
	pub height: u64,
	/// Whether the forwarded call executed successfully.
	pub success: bool,
	/// Failure reason reported by the execution surface, when unsuccessful.
	pub revert_reason: Option<String>,
	/// Signer the target saw the call delivered from, when successful.
	pub delivered_from: Option<Address>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_receipt_handle_display() {
		let handle = ReceiptHandle(vec![0xab, 0xcd]);
		assert_eq!(handle.to_string(), "0xabcd");
	}

	#[test]
	fn test_receipt_serde_round_trip() {
		let receipt = ExecutionReceipt {
			handle: ReceiptHandle(vec![1, 2, 3]),
			height: 7,
			success: false,
			revert_reason: Some("out of gas".to_string()),
			delivered_from: None,
		};
		let json = serde_json::to_string(&receipt).unwrap();
		let back: ExecutionReceipt = serde_json::from_str(&json).unwrap();
		assert_eq!(back, receipt);
	}
}
