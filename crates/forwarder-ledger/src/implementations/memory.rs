//! In-memory ledger implementation.
//!
//! Implements both ledger surfaces against process-local state with a
//! manually advanced height clock and explicit settlement hooks. Used by the
//! test suites and for local development; the nonce at each height is
//! derived deterministically so issuer and verifier reproduce the same
//! canonical text exactly as they would against a real ledger.

use crate::{ExecutionInterface, LedgerError, LedgerInterface};
use alloy_primitives::{keccak256, U256};
use async_trait::async_trait;
use forwarder_types::{Address, ExecutionReceipt, ForwardRequest, ReceiptHandle, Signature};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A submission accepted into the pending queue.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
	/// Requests carried by the submission (one for execute, many for
	/// multiExecute).
	pub requests: Vec<ForwardRequest>,
	/// Signature the submission was backed by.
	pub signature: Signature,
	/// Outer gas ceiling the submitter attached.
	pub gas_ceiling: u64,
	/// Height at which the submission was accepted.
	pub submitted_at: u64,
}

#[derive(Debug, Default)]
struct LedgerState {
	height: u64,
	pending: HashMap<ReceiptHandle, PendingSubmission>,
	settled: HashMap<ReceiptHandle, ExecutionReceipt>,
	next_submission: u64,
}

/// In-memory ledger with a controllable height clock.
pub struct InMemoryLedger {
	service: String,
	statement: String,
	uri: String,
	version: String,
	chain_id: u64,
	state: Mutex<LedgerState>,
	unavailable: AtomicBool,
}

impl InMemoryLedger {
	/// Creates a ledger with the given metadata, starting at height 1.
	pub fn new(service: &str, statement: &str, uri: &str, version: &str, chain_id: u64) -> Self {
		Self {
			service: service.to_string(),
			statement: statement.to_string(),
			uri: uri.to_string(),
			version: version.to_string(),
			chain_id,
			state: Mutex::new(LedgerState {
				height: 1,
				..Default::default()
			}),
			unavailable: AtomicBool::new(false),
		}
	}

	/// Advances the height clock by `n` heights.
	pub fn advance(&self, n: u64) {
		let mut state = self.state.lock().expect("ledger state poisoned");
		state.height += n;
	}

	/// Current head height, for test assertions.
	pub fn height(&self) -> u64 {
		self.state.lock().expect("ledger state poisoned").height
	}

	/// Makes every read-side call fail with `Upstream` until cleared.
	pub fn set_unavailable(&self, unavailable: bool) {
		self.unavailable.store(unavailable, Ordering::SeqCst);
	}

	/// Returns a pending submission, or `None` once settled or unknown.
	pub fn pending_submission(&self, handle: &ReceiptHandle) -> Option<PendingSubmission> {
		let state = self.state.lock().expect("ledger state poisoned");
		state.pending.get(handle).cloned()
	}

	/// Number of submissions still awaiting settlement.
	pub fn pending_count(&self) -> usize {
		self.state.lock().expect("ledger state poisoned").pending.len()
	}

	/// Settles a pending submission as delivered from `signer`.
	pub fn settle_delivered(&self, handle: &ReceiptHandle, signer: Address) {
		let mut state = self.state.lock().expect("ledger state poisoned");
		if state.pending.remove(handle).is_some() {
			let height = state.height;
			state.settled.insert(
				handle.clone(),
				ExecutionReceipt {
					handle: handle.clone(),
					height,
					success: true,
					revert_reason: None,
					delivered_from: Some(signer),
				},
			);
		}
	}

	/// Settles a pending submission as reverted with the given reason.
	pub fn settle_reverted(&self, handle: &ReceiptHandle, reason: &str) {
		let mut state = self.state.lock().expect("ledger state poisoned");
		if state.pending.remove(handle).is_some() {
			let height = state.height;
			state.settled.insert(
				handle.clone(),
				ExecutionReceipt {
					handle: handle.clone(),
					height,
					success: false,
					revert_reason: Some(reason.to_string()),
					delivered_from: None,
				},
			);
		}
	}

	fn check_available(&self) -> Result<(), LedgerError> {
		if self.unavailable.load(Ordering::SeqCst) {
			Err(LedgerError::Upstream("ledger unreachable".to_string()))
		} else {
			Ok(())
		}
	}

	fn accept(
		&self,
		requests: Vec<ForwardRequest>,
		signature: Signature,
		gas_ceiling: u64,
	) -> Result<ReceiptHandle, LedgerError> {
		if requests.is_empty() {
			return Err(LedgerError::Rejected("empty submission".to_string()));
		}
		let mut state = self.state.lock().expect("ledger state poisoned");
		state.next_submission += 1;
		let handle = ReceiptHandle(
			keccak256(state.next_submission.to_be_bytes())
				.as_slice()
				.to_vec(),
		);
		let submitted_at = state.height;
		tracing::debug!(
			handle = %handle,
			entries = requests.len(),
			height = submitted_at,
			"Submission accepted into pending queue"
		);
		state.pending.insert(
			handle.clone(),
			PendingSubmission {
				requests,
				signature,
				gas_ceiling,
				submitted_at,
			},
		);
		Ok(handle)
	}
}

#[async_trait]
impl LedgerInterface for InMemoryLedger {
	async fn service(&self) -> Result<String, LedgerError> {
		self.check_available()?;
		Ok(self.service.clone())
	}

	async fn statement(&self) -> Result<String, LedgerError> {
		self.check_available()?;
		Ok(self.statement.clone())
	}

	async fn uri(&self) -> Result<String, LedgerError> {
		self.check_available()?;
		Ok(self.uri.clone())
	}

	async fn version(&self) -> Result<String, LedgerError> {
		self.check_available()?;
		Ok(self.version.clone())
	}

	async fn chain_id(&self) -> Result<u64, LedgerError> {
		self.check_available()?;
		Ok(self.chain_id)
	}

	async fn current_height(&self) -> Result<u64, LedgerError> {
		self.check_available()?;
		Ok(self.state.lock().expect("ledger state poisoned").height)
	}

	async fn nonce_at(&self, height: u64) -> Result<U256, LedgerError> {
		self.check_available()?;
		let head = self.state.lock().expect("ledger state poisoned").height;
		// The head itself is not finalized for nonce queries.
		if height >= head {
			return Err(LedgerError::UnknownHeight(height));
		}
		let mut seed = Vec::with_capacity(16);
		seed.extend_from_slice(&self.chain_id.to_be_bytes());
		seed.extend_from_slice(&height.to_be_bytes());
		Ok(U256::from_be_bytes(keccak256(&seed).0))
	}
}

#[async_trait]
impl ExecutionInterface for InMemoryLedger {
	async fn execute(
		&self,
		request: ForwardRequest,
		signature: Signature,
		gas_ceiling: u64,
	) -> Result<ReceiptHandle, LedgerError> {
		self.check_available()?;
		self.accept(vec![request], signature, gas_ceiling)
	}

	async fn multi_execute(
		&self,
		requests: Vec<ForwardRequest>,
		signature: Signature,
		gas_ceiling: u64,
	) -> Result<ReceiptHandle, LedgerError> {
		self.check_available()?;
		self.accept(requests, signature, gas_ceiling)
	}

	async fn receipt(
		&self,
		handle: &ReceiptHandle,
	) -> Result<Option<ExecutionReceipt>, LedgerError> {
		self.check_available()?;
		let state = self.state.lock().expect("ledger state poisoned");
		Ok(state.settled.get(handle).cloned())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	fn ledger() -> InMemoryLedger {
		InMemoryLedger::new(
			"service.invalid",
			"I accept the ServiceOrg Terms of Service: https://service.invalid/tos",
			"https://service.invalid/login",
			"1",
			31337,
		)
	}

	fn request() -> ForwardRequest {
		ForwardRequest {
			to: Address(vec![1u8; 20]),
			from: Address(vec![2u8; 20]),
			data: vec![0xaa],
			gas: 100_000,
			value: U256::ZERO,
			session_expiry: 0,
			issued_at: 1,
		}
	}

	#[tokio::test]
	async fn test_height_clock_advances() {
		let ledger = ledger();
		assert_eq!(ledger.current_height().await.unwrap(), 1);
		ledger.advance(5);
		assert_eq!(ledger.current_height().await.unwrap(), 6);
	}

	#[tokio::test]
	async fn test_nonce_is_deterministic_per_height() {
		let ledger = ledger();
		ledger.advance(10);
		let a = ledger.nonce_at(4).await.unwrap();
		let b = ledger.nonce_at(4).await.unwrap();
		assert_eq!(a, b);
		assert_ne!(a, ledger.nonce_at(5).await.unwrap());
	}

	#[tokio::test]
	async fn test_nonce_at_head_not_queryable() {
		let ledger = ledger();
		ledger.advance(3);
		let head = ledger.current_height().await.unwrap();
		assert!(matches!(
			ledger.nonce_at(head).await,
			Err(LedgerError::UnknownHeight(_))
		));
		assert!(ledger.nonce_at(head - 1).await.is_ok());
	}

	#[tokio::test]
	async fn test_unavailable_reads_fail_upstream() {
		let ledger = ledger();
		ledger.set_unavailable(true);
		assert!(matches!(
			ledger.current_height().await,
			Err(LedgerError::Upstream(_))
		));
		ledger.set_unavailable(false);
		assert!(ledger.current_height().await.is_ok());
	}

	#[tokio::test]
	async fn test_submission_and_settlement() {
		let ledger = ledger();
		let signature = Signature(vec![0u8; 65]);
		let handle = ledger
			.execute(request(), signature, 3_000_000)
			.await
			.unwrap();

		assert!(ledger.receipt(&handle).await.unwrap().is_none());
		assert_eq!(ledger.pending_count(), 1);

		ledger.advance(1);
		ledger.settle_delivered(&handle, Address(vec![2u8; 20]));

		let receipt = ledger.receipt(&handle).await.unwrap().unwrap();
		assert!(receipt.success);
		assert_eq!(receipt.height, 2);
		assert_eq!(receipt.delivered_from, Some(Address(vec![2u8; 20])));
		assert_eq!(ledger.pending_count(), 0);
	}

	#[tokio::test]
	async fn test_reverted_settlement_carries_reason() {
		let ledger = ledger();
		let handle = ledger
			.execute(request(), Signature(vec![0u8; 65]), 3_000_000)
			.await
			.unwrap();
		ledger.settle_reverted(&handle, "TrustedForwarder: signature does not match request");

		let receipt = ledger.receipt(&handle).await.unwrap().unwrap();
		assert!(!receipt.success);
		assert!(receipt.revert_reason.unwrap().contains("signature"));
	}

	#[tokio::test]
	async fn test_empty_batch_rejected() {
		let ledger = ledger();
		let result = ledger
			.multi_execute(vec![], Signature(vec![0u8; 65]), 3_000_000)
			.await;
		assert!(matches!(result, Err(LedgerError::Rejected(_))));
	}

	#[tokio::test]
	async fn test_batch_submission_keeps_all_entries() {
		let ledger = ledger();
		let handle = ledger
			.multi_execute(
				vec![request(), request(), request()],
				Signature(vec![0u8; 65]),
				3_000_000,
			)
			.await
			.unwrap();
		let pending = ledger.pending_submission(&handle).unwrap();
		assert_eq!(pending.requests.len(), 3);
		assert_eq!(pending.gas_ceiling, 3_000_000);
	}
}
