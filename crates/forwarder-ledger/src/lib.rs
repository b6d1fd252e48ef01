//! Ledger boundary for the trusted-forwarder system.
//!
//! This crate defines the interface to the external append-only ledger: the
//! forwarder's service metadata, the height clock and per-height nonce
//! oracle consumed during issuance and verification, and the execution
//! surface that accepts forwarded calls for eventual settlement. The ledger
//! itself is an external collaborator; everything here is specified at the
//! interface boundary only.

use alloy_primitives::U256;
use async_trait::async_trait;
use forwarder_types::{ExecutionReceipt, ForwardRequest, ReceiptHandle, Signature};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur when talking to the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
	/// Metadata, height, or nonce retrieval failed. Retryable by the caller.
	#[error("Upstream unavailable: {0}")]
	Upstream(String),
	/// The requested height has no queryable nonce yet (or never will).
	#[error("No nonce available at height {0}")]
	UnknownHeight(u64),
	/// The execution surface refused the submission outright.
	#[error("Submission rejected: {0}")]
	Rejected(String),
}

/// Read-side ledger surface: forwarder metadata, the height clock, and the
/// per-height nonce oracle.
///
/// The nonce oracle is deterministic: two independent parties querying the
/// same height observe the same opaque value, which is what lets issuer and
/// verifier reconstruct identical canonical text without shared state.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait LedgerInterface: Send + Sync {
	/// Service name embedded in the canonical authorization text.
	async fn service(&self) -> Result<String, LedgerError>;

	/// Statement line of the canonical authorization text.
	async fn statement(&self) -> Result<String, LedgerError>;

	/// URI line of the canonical authorization text.
	async fn uri(&self) -> Result<String, LedgerError>;

	/// Version line of the canonical authorization text.
	async fn version(&self) -> Result<String, LedgerError>;

	/// Chain identifier of the ledger.
	async fn chain_id(&self) -> Result<u64, LedgerError>;

	/// Current head height. The head is not finalized for nonce queries
	/// until the next height begins.
	async fn current_height(&self) -> Result<u64, LedgerError>;

	/// Opaque per-height nonce. Only heights strictly below the current
	/// head are queryable.
	async fn nonce_at(&self, height: u64) -> Result<U256, LedgerError>;
}

/// Write-side execution surface accepting forwarded calls.
///
/// Submission is fire-and-submit: a returned handle means the call was
/// accepted into the pending queue, nothing more. The final outcome arrives
/// through [`ExecutionInterface::receipt`] once the ledger settles it, and
/// there is no cancellation once a call is accepted.
#[async_trait]
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait ExecutionInterface: Send + Sync {
	/// Submits a single forwarded call with the given outer gas ceiling.
	async fn execute(
		&self,
		request: ForwardRequest,
		signature: Signature,
		gas_ceiling: u64,
	) -> Result<ReceiptHandle, LedgerError>;

	/// Submits a batch of forwarded calls backed by one signature. The batch
	/// is atomic at the execution surface: all entries or none.
	async fn multi_execute(
		&self,
		requests: Vec<ForwardRequest>,
		signature: Signature,
		gas_ceiling: u64,
	) -> Result<ReceiptHandle, LedgerError>;

	/// Returns the receipt for a settled submission, or `None` while it is
	/// still pending.
	async fn receipt(&self, handle: &ReceiptHandle) -> Result<Option<ExecutionReceipt>, LedgerError>;
}
