//! Relay dispatch for authorized forwarded calls.
//!
//! The dispatcher is the relaying party's submission path. Given an
//! authorization token and one or more call descriptors, it builds the
//! forward requests, runs full client-side verification, and only then
//! submits to the execution surface. Submission is fire-and-submit: the
//! returned handle means the call was accepted into the pending queue.
//! Final outcomes arrive asynchronously through the event bus, fed by a
//! per-dispatch settlement watcher.

pub mod bus;
pub mod config;
mod watcher;

use forwarder_ledger::{ExecutionInterface, LedgerError};
use forwarder_types::{
	truncate_id, Address, AuthorizationToken, Call, ForwardRequest, ReceiptHandle,
};
use forwarder_verifier::{AuthorizationVerifier, VerificationError};
use std::sync::Arc;
use thiserror::Error;

pub use bus::EventBus;
pub use config::{GasPolicy, GasPolicySchema, WatchConfig};

/// Errors returned from the synchronous half of a dispatch.
///
/// Anything detectable only after settlement is not here; it flows through
/// the event bus instead.
#[derive(Debug, Error)]
pub enum DispatchError {
	/// Client-side verification rejected the request before submission.
	#[error("Verification failed: {0}")]
	Verification(#[from] VerificationError),
	/// A batch dispatch was called with no entries.
	#[error("Batch contains no calls")]
	EmptyBatch,
	/// The execution surface refused or could not accept the submission.
	#[error("Submission failed: {0}")]
	Submission(#[from] LedgerError),
}

/// Forwards verified calls to the execution surface and watches settlement.
///
/// One dispatcher serves one relayer identity. Dispatches are independent:
/// several in-flight calls may share one session token, and each gets its
/// own settlement watcher.
pub struct RelayDispatcher {
	execution: Arc<dyn ExecutionInterface>,
	verifier: Arc<AuthorizationVerifier>,
	relayer: Address,
	policy: GasPolicy,
	watch: WatchConfig,
	bus: EventBus,
}

impl RelayDispatcher {
	/// Channel capacity for the settlement event bus.
	const EVENT_CAPACITY: usize = 64;

	/// Creates a dispatcher with default gas policy and watch settings.
	pub fn new(
		execution: Arc<dyn ExecutionInterface>,
		verifier: Arc<AuthorizationVerifier>,
		relayer: Address,
	) -> Self {
		Self {
			execution,
			verifier,
			relayer,
			policy: GasPolicy::default(),
			watch: WatchConfig::default(),
			bus: EventBus::new(Self::EVENT_CAPACITY),
		}
	}

	/// Replaces the gas policy.
	pub fn with_gas_policy(mut self, policy: GasPolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Replaces the settlement watch settings.
	pub fn with_watch_config(mut self, watch: WatchConfig) -> Self {
		self.watch = watch;
		self
	}

	/// Subscribes to settlement events for calls dispatched through this
	/// dispatcher.
	pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<forwarder_types::RelayEvent> {
		self.bus.subscribe()
	}

	/// Dispatches a single call under the given token.
	///
	/// Verifies the rebuilt request fully client-side, submits it, and
	/// spawns a settlement watcher for the returned handle.
	pub async fn dispatch_one(
		&self,
		token: &AuthorizationToken,
		origin: &Address,
		call: Call,
	) -> Result<ReceiptHandle, DispatchError> {
		let request = self.request_for(token, origin, call, self.policy.call_gas);
		self.verifier
			.verify(&request, &token.signature, &self.relayer)
			.await?;

		let handle = self
			.execution
			.execute(
				request,
				token.signature.clone(),
				self.policy.submission_gas_ceiling,
			)
			.await?;
		tracing::info!(
			handle = %truncate_id(&handle.to_string()),
			origin = %origin,
			"Call accepted for forwarding"
		);
		self.spawn_watcher(handle.clone(), origin.clone());
		Ok(handle)
	}

	/// Dispatches a batch of calls atomically under one token.
	///
	/// The token is verified once; all entries go out in a single
	/// submission, so the execution surface applies all of them or none.
	pub async fn dispatch_batch(
		&self,
		token: &AuthorizationToken,
		origin: &Address,
		calls: Vec<Call>,
	) -> Result<ReceiptHandle, DispatchError> {
		if calls.is_empty() {
			return Err(DispatchError::EmptyBatch);
		}

		let requests: Vec<ForwardRequest> = calls
			.into_iter()
			.map(|call| self.request_for(token, origin, call, self.policy.call_gas))
			.collect();
		// Every entry shares the token's identity fields; one check covers
		// the whole batch.
		self.verifier
			.verify(&requests[0], &token.signature, &self.relayer)
			.await?;

		let entries = requests.len();
		let handle = self
			.execution
			.multi_execute(
				requests,
				token.signature.clone(),
				self.policy.submission_gas_ceiling,
			)
			.await?;
		tracing::info!(
			handle = %truncate_id(&handle.to_string()),
			origin = %origin,
			entries,
			"Batch accepted for forwarding"
		);
		self.spawn_watcher(handle.clone(), origin.clone());
		Ok(handle)
	}

	fn request_for(
		&self,
		token: &AuthorizationToken,
		origin: &Address,
		call: Call,
		default_gas: u64,
	) -> ForwardRequest {
		ForwardRequest {
			to: call.to,
			from: origin.clone(),
			data: call.data,
			gas: call.gas.unwrap_or(default_gas),
			value: call.value,
			session_expiry: token.session_expiry,
			issued_at: token.issued_at,
		}
	}

	fn spawn_watcher(&self, handle: ReceiptHandle, signer: Address) {
		tokio::spawn(watcher::watch_settlement(
			self.execution.clone(),
			handle,
			signer,
			self.bus.clone(),
			self.watch.clone(),
		));
	}
}
