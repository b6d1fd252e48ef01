//! Settlement watcher: polls a submission until the ledger settles it.
//!
//! Submission acceptance says nothing about the outcome. One watcher task is
//! spawned per dispatch; it polls the execution surface for the receipt and
//! publishes the classified outcome on the event bus. A revert whose reason
//! carries the forwarder's signature-failure marker means the authorization
//! was honored at dispatch time but rejected in flight, and is reported
//! distinctly from a generic execution failure.

use crate::bus::EventBus;
use crate::config::WatchConfig;
use forwarder_ledger::ExecutionInterface;
use forwarder_types::{
	Address, ExecutionReceipt, ReceiptHandle, RelayEvent, AUTH_FAILURE_MARKER,
};
use std::sync::Arc;
use tokio::time::Instant;

/// Watches one submission through to settlement, publishing the outcome.
///
/// If a deadline is configured and passes with the submission still pending,
/// the watcher stops without publishing anything: the outcome is unknown,
/// neither success nor failure. Transient ledger read errors are retried on
/// the next poll.
pub(crate) async fn watch_settlement(
	execution: Arc<dyn ExecutionInterface>,
	handle: ReceiptHandle,
	signer: Address,
	bus: EventBus,
	config: WatchConfig,
) {
	let started = Instant::now();
	loop {
		match execution.receipt(&handle).await {
			Ok(Some(receipt)) => {
				bus.publish(classify(receipt, &signer));
				return;
			},
			Ok(None) => {},
			Err(error) => {
				tracing::debug!(handle = %handle, %error, "Receipt poll failed; will retry");
			},
		}

		if let Some(deadline) = config.deadline {
			if started.elapsed() >= deadline {
				tracing::warn!(
					handle = %handle,
					"Watch deadline passed with outcome unknown"
				);
				return;
			}
		}
		tokio::time::sleep(config.poll_interval).await;
	}
}

fn classify(receipt: ExecutionReceipt, signer: &Address) -> RelayEvent {
	if receipt.success {
		return RelayEvent::CallDelivered {
			handle: receipt.handle,
			signer: receipt.delivered_from.unwrap_or_else(|| signer.clone()),
		};
	}

	let reason = receipt.revert_reason.unwrap_or_default();
	if reason.contains(AUTH_FAILURE_MARKER) {
		RelayEvent::AuthorizationRevokedDuringFlight {
			handle: receipt.handle,
			signer: signer.clone(),
		}
	} else {
		RelayEvent::DispatchFailed {
			handle: receipt.handle,
			error: reason,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn receipt(success: bool, reason: Option<&str>) -> ExecutionReceipt {
		ExecutionReceipt {
			handle: ReceiptHandle(vec![1]),
			height: 10,
			success,
			revert_reason: reason.map(str::to_string),
			delivered_from: None,
		}
	}

	fn signer() -> Address {
		Address(vec![0xAA; 20])
	}

	#[test]
	fn test_success_classifies_as_delivered() {
		let event = classify(receipt(true, None), &signer());
		assert!(matches!(event, RelayEvent::CallDelivered { .. }));
	}

	#[test]
	fn test_marker_revert_classifies_as_revoked_in_flight() {
		let reason = format!("execution reverted: {}", AUTH_FAILURE_MARKER);
		let event = classify(receipt(false, Some(&reason)), &signer());
		assert!(matches!(
			event,
			RelayEvent::AuthorizationRevokedDuringFlight { .. }
		));
	}

	#[test]
	fn test_other_revert_classifies_as_failed() {
		let event = classify(receipt(false, Some("out of gas")), &signer());
		assert!(matches!(
			event,
			RelayEvent::DispatchFailed { error, .. } if error == "out of gas"
		));
	}

	#[test]
	fn test_missing_reason_is_generic_failure() {
		let event = classify(receipt(false, None), &signer());
		assert!(matches!(event, RelayEvent::DispatchFailed { .. }));
	}
}
