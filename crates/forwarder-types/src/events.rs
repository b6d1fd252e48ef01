//! Relay events published on the dispatch event bus.
//!
//! Outcomes that can only be known after asynchronous settlement are never
//! returned from the dispatch call itself; they flow through these events to
//! whichever observers subscribed at dispatch time.

use crate::account::Address;
use crate::receipt::ReceiptHandle;
use serde::{Deserialize, Serialize};

/// Events describing the settled outcome of a forwarded call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayEvent {
	/// The forwarded call executed at its target. Carries the signer the
	/// target saw the call delivered from.
	CallDelivered {
		handle: ReceiptHandle,
		signer: Address,
	},
	/// The submission settled but execution failed for a reason unrelated
	/// to authorization.
	DispatchFailed { handle: ReceiptHandle, error: String },
	/// The execution surface rejected the call's authorization after it had
	/// already been accepted for submission. The token passed client-side
	/// verification at dispatch time but was revoked or expired in flight.
	AuthorizationRevokedDuringFlight {
		handle: ReceiptHandle,
		signer: Address,
	},
}

impl RelayEvent {
	/// Handle of the submission this event settles.
	pub fn handle(&self) -> &ReceiptHandle {
		match self {
			RelayEvent::CallDelivered { handle, .. }
			| RelayEvent::DispatchFailed { handle, .. }
			| RelayEvent::AuthorizationRevokedDuringFlight { handle, .. } => handle,
		}
	}
}
