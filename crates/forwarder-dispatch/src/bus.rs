//! Broadcast bus for relay settlement events.
//!
//! Settlement outcomes are known only after the ledger finalizes a
//! submission, long after the dispatch call returned. Observers subscribe to
//! this bus; the settlement watcher publishes here. There is no implicit
//! listener registry: anything that wants outcomes holds a receiver.

use forwarder_types::RelayEvent;
use tokio::sync::broadcast;

/// Event bus carrying settlement outcomes to whoever subscribed.
///
/// Built on tokio's broadcast channel: every subscriber gets its own copy of
/// each event published after it subscribed. Observation is optional, so
/// publishing never fails; an event with no subscribers is dropped.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<RelayEvent>,
}

impl EventBus {
	/// Creates a new bus with the given channel capacity. Once the channel
	/// is full the oldest buffered events are dropped for lagging receivers.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Creates a new subscriber to receive events from this bus.
	pub fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
		self.sender.subscribe()
	}

	/// Number of currently active subscribers.
	pub fn subscriber_count(&self) -> usize {
		self.sender.receiver_count()
	}

	/// Publishes a settlement event to all current subscribers.
	///
	/// With nobody subscribed the event is dropped; the settlement itself
	/// lives in the ledger's receipt, this is only its notification.
	pub fn publish(&self, event: RelayEvent) {
		match self.sender.send(event) {
			Ok(receivers) => {
				tracing::trace!(receivers, "Relay event published");
			},
			Err(broadcast::error::SendError(event)) => {
				tracing::trace!(
					handle = %event.handle(),
					"Relay event dropped, no subscribers"
				);
			},
		}
	}
}
