//! Session state: last successful use per token identity.

use alloy_primitives::B256;
use std::collections::HashMap;
use std::sync::RwLock;

/// Tracks, per token identity, the last ledger height at which the token
/// was successfully used.
///
/// Entries are never deleted: an identity that stops validating keeps its
/// record for audit. Key count grows monotonically and recorded heights
/// only move forward.
#[derive(Debug, Default)]
pub struct SessionTracker {
	last_used: RwLock<HashMap<B256, u64>>,
}

impl SessionTracker {
	/// Creates an empty tracker.
	pub fn new() -> Self {
		Self::default()
	}

	/// Last height this identity was successfully used at, if any.
	pub fn last_used(&self, identity: &B256) -> Option<u64> {
		self.last_used
			.read()
			.expect("session state poisoned")
			.get(identity)
			.copied()
	}

	/// Records a successful use at `height`. Heights never move backwards;
	/// a stale write is ignored.
	pub fn record_use(&self, identity: B256, height: u64) {
		let mut map = self.last_used.write().expect("session state poisoned");
		let entry = map.entry(identity).or_insert(height);
		if *entry < height {
			*entry = height;
		}
	}

	/// Number of identities ever tracked.
	pub fn len(&self) -> usize {
		self.last_used.read().expect("session state poisoned").len()
	}

	/// Whether no identity has been tracked yet.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
