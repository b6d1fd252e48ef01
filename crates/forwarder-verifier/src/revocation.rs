//! Revocation registry: a write-once set of invalidated token identities.

use alloy_primitives::B256;
use std::collections::HashSet;
use std::sync::RwLock;

/// Set of token identities that have been permanently invalidated.
///
/// Revocation is monotonic: once an identity is marked, nothing removes
/// it. Marking an already-revoked identity is a no-op.
#[derive(Debug, Default)]
pub struct RevocationRegistry {
	revoked: RwLock<HashSet<B256>>,
}

impl RevocationRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Whether this identity has been revoked.
	pub fn is_revoked(&self, identity: &B256) -> bool {
		self.revoked
			.read()
			.expect("revocation state poisoned")
			.contains(identity)
	}

	/// Marks an identity as revoked. Returns true if this call performed
	/// the revocation, false if it was already revoked.
	pub fn mark_revoked(&self, identity: B256) -> bool {
		self.revoked
			.write()
			.expect("revocation state poisoned")
			.insert(identity)
	}

	/// Number of revoked identities.
	pub fn len(&self) -> usize {
		self.revoked.read().expect("revocation state poisoned").len()
	}

	/// Whether no identity has been revoked yet.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
