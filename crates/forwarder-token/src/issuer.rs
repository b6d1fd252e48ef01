//! Token issuance and the per-issuer token cache.

use crate::canonical::SigningInput;
use forwarder_ledger::{LedgerError, LedgerInterface};
use forwarder_signer::{SignerError, SigningCapability};
use forwarder_types::{Address, AuthorizationToken};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};

/// Errors that can occur during token issuance.
#[derive(Debug, Error)]
pub enum IssueError {
	/// Metadata or height-nonce retrieval failed. Retryable: nothing was
	/// signed and no cache slot was filled.
	#[error("Upstream unavailable: {0}")]
	UpstreamUnavailable(#[from] LedgerError),
	/// The signer's wallet failed or refused to sign.
	#[error("Signing failed: {0}")]
	Signing(#[from] SignerError),
}

type CacheKey = (Address, Address, u64);

/// Issues signed authorization tokens, prompting each signer at most once.
///
/// The cache is keyed by (signer, relayer, session length) and holds one
/// slot per key with exactly-once in-flight semantics: concurrent `issue`
/// calls with identical parameters collapse into a single signing prompt,
/// and later calls return the cached token without re-signing. A failed
/// issuance leaves the slot empty so the caller can retry.
pub struct TokenIssuer {
	ledger: Arc<dyn LedgerInterface>,
	cache: Mutex<HashMap<CacheKey, Arc<OnceCell<AuthorizationToken>>>>,
}

impl TokenIssuer {
	/// Creates an issuer over the given ledger surface.
	pub fn new(ledger: Arc<dyn LedgerInterface>) -> Self {
		Self {
			ledger,
			cache: Mutex::new(HashMap::new()),
		}
	}

	/// Issues an authorization token naming `relayer`, signed by `signer`.
	///
	/// A zero `session_expiry` produces a token with no height-based expiry.
	pub async fn issue(
		&self,
		signer: &dyn SigningCapability,
		relayer: &Address,
		session_expiry: u64,
	) -> Result<AuthorizationToken, IssueError> {
		let signer_address = signer.address().await?;

		let slot = {
			let mut cache = self.cache.lock().await;
			cache
				.entry((signer_address.clone(), relayer.clone(), session_expiry))
				.or_insert_with(|| Arc::new(OnceCell::new()))
				.clone()
		};

		let token = slot
			.get_or_try_init(|| {
				self.issue_uncached(signer, &signer_address, relayer, session_expiry)
			})
			.await?;
		Ok(token.clone())
	}

	async fn issue_uncached(
		&self,
		signer: &dyn SigningCapability,
		signer_address: &Address,
		relayer: &Address,
		session_expiry: u64,
	) -> Result<AuthorizationToken, IssueError> {
		// Gather everything the canonical text needs up front. The signing
		// call below must be the only request in flight: mobile wallets
		// treat any concurrent call during signing as a separate app-switch.
		let (service, statement, uri, version, chain_id, height) = tokio::try_join!(
			self.ledger.service(),
			self.ledger.statement(),
			self.ledger.uri(),
			self.ledger.version(),
			self.ledger.chain_id(),
			self.ledger.current_height(),
		)?;

		// One behind the head: the head's nonce is not queryable until the
		// next height begins.
		let issued_at = height
			.checked_sub(1)
			.ok_or(LedgerError::UnknownHeight(0))?;
		let height_nonce = self.ledger.nonce_at(issued_at).await?;

		let input = SigningInput {
			service,
			statement,
			uri,
			version,
			chain_id,
			signer: signer_address.clone(),
			height_nonce,
			issued_at,
			relayer: relayer.clone(),
			session_expiry,
		};
		let message = input.canonical_message();

		tracing::debug!(
			signer = %signer_address,
			relayer = %relayer,
			issued_at,
			session_expiry,
			"Requesting authorization signature"
		);
		let signature = signer.sign_message(message.as_bytes()).await?.normalized();

		Ok(AuthorizationToken {
			signature,
			issued_at,
			session_expiry,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use forwarder_ledger::implementations::memory::InMemoryLedger;
	use forwarder_signer::LocalWallet;
	use forwarder_types::Signature;
	use std::sync::atomic::{AtomicUsize, Ordering};

	const SIGNER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	/// Wraps a wallet and counts signing prompts.
	struct CountingSigner {
		inner: LocalWallet,
		prompts: AtomicUsize,
	}

	impl CountingSigner {
		fn new() -> Self {
			Self {
				inner: LocalWallet::new(SIGNER_KEY).unwrap(),
				prompts: AtomicUsize::new(0),
			}
		}

		fn prompt_count(&self) -> usize {
			self.prompts.load(Ordering::SeqCst)
		}
	}

	#[async_trait]
	impl SigningCapability for CountingSigner {
		async fn address(&self) -> Result<Address, SignerError> {
			self.inner.address().await
		}

		async fn sign_message(&self, message: &[u8]) -> Result<Signature, SignerError> {
			self.prompts.fetch_add(1, Ordering::SeqCst);
			self.inner.sign_message(message).await
		}
	}

	fn ledger() -> Arc<InMemoryLedger> {
		let ledger = Arc::new(InMemoryLedger::new(
			"service.invalid",
			"I accept the ServiceOrg Terms of Service: https://service.invalid/tos",
			"https://service.invalid/login",
			"1",
			31337,
		));
		ledger.advance(99); // head at height 100
		ledger
	}

	fn relayer() -> Address {
		Address(vec![0xBB; 20])
	}

	#[tokio::test]
	async fn test_issue_binds_one_behind_head() {
		let ledger = ledger();
		let issuer = TokenIssuer::new(ledger.clone());
		let signer = CountingSigner::new();

		let token = issuer.issue(&signer, &relayer(), 0).await.unwrap();
		assert_eq!(token.issued_at, 99);
		assert_eq!(token.session_expiry, 0);
		assert_eq!(token.signature.0.len(), 65);
	}

	#[tokio::test]
	async fn test_issued_signature_is_normalized() {
		let issuer = TokenIssuer::new(ledger());
		let signer = CountingSigner::new();

		let token = issuer.issue(&signer, &relayer(), 10).await.unwrap();
		assert!(token.signature.0[64] >= 27);
		assert_eq!(token.signature.normalized(), token.signature);
	}

	#[tokio::test]
	async fn test_repeat_issue_hits_cache() {
		let issuer = TokenIssuer::new(ledger());
		let signer = CountingSigner::new();

		let first = issuer.issue(&signer, &relayer(), 0).await.unwrap();
		let second = issuer.issue(&signer, &relayer(), 0).await.unwrap();
		assert_eq!(first, second);
		assert_eq!(signer.prompt_count(), 1);
	}

	#[tokio::test]
	async fn test_distinct_session_lengths_are_distinct_tokens() {
		let issuer = TokenIssuer::new(ledger());
		let signer = CountingSigner::new();

		let plain = issuer.issue(&signer, &relayer(), 0).await.unwrap();
		let session = issuer.issue(&signer, &relayer(), 10).await.unwrap();
		assert_ne!(plain, session);
		assert_eq!(signer.prompt_count(), 2);
	}

	#[tokio::test]
	async fn test_concurrent_issue_collapses_to_one_prompt() {
		let issuer = Arc::new(TokenIssuer::new(ledger()));
		let signer = Arc::new(CountingSigner::new());

		let mut handles = Vec::new();
		for _ in 0..4 {
			let issuer = issuer.clone();
			let signer = signer.clone();
			handles.push(tokio::spawn(async move {
				issuer.issue(&*signer, &relayer(), 5).await.unwrap()
			}));
		}

		let mut tokens = Vec::new();
		for handle in handles {
			tokens.push(handle.await.unwrap());
		}
		assert!(tokens.windows(2).all(|w| w[0] == w[1]));
		assert_eq!(signer.prompt_count(), 1);
	}

	#[tokio::test]
	async fn test_upstream_failure_is_retryable() {
		let ledger = ledger();
		let issuer = TokenIssuer::new(ledger.clone());
		let signer = CountingSigner::new();

		ledger.set_unavailable(true);
		let result = issuer.issue(&signer, &relayer(), 0).await;
		assert!(matches!(result, Err(IssueError::UpstreamUnavailable(_))));
		assert_eq!(signer.prompt_count(), 0);

		// The failed attempt left the cache slot empty.
		ledger.set_unavailable(false);
		assert!(issuer.issue(&signer, &relayer(), 0).await.is_ok());
		assert_eq!(signer.prompt_count(), 1);
	}
}
