//! Authorization verification for forwarded calls.
//!
//! The verifier is the gate every forwarded call passes through before
//! dispatch. It rebuilds the canonical authorization text from the request's
//! public fields and ledger state, recovers the signing account, and then
//! checks the token's standing: not revoked, and (for session tokens) still
//! inside its sliding window. Successful verification renews the session.
//!
//! Session and revocation state are keyed by the token identity hash, so a
//! revocation issued against the identity tuple invalidates every future use
//! of that token regardless of which call it arrives with.

pub mod revocation;
pub mod session;

use alloy_primitives::Signature as PrimitiveSignature;
use forwarder_ledger::{LedgerError, LedgerInterface};
use forwarder_token::{session_line_applies, SigningInput};
use forwarder_types::{Address, ForwardRequest, Signature, TokenIdentity};
use std::sync::Arc;
use thiserror::Error;

pub use revocation::RevocationRegistry;
pub use session::SessionTracker;

/// Errors produced while verifying an authorization.
#[derive(Debug, Error)]
pub enum VerificationError {
	/// The ledger could not be read; the caller may retry.
	#[error("Ledger error: {0}")]
	Upstream(#[from] LedgerError),
	/// The signature does not recover to the claimed signer for the
	/// reconstructed authorization text.
	#[error("Signature does not match request")]
	SignatureMismatch,
	/// The token identity has been revoked.
	#[error("Authorization token has been revoked")]
	TokenRevoked,
	/// The token's session window has lapsed without renewal.
	#[error("Session expired at height {current_height}")]
	SessionExpired {
		/// Head height at the time of the failed check.
		current_height: u64,
	},
	/// The revoking party is neither the signer nor the relayer named in
	/// the token identity.
	#[error("Caller is not a party to the authorization")]
	UnauthorizedRevocation,
}

/// Verifies forwarded calls against their backing authorization tokens.
///
/// Holds the session tracker and revocation registry; one instance guards
/// one relay deployment.
pub struct AuthorizationVerifier {
	ledger: Arc<dyn LedgerInterface>,
	sessions: SessionTracker,
	revocations: RevocationRegistry,
}

impl AuthorizationVerifier {
	/// Creates a verifier with empty session and revocation state.
	pub fn new(ledger: Arc<dyn LedgerInterface>) -> Self {
		Self {
			ledger,
			sessions: SessionTracker::new(),
			revocations: RevocationRegistry::new(),
		}
	}

	/// Session state, exposed for inspection.
	pub fn sessions(&self) -> &SessionTracker {
		&self.sessions
	}

	/// Revocation state, exposed for inspection.
	pub fn revocations(&self) -> &RevocationRegistry {
		&self.revocations
	}

	/// Verifies a forwarded call and renews its session on success.
	///
	/// Rebuilds the canonical authorization text from the request's public
	/// fields plus ledger metadata, recovers the signer, and checks
	/// revocation and session standing. Returns the recovered signer
	/// address. Renewal records the current head height as the session
	/// baseline for the next check.
	pub async fn verify(
		&self,
		request: &ForwardRequest,
		signature: &Signature,
		relayer: &Address,
	) -> Result<Address, VerificationError> {
		let (input, current_height) = tokio::try_join!(
			self.signing_input(
				&request.from,
				relayer,
				request.issued_at,
				request.session_expiry,
			),
			self.ledger.current_height(),
		)?;

		let recovered = recover_signer(signature, &input.canonical_message())?;
		if recovered != request.from {
			tracing::debug!(
				claimed = %request.from,
				recovered = %recovered,
				"Signature recovered to a different account"
			);
			return Err(VerificationError::SignatureMismatch);
		}

		let identity = TokenIdentity {
			signer: request.from.clone(),
			relayer: relayer.clone(),
			issued_at: request.issued_at,
			session_expiry: request.session_expiry,
		}
		.hash();

		if self.revocations.is_revoked(&identity) {
			return Err(VerificationError::TokenRevoked);
		}

		if session_line_applies(request.session_expiry) {
			// Baseline is the later of issuance and last use; a session
			// that was never used measures from issuance.
			let baseline = self
				.sessions
				.last_used(&identity)
				.unwrap_or(request.issued_at)
				.max(request.issued_at);
			if current_height.saturating_sub(baseline) > request.session_expiry {
				return Err(VerificationError::SessionExpired { current_height });
			}
		}

		self.sessions.record_use(identity, current_height);
		Ok(recovered)
	}

	/// Revokes a token identity on behalf of one of its parties.
	///
	/// Only the signer or the relayer named in the identity may revoke it,
	/// and the presented signature must be the token's own: it has to
	/// recover to the identity's signer over the reconstructed text.
	/// Revoking an already-revoked identity succeeds without effect.
	pub async fn revoke(
		&self,
		caller: &Address,
		identity: &TokenIdentity,
		signature: &Signature,
	) -> Result<(), VerificationError> {
		if *caller != identity.signer && *caller != identity.relayer {
			return Err(VerificationError::UnauthorizedRevocation);
		}

		let input = self
			.signing_input(
				&identity.signer,
				&identity.relayer,
				identity.issued_at,
				identity.session_expiry,
			)
			.await?;
		let recovered = recover_signer(signature, &input.canonical_message())?;
		if recovered != identity.signer {
			return Err(VerificationError::SignatureMismatch);
		}

		let key = identity.hash();
		if self.revocations.mark_revoked(key) {
			tracing::info!(
				signer = %identity.signer,
				relayer = %identity.relayer,
				issued_at = identity.issued_at,
				"Authorization token revoked"
			);
		}
		Ok(())
	}

	/// Rebuilds the signing input for a token from ledger state. Shared by
	/// verification and revocation so both recover against the same text.
	async fn signing_input(
		&self,
		signer: &Address,
		relayer: &Address,
		issued_at: u64,
		session_expiry: u64,
	) -> Result<SigningInput, LedgerError> {
		let (service, statement, uri, version, chain_id, height_nonce) = tokio::try_join!(
			self.ledger.service(),
			self.ledger.statement(),
			self.ledger.uri(),
			self.ledger.version(),
			self.ledger.chain_id(),
			self.ledger.nonce_at(issued_at),
		)?;

		Ok(SigningInput {
			service,
			statement,
			uri,
			version,
			chain_id,
			signer: signer.clone(),
			height_nonce,
			issued_at,
			relayer: relayer.clone(),
			session_expiry,
		})
	}
}

/// Recovers the EIP-191 signer of `message`, treating any malformed or
/// unrecoverable signature as a mismatch.
fn recover_signer(signature: &Signature, message: &str) -> Result<Address, VerificationError> {
	let primitive: PrimitiveSignature = signature
		.to_primitive()
		.map_err(|_| VerificationError::SignatureMismatch)?;
	let recovered = primitive
		.recover_address_from_msg(message.as_bytes())
		.map_err(|_| VerificationError::SignatureMismatch)?;
	Ok(Address::from(recovered))
}
