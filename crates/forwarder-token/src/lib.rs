//! Authorization-token issuance for the trusted-forwarder system.
//!
//! Two pieces: the canonical message builder, a pure function both issuance
//! and verification share, and the token issuer, which gathers the on-ledger
//! inputs, obtains one signature from the signer's wallet, and caches the
//! resulting token so a signer/relayer pair is prompted at most once.

/// Canonical authorization text construction.
pub mod canonical;
/// Token issuance and the per-issuer token cache.
pub mod issuer;

pub use canonical::{session_line_applies, SigningInput};
pub use issuer::{IssueError, TokenIssuer};
