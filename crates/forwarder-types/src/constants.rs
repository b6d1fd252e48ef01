//! Policy constants shared across the forwarder components.
//!
//! The gas values are policy, not estimates: meta-transaction costs are hard
//! to predict client-side, so the defaults are deliberately generous and can
//! be overridden through the dispatcher's gas policy configuration.

/// Default gas ceiling for a forwarded call when the caller does not set
/// one, applied to single dispatches and batch entries alike.
pub const DEFAULT_CALL_GAS: u64 = 9_500_000;

/// Gas ceiling for the outer execute/multiExecute submission itself.
pub const SUBMISSION_GAS_CEILING: u64 = 3_000_000;

/// Lowest canonical recovery byte of an Ethereum signature. Signers that
/// report a 0/1 parity are lifted into the 27/28 range.
pub const MIN_VALID_RECOVERY_BYTE: u8 = 27;

/// Revert-reason substring that identifies an authorization failure raised
/// by the execution surface after submission. A settled call whose failure
/// reason contains this marker was rejected by the forwarder's own
/// verification, not by the target.
pub const AUTH_FAILURE_MARKER: &str = "TrustedForwarder: signature does not match request";
