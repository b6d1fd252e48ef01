//! Dispatch configuration: gas policy and settlement watching.

use forwarder_types::{
	ConfigSchema, Field, FieldType, Schema, ValidationError, DEFAULT_CALL_GAS,
	SUBMISSION_GAS_CEILING,
};
use std::time::Duration;

/// Gas ceilings applied when a call does not name its own.
///
/// Meta-transaction gas costs are hard to estimate client-side, so the
/// defaults are deliberately high per-call ceilings rather than estimates.
/// The same inner-call default applies whether a call goes out alone or
/// inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPolicy {
	/// Default inner-call ceiling for a dispatched call.
	pub call_gas: u64,
	/// Ceiling for the outer forwarding submission itself.
	pub submission_gas_ceiling: u64,
}

impl Default for GasPolicy {
	fn default() -> Self {
		Self {
			call_gas: DEFAULT_CALL_GAS,
			submission_gas_ceiling: SUBMISSION_GAS_CEILING,
		}
	}
}

impl GasPolicy {
	/// Builds a policy from TOML configuration, falling back to the default
	/// for any ceiling the configuration leaves out.
	pub fn from_config(config: &toml::Value) -> Result<Self, ValidationError> {
		GasPolicySchema.validate(config)?;
		let defaults = Self::default();
		let ceiling = |name: &str, fallback: u64| {
			config
				.get(name)
				.and_then(|v| v.as_integer())
				.map(|v| v as u64)
				.unwrap_or(fallback)
		};
		Ok(Self {
			call_gas: ceiling("call_gas", defaults.call_gas),
			submission_gas_ceiling: ceiling(
				"submission_gas_ceiling",
				defaults.submission_gas_ceiling,
			),
		})
	}
}

/// Configuration schema for [`GasPolicy`].
pub struct GasPolicySchema;

impl ConfigSchema for GasPolicySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let gas_field = |name: &str| {
			Field::new(
				name,
				FieldType::Integer {
					min: Some(21_000),
					max: None,
				},
			)
		};
		Schema::new(
			vec![],
			vec![
				gas_field("call_gas"),
				gas_field("submission_gas_ceiling"),
			],
		)
		.validate(config)
	}
}

/// How the settlement watcher polls for a submission's final outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
	/// Interval between receipt polls.
	pub poll_interval: Duration,
	/// Give up after this long with the outcome still unknown. `None` keeps
	/// watching until the submission settles.
	pub deadline: Option<Duration>,
}

impl Default for WatchConfig {
	fn default() -> Self {
		Self {
			poll_interval: Duration::from_secs(2),
			deadline: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(s: &str) -> toml::Value {
		toml::from_str(s).unwrap()
	}

	#[test]
	fn test_empty_config_yields_defaults() {
		let policy = GasPolicy::from_config(&parse("")).unwrap();
		assert_eq!(policy, GasPolicy::default());
		assert_eq!(policy.call_gas, 9_500_000);
		assert_eq!(policy.submission_gas_ceiling, 3_000_000);
	}

	#[test]
	fn test_configured_ceilings_override_defaults() {
		let policy = GasPolicy::from_config(&parse("call_gas = 500000")).unwrap();
		assert_eq!(policy.call_gas, 500_000);
		assert_eq!(policy.submission_gas_ceiling, SUBMISSION_GAS_CEILING);
	}

	#[test]
	fn test_undersized_ceiling_rejected() {
		let result = GasPolicy::from_config(&parse("call_gas = 20000"));
		assert!(matches!(
			result,
			Err(ValidationError::InvalidValue { field, .. }) if field == "call_gas"
		));
	}

	#[test]
	fn test_wrong_type_rejected() {
		let result = GasPolicy::from_config(&parse("submission_gas_ceiling = \"lots\""));
		assert!(matches!(result, Err(ValidationError::TypeMismatch { .. })));
	}
}
