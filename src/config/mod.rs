//! # Run Configuration
//!
//! Everything the harness reads from its environment before the first test runs:
//! the provider connection record and the inclusion/exclusion lists.
//!
//! All variables share the `CONFORMANCE_` prefix. Unset and empty variables are
//! treated the same way: the field is simply omitted.
//!
//! ```bash
//! CONFORMANCE_PROVIDER_CLASS=mock \
//! CONFORMANCE_REGION_ID=us-east-1 \
//! CONFORMANCE_CUSTOM_PROPERTIES='{"tier":"gold"}' \
//! CONFORMANCE_INCLUSIONS=StatelessVMTests.listVirtualMachines,StatelessDCTests \
//! cargo run
//! ```

pub mod error;
pub mod provider;

pub use error::*;
pub use provider::*;

/// Prefix shared by every configuration variable.
pub const ENV_PREFIX: &str = "CONFORMANCE_";

/// Complete run configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarnessConfig {
    pub provider: ProviderConfig,
    /// Comma-separated `suite` or `suite.test` tokens to run exclusively.
    pub inclusions: Option<String>,
    /// Comma-separated `suite` or `suite.test` tokens to skip.
    pub exclusions: Option<String>,
}

impl HarnessConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = ProviderConfig::from_lookup(&lookup)?;
        Ok(Self {
            provider,
            inclusions: prefixed(&lookup, "INCLUSIONS"),
            exclusions: prefixed(&lookup, "EXCLUSIONS"),
        })
    }
}

pub(crate) fn prefixed<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(&format!("{ENV_PREFIX}{name}")).filter(|value| !value.is_empty())
}
