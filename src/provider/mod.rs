//! # Cloud Providers
//!
//! A provider is the connected handle to one cloud. The harness never loads provider
//! implementations by name at runtime; instead every implementation the run may use is
//! registered up front in a [`ProviderRegistry`] under a string key, and the configured
//! `provider_class` selects one of them.

use crate::config::{ConfigError, ProviderConfig};
use crate::framework::ResourceProvisioner;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// A connected cloud.
pub trait CloudProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    fn cloud_name(&self) -> &str;

    /// The configuration the provider connected with, or `None` once the connection is gone.
    fn context(&self) -> Option<&ProviderConfig>;

    /// Collaborator that creates, finds and deletes resources in this cloud.
    fn provisioner(&self) -> Arc<dyn ResourceProvisioner>;

    fn close(&self) {}
}

/// Builds a connected provider from configuration.
pub type ProviderConstructor =
    Arc<dyn Fn(&ProviderConfig) -> Result<Arc<dyn CloudProvider>, ConfigError> + Send + Sync>;

/// Statically known provider implementations, keyed by `provider_class`.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    constructors: BTreeMap<String, ProviderConstructor>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, key: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(&ProviderConfig) -> Result<Arc<dyn CloudProvider>, ConfigError>
            + Send
            + Sync
            + 'static,
    {
        let key = key.into();
        debug!(%key, "Registered provider");
        self.constructors.insert(key, Arc::new(constructor));
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Resolve and connect the configured provider.
    pub fn connect(&self, config: &ProviderConfig) -> Result<Arc<dyn CloudProvider>, ConfigError> {
        let key = config
            .provider_class
            .as_deref()
            .ok_or(ConfigError::MissingProviderClass)?;
        let constructor = self
            .constructors
            .get(key)
            .ok_or_else(|| ConfigError::UnknownProvider(key.to_string()))?;
        let provider = constructor(config)?;
        info!(
            provider = provider.provider_name(),
            cloud = provider.cloud_name(),
            "Connected"
        );
        Ok(provider)
    }
}
