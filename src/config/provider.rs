//! Provider connection record.

use super::{prefixed, ConfigError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Everything a provider constructor may need to connect.
///
/// Certificate and key material is stored as file contents, not paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Registry key selecting the provider implementation.
    pub provider_class: Option<String>,
    pub account_number: Option<String>,
    pub access_public: Option<String>,
    pub access_private: Option<String>,
    pub x509_cert: Option<String>,
    pub x509_key: Option<String>,
    pub endpoint: Option<String>,
    pub cloud_name: Option<String>,
    pub provider_name: Option<String>,
    pub region_id: Option<String>,
    #[serde(default)]
    pub custom_properties: BTreeMap<String, String>,
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| prefixed(&lookup, name);

        let x509_cert = get("X509_CERT_FILE")
            .map(|path| read_material(Path::new(&path)))
            .transpose()?;
        let x509_key = get("X509_KEY_FILE")
            .map(|path| read_material(Path::new(&path)))
            .transpose()?;
        let custom_properties = match get("CUSTOM_PROPERTIES") {
            Some(json) => parse_custom_properties(&json)?,
            None => BTreeMap::new(),
        };

        Ok(Self {
            provider_class: get("PROVIDER_CLASS"),
            account_number: get("ACCOUNT_NUMBER"),
            access_public: get("ACCESS_PUBLIC"),
            access_private: get("ACCESS_PRIVATE"),
            x509_cert,
            x509_key,
            endpoint: get("ENDPOINT"),
            cloud_name: get("CLOUD_NAME"),
            provider_name: get("PROVIDER_NAME"),
            region_id: get("REGION_ID"),
            custom_properties,
        })
    }

    /// Demand a field a provider cannot connect without.
    pub fn require(&self, field: &'static str) -> Result<&str, ConfigError> {
        let value = match field {
            "account_number" => &self.account_number,
            "access_public" => &self.access_public,
            "access_private" => &self.access_private,
            "x509_cert" => &self.x509_cert,
            "x509_key" => &self.x509_key,
            "endpoint" => &self.endpoint,
            "region_id" => &self.region_id,
            _ => return Err(ConfigError::MissingCredential(field)),
        };
        value
            .as_deref()
            .ok_or(ConfigError::MissingCredential(field))
    }
}

/// Read certificate or key material, terminating every line with `\n`.
fn read_material(path: &Path) -> Result<String, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(raw.lines().map(|line| format!("{line}\n")).collect())
}

fn parse_custom_properties(json: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    Ok(serde_json::from_str(json)?)
}
