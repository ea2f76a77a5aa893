//! Configuration types for AutoDNS
//!
//! The core never reads the environment itself. The binary fills these
//! types in and the core only checks that they are usable.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main AutoDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoDnsConfig {
    /// Cache file location
    pub cache_path: PathBuf,

    /// Mapping file location
    pub mapping_path: PathBuf,

    /// DNS provider configuration, only needed to remap
    #[serde(default)]
    pub provider: Option<ProviderConfig>,
}

impl AutoDnsConfig {
    /// Create a new configuration without a provider
    pub fn new(cache_path: impl Into<PathBuf>, mapping_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
            mapping_path: mapping_path.into(),
            provider: None,
        }
    }

    /// Set the provider configuration
    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Validate the file locations, the only part `add` needs
    pub fn validate_paths(&self) -> Result<(), crate::Error> {
        if self.cache_path.as_os_str().is_empty() {
            return Err(crate::Error::config("Cache file path cannot be empty"));
        }
        if self.mapping_path.as_os_str().is_empty() {
            return Err(crate::Error::config("Mapping file path cannot be empty"));
        }
        Ok(())
    }

    /// Validate the file locations and any configured provider
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.validate_paths()?;
        if let Some(provider) = &self.provider {
            provider.validate()?;
        }
        Ok(())
    }

    /// Validate and return the provider configuration for a remap run
    pub fn require_provider(&self) -> Result<&ProviderConfig, crate::Error> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| crate::Error::config("No DNS provider configured"))?;
        provider.validate()?;
        Ok(provider)
    }
}

/// DNS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    Cloudflare {
        /// Cloudflare API token
        api_token: String,
        /// Zone name (e.g. "example.com"), resolved to an id on first use
        zone_name: Option<String>,
        /// Zone id, skips the zone lookup when set
        zone_id: Option<String>,
        /// Log edits instead of sending them
        #[serde(default)]
        dry_run: bool,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare {
                api_token,
                zone_name,
                zone_id,
                ..
            } => {
                if api_token.is_empty() {
                    return Err(crate::Error::config("Cloudflare API token cannot be empty"));
                }
                let has_zone_name = zone_name.as_deref().is_some_and(|z| !z.is_empty());
                let has_zone_id = zone_id.as_deref().is_some_and(|z| !z.is_empty());
                if !has_zone_name && !has_zone_id {
                    return Err(crate::Error::config(
                        "Cloudflare needs a zone name or a zone id",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
        }
    }
}
