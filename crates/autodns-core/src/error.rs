//! Error types for AutoDNS
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for AutoDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for AutoDNS
#[derive(Error, Debug)]
pub enum Error {
    /// The network mapping source is missing or unreadable
    #[error("Mapping source unavailable ({path}): {reason}")]
    SourceUnavailable {
        /// Location of the mapping source
        path: String,
        /// What went wrong
        reason: String,
    },

    /// The persisted cache exists but cannot be understood
    #[error("Cache corrupt ({path}): {reason}. Fix or delete the cache file.")]
    CacheCorrupt {
        /// Location of the cache
        path: String,
        /// What went wrong
        reason: String,
    },

    /// A cache entry or `add` target names a network absent from the mapping
    #[error("Network '{network_name}' not found in the current network mapping")]
    NetworkNotObserved {
        /// The network that was looked up
        network_name: String,
    },

    /// The DNS remap port failed to move records for one network
    #[error("Failed to remap {network_name} ({old_address} => {new_address}): {reason}")]
    Remap {
        /// Network whose records were being moved
        network_name: String,
        /// Address the records were expected to hold
        old_address: String,
        /// Address the records should now hold
        new_address: String,
        /// Provider-reported detail
        reason: String,
    },

    /// A run finished but one or more cache entries failed
    #[error("{} of {total} cache entries failed: {}", .details.len(), .details.join("; "))]
    RunFailed {
        /// Number of entries processed
        total: usize,
        /// One description per failed entry, in cache order
        details: Vec<String>,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Resource not found on the provider side
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a mapping source error
    pub fn source_unavailable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a cache corruption error
    pub fn cache_corrupt(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CacheCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a "network not observed" error
    pub fn network_not_observed(network_name: impl Into<String>) -> Self {
        Self::NetworkNotObserved {
            network_name: network_name.into(),
        }
    }

    /// Create a remap error for one network's old => new transition
    pub fn remap(
        network_name: impl Into<String>,
        old_address: impl Into<String>,
        new_address: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Remap {
            network_name: network_name.into(),
            old_address: old_address.into(),
            new_address: new_address.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error is scoped to a single cache entry
    ///
    /// Entry-scoped errors are collected by the reconciler; every other
    /// error stops the run before reconciliation starts.
    pub fn is_per_entry(&self) -> bool {
        matches!(self, Self::NetworkNotObserved { .. } | Self::Remap { .. })
    }
}
