//! Connection configuration for the registry.
//!
//! Loads the four connection URLs from environment variables with defaults
//! pointing at a local development stack.

use crate::handle::{BrokerRole, Handle};
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable holding the document-store URL.
pub const DOC_STORE_URL_VAR: &str = "ANALYTICS_MONGO_URL";
/// Environment variable holding the analytics broker URL.
pub const ANALYTICS_BROKER_URL_VAR: &str = "ANALYTICS_BROKER_REDIS_URL";
/// Environment variable holding the iOS authorization broker URL.
pub const AUTHORIZATION_IOS_BROKER_URL_VAR: &str = "CELERY_BROKER_REDIS_URL_AUTHORIZATION_IOS";
/// Environment variable holding the Android authorization broker URL.
pub const AUTHORIZATION_ANDROID_BROKER_URL_VAR: &str =
    "CELERY_BROKER_REDIS_URL_AUTHORIZATION_ANDROID";

/// Connection URLs consumed by `initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagersConfig {
    /// Document-store (`MongoDB`) connection URL
    pub doc_store_url: String,
    /// Analytics broker (`Redis`) connection URL
    pub analytics_broker_url: String,
    /// iOS authorization broker (`Redis`) connection URL
    pub authorization_ios_broker_url: String,
    /// Android authorization broker (`Redis`) connection URL
    pub authorization_android_broker_url: String,
}

impl ManagersConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to [`ManagersConfig::default`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// `from_env` is this with [`std::env::var`]; tests pass a map instead.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            doc_store_url: lookup(DOC_STORE_URL_VAR).unwrap_or(defaults.doc_store_url),
            analytics_broker_url: lookup(ANALYTICS_BROKER_URL_VAR)
                .unwrap_or(defaults.analytics_broker_url),
            authorization_ios_broker_url: lookup(AUTHORIZATION_IOS_BROKER_URL_VAR)
                .unwrap_or(defaults.authorization_ios_broker_url),
            authorization_android_broker_url: lookup(AUTHORIZATION_ANDROID_BROKER_URL_VAR)
                .unwrap_or(defaults.authorization_android_broker_url),
        }
    }

    /// Set the document-store URL.
    #[must_use]
    pub fn with_doc_store_url(mut self, url: impl Into<String>) -> Self {
        self.doc_store_url = url.into();
        self
    }

    /// Set the URL of one broker pool.
    #[must_use]
    pub fn with_broker_url(mut self, role: BrokerRole, url: impl Into<String>) -> Self {
        let url = url.into();
        match role {
            BrokerRole::Analytics => self.analytics_broker_url = url,
            BrokerRole::AuthorizationIos => self.authorization_ios_broker_url = url,
            BrokerRole::AuthorizationAndroid => self.authorization_android_broker_url = url,
        }
        self
    }

    /// The URL a handle connects to.
    #[must_use]
    pub fn url_for(&self, handle: Handle) -> &str {
        match handle {
            Handle::DocStore => &self.doc_store_url,
            Handle::Broker(BrokerRole::Analytics) => &self.analytics_broker_url,
            Handle::Broker(BrokerRole::AuthorizationIos) => &self.authorization_ios_broker_url,
            Handle::Broker(BrokerRole::AuthorizationAndroid) => {
                &self.authorization_android_broker_url
            }
        }
    }
}

impl Default for ManagersConfig {
    fn default() -> Self {
        Self {
            doc_store_url: "mongodb://localhost:27017/immuni-analytics-dev".to_string(),
            analytics_broker_url: "redis://localhost:6379/0".to_string(),
            authorization_ios_broker_url: "redis://localhost:6379/1".to_string(),
            authorization_android_broker_url: "redis://localhost:6379/2".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ManagersConfig::default();
        assert_eq!(
            config.doc_store_url,
            "mongodb://localhost:27017/immuni-analytics-dev"
        );
        assert_eq!(config.analytics_broker_url, "redis://localhost:6379/0");
    }

    #[test]
    fn test_lookup_overrides_only_present_keys() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ANALYTICS_BROKER_URL_VAR, "redis://queue:6379/4"),
            (DOC_STORE_URL_VAR, "mongodb://db:27017/analytics"),
        ]);
        let config = ManagersConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.doc_store_url, "mongodb://db:27017/analytics");
        assert_eq!(config.analytics_broker_url, "redis://queue:6379/4");
        assert_eq!(
            config.authorization_ios_broker_url,
            ManagersConfig::default().authorization_ios_broker_url
        );
    }

    #[test]
    fn test_builder_and_url_for() {
        let config = ManagersConfig::default()
            .with_doc_store_url("mongodb://a")
            .with_broker_url(BrokerRole::AuthorizationAndroid, "redis://b");

        assert_eq!(config.url_for(Handle::DocStore), "mongodb://a");
        assert_eq!(
            config.url_for(Handle::Broker(BrokerRole::AuthorizationAndroid)),
            "redis://b"
        );
        assert_eq!(
            config.url_for(Handle::Broker(BrokerRole::AuthorizationIos)),
            "redis://localhost:6379/1"
        );
    }

    #[test]
    fn test_config_serde() {
        let config = ManagersConfig::default();
        let json = serde_json::to_string(&config).unwrap_or_default();
        assert!(json.contains("analytics_broker_url"));
    }
}
