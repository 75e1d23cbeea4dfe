//! # Analytics Managers Testing
//!
//! Testing utilities for the connection registry.
//!
//! This crate provides:
//! - Recording doubles for every connector, handle and hook trait in core
//! - A shared [`CallLog`] so tests can assert the exact order of lifecycle calls
//! - Failure injection per URL for connect and close
//! - [`test_config`] with four distinct fake URLs
//!
//! ## Example
//!
//! ```ignore
//! use analytics_managers_runtime::Managers;
//! use analytics_managers_testing::{CallLog, MockBrokerConnector, MockDocumentStoreConnector, test_config};
//!
//! #[tokio::test]
//! async fn test_startup() {
//!     let log = CallLog::new();
//!     let mut managers = Managers::new(
//!         test_config(),
//!         MockDocumentStoreConnector::new(log.clone()),
//!         MockBrokerConnector::new(log.clone()),
//!     );
//!
//!     managers.initialize(true).await.unwrap();
//!     assert_eq!(log.len(), 4);
//! }
//! ```

pub mod mocks;

use analytics_managers_core::ManagersConfig;

pub use mocks::{
    Call, CallLog, MockBrokerConnector, MockBrokerPool, MockDocumentStore,
    MockDocumentStoreConnector, RecordingHook,
};

/// Document-store URL used by [`test_config`].
pub const TEST_DOC_STORE_URL: &str = "mock://doc-store";
/// Analytics broker URL used by [`test_config`].
pub const TEST_ANALYTICS_BROKER_URL: &str = "mock://analytics-broker";
/// iOS authorization broker URL used by [`test_config`].
pub const TEST_AUTHORIZATION_IOS_BROKER_URL: &str = "mock://authorization-ios-broker";
/// Android authorization broker URL used by [`test_config`].
pub const TEST_AUTHORIZATION_ANDROID_BROKER_URL: &str = "mock://authorization-android-broker";

/// Configuration pointing every handle at a distinct fake URL.
#[must_use]
pub fn test_config() -> ManagersConfig {
    ManagersConfig {
        doc_store_url: TEST_DOC_STORE_URL.to_string(),
        analytics_broker_url: TEST_ANALYTICS_BROKER_URL.to_string(),
        authorization_ios_broker_url: TEST_AUTHORIZATION_IOS_BROKER_URL.to_string(),
        authorization_android_broker_url: TEST_AUTHORIZATION_ANDROID_BROKER_URL.to_string(),
    }
}

/// Install a test-friendly tracing subscriber.
///
/// Honors `RUST_LOG`; safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
