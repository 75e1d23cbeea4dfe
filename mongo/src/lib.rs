//! `MongoDB` document store for the Analytics Managers registry.
//!
//! This crate implements [`DocumentStoreConnector`] and
//! [`DocumentStoreClient`] from `analytics-managers-core` with the official
//! `mongodb` driver. The driver connects lazily, so by default a bad host
//! only surfaces on the first query; enable
//! [`verify_on_connect`](MongoConnectorBuilder::verify_on_connect) to make
//! `initialize` fail fast instead.
//!
//! # Example
//!
//! ```no_run
//! use analytics_managers_core::{DocumentStoreClient, DocumentStoreConnector};
//! use analytics_managers_mongo::MongoConnector;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connector = MongoConnector::builder()
//!     .app_name("analytics")
//!     .verify_on_connect(true)
//!     .build();
//!
//! let store = connector
//!     .connect("mongodb://localhost:27017/immuni-analytics-dev")
//!     .await?;
//! let db = store.default_database();
//!
//! store.close().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use analytics_managers_core::{ClientError, DocumentStoreClient, DocumentStoreConnector};
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use std::future::Future;
use std::time::Duration;

/// Opens [`MongoDocumentStore`]s.
#[derive(Debug, Clone, Default)]
pub struct MongoConnector {
    app_name: Option<String>,
    connect_timeout: Option<Duration>,
    server_selection_timeout: Option<Duration>,
    verify_on_connect: bool,
}

impl MongoConnector {
    /// Create a connector with the driver's defaults and no ping on connect.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder for configuring the connector.
    #[must_use]
    pub fn builder() -> MongoConnectorBuilder {
        MongoConnectorBuilder::default()
    }

    fn apply(&self, options: &mut ClientOptions) {
        if let Some(app_name) = &self.app_name {
            options.app_name = Some(app_name.clone());
        }
        if let Some(timeout) = self.connect_timeout {
            options.connect_timeout = Some(timeout);
        }
        if let Some(timeout) = self.server_selection_timeout {
            options.server_selection_timeout = Some(timeout);
        }
    }
}

/// Builder for configuring a [`MongoConnector`].
#[derive(Debug, Default)]
pub struct MongoConnectorBuilder {
    app_name: Option<String>,
    connect_timeout: Option<Duration>,
    server_selection_timeout: Option<Duration>,
    verify_on_connect: bool,
}

impl MongoConnectorBuilder {
    /// Set the application name reported to the server.
    #[must_use]
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Set the timeout for opening each socket.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set how long an operation waits for a suitable server.
    #[must_use]
    pub const fn server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.server_selection_timeout = Some(timeout);
        self
    }

    /// Ping the server while connecting.
    ///
    /// Default: `false`
    #[must_use]
    pub const fn verify_on_connect(mut self, verify: bool) -> Self {
        self.verify_on_connect = verify;
        self
    }

    /// Build the [`MongoConnector`].
    #[must_use]
    pub fn build(self) -> MongoConnector {
        MongoConnector {
            app_name: self.app_name,
            connect_timeout: self.connect_timeout,
            server_selection_timeout: self.server_selection_timeout,
            verify_on_connect: self.verify_on_connect,
        }
    }
}

impl DocumentStoreConnector for MongoConnector {
    type Client = MongoDocumentStore;

    fn connect(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<MongoDocumentStore, ClientError>> + Send {
        let url = url.to_string();
        let connector = self.clone();

        async move {
            let mut options = ClientOptions::parse(url.as_str())
                .await
                .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
            connector.apply(&mut options);

            let client = Client::with_options(options).map_err(|e| {
                ClientError::Connect(format!("Failed to create MongoDB client: {e}"))
            })?;

            if connector.verify_on_connect {
                client
                    .database("admin")
                    .run_command(doc! { "ping": 1 })
                    .await
                    .map_err(|e| ClientError::Connect(format!("MongoDB ping failed: {e}")))?;
            }

            let store = MongoDocumentStore { client };
            tracing::info!(
                database = ?store.default_database().map(|db| db.name().to_string()),
                verified = connector.verify_on_connect,
                "MongoDB client created"
            );
            Ok(store)
        }
    }
}

/// An open `MongoDB` client.
///
/// Clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct MongoDocumentStore {
    client: Client,
}

impl MongoDocumentStore {
    /// The raw driver client.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// The database named in the connection URL, if any.
    #[must_use]
    pub fn default_database(&self) -> Option<Database> {
        self.client.default_database()
    }
}

impl DocumentStoreClient for MongoDocumentStore {
    fn close(&self) -> impl Future<Output = Result<(), ClientError>> + Send {
        let client = self.client.clone();

        async move {
            client.shutdown().await;
            tracing::debug!("MongoDB client shut down");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn mongo_document_store_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<MongoDocumentStore>();
        assert_sync::<MongoDocumentStore>();
    }

    #[tokio::test]
    async fn invalid_url_is_rejected() {
        let err = MongoConnector::new()
            .connect("postgres://localhost/analytics")
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn lazy_connect_exposes_default_database() {
        // No server needed: the driver does not connect until first use.
        let store = MongoConnector::builder()
            .app_name("analytics-test")
            .build()
            .connect("mongodb://localhost:27017/immuni-analytics-test")
            .await
            .unwrap();

        assert_eq!(
            store.default_database().map(|db| db.name().to_string()),
            Some("immuni-analytics-test".to_string())
        );
        assert!(store.close().await.is_ok());
    }

    #[tokio::test]
    async fn builder_applies_options() {
        let connector = MongoConnector::builder()
            .app_name("analytics")
            .connect_timeout(Duration::from_secs(3))
            .server_selection_timeout(Duration::from_secs(4))
            .build();
        let mut options = ClientOptions::parse("mongodb://localhost:27017")
            .await
            .unwrap();

        connector.apply(&mut options);

        assert_eq!(options.app_name.as_deref(), Some("analytics"));
        assert_eq!(options.connect_timeout, Some(Duration::from_secs(3)));
        assert_eq!(options.server_selection_timeout, Some(Duration::from_secs(4)));
    }
}
