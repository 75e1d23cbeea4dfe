//! Connector and handle traits.
//!
//! The registry never names a client library. It asks a connector for a
//! handle, stores it, hands out references, and closes it at shutdown.
//!
//! # Implementations
//!
//! - `MongoConnector` (`analytics-managers-mongo`) - document store
//! - `RedisBrokerConnector` (`analytics-managers-redis`) - broker pools
//! - `MockDocumentStoreConnector` / `MockBrokerConnector`
//!   (`analytics-managers-testing`) - recording doubles
//!
//! # Example
//!
//! ```rust,ignore
//! use analytics_managers_core::{BrokerConnector, BrokerPool, Encoding};
//!
//! async fn example(connector: impl BrokerConnector) -> Result<(), ClientError> {
//!     let pool = connector.create_pool("redis://localhost:6379/0", Encoding::Utf8).await?;
//!     // ... use the pool ...
//!     pool.close();
//!     pool.wait_closed().await
//! }
//! ```

use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Text encoding used to decode broker replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Encoding {
    /// UTF-8 text.
    #[default]
    Utf8,
}

impl Encoding {
    /// Canonical label of the encoding.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
        }
    }
}

/// Opens document-store clients.
pub trait DocumentStoreConnector: Send + Sync {
    /// The client handle this connector produces.
    type Client: DocumentStoreClient;

    /// Connect to the document store at `url`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The URL cannot be parsed → [`ClientError::InvalidUrl`]
    /// - The server cannot be reached → [`ClientError::Connect`]
    fn connect(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Self::Client, ClientError>> + Send;
}

/// An open document-store client.
///
/// Clones share the same underlying connection.
pub trait DocumentStoreClient: Clone + Send + Sync + 'static {
    /// Close the client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Close`] if the client fails to shut down.
    fn close(&self) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Creates broker connection pools.
pub trait BrokerConnector: Send + Sync {
    /// The pool handle this connector produces.
    type Pool: BrokerPool;

    /// Create a pool of connections to the broker at `address`.
    ///
    /// Replies read through the pool are decoded with `encoding`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The address cannot be parsed → [`ClientError::InvalidUrl`]
    /// - The broker cannot be reached → [`ClientError::Connect`]
    fn create_pool(
        &self,
        address: &str,
        encoding: Encoding,
    ) -> impl Future<Output = Result<Self::Pool, ClientError>> + Send;
}

/// An open broker connection pool.
///
/// Closing is two-phase: [`close`](BrokerPool::close) signals the pool to
/// stop, [`wait_closed`](BrokerPool::wait_closed) waits until it has.
pub trait BrokerPool: Clone + Send + Sync + 'static {
    /// Signal the pool to close. Does not wait.
    fn close(&self);

    /// Wait until the pool has fully closed.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Close`] if the pool fails to close cleanly.
    fn wait_closed(&self) -> impl Future<Output = Result<(), ClientError>> + Send;
}
