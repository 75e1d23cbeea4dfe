//! # Analytics Managers Runtime
//!
//! The connection registry: one document-store client and three broker pools,
//! opened in a fixed order at startup and closed in the same order at
//! shutdown.
//!
//! ## Lifecycle
//!
//! ```text
//! Managers::new ──▶ initialize(init_doc_store) ──▶ accessors ──▶ teardown
//!   (empty)          hook, doc store?, analytics,    (&self)       hook, then
//!                    auth iOS, auth Android                        same order
//! ```
//!
//! The registry is an ordinary value. Build it once in `main`, initialize it,
//! lend `&Managers` to the components that need a handle, and tear it down
//! before exit. Lifecycle methods take `&mut self`, so no component can hold
//! a handle reference across `teardown`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use analytics_managers_core::ManagersConfig;
//! use analytics_managers_mongo::MongoConnector;
//! use analytics_managers_redis::RedisBrokerConnector;
//! use analytics_managers_runtime::Managers;
//!
//! let mut managers = Managers::new(
//!     ManagersConfig::from_env(),
//!     MongoConnector::new(),
//!     RedisBrokerConnector::new(),
//! );
//! managers.initialize(true).await?;
//!
//! let queue = managers.analytics_broker()?.connection()?;
//! // ... serve ...
//! drop(queue);
//!
//! // Waits for every leased broker connection to be dropped.
//! managers.teardown().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod managers;
pub mod metrics;

pub use managers::Managers;
