//! # Analytics Managers Core
//!
//! Core traits and types for the analytics connection registry.
//!
//! The registry owns one document-store client and three broker pools. This
//! crate defines everything the registry needs to talk about those handles
//! without depending on a concrete client library:
//!
//! - **Handles**: [`Handle`] and [`BrokerRole`] name the four slots and fix their order
//! - **Connectors**: [`DocumentStoreConnector`] and [`BrokerConnector`] open handles
//! - **Handles' lifecycle**: [`DocumentStoreClient`] and [`BrokerPool`] close them
//! - **Base lifecycle**: [`LifecycleHook`] runs before the registry's own steps
//! - **Errors**: [`ClientError`] at the collaborator level, [`RegistryError`] above it
//! - **Configuration**: [`ManagersConfig`] holds the four connection URLs
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  Managers (runtime)  │
//! └──────────┬───────────┘
//!            │ Handle::ORDER
//!     ┌──────┴───────┐
//!     ▼              ▼
//! ┌────────────┐ ┌────────────────┐
//! │ DocumentSt.│ │ BrokerConnector│
//! │ Connector  │ │   (x3 pools)   │
//! └─────┬──────┘ └───────┬────────┘
//!       ▼                ▼
//!    MongoDB           Redis
//! ```
//!
//! Concrete connectors live in `analytics-managers-mongo` and
//! `analytics-managers-redis`; recording doubles live in
//! `analytics-managers-testing`.

pub mod config;
pub mod connection;
pub mod error;
pub mod handle;
pub mod lifecycle;

// Re-export commonly used types
pub use config::ManagersConfig;
pub use connection::{
    BrokerConnector, BrokerPool, DocumentStoreClient, DocumentStoreConnector, Encoding,
};
pub use error::{ClientError, RegistryError, Result};
pub use handle::{BrokerRole, Handle, Phase};
pub use lifecycle::LifecycleHook;
