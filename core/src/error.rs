//! Error types for the connection registry.
//!
//! Two levels:
//!
//! - [`ClientError`] is what a connector, pool or hook reports. It carries the
//!   underlying library's message as a string so core stays library-agnostic.
//! - [`RegistryError`] is what `Managers` returns. It adds the [`Handle`] whose
//!   step failed and otherwise passes the client error through unchanged.

use crate::handle::{Handle, Phase};
use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors reported by connectors, pools and lifecycle hooks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Failed to reach the backing service
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Failed to close an open handle
    #[error("Close failed: {0}")]
    Close(String),

    /// The handle was already closed
    #[error("Handle is closed")]
    Closed,

    /// The connection URL could not be parsed
    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),

    /// Generic error for other failures
    #[error("Client error: {0}")]
    Other(String),
}

/// Errors returned by the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// An accessor was called while its handle is absent.
    ///
    /// This is a programmer error: the caller used the handle before
    /// `initialize`, without requesting it, or after `teardown`.
    #[error("Cannot use {handle} before initializing it")]
    Uninitialized {
        /// The handle that was requested
        handle: Handle,
    },

    /// Opening a handle failed during `initialize`.
    #[error("Failed to open {handle}: {source}")]
    ConnectionFailed {
        /// The handle whose step failed
        handle: Handle,
        /// The underlying client error
        #[source]
        source: ClientError,
    },

    /// Closing a handle failed during `teardown`.
    #[error("Failed to close {handle}: {source}")]
    CloseFailed {
        /// The handle whose close failed
        handle: Handle,
        /// The underlying client error
        #[source]
        source: ClientError,
    },

    /// `initialize` was called after the registry left `Uninitialized`.
    #[error("Registry already {phase}; initialize may only run once")]
    AlreadyInitialized {
        /// The phase the registry was in
        phase: Phase,
    },

    /// The base lifecycle hook failed.
    #[error("Base lifecycle hook failed: {0}")]
    Lifecycle(#[source] ClientError),
}

impl RegistryError {
    /// The handle involved in this error, if any.
    #[must_use]
    pub const fn handle(&self) -> Option<Handle> {
        match self {
            Self::Uninitialized { handle }
            | Self::ConnectionFailed { handle, .. }
            | Self::CloseFailed { handle, .. } => Some(*handle),
            Self::AlreadyInitialized { .. } | Self::Lifecycle(_) => None,
        }
    }

    /// Returns `true` if this error signals misuse of the registry rather
    /// than a failure of a backing service.
    ///
    /// # Examples
    ///
    /// ```
    /// # use analytics_managers_core::{Handle, RegistryError};
    /// let err = RegistryError::Uninitialized { handle: Handle::DocStore };
    /// assert!(err.is_programmer_error());
    /// ```
    #[must_use]
    pub const fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            Self::Uninitialized { .. } | Self::AlreadyInitialized { .. }
        )
    }
}
