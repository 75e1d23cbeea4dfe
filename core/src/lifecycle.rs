//! Base lifecycle hook.
//!
//! A [`LifecycleHook`] runs shared bootstrap work (telemetry, common
//! connections) that every service's registry builds on. The registry awaits
//! [`LifecycleHook::initialize`] before opening its own handles and
//! [`LifecycleHook::teardown`] before closing them.

use crate::error::ClientError;
use std::future::Future;

/// Shared bootstrap and shutdown work run ahead of the registry's own steps.
pub trait LifecycleHook: Send + Sync {
    /// Run base initialization.
    ///
    /// # Errors
    ///
    /// Returns error if base initialization fails; the registry then opens
    /// nothing.
    fn initialize(&self) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Run base teardown.
    ///
    /// # Errors
    ///
    /// Returns error if base teardown fails; the registry then closes
    /// nothing.
    fn teardown(&self) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// No base lifecycle.
impl LifecycleHook for () {
    fn initialize(&self) -> impl Future<Output = Result<(), ClientError>> + Send {
        std::future::ready(Ok(()))
    }

    fn teardown(&self) -> impl Future<Output = Result<(), ClientError>> + Send {
        std::future::ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unit_hook_is_a_no_op() {
        assert_eq!(().initialize().await, Ok(()));
        assert_eq!(().teardown().await, Ok(()));
    }
}
