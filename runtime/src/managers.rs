//! The [`Managers`] registry.

use crate::metrics::{HANDLE_ERRORS, HANDLES_CLOSED, HANDLES_OPENED};
use analytics_managers_core::{
    BrokerConnector, BrokerPool, BrokerRole, ClientError, DocumentStoreClient,
    DocumentStoreConnector, Encoding, Handle, LifecycleHook, ManagersConfig, Phase,
    RegistryError, Result,
};
use std::fmt;

/// Registry of the service's connections, opened lazily by
/// [`initialize`](Managers::initialize).
///
/// # Type Parameters
///
/// - `D`: Document-store connector
/// - `B`: Broker connector, used for all three pools
/// - `H`: Base lifecycle hook (defaults to the no-op `()`)
///
/// # Contract
///
/// - Accessors return [`RegistryError::Uninitialized`] while their handle is absent.
/// - `initialize` runs at most once; later calls return
///   [`RegistryError::AlreadyInitialized`].
/// - `teardown` closes each present handle exactly once. Repeating it after
///   success is a no-op; repeating it after a failure resumes with the
///   handles that are still open.
pub struct Managers<D, B, H = ()>
where
    D: DocumentStoreConnector,
    B: BrokerConnector,
    H: LifecycleHook,
{
    config: ManagersConfig,
    hook: H,
    doc_connector: D,
    broker_connector: B,
    doc_store: Option<D::Client>,
    brokers: [Option<B::Pool>; 3],
    phase: Phase,
    hook_torn_down: bool,
}

impl<D, B> Managers<D, B>
where
    D: DocumentStoreConnector,
    B: BrokerConnector,
{
    /// Create an empty registry without a base lifecycle hook.
    #[must_use]
    pub fn new(config: ManagersConfig, doc_connector: D, broker_connector: B) -> Self {
        Self::with_hook(config, (), doc_connector, broker_connector)
    }
}

impl<D, B, H> Managers<D, B, H>
where
    D: DocumentStoreConnector,
    B: BrokerConnector,
    H: LifecycleHook,
{
    /// Create an empty registry whose lifecycle extends `hook`.
    #[must_use]
    pub fn with_hook(config: ManagersConfig, hook: H, doc_connector: D, broker_connector: B) -> Self {
        Self {
            config,
            hook,
            doc_connector,
            broker_connector,
            doc_store: None,
            brokers: [None, None, None],
            phase: Phase::Uninitialized,
            hook_torn_down: false,
        }
    }

    /// The document-store client.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Uninitialized`] unless `initialize(true)`
    /// completed that step and `teardown` has not closed it.
    pub fn doc_store(&self) -> Result<&D::Client> {
        self.doc_store.as_ref().ok_or(RegistryError::Uninitialized {
            handle: Handle::DocStore,
        })
    }

    /// The broker pool for `role`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Uninitialized`] if the pool is absent.
    pub fn broker(&self, role: BrokerRole) -> Result<&B::Pool> {
        self.brokers[role.index()]
            .as_ref()
            .ok_or(RegistryError::Uninitialized {
                handle: Handle::Broker(role),
            })
    }

    /// The analytics broker pool.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Uninitialized`] if the pool is absent.
    pub fn analytics_broker(&self) -> Result<&B::Pool> {
        self.broker(BrokerRole::Analytics)
    }

    /// The iOS authorization broker pool.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Uninitialized`] if the pool is absent.
    pub fn auth_ios_broker(&self) -> Result<&B::Pool> {
        self.broker(BrokerRole::AuthorizationIos)
    }

    /// The Android authorization broker pool.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Uninitialized`] if the pool is absent.
    pub fn auth_android_broker(&self) -> Result<&B::Pool> {
        self.broker(BrokerRole::AuthorizationAndroid)
    }

    /// Whether `handle` is currently open.
    #[must_use]
    pub fn is_open(&self, handle: Handle) -> bool {
        match handle {
            Handle::DocStore => self.doc_store.is_some(),
            Handle::Broker(role) => self.brokers[role.index()].is_some(),
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether `initialize` completed every requested step.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.phase == Phase::Initialized
    }

    /// The configuration handles are opened with.
    #[must_use]
    pub const fn config(&self) -> &ManagersConfig {
        &self.config
    }

    /// Open the registry's handles.
    ///
    /// Runs the base hook, then walks [`Handle::ORDER`], awaiting each step
    /// before starting the next. The document store is opened only when
    /// `init_doc_store` is `true`; the three broker pools always are.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::AlreadyInitialized`] if called a second time
    /// - [`RegistryError::Lifecycle`] if the base hook fails (nothing is opened)
    /// - [`RegistryError::ConnectionFailed`] for the first step that fails;
    ///   later steps are not attempted and earlier handles stay open
    pub async fn initialize(&mut self, init_doc_store: bool) -> Result<()> {
        if self.phase != Phase::Uninitialized {
            tracing::warn!(phase = %self.phase, "initialize called on a used registry");
            return Err(RegistryError::AlreadyInitialized { phase: self.phase });
        }

        // Any failure below leaves the registry partially initialized.
        self.phase = Phase::PartiallyInitialized;

        self.hook.initialize().await.map_err(|e| {
            tracing::warn!(error = %e, "Base lifecycle initialize failed");
            RegistryError::Lifecycle(e)
        })?;

        for handle in Handle::ORDER {
            if handle == Handle::DocStore && !init_doc_store {
                tracing::debug!(handle = %handle, "Handle not requested, skipping");
                continue;
            }
            self.open(handle).await?;
        }

        self.phase = Phase::Initialized;
        tracing::info!(doc_store = init_doc_store, "Managers initialized");
        Ok(())
    }

    /// Close the registry's handles.
    ///
    /// Runs the base hook, then closes every present handle in
    /// [`Handle::ORDER`]. Broker pools are signalled and then awaited until
    /// closed. Absent handles are skipped.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Lifecycle`] if the base hook fails (nothing is closed)
    /// - [`RegistryError::CloseFailed`] for the first handle that fails to
    ///   close; later handles stay open until `teardown` is called again
    pub async fn teardown(&mut self) -> Result<()> {
        if self.phase == Phase::TornDown {
            tracing::debug!("Managers already torn down");
            return Ok(());
        }

        if !self.hook_torn_down {
            self.hook.teardown().await.map_err(|e| {
                tracing::warn!(error = %e, "Base lifecycle teardown failed");
                RegistryError::Lifecycle(e)
            })?;
            self.hook_torn_down = true;
        }

        for handle in Handle::ORDER {
            self.close(handle).await?;
        }

        self.phase = Phase::TornDown;
        tracing::info!("Managers torn down");
        Ok(())
    }

    async fn open(&mut self, handle: Handle) -> Result<()> {
        let url = self.config.url_for(handle);

        match handle {
            Handle::DocStore => {
                let client = self
                    .doc_connector
                    .connect(url)
                    .await
                    .map_err(|source| open_failed(handle, source))?;
                self.doc_store = Some(client);
            }
            Handle::Broker(role) => {
                let pool = self
                    .broker_connector
                    .create_pool(url, Encoding::Utf8)
                    .await
                    .map_err(|source| open_failed(handle, source))?;
                self.brokers[role.index()] = Some(pool);
            }
        }

        tracing::info!(handle = %handle, "Opened handle");
        metrics::counter!(HANDLES_OPENED, "handle" => handle.name()).increment(1);
        Ok(())
    }

    async fn close(&mut self, handle: Handle) -> Result<()> {
        match handle {
            Handle::DocStore => {
                let Some(client) = self.doc_store.take() else {
                    tracing::debug!(handle = %handle, "Handle absent, skipping close");
                    return Ok(());
                };
                client
                    .close()
                    .await
                    .map_err(|source| close_failed(handle, source))?;
            }
            Handle::Broker(role) => {
                let Some(pool) = self.brokers[role.index()].take() else {
                    tracing::debug!(handle = %handle, "Handle absent, skipping close");
                    return Ok(());
                };
                pool.close();
                pool.wait_closed()
                    .await
                    .map_err(|source| close_failed(handle, source))?;
            }
        }

        tracing::info!(handle = %handle, "Closed handle");
        metrics::counter!(HANDLES_CLOSED, "handle" => handle.name()).increment(1);
        Ok(())
    }
}

fn open_failed(handle: Handle, source: ClientError) -> RegistryError {
    tracing::warn!(handle = %handle, error = %source, "Failed to open handle");
    metrics::counter!(HANDLE_ERRORS, "handle" => handle.name(), "operation" => "open")
        .increment(1);
    RegistryError::ConnectionFailed { handle, source }
}

fn close_failed(handle: Handle, source: ClientError) -> RegistryError {
    tracing::warn!(handle = %handle, error = %source, "Failed to close handle");
    metrics::counter!(HANDLE_ERRORS, "handle" => handle.name(), "operation" => "close")
        .increment(1);
    RegistryError::CloseFailed { handle, source }
}

impl<D, B, H> fmt::Debug for Managers<D, B, H>
where
    D: DocumentStoreConnector,
    B: BrokerConnector,
    H: LifecycleHook,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open: Vec<&str> = Handle::ORDER
            .iter()
            .filter(|handle| self.is_open(**handle))
            .map(|handle| handle.name())
            .collect();
        f.debug_struct("Managers")
            .field("phase", &self.phase)
            .field("open", &open)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use analytics_managers_testing::{
        Call, CallLog, MockBrokerConnector, MockDocumentStoreConnector, RecordingHook,
        TEST_ANALYTICS_BROKER_URL, TEST_DOC_STORE_URL, test_config,
    };

    fn managers(
        log: &CallLog,
    ) -> Managers<MockDocumentStoreConnector, MockBrokerConnector, RecordingHook> {
        Managers::with_hook(
            test_config(),
            RecordingHook::new(log.clone()),
            MockDocumentStoreConnector::new(log.clone()),
            MockBrokerConnector::new(log.clone()),
        )
    }

    #[test]
    fn new_registry_is_empty() {
        let log = CallLog::new();
        let managers = managers(&log);

        assert_eq!(managers.phase(), Phase::Uninitialized);
        assert!(!managers.is_initialized());
        for handle in Handle::ORDER {
            assert!(!managers.is_open(handle));
        }
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn hook_runs_before_first_step() {
        let log = CallLog::new();
        let mut managers = managers(&log);

        managers.initialize(true).await.unwrap();

        let calls = log.calls();
        assert_eq!(calls[0], Call::HookInitialize);
        assert_eq!(
            calls[1],
            Call::Connect {
                url: TEST_DOC_STORE_URL.to_string()
            }
        );
    }

    #[tokio::test]
    async fn pools_are_created_with_utf8() {
        let log = CallLog::new();
        let mut managers = managers(&log);

        managers.initialize(false).await.unwrap();

        assert_eq!(managers.analytics_broker().unwrap().encoding(), Encoding::Utf8);
        assert_eq!(
            log.count(&Call::CreatePool {
                address: TEST_ANALYTICS_BROKER_URL.to_string(),
                encoding: Encoding::Utf8,
            }),
            1
        );
    }

    #[tokio::test]
    async fn hook_failure_opens_nothing() {
        let log = CallLog::new();
        let mut managers = Managers::with_hook(
            test_config(),
            RecordingHook::new(log.clone()).failing_initialize(),
            MockDocumentStoreConnector::new(log.clone()),
            MockBrokerConnector::new(log.clone()),
        );

        let err = managers.initialize(true).await.unwrap_err();

        assert!(matches!(err, RegistryError::Lifecycle(_)));
        assert_eq!(log.calls(), vec![Call::HookInitialize]);
        assert_eq!(managers.phase(), Phase::PartiallyInitialized);
    }

    #[tokio::test]
    async fn teardown_hook_failure_closes_nothing_and_can_be_retried() {
        let log = CallLog::new();
        let mut managers = Managers::with_hook(
            test_config(),
            RecordingHook::new(log.clone()).failing_teardown(),
            MockDocumentStoreConnector::new(log.clone()),
            MockBrokerConnector::new(log.clone()),
        );
        managers.initialize(false).await.unwrap();

        let err = managers.teardown().await.unwrap_err();

        assert!(matches!(err, RegistryError::Lifecycle(_)));
        assert!(managers.analytics_broker().is_ok());
        assert_eq!(managers.phase(), Phase::Initialized);
    }

    #[tokio::test]
    async fn debug_lists_open_handles() {
        let log = CallLog::new();
        let mut managers = managers(&log);
        managers.initialize(false).await.unwrap();

        let rendered = format!("{managers:?}");

        assert!(rendered.contains("analytics_broker"));
        assert!(!rendered.contains("doc_store"));
    }
}
