//! Recording doubles for connectors, handles and the lifecycle hook.
//!
//! Every double writes to a shared [`CallLog`]. Share one log between the
//! hook, the document-store connector and the broker connector to assert the
//! global order of lifecycle calls.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on a poisoned test mutex

use analytics_managers_core::{
    BrokerConnector, BrokerPool, ClientError, DocumentStoreClient, DocumentStoreConnector,
    Encoding, LifecycleHook,
};
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

fn next_handle_id() -> u64 {
    NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed)
}

/// One recorded lifecycle call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// [`LifecycleHook::initialize`] ran.
    HookInitialize,
    /// [`LifecycleHook::teardown`] ran.
    HookTeardown,
    /// A document-store connect was attempted.
    Connect {
        /// Target URL
        url: String,
    },
    /// A document-store client was closed.
    CloseDocStore {
        /// URL the client was opened with
        url: String,
    },
    /// A broker pool creation was attempted.
    CreatePool {
        /// Target address
        address: String,
        /// Requested reply encoding
        encoding: Encoding,
    },
    /// A broker pool was signalled to close.
    ClosePool {
        /// Address the pool was opened with
        address: String,
    },
    /// A broker pool was awaited until closed.
    WaitClosed {
        /// Address the pool was opened with
        address: String,
    },
}

/// Ordered, shareable record of lifecycle calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call.
    pub fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    /// Snapshot of all calls so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Whether no call has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.lock().unwrap().is_empty()
    }

    /// Number of recorded calls equal to `call`.
    #[must_use]
    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    /// Forget every recorded call.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

/// Lifecycle hook that records its calls and can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingHook {
    log: CallLog,
    fail_initialize: bool,
    fail_teardown: bool,
}

impl RecordingHook {
    /// Create a hook writing to `log`.
    #[must_use]
    pub const fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_initialize: false,
            fail_teardown: false,
        }
    }

    /// Make `initialize` fail.
    #[must_use]
    pub const fn failing_initialize(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    /// Make `teardown` fail.
    #[must_use]
    pub const fn failing_teardown(mut self) -> Self {
        self.fail_teardown = true;
        self
    }
}

impl LifecycleHook for RecordingHook {
    fn initialize(&self) -> impl Future<Output = Result<(), ClientError>> + Send {
        self.log.record(Call::HookInitialize);
        let fail = self.fail_initialize;
        async move {
            if fail {
                Err(ClientError::Other("base initialize failed".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn teardown(&self) -> impl Future<Output = Result<(), ClientError>> + Send {
        self.log.record(Call::HookTeardown);
        let fail = self.fail_teardown;
        async move {
            if fail {
                Err(ClientError::Other("base teardown failed".to_string()))
            } else {
                Ok(())
            }
        }
    }
}

/// Document-store connector double.
#[derive(Debug, Clone, Default)]
pub struct MockDocumentStoreConnector {
    log: CallLog,
    failing_connect: HashSet<String>,
    failing_close: HashSet<String>,
}

impl MockDocumentStoreConnector {
    /// Create a connector writing to `log`.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Make connecting to `url` fail.
    #[must_use]
    pub fn fail_connect(mut self, url: impl Into<String>) -> Self {
        self.failing_connect.insert(url.into());
        self
    }

    /// Make closing a client opened on `url` fail.
    #[must_use]
    pub fn fail_close(mut self, url: impl Into<String>) -> Self {
        self.failing_close.insert(url.into());
        self
    }
}

impl DocumentStoreConnector for MockDocumentStoreConnector {
    type Client = MockDocumentStore;

    fn connect(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<MockDocumentStore, ClientError>> + Send {
        self.log.record(Call::Connect {
            url: url.to_string(),
        });
        let result = if self.failing_connect.contains(url) {
            Err(ClientError::Connect(format!("connection refused: {url}")))
        } else {
            Ok(MockDocumentStore {
                id: next_handle_id(),
                url: url.to_string(),
                log: self.log.clone(),
                fail_close: self.failing_close.contains(url),
                close_calls: Arc::new(AtomicUsize::new(0)),
            })
        };
        std::future::ready(result)
    }
}

/// Document-store client double.
#[derive(Debug, Clone)]
pub struct MockDocumentStore {
    id: u64,
    url: String,
    log: CallLog,
    fail_close: bool,
    close_calls: Arc<AtomicUsize>,
}

impl MockDocumentStore {
    /// Process-unique identity of this handle.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// URL this client was opened with.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// How many times `close` ran on this client or its clones.
    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

impl DocumentStoreClient for MockDocumentStore {
    fn close(&self) -> impl Future<Output = Result<(), ClientError>> + Send {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.log.record(Call::CloseDocStore {
            url: self.url.clone(),
        });
        let result = if self.fail_close {
            Err(ClientError::Close(format!("close failed: {}", self.url)))
        } else {
            Ok(())
        };
        std::future::ready(result)
    }
}

/// Broker connector double.
#[derive(Debug, Clone, Default)]
pub struct MockBrokerConnector {
    log: CallLog,
    failing_create: HashSet<String>,
    failing_close: HashSet<String>,
}

impl MockBrokerConnector {
    /// Create a connector writing to `log`.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Make creating a pool on `address` fail.
    #[must_use]
    pub fn fail_create(mut self, address: impl Into<String>) -> Self {
        self.failing_create.insert(address.into());
        self
    }

    /// Make `wait_closed` fail for the pool on `address`.
    #[must_use]
    pub fn fail_close(mut self, address: impl Into<String>) -> Self {
        self.failing_close.insert(address.into());
        self
    }
}

impl BrokerConnector for MockBrokerConnector {
    type Pool = MockBrokerPool;

    fn create_pool(
        &self,
        address: &str,
        encoding: Encoding,
    ) -> impl Future<Output = Result<MockBrokerPool, ClientError>> + Send {
        self.log.record(Call::CreatePool {
            address: address.to_string(),
            encoding,
        });
        let result = if self.failing_create.contains(address) {
            Err(ClientError::Connect(format!("connection refused: {address}")))
        } else {
            Ok(MockBrokerPool {
                id: next_handle_id(),
                address: address.to_string(),
                encoding,
                log: self.log.clone(),
                fail_close: self.failing_close.contains(address),
                closed: Arc::new(AtomicBool::new(false)),
                close_calls: Arc::new(AtomicUsize::new(0)),
            })
        };
        std::future::ready(result)
    }
}

/// Broker pool double.
#[derive(Debug, Clone)]
pub struct MockBrokerPool {
    id: u64,
    address: String,
    encoding: Encoding,
    log: CallLog,
    fail_close: bool,
    closed: Arc<AtomicBool>,
    close_calls: Arc<AtomicUsize>,
}

impl MockBrokerPool {
    /// Process-unique identity of this handle.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Address this pool was opened with.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Encoding requested at creation.
    #[must_use]
    pub const fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Whether `close` has been signalled.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// How many times `close` ran on this pool or its clones.
    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

impl BrokerPool for MockBrokerPool {
    fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        self.log.record(Call::ClosePool {
            address: self.address.clone(),
        });
    }

    fn wait_closed(&self) -> impl Future<Output = Result<(), ClientError>> + Send {
        self.log.record(Call::WaitClosed {
            address: self.address.clone(),
        });
        let result = if !self.is_closed() {
            Err(ClientError::Other(format!(
                "wait_closed before close: {}",
                self.address
            )))
        } else if self.fail_close {
            Err(ClientError::Close(format!("close failed: {}", self.address)))
        } else {
            Ok(())
        };
        std::future::ready(result)
    }
}
