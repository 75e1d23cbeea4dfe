//! Handle identifiers and registry phases.
//!
//! A [`Handle`] names one slot of the registry. [`Handle::ORDER`] is the single
//! source of truth for the order in which slots are opened and closed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a broker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrokerRole {
    /// Queue receiving analytics operational data.
    Analytics,
    /// Queue of iOS device authorization jobs.
    AuthorizationIos,
    /// Queue of Android device authorization jobs.
    AuthorizationAndroid,
}

impl BrokerRole {
    /// All roles, in opening order.
    pub const ALL: [Self; 3] = [
        Self::Analytics,
        Self::AuthorizationIos,
        Self::AuthorizationAndroid,
    ];

    /// Position of this role in [`BrokerRole::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Analytics => 0,
            Self::AuthorizationIos => 1,
            Self::AuthorizationAndroid => 2,
        }
    }

    /// Stable name used in logs and metric labels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Analytics => "analytics_broker",
            Self::AuthorizationIos => "authorization_ios_broker",
            Self::AuthorizationAndroid => "authorization_android_broker",
        }
    }
}

/// One slot of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handle {
    /// The document-store client.
    DocStore,
    /// One of the broker pools.
    Broker(BrokerRole),
}

impl Handle {
    /// Opening order of `initialize`, and closing order of `teardown`.
    pub const ORDER: [Self; 4] = [
        Self::DocStore,
        Self::Broker(BrokerRole::Analytics),
        Self::Broker(BrokerRole::AuthorizationIos),
        Self::Broker(BrokerRole::AuthorizationAndroid),
    ];

    /// Stable name used in logs and metric labels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DocStore => "doc_store",
            Self::Broker(role) => role.name(),
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle phase of the registry.
///
/// ```text
/// Uninitialized ──initialize──▶ Initialized ──teardown──▶ TornDown
///       │                                                   ▲
///       └──initialize (step failed)──▶ PartiallyInitialized ┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Nothing has been opened yet.
    #[default]
    Uninitialized,
    /// Every requested handle was opened.
    Initialized,
    /// `initialize` stopped at a failing step; earlier handles are still open.
    PartiallyInitialized,
    /// `teardown` completed.
    TornDown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::PartiallyInitialized => "partially initialized",
            Self::TornDown => "torn down",
        };
        f.write_str(name)
    }
}
