//! Events emitted by wallets and factories
//!
//! Events are produced only by operations that succeed; the host appends
//! them to its log.

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recovery lifecycle events of a wallet
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletEvent {
    RecoverStarted { owner: Address },
    RecoverCanceled { owner: Address },
    RecoverFinalized { owner: Address },
}

/// Events of the factory's admin registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminEvent {
    AdminAdded {
        added_admin: Address,
        added_by: Address,
    },
    AdminRemoved {
        removed_admin: Address,
        removed_by: Address,
    },
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
}

/// Events of the wallet factory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactoryEvent {
    WalletCreated { wallet: Address },
}

/// Any event the host can persist
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Wallet(WalletEvent),
    Admin(AdminEvent),
    Factory(FactoryEvent),
}

impl From<WalletEvent> for Event {
    fn from(event: WalletEvent) -> Self {
        Event::Wallet(event)
    }
}

impl From<AdminEvent> for Event {
    fn from(event: AdminEvent) -> Self {
        Event::Admin(event)
    }
}

impl From<FactoryEvent> for Event {
    fn from(event: FactoryEvent) -> Self {
        Event::Factory(event)
    }
}

/// An event as recorded by the host
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Instance that emitted the event
    pub emitter: Address,
    /// Host time of the emitting call
    pub timestamp: DateTime<Utc>,
    pub event: Event,
}
