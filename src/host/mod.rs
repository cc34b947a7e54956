//! Execution host interfaces
//!
//! The host owns persistence, time and value transfer. Wallets and factories
//! only see:
//! - a [`CallContext`] naming the caller and the current time
//! - a [`CallExecutor`] that forwards approved calls to their destination
//!
//! [`MemoryHost`] is an in-process host used by the CLI and the tests.

pub mod memory;

use crate::core::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryHost;

/// Errors reported by the destination of a forwarded call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: U256, need: U256 },
    #[error("Balance of {account} would overflow")]
    BalanceOverflow { account: Address },
    #[error("Call reverted: {0}")]
    Reverted(String),
}

/// Who is calling, and when
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    pub timestamp: DateTime<Utc>,
}

impl CallContext {
    pub fn new(caller: Address, timestamp: DateTime<Utc>) -> Self {
        Self { caller, timestamp }
    }

    /// Context stamped with the wall clock
    pub fn now(caller: Address) -> Self {
        Self::new(caller, Utc::now())
    }
}

/// A call forwarded by a wallet after its signatures were accepted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingCall {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    #[serde(with = "crate::core::abi::hex_bytes")]
    pub payload: Vec<u8>,
}

/// Forwards calls to their destination
pub trait CallExecutor {
    /// Execute the call, returning the destination's return data
    fn execute(&mut self, call: &OutgoingCall) -> Result<Vec<u8>, CallError>;
}
