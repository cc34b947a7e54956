//! Core protocol primitives
//!
//! This module contains the building blocks shared by every component:
//! - Ethereum-style identifiers and 256-bit words (from `alloy-primitives`)
//! - 32-byte word encoding for signed messages
//! - Events emitted by wallets and factories

pub mod abi;
pub mod events;

pub use abi::{encode_address, encode_uint, WordWriter, WORD_SIZE};
pub use alloy_primitives::{Address, B256, U256};
pub use events::{AdminEvent, Event, FactoryEvent, LoggedEvent, WalletEvent};
