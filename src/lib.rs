//! litesig: threshold multi-signature wallets in Rust
//!
//! This crate provides:
//! - M-of-N wallets authorized by structured-message (EIP-712 style) signatures
//! - Replay protection through a per-wallet nonce and domain separator
//! - Time-locked owner-set recovery that any owner can cancel
//! - A factory that creates wallets at addresses predictable from a salt
//! - An owner-controlled administrator registry gating the factory
//! - An in-process host and JSON persistence for the CLI
//!
//! # Example
//!
//! ```rust
//! use litesig::core::{Address, B256, U256};
//! use litesig::crypto::{KeyPair, Secp256k1Recovery};
//! use litesig::factory::{FactoryConfig, WalletFactory};
//! use litesig::host::MemoryHost;
//! use litesig::multisig::{SignatureSet, TransactionRequest};
//!
//! let mut host = MemoryHost::new();
//! let admin = Address::new([1; 20]);
//! let mut factory = WalletFactory::new(
//!     Address::new([0x55; 20]),
//!     Address::new([0x44; 20]),
//!     admin,
//!     FactoryConfig::default(),
//! )
//! .unwrap();
//!
//! // A 1-of-1 wallet at a predictable address
//! let key = KeyPair::generate();
//! let salt = B256::with_last_byte(1);
//! let predicted = factory.predict_address(&salt);
//! let (mut wallet, _) = factory
//!     .create_wallet(&host.context(admin), &salt, vec![key.address()], 1, U256::from(1))
//!     .unwrap();
//! assert_eq!(wallet.address(), predicted);
//!
//! // Fund it and send value out
//! host.deposit(wallet.address(), U256::from(100)).unwrap();
//! let tx = TransactionRequest::transfer(Address::new([0x22; 20]), U256::from(40));
//! let hash = wallet.message_hash(&tx, None).unwrap();
//! let signatures = SignatureSet::sign(&[&key], &hash).unwrap();
//!
//! let ctx = host.context(admin);
//! let receipt = wallet
//!     .submit(&ctx, &signatures, &tx, &Secp256k1Recovery::new(), &mut host)
//!     .unwrap();
//! assert!(receipt.is_success());
//! assert_eq!(wallet.nonce(), U256::from(1));
//! ```

pub mod cli;
pub mod core;
pub mod crypto;
pub mod factory;
pub mod host;
pub mod multisig;
pub mod storage;

// Re-export commonly used types
pub use core::{Address, B256, U256};
pub use crypto::{KeyPair, Secp256k1Recovery, Signature};
pub use factory::{AdminRegistry, FactoryConfig, WalletFactory};
pub use host::{CallContext, MemoryHost};
pub use multisig::{SignatureSet, TransactionRequest, Wallet, WalletConfig};
pub use storage::{Snapshot, Storage};
