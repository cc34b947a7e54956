//! Storage module for CLI persistence

pub mod keystore;
pub mod persistence;

pub use keystore::{KeyInfo, KeyStore, KeystoreError};
pub use persistence::{load_from_file, Snapshot, Storage, StorageConfig, StorageError};
