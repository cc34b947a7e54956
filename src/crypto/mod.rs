//! Cryptographic utilities
//!
//! This module provides:
//! - Keccak-256 and SHA-256 hashing
//! - ECDSA key management and recoverable signing (secp256k1)
//! - Signer recovery behind an injectable trait

pub mod hash;
pub mod keys;
pub mod recover;

pub use hash::{keccak256, keccak256_concat, keccak256_hex, sha256};
pub use keys::{public_key_to_address, sign_digest, KeyError, KeyPair, Signature, V_OFFSET};
pub use recover::{Secp256k1Recovery, SignerRecovery};
