//! Cryptographic hashing utilities
//!
//! Keccak-256 is the protocol hash: domain separators, signed messages,
//! deployment addresses and account identifiers are all derived with it.
//! SHA-256 is only used to turn free-form seed text into deployment salts.

use crate::core::B256;
use alloy_primitives::Keccak256;
use sha2::{Digest, Sha256};

pub use alloy_primitives::keccak256;

/// Computes Keccak-256 over several slices as if they were concatenated
pub fn keccak256_concat(parts: &[&[u8]]) -> B256 {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize()
}

/// Computes SHA-256 of the input data
pub fn sha256(data: &[u8]) -> B256 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    B256::new(hasher.finalize().into())
}

/// Computes Keccak-256 and returns it as a hex string
pub fn keccak256_hex(data: &[u8]) -> String {
    hex::encode(keccak256(data))
}
