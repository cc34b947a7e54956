//! ECDSA key management
//!
//! Provides key pair generation and recoverable signing on secp256k1.
//! Account identifiers are derived the Ethereum way: the last 20 bytes of
//! the Keccak-256 hash of the uncompressed public key (without its prefix).

use rand::rngs::OsRng;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::hash::keccak256;
use crate::core::{Address, B256};

/// Offset added to the recovery id to form `v`
pub const V_OFFSET: u8 = 27;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid signature encoding: {0}")]
    InvalidEncoding(String),
    #[error("Invalid recovery byte v={0}")]
    InvalidRecoveryByte(u8),
    #[error("Signature component is zero")]
    ZeroComponent,
    #[error("Signer recovery failed")]
    RecoveryFailed,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A recoverable ECDSA signature in `(v, r, s)` form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub v: u8,
    pub r: B256,
    pub s: B256,
}

impl Signature {
    pub fn new(v: u8, r: B256, s: B256) -> Self {
        Self { v, r, s }
    }

    /// 65-byte `r || s || v` encoding
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(self.r.as_slice());
        out[32..64].copy_from_slice(self.s.as_slice());
        out[64] = self.v;
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != 65 {
            return Err(KeyError::InvalidEncoding(format!(
                "expected 65 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self::new(
            bytes[64],
            B256::from_slice(&bytes[..32]),
            B256::from_slice(&bytes[32..64]),
        ))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}

impl FromStr for Signature {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(trimmed).map_err(|e| KeyError::InvalidEncoding(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let trimmed = hex_key.strip_prefix("0x").unwrap_or(hex_key);
        let bytes = hex::decode(trimmed).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Get the account identifier controlled by this key
    pub fn address(&self) -> Address {
        public_key_to_address(&self.public_key)
    }

    /// Sign a 32-byte digest
    pub fn sign_digest(&self, digest: &B256) -> Result<Signature, KeyError> {
        sign_digest(&self.secret_key, digest)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Convert a public key to its account identifier
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    Address::from_word(keccak256(&uncompressed[1..]))
}

/// Sign a digest producing `v = 27 + recovery id`
pub fn sign_digest(secret_key: &SecretKey, digest: &B256) -> Result<Signature, KeyError> {
    let secp = Secp256k1::signing_only();
    let message = Message::from_digest(digest.0);
    let signature = secp.sign_ecdsa_recoverable(&message, secret_key);
    let (recovery_id, compact) = signature.serialize_compact();

    Ok(Signature {
        v: V_OFFSET + recovery_id.to_i32() as u8,
        r: B256::from_slice(&compact[..32]),
        s: B256::from_slice(&compact[32..]),
    })
}

/// Recover the public key that produced `signature` over `digest`
pub(crate) fn recover_public_key(
    secp: &Secp256k1<secp256k1::VerifyOnly>,
    digest: &B256,
    signature: &Signature,
) -> Result<PublicKey, KeyError> {
    if signature.v != V_OFFSET && signature.v != V_OFFSET + 1 {
        return Err(KeyError::InvalidRecoveryByte(signature.v));
    }
    if signature.r == B256::ZERO || signature.s == B256::ZERO {
        return Err(KeyError::ZeroComponent);
    }

    let recovery_id = RecoveryId::from_i32(i32::from(signature.v - V_OFFSET))?;
    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(signature.r.as_slice());
    compact[32..].copy_from_slice(signature.s.as_slice());

    let recoverable = RecoverableSignature::from_compact(&compact, recovery_id)?;
    let message = Message::from_digest(digest.0);
    secp.recover_ecdsa(&message, &recoverable)
        .map_err(|_| KeyError::RecoveryFailed)
}
