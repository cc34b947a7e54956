//! Signer key files
//!
//! Owner keys used by the CLI are kept one file per address under the data
//! directory, so `sign` can look them up by address.

use crate::core::Address;
use crate::crypto::{KeyError, KeyPair};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Keystore errors
#[derive(Error, Debug)]
pub enum KeystoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Crypto error: {0}")]
    CryptoError(#[from] KeyError),
    #[error("Key file {path} does not match its address {address}")]
    AddressMismatch { path: PathBuf, address: Address },
}

/// Serializable key data for persistence
#[derive(Debug, Serialize, Deserialize)]
struct KeyFile {
    private_key_hex: String,
    address: Address,
    label: Option<String>,
}

/// Public key information (safe to share)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyInfo {
    pub address: Address,
    /// EIP-55 checksummed address
    pub checksum: String,
    pub label: Option<String>,
}

/// Directory of signer keys
pub struct KeyStore {
    keys_dir: PathBuf,
}

impl KeyStore {
    pub fn new(keys_dir: &Path) -> Result<Self, KeystoreError> {
        fs::create_dir_all(keys_dir)?;
        Ok(Self {
            keys_dir: keys_dir.to_path_buf(),
        })
    }

    fn key_path(&self, address: &Address) -> PathBuf {
        self.keys_dir.join(format!("0x{}.json", hex::encode(address)))
    }

    /// Generate and save a new key
    pub fn generate(&self, label: Option<&str>) -> Result<(KeyPair, KeyInfo), KeystoreError> {
        let key = KeyPair::generate();
        let info = self.import(&key, label)?;
        Ok((key, info))
    }

    /// Save an existing key
    pub fn import(&self, key: &KeyPair, label: Option<&str>) -> Result<KeyInfo, KeystoreError> {
        let data = KeyFile {
            private_key_hex: key.private_key_hex(),
            address: key.address(),
            label: label.map(str::to_string),
        };
        fs::write(self.key_path(&data.address), serde_json::to_string_pretty(&data)?)?;

        log::info!("Stored key for {}", data.address);
        Ok(info_of(&data))
    }

    /// Load the key of `address`
    pub fn load(&self, address: &Address) -> Result<KeyPair, KeystoreError> {
        let path = self.key_path(address);
        let data: KeyFile = serde_json::from_str(&fs::read_to_string(&path)?)?;
        let key = KeyPair::from_private_key_hex(&data.private_key_hex)?;

        if key.address() != data.address || data.address != *address {
            return Err(KeystoreError::AddressMismatch {
                path,
                address: *address,
            });
        }
        Ok(key)
    }

    /// Public info of every readable key file, sorted by address
    pub fn list(&self) -> Result<Vec<KeyInfo>, KeystoreError> {
        let mut keys = Vec::new();

        for entry in fs::read_dir(&self.keys_dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let data = fs::read_to_string(&path)
                    .ok()
                    .and_then(|json| serde_json::from_str::<KeyFile>(&json).ok());
                match data {
                    Some(data) => keys.push(info_of(&data)),
                    None => log::warn!("Skipping unreadable key file {}", path.display()),
                }
            }
        }

        keys.sort_by_key(|k| k.address);
        Ok(keys)
    }

    pub fn delete(&self, address: &Address) -> Result<(), KeystoreError> {
        fs::remove_file(self.key_path(address))?;
        Ok(())
    }
}

fn info_of(data: &KeyFile) -> KeyInfo {
    KeyInfo {
        address: data.address,
        checksum: data.address.to_checksum(None),
        label: data.label.clone(),
    }
}
