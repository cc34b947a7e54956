//! Snapshot persistence
//!
//! The whole in-process deployment (factory, wallets and host ledger) is
//! saved as one JSON document. Each save rotates the previous document into
//! a numbered backup.

use crate::core::Address;
use crate::factory::WalletFactory;
use crate::host::MemoryHost;
use crate::multisig::Wallet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub state_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".litesig_data"),
            state_file: "litesig.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Everything the CLI persists between invocations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub factory: Option<WalletFactory>,
    pub wallets: BTreeMap<Address, Wallet>,
    pub host: MemoryHost,
}

impl Snapshot {
    pub fn wallet(&self, address: &Address) -> Result<&Wallet, StorageError> {
        self.wallets
            .get(address)
            .ok_or_else(|| StorageError::InvalidData(format!("Unknown wallet {}", address)))
    }

    pub fn wallet_mut(&mut self, address: &Address) -> Result<&mut Wallet, StorageError> {
        self.wallets
            .get_mut(address)
            .ok_or_else(|| StorageError::InvalidData(format!("Unknown wallet {}", address)))
    }

    pub fn factory(&self) -> Result<&WalletFactory, StorageError> {
        self.factory
            .as_ref()
            .ok_or_else(|| StorageError::InvalidData("No factory deployed".to_string()))
    }

    pub fn factory_mut(&mut self) -> Result<&mut WalletFactory, StorageError> {
        self.factory
            .as_mut()
            .ok_or_else(|| StorageError::InvalidData("No factory deployed".to_string()))
    }
}

/// Snapshot storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Result<Self, StorageError> {
        Self::new(StorageConfig::default())
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    fn state_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.state_file)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.state_file, index))
    }

    /// Save the snapshot to disk
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let path = self.state_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        // Write to a temporary file, then rename over the old state
        let temp_path = self
            .config
            .data_dir
            .join(format!("{}.tmp", self.config.state_file));
        let writer = BufWriter::new(fs::File::create(&temp_path)?);
        serde_json::to_writer_pretty(writer, snapshot)?;
        fs::rename(&temp_path, &path)?;

        log::debug!("Snapshot saved to {}", path.display());
        Ok(())
    }

    /// Load the snapshot from disk
    pub fn load(&self) -> Result<Snapshot, StorageError> {
        let path = self.state_path();
        if !path.exists() {
            return Err(StorageError::InvalidData(format!(
                "State file not found: {}",
                path.display()
            )));
        }
        load_from_file(&path)
    }

    /// Load the saved snapshot, or start an empty one
    pub fn load_or_default(&self) -> Result<Snapshot, StorageError> {
        if self.exists() {
            self.load()
        } else {
            log::info!("No saved state in {}, starting fresh", self.data_dir().display());
            Ok(Snapshot::default())
        }
    }

    pub fn exists(&self) -> bool {
        self.state_path().exists()
    }

    /// Delete the saved snapshot
    pub fn delete(&self) -> Result<(), StorageError> {
        let path = self.state_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn rotate_backups(&self) -> Result<(), StorageError> {
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }

        Ok(())
    }

    /// Restore from a backup; 0 is the most recent
    pub fn restore_backup(&self, backup_index: usize) -> Result<Snapshot, StorageError> {
        let backup_path = self.backup_path(backup_index);
        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }
        load_from_file(&backup_path)
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|i| self.backup_path(*i).exists())
            .collect()
    }
}

/// Load a snapshot from a specific file path
pub fn load_from_file(path: &Path) -> Result<Snapshot, StorageError> {
    let reader = BufReader::new(fs::File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::FactoryConfig;
    use crate::core::{B256, U256};

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    fn storage_in(dir: &Path, max_backups: usize) -> Storage {
        Storage::new(StorageConfig {
            data_dir: dir.to_path_buf(),
            max_backups,
            ..Default::default()
        })
        .unwrap()
    }

    fn populated() -> Snapshot {
        let mut snapshot = Snapshot::default();
        let mut factory =
            WalletFactory::new(addr(0x55), addr(0x44), addr(1), FactoryConfig::default())
                .unwrap();
        let ctx = snapshot.host.context(addr(1));
        let (wallet, event) = factory
            .create_wallet(
                &ctx,
                &B256::with_last_byte(1),
                vec![addr(2), addr(3)],
                2,
                U256::from(1234),
            )
            .unwrap();

        snapshot
            .host
            .deposit(wallet.address(), U256::from(500))
            .unwrap();
        snapshot.host.record(factory.address(), [event]);
        snapshot.wallets.insert(wallet.address(), wallet);
        snapshot.factory = Some(factory);
        snapshot
    }

    #[test]
    fn test_save_load_snapshot() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage_in(temp_dir.path(), 5);
        assert!(!storage.exists());
        assert!(storage.load().is_err());

        let snapshot = populated();
        storage.save(&snapshot).unwrap();
        assert!(storage.exists());

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.factory, snapshot.factory);
        assert_eq!(loaded.wallets, snapshot.wallets);
        assert_eq!(loaded.host.events(), snapshot.host.events());

        let wallet = loaded.wallets.keys().next().unwrap();
        assert_eq!(loaded.host.balance_of(wallet), U256::from(500));
        assert_eq!(loaded.wallet(wallet).unwrap().required_signatures(), 2);
        assert!(loaded.wallet(&addr(9)).is_err());
    }

    #[test]
    fn test_load_or_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage_in(temp_dir.path(), 5);

        let fresh = storage.load_or_default().unwrap();
        assert!(fresh.factory.is_none());
        assert!(fresh.wallets.is_empty());
        assert!(fresh.factory().is_err());
    }

    #[test]
    fn test_backup_rotation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage_in(temp_dir.path(), 3);
        let mut snapshot = Snapshot::default();

        for i in 0..5u64 {
            snapshot.host.deposit(addr(1), U256::from(1)).unwrap();
            storage.save(&snapshot).unwrap();
            assert_eq!(storage.load().unwrap().host.balance_of(&addr(1)), U256::from(i + 1));
        }

        assert_eq!(storage.list_backups(), vec![0, 1, 2]);
        // Most recent backup is the state before the last save
        let previous = storage.restore_backup(0).unwrap();
        assert_eq!(previous.host.balance_of(&addr(1)), U256::from(4));
        assert!(storage.restore_backup(3).is_err());

        storage.delete().unwrap();
        assert!(!storage.exists());
    }
}
