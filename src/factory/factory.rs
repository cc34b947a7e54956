//! Wallet factory
//!
//! Creates initialized wallets at predictable addresses. Only the registry
//! owner and its administrators may create wallets; the factory keeps no
//! control over a wallet once it is returned.

use super::admin::{AdminError, AdminRegistry};
use super::deploy::{create2_address_from_hash, DeploymentCode};
use crate::core::{Address, AdminEvent, FactoryEvent, B256, U256};
use crate::host::CallContext;
use crate::multisig::{Wallet, WalletConfig, WalletError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors related to wallet creation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FactoryError {
    #[error("Caller is not an administrator: {0}")]
    NotAdministrator(Address),
    #[error("A wallet is already deployed at {0}")]
    DeploymentCollision(Address),
    #[error("Admin error: {0}")]
    Admin(#[from] AdminError),
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),
}

/// Factory settings
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// Init code scheme used for every wallet
    pub deployment: DeploymentCode,
    /// Configuration handed to every created wallet
    pub wallet: WalletConfig,
}

/// Deterministic wallet factory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletFactory {
    address: Address,
    logic: Address,
    config: FactoryConfig,
    admins: AdminRegistry,
    /// Addresses this factory has already produced
    deployed: BTreeSet<Address>,
}

impl WalletFactory {
    /// Create a factory at `address`, owned by `owner`
    ///
    /// The wallet configuration is checked here so every wallet the factory
    /// creates carries a valid recovery delay.
    pub fn new(
        address: Address,
        logic: Address,
        owner: Address,
        config: FactoryConfig,
    ) -> Result<Self, FactoryError> {
        config.wallet.validate()?;
        log::info!(
            "Factory {} created for logic {}, owner {}",
            address,
            logic,
            owner
        );
        Ok(Self {
            address,
            logic,
            config,
            admins: AdminRegistry::new(owner),
            deployed: BTreeSet::new(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn logic(&self) -> Address {
        self.logic
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn admins(&self) -> &AdminRegistry {
        &self.admins
    }

    pub fn owner(&self) -> Address {
        self.admins.owner()
    }

    pub fn is_administrator(&self, address: &Address) -> bool {
        self.admins.is_administrator(address)
    }

    pub fn add_admin(&mut self, ctx: &CallContext, admin: Address) -> Result<AdminEvent, FactoryError> {
        Ok(self.admins.add_admin(&ctx.caller, admin)?)
    }

    pub fn remove_admin(
        &mut self,
        ctx: &CallContext,
        admin: &Address,
    ) -> Result<AdminEvent, FactoryError> {
        Ok(self.admins.remove_admin(&ctx.caller, admin)?)
    }

    pub fn transfer_ownership(
        &mut self,
        ctx: &CallContext,
        new_owner: Address,
    ) -> Result<AdminEvent, FactoryError> {
        Ok(self.admins.transfer_ownership(&ctx.caller, new_owner)?)
    }

    /// Hash of the init code every wallet of this factory is created from
    pub fn init_code_hash(&self) -> B256 {
        self.config.deployment.init_code_hash(&self.logic)
    }

    /// Address `create_wallet` will use for `salt`
    pub fn predict_address(&self, salt: &B256) -> Address {
        create2_address_from_hash(&self.address, salt, &self.init_code_hash())
    }

    pub fn is_deployed(&self, wallet: &Address) -> bool {
        self.deployed.contains(wallet)
    }

    pub fn deployed(&self) -> impl Iterator<Item = &Address> {
        self.deployed.iter()
    }

    /// Create and initialize a wallet at the address predicted for `salt`
    pub fn create_wallet(
        &mut self,
        ctx: &CallContext,
        salt: &B256,
        owners: Vec<Address>,
        required_signatures: usize,
        chain_id: U256,
    ) -> Result<(Wallet, FactoryEvent), FactoryError> {
        if !self.admins.is_privileged(&ctx.caller) {
            return Err(FactoryError::NotAdministrator(ctx.caller));
        }

        let address = self.predict_address(salt);
        if self.deployed.contains(&address) {
            return Err(FactoryError::DeploymentCollision(address));
        }

        let wallet = Wallet::deploy(
            address,
            owners,
            required_signatures,
            chain_id,
            self.config.wallet.clone(),
        )?;
        self.deployed.insert(address);

        log::info!(
            "Factory {} created wallet {} (salt {}) for {}",
            self.address,
            address,
            salt,
            ctx.caller
        );
        Ok((wallet, FactoryEvent::WalletCreated { wallet: address }))
    }
}
