//! Deterministic wallet deployment
//!
//! A factory owned by a single account creates fully initialized wallets at
//! addresses callers can compute ahead of time from the factory address, a
//! salt and the wallet init code.

pub mod admin;
pub mod deploy;
pub mod factory;

pub use admin::{AdminError, AdminRegistry};
pub use deploy::{create2_address, create2_address_from_hash, minimal_proxy_code, DeploymentCode};
pub use factory::{FactoryConfig, FactoryError, WalletFactory};
