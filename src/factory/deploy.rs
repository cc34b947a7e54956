//! Deterministic deployment addresses
//!
//! `address = last20(keccak(0xff || deployer || salt || keccak(init_code)))`
//!
//! The address depends only on the deployer, the salt and the init code, so
//! it can be computed before the wallet exists.

use crate::core::{encode_address, Address, B256};
use crate::crypto::keccak256;
use serde::{Deserialize, Serialize};

/// Minimal proxy code preceding the logic address
pub const MINIMAL_PROXY_PREFIX: [u8; 20] = [
    0x3d, 0x60, 0x2d, 0x80, 0x60, 0x0a, 0x3d, 0x39, 0x81, 0xf3, 0x36, 0x3d, 0x3d, 0x37, 0x3d, 0x3d,
    0x3d, 0x36, 0x3d, 0x73,
];

/// Minimal proxy code following the logic address
pub const MINIMAL_PROXY_SUFFIX: [u8; 15] = [
    0x5a, 0xf4, 0x3d, 0x82, 0x80, 0x3e, 0x90, 0x3d, 0x91, 0x60, 0x2b, 0x57, 0xfd, 0x5b, 0xf3,
];

/// Address produced by `deployer` for `salt` and `init_code`
pub fn create2_address(deployer: &Address, salt: &B256, init_code: &[u8]) -> Address {
    deployer.create2_from_code(*salt, init_code)
}

/// Same as [`create2_address`] with the init code already hashed
pub fn create2_address_from_hash(deployer: &Address, salt: &B256, code_hash: &B256) -> Address {
    deployer.create2(*salt, *code_hash)
}

/// Init code for a minimal proxy that delegates every call to `logic`
pub fn minimal_proxy_code(logic: &Address) -> Vec<u8> {
    let mut code = Vec::with_capacity(MINIMAL_PROXY_PREFIX.len() + 20 + MINIMAL_PROXY_SUFFIX.len());
    code.extend_from_slice(&MINIMAL_PROXY_PREFIX);
    code.extend_from_slice(logic.as_slice());
    code.extend_from_slice(&MINIMAL_PROXY_SUFFIX);
    code
}

/// How the factory builds the init code of each wallet
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeploymentCode {
    /// Minimal proxy pointing at the logic address
    #[default]
    MinimalProxy,
    /// Proxy creation code with the logic address as constructor argument
    ConstructorProxy {
        #[serde(with = "crate::core::abi::hex_bytes")]
        creation_code: Vec<u8>,
    },
    /// Creation code used verbatim
    Direct {
        #[serde(with = "crate::core::abi::hex_bytes")]
        creation_code: Vec<u8>,
    },
}

impl DeploymentCode {
    /// Full init code for wallets backed by `logic`
    pub fn init_code(&self, logic: &Address) -> Vec<u8> {
        match self {
            DeploymentCode::MinimalProxy => minimal_proxy_code(logic),
            DeploymentCode::ConstructorProxy { creation_code } => {
                let mut code = creation_code.clone();
                code.extend_from_slice(encode_address(logic).as_slice());
                code
            }
            DeploymentCode::Direct { creation_code } => creation_code.clone(),
        }
    }

    pub fn init_code_hash(&self, logic: &Address) -> B256 {
        keccak256(self.init_code(logic))
    }
}
