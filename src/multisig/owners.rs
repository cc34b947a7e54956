//! Owner set
//!
//! Owners are kept strictly ascending. That ordering is what lets
//! signature verification check membership by binary search and reject
//! duplicate signers in a single pass.

use crate::core::Address;
use crate::multisig::wallet::WalletError;
use serde::{Deserialize, Serialize};

/// Smallest allowed owner set
pub const MIN_OWNERS: usize = 1;
/// Largest allowed owner set
pub const MAX_OWNERS: usize = 10;

/// A validated, strictly ascending list of non-zero owners
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Address>", into = "Vec<Address>")]
pub struct OwnerSet(Vec<Address>);

impl OwnerSet {
    /// Validate size and ordering of an owner list
    pub fn new(owners: Vec<Address>) -> Result<Self, WalletError> {
        Self::check_size(owners.len())?;
        Self::check_order(&owners)?;
        Ok(Self(owners))
    }

    pub fn check_size(len: usize) -> Result<(), WalletError> {
        if (MIN_OWNERS..=MAX_OWNERS).contains(&len) {
            Ok(())
        } else {
            Err(WalletError::OwnerListSize { len })
        }
    }

    /// Every entry must be non-zero and greater than the one before it
    pub fn check_order(owners: &[Address]) -> Result<(), WalletError> {
        let mut last = Address::ZERO;
        for owner in owners {
            if *owner <= last {
                return Err(WalletError::OwnerListOrder);
            }
            last = *owner;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.0.binary_search(address).is_ok()
    }

    pub fn get(&self, index: usize) -> Option<&Address> {
        self.0.get(index)
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.0.iter()
    }
}

impl TryFrom<Vec<Address>> for OwnerSet {
    type Error = WalletError;

    fn try_from(owners: Vec<Address>) -> Result<Self, Self::Error> {
        Self::new(owners)
    }
}

impl From<OwnerSet> for Vec<Address> {
    fn from(set: OwnerSet) -> Self {
        set.0
    }
}
