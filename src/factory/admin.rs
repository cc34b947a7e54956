//! Owner-controlled administrator registry
//!
//! The registry has a single owner who manages a set of administrators.
//! Administrators are independent of any wallet owner set; they only gate
//! privileged factory calls.

use crate::core::{Address, AdminEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors related to registry operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error("Ownable: caller is not the owner: {0}")]
    NotOwner(Address),
    #[error("Address is already an administrator: {0}")]
    AlreadyAdmin(Address),
    #[error("Address is not an administrator: {0}")]
    NotAdmin(Address),
    #[error("Ownable: new owner is the zero address")]
    InvalidOwner,
}

/// Registry owner plus the administrators it appointed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRegistry {
    owner: Address,
    admins: BTreeSet<Address>,
}

impl AdminRegistry {
    /// Create a registry owned by `owner` with no administrators
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            admins: BTreeSet::new(),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_administrator(&self, address: &Address) -> bool {
        self.admins.contains(address)
    }

    /// Owner or administrator
    pub fn is_privileged(&self, address: &Address) -> bool {
        *address == self.owner || self.is_administrator(address)
    }

    pub fn admins(&self) -> impl Iterator<Item = &Address> {
        self.admins.iter()
    }

    pub fn add_admin(&mut self, caller: &Address, admin: Address) -> Result<AdminEvent, AdminError> {
        self.ensure_owner(caller)?;
        if !self.admins.insert(admin) {
            return Err(AdminError::AlreadyAdmin(admin));
        }

        log::info!("Admin {} added by {}", admin, caller);
        Ok(AdminEvent::AdminAdded {
            added_admin: admin,
            added_by: *caller,
        })
    }

    pub fn remove_admin(
        &mut self,
        caller: &Address,
        admin: &Address,
    ) -> Result<AdminEvent, AdminError> {
        self.ensure_owner(caller)?;
        if !self.admins.remove(admin) {
            return Err(AdminError::NotAdmin(*admin));
        }

        log::info!("Admin {} removed by {}", admin, caller);
        Ok(AdminEvent::AdminRemoved {
            removed_admin: *admin,
            removed_by: *caller,
        })
    }

    /// Hand the registry to `new_owner`; administrators are kept
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<AdminEvent, AdminError> {
        self.ensure_owner(caller)?;
        if new_owner == Address::ZERO {
            return Err(AdminError::InvalidOwner);
        }

        let previous_owner = std::mem::replace(&mut self.owner, new_owner);
        log::info!("Ownership transferred from {} to {}", previous_owner, new_owner);
        Ok(AdminEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        })
    }

    fn ensure_owner(&self, caller: &Address) -> Result<(), AdminError> {
        if *caller == self.owner {
            Ok(())
        } else {
            Err(AdminError::NotOwner(*caller))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    #[test]
    fn test_owner_manages_admins() {
        let owner = addr(1);
        let mut registry = AdminRegistry::new(owner);
        assert!(!registry.is_administrator(&addr(2)));

        let event = registry.add_admin(&owner, addr(2)).unwrap();
        assert_eq!(
            event,
            AdminEvent::AdminAdded {
                added_admin: addr(2),
                added_by: owner
            }
        );
        assert!(registry.is_administrator(&addr(2)));

        let event = registry.remove_admin(&owner, &addr(2)).unwrap();
        assert_eq!(
            event,
            AdminEvent::AdminRemoved {
                removed_admin: addr(2),
                removed_by: owner
            }
        );
        assert!(!registry.is_administrator(&addr(2)));
    }

    #[test]
    fn test_non_owner_rejected() {
        let owner = addr(1);
        let mut registry = AdminRegistry::new(owner);

        assert_eq!(
            registry.add_admin(&addr(2), addr(3)),
            Err(AdminError::NotOwner(addr(2)))
        );

        // Being an admin does not allow managing admins
        registry.add_admin(&owner, addr(2)).unwrap();
        assert_eq!(
            registry.add_admin(&addr(2), addr(3)),
            Err(AdminError::NotOwner(addr(2)))
        );
        assert_eq!(
            registry.remove_admin(&addr(2), &addr(2)),
            Err(AdminError::NotOwner(addr(2)))
        );
        assert!(registry.is_administrator(&addr(2)));
    }

    #[test]
    fn test_duplicate_add_and_missing_remove() {
        let owner = addr(1);
        let mut registry = AdminRegistry::new(owner);

        registry.add_admin(&owner, addr(2)).unwrap();
        assert_eq!(
            registry.add_admin(&owner, addr(2)),
            Err(AdminError::AlreadyAdmin(addr(2)))
        );

        registry.remove_admin(&owner, &addr(2)).unwrap();
        assert_eq!(
            registry.remove_admin(&owner, &addr(2)),
            Err(AdminError::NotAdmin(addr(2)))
        );
    }

    #[test]
    fn test_transfer_ownership() {
        let mut registry = AdminRegistry::new(addr(1));
        registry.add_admin(&addr(1), addr(3)).unwrap();

        assert_eq!(
            registry.transfer_ownership(&addr(2), addr(2)),
            Err(AdminError::NotOwner(addr(2)))
        );
        assert_eq!(
            registry.transfer_ownership(&addr(1), Address::ZERO),
            Err(AdminError::InvalidOwner)
        );

        let event = registry.transfer_ownership(&addr(1), addr(2)).unwrap();
        assert_eq!(
            event,
            AdminEvent::OwnershipTransferred {
                previous_owner: addr(1),
                new_owner: addr(2)
            }
        );
        assert_eq!(registry.owner(), addr(2));
        assert!(registry.is_privileged(&addr(2)));
        assert!(!registry.is_privileged(&addr(1)));
        assert!(registry.is_administrator(&addr(3)));

        // Old owner lost its rights
        assert!(registry.add_admin(&addr(1), addr(4)).is_err());
    }
}
