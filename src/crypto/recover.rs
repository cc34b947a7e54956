//! Signer recovery
//!
//! The wallet never sees public keys: it recovers the signing account from
//! each `(v, r, s)` triple. The capability is a trait so hosts can plug in
//! their own primitive and tests can use a deterministic stub.

use secp256k1::{Secp256k1, VerifyOnly};

use super::keys::{public_key_to_address, recover_public_key, KeyError, Signature};
use crate::core::{Address, B256};

/// Recovers the account that signed a digest
pub trait SignerRecovery {
    fn recover(&self, digest: &B256, signature: &Signature) -> Result<Address, KeyError>;
}

impl<F> SignerRecovery for F
where
    F: Fn(&B256, &Signature) -> Result<Address, KeyError>,
{
    fn recover(&self, digest: &B256, signature: &Signature) -> Result<Address, KeyError> {
        self(digest, signature)
    }
}

/// secp256k1 public-key recovery
pub struct Secp256k1Recovery {
    secp: Secp256k1<VerifyOnly>,
}

impl Secp256k1Recovery {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::verification_only(),
        }
    }
}

impl Default for Secp256k1Recovery {
    fn default() -> Self {
        Self::new()
    }
}

impl SignerRecovery for Secp256k1Recovery {
    fn recover(&self, digest: &B256, signature: &Signature) -> Result<Address, KeyError> {
        let public_key = recover_public_key(&self.secp, digest, signature)?;
        Ok(public_key_to_address(&public_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{keccak256, KeyPair};

    #[test]
    fn test_recovers_signer_address() {
        let kp = KeyPair::generate();
        let digest = keccak256(b"message");
        let signature = kp.sign_digest(&digest).unwrap();

        let recovery = Secp256k1Recovery::new();
        assert_eq!(recovery.recover(&digest, &signature).unwrap(), kp.address());
    }

    #[test]
    fn test_different_digest_yields_different_signer() {
        let kp = KeyPair::generate();
        let signature = kp.sign_digest(&keccak256(b"one")).unwrap();

        let recovery = Secp256k1Recovery::new();
        // Recovery succeeds but lands on an unrelated account
        if let Ok(addr) = recovery.recover(&keccak256(b"two"), &signature) {
            assert_ne!(addr, kp.address());
        }
    }

    #[test]
    fn test_zero_components_rejected() {
        let recovery = Secp256k1Recovery::new();
        let signature = Signature::new(27, B256::ZERO, B256::ZERO);
        assert!(matches!(
            recovery.recover(&keccak256(b"x"), &signature),
            Err(KeyError::ZeroComponent)
        ));
    }

    #[test]
    fn test_closure_as_recovery() {
        let fixed = Address::new([9; 20]);
        let stub = move |_: &B256, _: &Signature| -> Result<Address, KeyError> { Ok(fixed) };
        let signature = Signature::new(27, B256::with_last_byte(1), B256::with_last_byte(1));
        assert_eq!(stub.recover(&B256::ZERO, &signature).unwrap(), fixed);
    }
}
