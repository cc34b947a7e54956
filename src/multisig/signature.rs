//! Structured-message hashing and quorum verification
//!
//! A transaction is authorized when exactly `required` owners signed the
//! same message hash and their recovered addresses appear in strictly
//! ascending order. The message hash is built in three layers:
//!
//! ```text
//! struct_hash  = keccak(TX_TYPE_HASH || dest || value || keccak(payload) || nonce [|| submitter])
//! signing_hash = keccak(0x19 || 0x01 || domain_separator || struct_hash)
//! message_hash = signing_hash                        (SigningScheme::Typed)
//!              | keccak(ETH_PREFIX || signing_hash)  (SigningScheme::EthSignedMessage)
//! ```
//!
//! Every field is a 32-byte word, addresses left-padded.

use crate::core::{Address, WordWriter, B256, U256};
use crate::crypto::{keccak256, keccak256_concat, KeyError, KeyPair, Signature, SignerRecovery};
use crate::multisig::owners::OwnerSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// `keccak("EIP712Domain(string name,string version,uint256 chainId,address verifyingContract,bytes32 salt)")`
pub const DOMAIN_TYPE_HASH: B256 = B256::new([
    0xd8, 0x7c, 0xd6, 0xef, 0x79, 0xd4, 0xe2, 0xb9,
    0x5e, 0x15, 0xce, 0x8a, 0xbf, 0x73, 0x2d, 0xb5,
    0x1e, 0xc7, 0x71, 0xf1, 0xca, 0x2e, 0xdc, 0xcf,
    0x22, 0xa4, 0x6c, 0x72, 0x9a, 0xc5, 0x64, 0x72,
]);

/// `keccak("LightSig")`
pub const NAME_HASH: B256 = B256::new([
    0xe0, 0xf1, 0xe1, 0xc9, 0x90, 0x09, 0xe2, 0x12,
    0xfa, 0x1e, 0x20, 0x7f, 0xcc, 0xef, 0x2e, 0xe9,
    0x43, 0x2c, 0x52, 0xbb, 0xf5, 0xef, 0x25, 0x68,
    0x88, 0x85, 0xea, 0x0c, 0xce, 0x69, 0x53, 0x1d,
]);

/// `keccak("1")`
pub const VERSION_HASH: B256 = B256::new([
    0xc8, 0x9e, 0xfd, 0xaa, 0x54, 0xc0, 0xf2, 0x0c,
    0x7a, 0xdf, 0x61, 0x28, 0x82, 0xdf, 0x09, 0x50,
    0xf5, 0xa9, 0x51, 0x63, 0x7e, 0x03, 0x07, 0xcd,
    0xcb, 0x4c, 0x67, 0x2f, 0x29, 0x8b, 0x8b, 0xc6,
]);

pub const DOMAIN_SALT: B256 = B256::new([
    0x25, 0x15, 0x43, 0xaf, 0x6a, 0x22, 0x23, 0x78,
    0x66, 0x5a, 0x76, 0xfe, 0x38, 0xdb, 0xce, 0xae,
    0x48, 0x71, 0xa0, 0x70, 0xb7, 0xfd, 0xaf, 0x5c,
    0x6c, 0x30, 0xcf, 0x75, 0x8d, 0xc3, 0x3c, 0xc0,
]);

/// Type tag of an unbound transaction
pub const TX_TYPE_HASH: B256 = B256::new([
    0xeb, 0xbf, 0xa7, 0xb2, 0x86, 0xe5, 0x2d, 0x30,
    0xa1, 0x38, 0x89, 0xef, 0xa8, 0xca, 0x90, 0xa6,
    0x96, 0xb0, 0xe6, 0xec, 0x09, 0x36, 0xc8, 0x68,
    0x8c, 0x35, 0x7c, 0x7d, 0x2b, 0xdd, 0x04, 0x30,
]);

pub const TX_WITH_SUBMITTER_TYPE: &str =
    "MultiSigTransaction(address destination,uint256 value,bytes data,uint256 nonce,address executor)";

/// `keccak(TX_WITH_SUBMITTER_TYPE)`, type tag of a transaction bound to its submitter
pub const TX_WITH_SUBMITTER_TYPE_HASH: B256 = B256::new([
    0x77, 0xa0, 0x2b, 0x8d, 0x4d, 0x89, 0x82, 0x1b,
    0x65, 0x79, 0x6d, 0x53, 0x5c, 0xba, 0x07, 0x66,
    0x9f, 0x29, 0x2a, 0xed, 0xe4, 0xf4, 0xa6, 0xe1,
    0x77, 0x53, 0xe6, 0xe3, 0xd2, 0x49, 0x97, 0x32,
]);

/// Prefix of the structured-data signing envelope
pub const STRUCTURED_DATA_PREFIX: [u8; 2] = [0x19, 0x01];

/// Prefix applied by wallets signing through the personal-message envelope
pub const ETH_SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Why a signature was not accepted
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignatureFault {
    /// The signer could not be recovered from the triple
    Unrecoverable { index: usize, reason: String },
    /// Recovered signer is not in the owner set
    NotOwner { index: usize, signer: Address },
    /// Same signer as the previous signature
    Duplicate { index: usize, signer: Address },
    /// Signer sorts below the previous signer
    OutOfOrder { index: usize, signer: Address },
}

impl fmt::Display for SignatureFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureFault::Unrecoverable { index, reason } => {
                write!(f, "signature {} is malformed: {}", index, reason)
            }
            SignatureFault::NotOwner { index, signer } => {
                write!(f, "signature {} must be from an owner, recovered {}", index, signer)
            }
            SignatureFault::Duplicate { index, signer } => {
                write!(f, "signature {} must be unique, {} already signed", index, signer)
            }
            SignatureFault::OutOfOrder { index, signer } => {
                write!(f, "signature {} out of order, {} sorts below the previous signer", index, signer)
            }
        }
    }
}

/// Errors raised while verifying a signature set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Signatures list is not the expected length: need {expected}, got v={v} r={r} s={s}")]
    SignatureArity {
        expected: usize,
        v: usize,
        r: usize,
        s: usize,
    },
    #[error("Invalid signature: {0}")]
    InvalidSignature(SignatureFault),
}

/// How the signing hash is presented to signers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SigningScheme {
    /// Signers sign the structured-data hash directly
    #[default]
    Typed,
    /// Signers sign `keccak("\x19Ethereum Signed Message:\n32" || hash)`
    EthSignedMessage,
}

impl SigningScheme {
    /// Wrap a signing hash into the hash the signers actually signed
    pub fn message_hash(&self, signing_hash: &B256) -> B256 {
        match self {
            SigningScheme::Typed => *signing_hash,
            SigningScheme::EthSignedMessage => {
                keccak256_concat(&[ETH_SIGNED_MESSAGE_PREFIX, signing_hash.as_slice()])
            }
        }
    }
}

/// Binds signatures to one wallet instance on one network
pub fn domain_separator(chain_id: &U256, wallet: &Address) -> B256 {
    let encoded = WordWriter::with_capacity(6)
        .word(&DOMAIN_TYPE_HASH)
        .word(&NAME_HASH)
        .word(&VERSION_HASH)
        .uint(chain_id)
        .address(wallet)
        .word(&DOMAIN_SALT)
        .finish();
    keccak256(&encoded)
}

/// `keccak(0x19 || 0x01 || domain_separator || struct_hash)`
pub fn signing_hash(domain_separator: &B256, struct_hash: &B256) -> B256 {
    keccak256_concat(&[
        &STRUCTURED_DATA_PREFIX,
        domain_separator.as_slice(),
        struct_hash.as_slice(),
    ])
}

/// A call proposed for execution by the wallet
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub destination: Address,
    pub value: U256,
    #[serde(with = "crate::core::abi::hex_bytes")]
    pub payload: Vec<u8>,
}

impl TransactionRequest {
    pub fn new(destination: Address, value: U256, payload: Vec<u8>) -> Self {
        Self {
            destination,
            value,
            payload,
        }
    }

    /// Plain value transfer with an empty payload
    pub fn transfer(destination: Address, value: U256) -> Self {
        Self::new(destination, value, Vec::new())
    }

    /// Hash of the transaction fields at a given nonce
    ///
    /// With a submitter the hash commits to the account allowed to submit it.
    pub fn struct_hash(&self, nonce: &U256, submitter: Option<&Address>) -> B256 {
        let type_hash = match submitter {
            Some(_) => TX_WITH_SUBMITTER_TYPE_HASH,
            None => TX_TYPE_HASH,
        };

        let mut writer = WordWriter::with_capacity(6)
            .word(&type_hash)
            .address(&self.destination)
            .uint(&self.value)
            .word(&keccak256(&self.payload))
            .uint(nonce);
        if let Some(submitter) = submitter {
            writer = writer.address(submitter);
        }
        keccak256(&writer.finish())
    }
}

/// The hash every owner signs for `tx` at `nonce`
pub fn transaction_message_hash(
    scheme: SigningScheme,
    domain_separator: &B256,
    tx: &TransactionRequest,
    nonce: &U256,
    submitter: Option<&Address>,
) -> B256 {
    let struct_hash = tx.struct_hash(nonce, submitter);
    scheme.message_hash(&signing_hash(domain_separator, &struct_hash))
}

/// Signatures in wire form: three parallel component arrays
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureSet {
    pub v: Vec<u8>,
    pub r: Vec<B256>,
    pub s: Vec<B256>,
}

impl SignatureSet {
    pub fn new(v: Vec<u8>, r: Vec<B256>, s: Vec<B256>) -> Self {
        Self { v, r, s }
    }

    /// Sign `message_hash` with each key, in the order given
    ///
    /// Callers pass keys sorted by address; the wallet rejects any other order.
    pub fn sign(keys: &[&KeyPair], message_hash: &B256) -> Result<Self, KeyError> {
        keys.iter()
            .map(|key| key.sign_digest(message_hash))
            .collect()
    }

    pub fn push(&mut self, signature: Signature) {
        self.v.push(signature.v);
        self.r.push(signature.r);
        self.s.push(signature.s);
    }

    /// Number of complete `(v, r, s)` triples
    pub fn len(&self) -> usize {
        self.v.len().min(self.r.len()).min(self.s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Signature> {
        Some(Signature::new(
            *self.v.get(index)?,
            *self.r.get(index)?,
            *self.s.get(index)?,
        ))
    }
}

impl FromIterator<Signature> for SignatureSet {
    fn from_iter<I: IntoIterator<Item = Signature>>(iter: I) -> Self {
        let mut set = SignatureSet::default();
        for signature in iter {
            set.push(signature);
        }
        set
    }
}

/// Verify that `signatures` form a quorum of `owners` over `message_hash`
///
/// Returns the recovered signers in submission order.
pub fn verify_quorum<R: SignerRecovery + ?Sized>(
    recovery: &R,
    owners: &OwnerSet,
    required: usize,
    signatures: &SignatureSet,
    message_hash: &B256,
) -> Result<Vec<Address>, VerificationError> {
    let (v, r, s) = (signatures.v.len(), signatures.r.len(), signatures.s.len());
    if v != r || r != s || v != required {
        return Err(VerificationError::SignatureArity {
            expected: required,
            v,
            r,
            s,
        });
    }

    let mut signers = Vec::with_capacity(required);
    let mut last = Address::ZERO;

    for index in 0..v {
        let signature = Signature::new(signatures.v[index], signatures.r[index], signatures.s[index]);

        let signer = recovery.recover(message_hash, &signature).map_err(|e| {
            VerificationError::InvalidSignature(SignatureFault::Unrecoverable {
                index,
                reason: e.to_string(),
            })
        })?;

        if !owners.contains(&signer) {
            log::debug!("Signature {} recovered non-owner {}", index, signer);
            return Err(VerificationError::InvalidSignature(
                SignatureFault::NotOwner { index, signer },
            ));
        }

        if signer == last {
            return Err(VerificationError::InvalidSignature(
                SignatureFault::Duplicate { index, signer },
            ));
        }
        if signer < last {
            return Err(VerificationError::InvalidSignature(
                SignatureFault::OutOfOrder { index, signer },
            ));
        }

        last = signer;
        signers.push(signer);
    }

    log::debug!("Quorum of {} verified over {}", signers.len(), message_hash);
    Ok(signers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encode_address;
    use crate::crypto::Secp256k1Recovery;
    use crate::multisig::owners::MAX_OWNERS;
    use proptest::prelude::*;

    const CHAIN_ID: U256 = U256::from_limbs([1234, 0, 0, 0]);

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    fn nonce(n: u64) -> U256 {
        U256::from(n)
    }

    /// Signature that the stub recovers to `signer` only over `hash`
    fn stub_signature(signer: &Address, hash: &B256) -> Signature {
        Signature::new(27, encode_address(signer), *hash)
    }

    fn stub_recover(hash: &B256, signature: &Signature) -> Result<Address, KeyError> {
        if signature.v != 27 {
            return Err(KeyError::InvalidRecoveryByte(signature.v));
        }
        if &signature.s == hash {
            Ok(Address::from_word(signature.r))
        } else {
            // A wrong digest recovers to an unrelated account
            Ok(Address::from_word(keccak256_concat(&[
                signature.r.as_slice(),
                hash.as_slice(),
            ])))
        }
    }

    fn owners() -> OwnerSet {
        OwnerSet::new(vec![addr(1), addr(2), addr(3)]).unwrap()
    }

    fn typed_hash(separator: &B256, tx: &TransactionRequest, n: u64) -> B256 {
        transaction_message_hash(SigningScheme::Typed, separator, tx, &nonce(n), None)
    }

    #[test]
    fn test_domain_separator_vector() {
        assert_eq!(
            keccak256(b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract,bytes32 salt)"),
            DOMAIN_TYPE_HASH
        );
        assert_eq!(keccak256(b"LightSig"), NAME_HASH);
        assert_eq!(keccak256(b"1"), VERSION_HASH);
        assert_eq!(keccak256(TX_WITH_SUBMITTER_TYPE.as_bytes()), TX_WITH_SUBMITTER_TYPE_HASH);

        let separator = domain_separator(&CHAIN_ID, &addr(0x11));
        assert_eq!(
            separator.to_string(),
            "0x3031ef673a6c7a51ca0918a8fea8b9086d13e662df9d3e4bf6291030ee84e24d"
        );
    }

    #[test]
    fn test_message_hash_vectors() {
        let separator = domain_separator(&CHAIN_ID, &addr(0x11));
        let tx = TransactionRequest::new(addr(0x22), U256::from(1000), vec![0x00]);

        assert_eq!(
            tx.struct_hash(&nonce(0), None).to_string(),
            "0x295867adfef921872b4b6d714e22bd5b57f52e4b7beddfeaa5db5859f4d13cfd"
        );
        assert_eq!(
            typed_hash(&separator, &tx, 0).to_string(),
            "0x02d4d1325526a70ce94942a77418efa5690725a2275957cd5773b156a78f24c8"
        );
        assert_eq!(
            transaction_message_hash(SigningScheme::Typed, &separator, &tx, &nonce(0), Some(&addr(0x33)))
                .to_string(),
            "0x7574788af107c751c4762aa6befbbe27db728b757ce62b6fd0d7d9b9f091f624"
        );
    }

    #[test]
    fn test_wide_values_use_full_word() {
        let value = (U256::from(1) << 200) + U256::from(7);
        let tx = TransactionRequest::new(addr(0x22), value, vec![0x00]);

        let mut layout = Vec::with_capacity(5 * 32);
        layout.extend_from_slice(TX_TYPE_HASH.as_slice());
        layout.extend_from_slice(&[0u8; 12]);
        layout.extend_from_slice(addr(0x22).as_slice());
        layout.extend_from_slice(&value.to_be_bytes::<32>());
        layout.extend_from_slice(keccak256([0x00u8]).as_slice());
        layout.extend_from_slice(&[0u8; 32]);
        assert_eq!(tx.struct_hash(&nonce(0), None), keccak256(&layout));

        // Bits above 128 are part of what owners sign
        let low = TransactionRequest::new(addr(0x22), U256::from(7), vec![0x00]);
        assert_ne!(tx.struct_hash(&nonce(0), None), low.struct_hash(&nonce(0), None));

        // Chain ids of any width separate domains
        let wide_chain = U256::from(1) << 128;
        assert_ne!(
            domain_separator(&wide_chain, &addr(0x11)),
            domain_separator(&U256::ZERO, &addr(0x11))
        );
    }

    #[test]
    fn test_eth_signed_message_envelope() {
        assert_eq!(
            SigningScheme::EthSignedMessage.message_hash(&B256::ZERO).to_string(),
            "0x5e4106618209740b9f773a94c5667b9659a7a4e2691c7c8a78336e9889a6be07"
        );
        assert_eq!(SigningScheme::Typed.message_hash(&B256::ZERO), B256::ZERO);
    }

    #[test]
    fn test_hash_covers_every_field() {
        let separator = domain_separator(&U256::from(1), &addr(0x11));
        let tx = TransactionRequest::new(addr(0x22), U256::from(5), vec![1, 2, 3]);
        let base = typed_hash(&separator, &tx, 0);

        let mut other = tx.clone();
        other.destination = addr(0x23);
        assert_ne!(base, typed_hash(&separator, &other, 0));

        let mut other = tx.clone();
        other.value = U256::from(6);
        assert_ne!(base, typed_hash(&separator, &other, 0));

        let mut other = tx.clone();
        other.payload = vec![1, 2];
        assert_ne!(base, typed_hash(&separator, &other, 0));

        assert_ne!(base, typed_hash(&separator, &tx, 1));
        assert_ne!(
            base,
            typed_hash(&domain_separator(&U256::from(2), &addr(0x11)), &tx, 0)
        );
        assert_ne!(
            base,
            typed_hash(&domain_separator(&U256::from(1), &addr(0x12)), &tx, 0)
        );
    }

    #[test]
    fn test_quorum_accepted() {
        let hash = keccak256(b"tx");
        let set: SignatureSet = [addr(1), addr(3)]
            .iter()
            .map(|a| stub_signature(a, &hash))
            .collect();

        let signers = verify_quorum(&stub_recover, &owners(), 2, &set, &hash).unwrap();
        assert_eq!(signers, vec![addr(1), addr(3)]);
    }

    #[test]
    fn test_arity_checks() {
        let hash = keccak256(b"tx");
        let set: SignatureSet = [addr(1), addr(2)]
            .iter()
            .map(|a| stub_signature(a, &hash))
            .collect();

        // Too few for the threshold
        let mut short = set.clone();
        short.v.pop();
        short.r.pop();
        short.s.pop();
        assert_eq!(
            verify_quorum(&stub_recover, &owners(), 2, &short, &hash),
            Err(VerificationError::SignatureArity { expected: 2, v: 1, r: 1, s: 1 })
        );

        // Each component array is checked
        for component in 0..3 {
            let mut uneven = set.clone();
            match component {
                0 => {
                    uneven.v.pop();
                }
                1 => {
                    uneven.r.pop();
                }
                _ => {
                    uneven.s.pop();
                }
            }
            assert!(matches!(
                verify_quorum(&stub_recover, &owners(), 2, &uneven, &hash),
                Err(VerificationError::SignatureArity { .. })
            ));
        }

        // More signatures than required is also rejected
        assert!(matches!(
            verify_quorum(&stub_recover, &owners(), 1, &set, &hash),
            Err(VerificationError::SignatureArity { expected: 1, .. })
        ));
    }

    #[test]
    fn test_non_owner_rejected() {
        let hash = keccak256(b"tx");
        let set: SignatureSet = [addr(1), addr(9)]
            .iter()
            .map(|a| stub_signature(a, &hash))
            .collect();

        assert_eq!(
            verify_quorum(&stub_recover, &owners(), 2, &set, &hash),
            Err(VerificationError::InvalidSignature(SignatureFault::NotOwner {
                index: 1,
                signer: addr(9)
            }))
        );
    }

    #[test]
    fn test_wrong_hash_rejected() {
        let hash = keccak256(b"tx");
        let set: SignatureSet = [addr(1), addr(2)]
            .iter()
            .map(|a| stub_signature(a, &hash))
            .collect();

        assert!(matches!(
            verify_quorum(&stub_recover, &owners(), 2, &set, &keccak256(b"other")),
            Err(VerificationError::InvalidSignature(SignatureFault::NotOwner { index: 0, .. }))
        ));
    }

    #[test]
    fn test_duplicate_and_order() {
        let hash = keccak256(b"tx");

        let dup: SignatureSet = [addr(2), addr(2)]
            .iter()
            .map(|a| stub_signature(a, &hash))
            .collect();
        assert!(matches!(
            verify_quorum(&stub_recover, &owners(), 2, &dup, &hash),
            Err(VerificationError::InvalidSignature(SignatureFault::Duplicate { index: 1, .. }))
        ));

        let reversed: SignatureSet = [addr(3), addr(1)]
            .iter()
            .map(|a| stub_signature(a, &hash))
            .collect();
        assert!(matches!(
            verify_quorum(&stub_recover, &owners(), 2, &reversed, &hash),
            Err(VerificationError::InvalidSignature(SignatureFault::OutOfOrder { index: 1, .. }))
        ));
    }

    #[test]
    fn test_unrecoverable_signature() {
        let hash = keccak256(b"tx");
        let mut set = SignatureSet::default();
        set.push(stub_signature(&addr(1), &hash));
        set.push(Signature::new(5, B256::ZERO, hash));

        assert!(matches!(
            verify_quorum(&stub_recover, &owners(), 2, &set, &hash),
            Err(VerificationError::InvalidSignature(SignatureFault::Unrecoverable { index: 1, .. }))
        ));
    }

    #[test]
    fn test_real_keys_end_to_end() {
        let mut keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
        keys.sort_by_key(|k| k.address());
        let owners = OwnerSet::new(keys.iter().map(|k| k.address()).collect()).unwrap();

        let separator = domain_separator(&CHAIN_ID, &addr(0x11));
        let tx = TransactionRequest::transfer(addr(0x22), U256::from(10));
        let hash = typed_hash(&separator, &tx, 0);

        let set = SignatureSet::sign(&[&keys[0], &keys[2]], &hash).unwrap();
        let signers = verify_quorum(&Secp256k1Recovery::new(), &owners, 2, &set, &hash).unwrap();
        assert_eq!(signers, vec![keys[0].address(), keys[2].address()]);

        // Same signatures at the next nonce recover to strangers
        let next = typed_hash(&separator, &tx, 1);
        assert!(matches!(
            verify_quorum(&Secp256k1Recovery::new(), &owners, 2, &set, &next),
            Err(VerificationError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_signature_set_accessors() {
        let hash = keccak256(b"tx");
        let set: SignatureSet = [addr(1), addr(2)]
            .iter()
            .map(|a| stub_signature(a, &hash))
            .collect();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1), Some(stub_signature(&addr(2), &hash)));
        assert_eq!(set.get(2), None);
        assert!(SignatureSet::default().is_empty());
    }

    fn full_owner_set() -> OwnerSet {
        OwnerSet::new((1..=MAX_OWNERS as u8).map(addr).collect()).unwrap()
    }

    proptest! {
        /// An owner signing twice in a row is a duplicate at every threshold
        #[test]
        fn adjacent_repeat_rejected_at_any_threshold(
            required in 2usize..=MAX_OWNERS,
            seed in any::<prop::sample::Index>()
        ) {
            let owners = full_owner_set();
            let hash = keccak256(b"tx");
            let mut signers = owners.as_slice()[..required].to_vec();
            let i = seed.index(required - 1);
            signers[i + 1] = signers[i];

            let set: SignatureSet = signers.iter().map(|a| stub_signature(a, &hash)).collect();
            prop_assert_eq!(
                verify_quorum(&stub_recover, &owners, required, &set, &hash),
                Err(VerificationError::InvalidSignature(SignatureFault::Duplicate {
                    index: i + 1,
                    signer: signers[i],
                }))
            );
        }

        /// A repeated owner anywhere in the set never reaches quorum
        #[test]
        fn repeat_anywhere_rejected_at_any_threshold(
            required in 2usize..=MAX_OWNERS,
            pick in any::<prop::sample::Index>(),
            place in any::<prop::sample::Index>()
        ) {
            let owners = full_owner_set();
            let hash = keccak256(b"tx");
            let mut signers = owners.as_slice()[..required - 1].to_vec();
            let repeated = signers[pick.index(signers.len())];
            signers.insert(place.index(signers.len() + 1), repeated);

            let set: SignatureSet = signers.iter().map(|a| stub_signature(a, &hash)).collect();
            let result = verify_quorum(&stub_recover, &owners, required, &set, &hash);
            prop_assert!(
                matches!(
                    result,
                    Err(VerificationError::InvalidSignature(
                        SignatureFault::Duplicate { .. } | SignatureFault::OutOfOrder { .. }
                    ))
                ),
                "unexpected result {:?}",
                result
            );
        }
    }
}
