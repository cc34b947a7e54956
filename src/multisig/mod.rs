//! Threshold multi-signature wallets
//!
//! An M-of-N wallet forwards a call only when M distinct owners signed the
//! structured hash of that call at the wallet's current nonce.
//!
//! # Example
//!
//! ```ignore
//! use litesig::multisig::{SignatureSet, TransactionRequest, Wallet, WalletConfig};
//!
//! // 2-of-3 wallet, owners sorted ascending
//! let mut wallet = Wallet::deploy(address, owners, 2, chain_id, WalletConfig::default())?;
//!
//! // Owners sign the message hash at the current nonce
//! let tx = TransactionRequest::transfer(recipient, U256::from(1_000));
//! let hash = wallet.message_hash(&tx, None)?;
//! let signatures = SignatureSet::sign(&[&alice, &carol], &hash)?;
//!
//! // Anyone may submit
//! let receipt = wallet.submit(&ctx, &signatures, &tx, &recovery, &mut host)?;
//! ```

pub mod owners;
pub mod recovery;
pub mod signature;
pub mod wallet;

pub use owners::{OwnerSet, MAX_OWNERS, MIN_OWNERS};
pub use recovery::{
    transition, RecoverySignal, RecoveryState, Transition, WalletAction, WalletState,
    RECOVERY_DELAY_DAYS, RECOVERY_DELAY_SECS,
};
pub use signature::{
    domain_separator, signing_hash, transaction_message_hash, verify_quorum, SignatureFault,
    SignatureSet, SigningScheme, TransactionRequest, VerificationError,
};
pub use wallet::{CallOutcome, ExecutionReceipt, Wallet, WalletConfig, WalletError};
