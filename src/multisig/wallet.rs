//! Threshold wallet state machine
//!
//! A wallet is controlled by 1..=10 owners; exactly `required_signatures`
//! of them must sign a transaction before it is forwarded to the host.
//! Each successful submission consumes one nonce. A single owner can start
//! a recovery that replaces the owner set after a time lock, and any owner
//! or any successful submission can cancel it in the meantime.
//!
//! Every operation validates all its inputs before touching state, so a
//! failed call leaves the wallet exactly as it was.

use crate::core::{Address, WalletEvent, B256, U256};
use crate::crypto::SignerRecovery;
use crate::host::{CallContext, CallExecutor, OutgoingCall};
use crate::multisig::owners::OwnerSet;
use crate::multisig::recovery::{
    transition, RecoveryState, Transition, WalletAction, WalletState, RECOVERY_DELAY_SECS,
};
use crate::multisig::signature::{
    domain_separator, transaction_message_hash, verify_quorum, SignatureSet, SigningScheme,
    TransactionRequest, VerificationError,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to wallet operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Wallet is not initialized")]
    NotInitialized,
    #[error("Wallet is already initialized")]
    AlreadyInitialized,
    #[error("Owners List min is 1 and max is 10, got {len}")]
    OwnerListSize { len: usize },
    #[error("Required signatures must be in the proper range: {required} of {owners}")]
    ThresholdRange { required: usize, owners: usize },
    #[error("Owner addresses must be unique and in order")]
    OwnerListOrder,
    #[error("Recovery list must match the owner count: expected {expected}, got {got}")]
    InvalidRecoverListLength { expected: usize, got: usize },
    #[error("Caller is not an owner: {0}")]
    NotAdministrator(Address),
    #[error("Wallet is not in recovery mode")]
    NotRecovering,
    #[error("Recovery time lock active until {unlocks_at}")]
    RecoveryTimeLockActive { unlocks_at: DateTime<Utc> },
    #[error("Recovery delay of {secs}s is out of range, minimum is {}s", RECOVERY_DELAY_SECS)]
    RecoveryDelayRange { secs: u64 },
    #[error("Index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Verification failed: {0}")]
    Verification(#[from] VerificationError),
}

/// Per-wallet settings fixed at creation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Time lock between starting and finalizing a recovery
    pub recovery_delay_secs: u64,
    /// Envelope the signers apply to the signing hash
    pub signing_scheme: SigningScheme,
    /// Commit signatures to the submitting account
    pub bind_submitter: bool,
}

impl WalletConfig {
    /// Time lock as a duration
    ///
    /// Fails when the delay is shorter than [`RECOVERY_DELAY_SECS`] or too
    /// long to represent.
    pub fn recovery_delay(&self) -> Result<Duration, WalletError> {
        let secs = self.recovery_delay_secs;
        if secs < RECOVERY_DELAY_SECS {
            return Err(WalletError::RecoveryDelayRange { secs });
        }
        i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or(WalletError::RecoveryDelayRange { secs })
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        self.recovery_delay().map(|_| ())
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            recovery_delay_secs: RECOVERY_DELAY_SECS,
            signing_scheme: SigningScheme::Typed,
            bind_submitter: false,
        }
    }
}

/// Result of forwarding the approved call
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutcome {
    Success {
        #[serde(with = "crate::core::abi::hex_bytes")]
        return_data: Vec<u8>,
    },
    Failed {
        reason: String,
    },
}

/// Receipt of an accepted submission
///
/// The nonce is consumed even when the destination fails, so the same
/// signatures can never be replayed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    /// Nonce the signatures were checked against
    pub nonce: U256,
    pub destination: Address,
    pub value: U256,
    /// Recovered signers in submission order
    pub signers: Vec<Address>,
    pub outcome: CallOutcome,
    pub events: Vec<WalletEvent>,
}

impl ExecutionReceipt {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CallOutcome::Success { .. })
    }
}

/// Configuration established by `init`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Setup {
    owners: OwnerSet,
    required_signatures: usize,
    chain_id: U256,
    domain_separator: B256,
}

/// A threshold wallet instance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    address: Address,
    config: WalletConfig,
    setup: Option<Setup>,
    nonce: U256,
    recovery: Option<RecoveryState>,
}

impl Wallet {
    /// Create an uninitialized wallet at `address`
    pub fn new(address: Address, config: WalletConfig) -> Result<Self, WalletError> {
        config.validate()?;
        Ok(Self {
            address,
            config,
            setup: None,
            nonce: U256::ZERO,
            recovery: None,
        })
    }

    /// Create and initialize in one step
    pub fn deploy(
        address: Address,
        owners: Vec<Address>,
        required_signatures: usize,
        chain_id: U256,
        config: WalletConfig,
    ) -> Result<Self, WalletError> {
        let mut wallet = Self::new(address, config)?;
        wallet.init(owners, required_signatures, chain_id)?;
        Ok(wallet)
    }

    /// Set owners, threshold and chain id; callable once
    pub fn init(
        &mut self,
        owners: Vec<Address>,
        required_signatures: usize,
        chain_id: U256,
    ) -> Result<(), WalletError> {
        if self.setup.is_some() {
            return Err(WalletError::AlreadyInitialized);
        }

        OwnerSet::check_size(owners.len())?;
        if required_signatures == 0 || required_signatures > owners.len() {
            return Err(WalletError::ThresholdRange {
                required: required_signatures,
                owners: owners.len(),
            });
        }
        let owners = OwnerSet::new(owners)?;

        log::info!(
            "Wallet {} initialized: {}-of-{} on chain {}",
            self.address,
            required_signatures,
            owners.len(),
            chain_id
        );

        self.setup = Some(Setup {
            domain_separator: domain_separator(&chain_id, &self.address),
            owners,
            required_signatures,
            chain_id,
        });
        self.nonce = U256::ZERO;
        Ok(())
    }

    /// Verify a quorum and forward the call
    ///
    /// A pending recovery is canceled by any accepted submission.
    pub fn submit<R, E>(
        &mut self,
        ctx: &CallContext,
        signatures: &SignatureSet,
        tx: &TransactionRequest,
        recovery: &R,
        executor: &mut E,
    ) -> Result<ExecutionReceipt, WalletError>
    where
        R: SignerRecovery + ?Sized,
        E: CallExecutor + ?Sized,
    {
        let step = transition(self.state(), WalletAction::Submit)?;
        let setup = self.setup()?;

        let submitter = self.config.bind_submitter.then_some(ctx.caller);
        let message_hash = transaction_message_hash(
            self.config.signing_scheme,
            &setup.domain_separator,
            tx,
            &self.nonce,
            submitter.as_ref(),
        );
        let signers = verify_quorum(
            recovery,
            &setup.owners,
            setup.required_signatures,
            signatures,
            &message_hash,
        )?;

        let nonce = self.nonce;
        self.nonce += U256::from(1);

        let events = self.settle(&step, ctx.caller);
        if !events.is_empty() {
            log::info!("Wallet {} recovery canceled by submission", self.address);
        }

        let call = OutgoingCall {
            from: self.address,
            to: tx.destination,
            value: tx.value,
            payload: tx.payload.clone(),
        };
        let outcome = match executor.execute(&call) {
            Ok(return_data) => CallOutcome::Success { return_data },
            Err(e) => {
                log::warn!(
                    "Wallet {} call to {} failed at nonce {}: {}",
                    self.address,
                    tx.destination,
                    nonce,
                    e
                );
                CallOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        Ok(ExecutionReceipt {
            nonce,
            destination: tx.destination,
            value: tx.value,
            signers,
            outcome,
            events,
        })
    }

    /// Propose a replacement owner set; starts the time lock
    pub fn start_recover(
        &mut self,
        ctx: &CallContext,
        new_owners: Vec<Address>,
    ) -> Result<Vec<WalletEvent>, WalletError> {
        let setup = self.setup()?;
        self.ensure_owner(&ctx.caller)?;

        if new_owners.len() != setup.owners.len() {
            return Err(WalletError::InvalidRecoverListLength {
                expected: setup.owners.len(),
                got: new_owners.len(),
            });
        }
        let new_owners = OwnerSet::new(new_owners)?;
        let step = transition(self.state(), WalletAction::StartRecover)?;

        let proposal = RecoveryState::new(new_owners, ctx.timestamp);
        let unlocks_at = proposal.unlocks_at(self.config.recovery_delay()?);
        self.recovery = Some(proposal);
        log::info!(
            "Wallet {} recovery started by {}, unlocks at {:?}",
            self.address,
            ctx.caller,
            unlocks_at
        );

        Ok(self.settle(&step, ctx.caller))
    }

    /// Abandon a pending recovery
    pub fn cancel_recover(&mut self, ctx: &CallContext) -> Result<Vec<WalletEvent>, WalletError> {
        self.setup()?;
        self.ensure_owner(&ctx.caller)?;
        let step = transition(self.state(), WalletAction::CancelRecover)?;

        log::info!("Wallet {} recovery canceled by {}", self.address, ctx.caller);
        Ok(self.settle(&step, ctx.caller))
    }

    /// Replace the owner set once the time lock has passed
    ///
    /// The threshold is left unchanged; the new set has the same size.
    pub fn finalize_recover(&mut self, ctx: &CallContext) -> Result<Vec<WalletEvent>, WalletError> {
        self.setup()?;
        self.ensure_owner(&ctx.caller)?;
        let step = transition(self.state(), WalletAction::FinalizeRecover)?;

        let delay = self.config.recovery_delay()?;
        let pending = self.recovery.as_ref().ok_or(WalletError::NotRecovering)?;
        if !pending.is_unlocked(ctx.timestamp, delay) {
            return Err(match pending.unlocks_at(delay) {
                Some(unlocks_at) => WalletError::RecoveryTimeLockActive { unlocks_at },
                None => WalletError::RecoveryDelayRange {
                    secs: self.config.recovery_delay_secs,
                },
            });
        }

        let new_owners = pending.owners.clone();
        if let Some(setup) = self.setup.as_mut() {
            setup.owners = new_owners;
        }
        log::info!("Wallet {} recovery finalized by {}", self.address, ctx.caller);

        Ok(self.settle(&step, ctx.caller))
    }

    /// Hash the owners must sign for `tx` at the current nonce
    pub fn message_hash(
        &self,
        tx: &TransactionRequest,
        submitter: Option<&Address>,
    ) -> Result<B256, WalletError> {
        self.message_hash_at(tx, &self.nonce, submitter)
    }

    pub fn message_hash_at(
        &self,
        tx: &TransactionRequest,
        nonce: &U256,
        submitter: Option<&Address>,
    ) -> Result<B256, WalletError> {
        let setup = self.setup()?;
        Ok(transaction_message_hash(
            self.config.signing_scheme,
            &setup.domain_separator,
            tx,
            nonce,
            submitter,
        ))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn state(&self) -> WalletState {
        match (&self.setup, &self.recovery) {
            (None, _) => WalletState::Uninitialized,
            (Some(_), None) => WalletState::Active,
            (Some(_), Some(_)) => WalletState::Recovering,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.setup.is_some()
    }

    /// Owner at `index`
    pub fn owners(&self, index: usize) -> Result<Address, WalletError> {
        let owners = self.owner_list();
        owners
            .get(index)
            .copied()
            .ok_or(WalletError::IndexOutOfRange {
                index,
                len: owners.len(),
            })
    }

    pub fn owner_list(&self) -> &[Address] {
        self.setup
            .as_ref()
            .map(|s| s.owners.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_owner(&self, address: &Address) -> bool {
        self.setup
            .as_ref()
            .map(|s| s.owners.contains(address))
            .unwrap_or(false)
    }

    pub fn nonce(&self) -> U256 {
        self.nonce
    }

    /// Threshold; zero before `init`
    pub fn required_signatures(&self) -> usize {
        self.setup
            .as_ref()
            .map(|s| s.required_signatures)
            .unwrap_or(0)
    }

    pub fn chain_id(&self) -> Option<U256> {
        self.setup.as_ref().map(|s| s.chain_id)
    }

    pub fn domain_separator(&self) -> Option<B256> {
        self.setup.as_ref().map(|s| s.domain_separator)
    }

    pub fn in_recovery_mode(&self) -> bool {
        self.recovery.is_some()
    }

    /// Proposed owner at `index` during a recovery
    pub fn recovery_owners(&self, index: usize) -> Result<Address, WalletError> {
        let owners = self.recovery_owner_list();
        owners
            .get(index)
            .copied()
            .ok_or(WalletError::IndexOutOfRange {
                index,
                len: owners.len(),
            })
    }

    pub fn recovery_owner_list(&self) -> &[Address] {
        self.recovery
            .as_ref()
            .map(|r| r.owners.as_slice())
            .unwrap_or(&[])
    }

    pub fn recovery_start_time(&self) -> Option<DateTime<Utc>> {
        self.recovery.as_ref().map(|r| r.started_at)
    }

    pub fn recovery_unlocks_at(&self) -> Option<DateTime<Utc>> {
        let delay = self.config.recovery_delay().ok()?;
        self.recovery.as_ref()?.unlocks_at(delay)
    }

    fn setup(&self) -> Result<&Setup, WalletError> {
        self.setup.as_ref().ok_or(WalletError::NotInitialized)
    }

    fn ensure_owner(&self, caller: &Address) -> Result<(), WalletError> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(WalletError::NotAdministrator(*caller))
        }
    }

    /// Apply a table step once every check has passed
    fn settle(&mut self, step: &Transition, caller: Address) -> Vec<WalletEvent> {
        if !step.keeps_proposal() {
            self.recovery = None;
        }
        step.events(caller)
    }
}
