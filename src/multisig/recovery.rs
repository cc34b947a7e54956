//! Wallet lifecycle and owner-set recovery
//!
//! The wallet moves between three states:
//!
//! ```text
//! Uninitialized --init--> Active <--startRecover / cancel / finalize / submit--> Recovering
//! ```
//!
//! Every operation first consults [`transition`]. The returned step decides
//! whether a pending proposal survives (`next`) and which event is emitted
//! (`signal`), so the implicit cancel by `submit` is a table entry rather
//! than a side effect.

use crate::core::{Address, WalletEvent};
use crate::multisig::owners::OwnerSet;
use crate::multisig::wallet::WalletError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Waiting period between starting and finalizing a recovery, in days
pub const RECOVERY_DELAY_DAYS: u64 = 180;

/// Shortest time lock a wallet accepts, in seconds
pub const RECOVERY_DELAY_SECS: u64 = RECOVERY_DELAY_DAYS * 24 * 60 * 60;

/// Lifecycle state of a wallet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletState {
    Uninitialized,
    Active,
    Recovering,
}

/// Operations that are subject to the state table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalletAction {
    Submit,
    StartRecover,
    CancelRecover,
    FinalizeRecover,
}

/// Recovery event emitted by a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoverySignal {
    Started,
    Canceled,
    Finalized,
}

impl RecoverySignal {
    /// Attach the acting owner
    pub fn event(self, owner: Address) -> WalletEvent {
        match self {
            RecoverySignal::Started => WalletEvent::RecoverStarted { owner },
            RecoverySignal::Canceled => WalletEvent::RecoverCanceled { owner },
            RecoverySignal::Finalized => WalletEvent::RecoverFinalized { owner },
        }
    }
}

/// Outcome of applying an action to a state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub next: WalletState,
    pub signal: Option<RecoverySignal>,
}

impl Transition {
    fn to(next: WalletState, signal: Option<RecoverySignal>) -> Result<Self, WalletError> {
        Ok(Self { next, signal })
    }

    /// Whether a pending proposal outlives this step
    pub fn keeps_proposal(&self) -> bool {
        self.next == WalletState::Recovering
    }

    /// Events emitted by this step on behalf of `caller`
    pub fn events(&self, caller: Address) -> Vec<WalletEvent> {
        self.signal.map(|signal| signal.event(caller)).into_iter().collect()
    }
}

/// The state table
pub fn transition(state: WalletState, action: WalletAction) -> Result<Transition, WalletError> {
    use RecoverySignal::*;
    use WalletAction::*;
    use WalletState::*;

    match (state, action) {
        (Uninitialized, _) => Err(WalletError::NotInitialized),

        (Active, Submit) => Transition::to(Active, None),
        (Recovering, Submit) => Transition::to(Active, Some(Canceled)),

        // A new recovery replaces a pending one and restarts its clock
        (Active | Recovering, StartRecover) => Transition::to(Recovering, Some(Started)),

        (Recovering, CancelRecover) => Transition::to(Active, Some(Canceled)),
        (Recovering, FinalizeRecover) => Transition::to(Active, Some(Finalized)),

        (Active, CancelRecover | FinalizeRecover) => Err(WalletError::NotRecovering),
    }
}

/// A pending replacement of the owner set
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryState {
    /// Owners that take over once the recovery is finalized
    pub owners: OwnerSet,
    /// Host time when the recovery was started
    pub started_at: DateTime<Utc>,
}

impl RecoveryState {
    pub fn new(owners: OwnerSet, started_at: DateTime<Utc>) -> Self {
        Self { owners, started_at }
    }

    /// Earliest time at which the recovery can be finalized
    ///
    /// `None` when the time lock ends beyond the representable calendar,
    /// in which case it never opens.
    pub fn unlocks_at(&self, delay: Duration) -> Option<DateTime<Utc>> {
        self.started_at.checked_add_signed(delay)
    }

    pub fn is_unlocked(&self, now: DateTime<Utc>, delay: Duration) -> bool {
        self.unlocks_at(delay).is_some_and(|unlocks_at| now >= unlocks_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use RecoverySignal::*;
        use WalletAction::*;
        use WalletState::*;

        let cases = [
            (Active, Submit, Active, None),
            (Recovering, Submit, Active, Some(Canceled)),
            (Active, StartRecover, Recovering, Some(Started)),
            (Recovering, StartRecover, Recovering, Some(Started)),
            (Recovering, CancelRecover, Active, Some(Canceled)),
            (Recovering, FinalizeRecover, Active, Some(Finalized)),
        ];

        for (state, action, next, signal) in cases {
            assert_eq!(
                transition(state, action),
                Ok(Transition { next, signal }),
                "{:?} x {:?}",
                state,
                action
            );
        }
    }

    #[test]
    fn test_rejected_transitions() {
        for action in [
            WalletAction::Submit,
            WalletAction::StartRecover,
            WalletAction::CancelRecover,
            WalletAction::FinalizeRecover,
        ] {
            assert_eq!(
                transition(WalletState::Uninitialized, action),
                Err(WalletError::NotInitialized)
            );
        }

        assert_eq!(
            transition(WalletState::Active, WalletAction::CancelRecover),
            Err(WalletError::NotRecovering)
        );
        assert_eq!(
            transition(WalletState::Active, WalletAction::FinalizeRecover),
            Err(WalletError::NotRecovering)
        );
    }

    #[test]
    fn test_time_lock_boundary() {
        let start = Utc::now();
        let owners = OwnerSet::new(vec![Address::new([1; 20])]).unwrap();
        let recovery = RecoveryState::new(owners, start);
        let delay = Duration::seconds(RECOVERY_DELAY_SECS as i64);
        assert_eq!(delay, Duration::days(180));

        assert!(!recovery.is_unlocked(start, delay));
        assert!(!recovery.is_unlocked(start + delay - Duration::seconds(1), delay));
        assert!(recovery.is_unlocked(start + delay, delay));
        assert!(recovery.is_unlocked(start + delay + Duration::days(1), delay));
    }

    #[test]
    fn test_unrepresentable_unlock_never_opens() {
        let owners = OwnerSet::new(vec![Address::new([1; 20])]).unwrap();
        let recovery = RecoveryState::new(owners, DateTime::<Utc>::MAX_UTC - Duration::days(1));
        let delay = Duration::days(2);

        assert_eq!(recovery.unlocks_at(delay), None);
        assert!(!recovery.is_unlocked(DateTime::<Utc>::MAX_UTC, delay));
    }

    #[test]
    fn test_step_events_and_proposal() {
        let owner = Address::new([4; 20]);
        assert_eq!(
            RecoverySignal::Canceled.event(owner),
            WalletEvent::RecoverCanceled { owner }
        );

        let start = transition(WalletState::Active, WalletAction::StartRecover).unwrap();
        assert!(start.keeps_proposal());
        assert_eq!(start.events(owner), vec![WalletEvent::RecoverStarted { owner }]);

        let submit = transition(WalletState::Active, WalletAction::Submit).unwrap();
        assert!(!submit.keeps_proposal());
        assert!(submit.events(owner).is_empty());

        let canceled = transition(WalletState::Recovering, WalletAction::Submit).unwrap();
        assert!(!canceled.keeps_proposal());
        assert_eq!(canceled.events(owner), vec![WalletEvent::RecoverCanceled { owner }]);
    }
}
