//! In-process execution host
//!
//! Keeps a native-value ledger, a log of executed calls and an append-only
//! event log. The clock is explicit so recovery time locks can be exercised
//! without waiting.

use super::{CallContext, CallError, CallExecutor, OutgoingCall};
use crate::core::{Address, Event, LoggedEvent, U256};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Serializable host state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemoryHost {
    /// Current host time
    clock: DateTime<Utc>,
    /// Native value held by each account
    balances: HashMap<Address, U256>,
    /// Destinations that revert every call
    rejecting: BTreeSet<Address>,
    /// Successfully executed calls
    calls: Vec<OutgoingCall>,
    /// Persisted events
    events: Vec<LoggedEvent>,
}

impl MemoryHost {
    /// Create a host whose clock starts at the wall clock
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Create a host with a fixed starting time
    pub fn starting_at(clock: DateTime<Utc>) -> Self {
        Self {
            clock,
            balances: HashMap::new(),
            rejecting: BTreeSet::new(),
            calls: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock
    }

    /// Move the clock forward; saturates at the end of the representable range
    pub fn advance(&mut self, by: Duration) {
        self.clock = self
            .clock
            .checked_add_signed(by)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
    }

    pub fn set_time(&mut self, time: DateTime<Utc>) {
        self.clock = time;
    }

    /// Build a call context for `caller` at the current host time
    pub fn context(&self, caller: Address) -> CallContext {
        CallContext::new(caller, self.clock)
    }

    /// Credit native value to an account
    pub fn deposit(&mut self, account: Address, amount: U256) -> Result<(), CallError> {
        let balance = self.balances.entry(account).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(CallError::BalanceOverflow { account })?;
        Ok(())
    }

    pub fn balance_of(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Make every call to `destination` revert
    pub fn reject_calls_to(&mut self, destination: Address) {
        self.rejecting.insert(destination);
    }

    pub fn accept_calls_to(&mut self, destination: &Address) {
        self.rejecting.remove(destination);
    }

    /// Append events emitted by `emitter` during a successful call
    pub fn record<E, I>(&mut self, emitter: Address, events: I)
    where
        E: Into<Event>,
        I: IntoIterator<Item = E>,
    {
        let timestamp = self.clock;
        self.events
            .extend(events.into_iter().map(|event| LoggedEvent {
                emitter,
                timestamp,
                event: event.into(),
            }));
    }

    pub fn events(&self) -> &[LoggedEvent] {
        &self.events
    }

    /// Events emitted by one instance, oldest first
    pub fn events_for(&self, emitter: &Address) -> Vec<&LoggedEvent> {
        self.events.iter().filter(|e| &e.emitter == emitter).collect()
    }

    pub fn calls(&self) -> &[OutgoingCall] {
        &self.calls
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl CallExecutor for MemoryHost {
    fn execute(&mut self, call: &OutgoingCall) -> Result<Vec<u8>, CallError> {
        if self.rejecting.contains(&call.to) {
            return Err(CallError::Reverted(format!("{} rejected the call", call.to)));
        }

        let have = self.balance_of(&call.from);
        if have < call.value {
            return Err(CallError::InsufficientBalance {
                have,
                need: call.value,
            });
        }

        if !call.value.is_zero() {
            self.balances.insert(call.from, have - call.value);
            if let Err(e) = self.deposit(call.to, call.value) {
                // The ledger is left as it was before the call
                self.balances.insert(call.from, have);
                return Err(e);
            }
        }

        self.calls.push(call.clone());
        Ok(Vec::new())
    }
}
