use thiserror::Error;

use crate::domain::{AdapterState, ReadyState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: AdapterState,
    pub to: AdapterState,
    pub reason: &'static str,
}

impl StateTransition {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("illegal adapter transition {from} -> {to} ({reason})")]
    Adapter {
        from: AdapterState,
        to: AdapterState,
        reason: &'static str,
    },
    #[error("illegal ready-state transition {from} -> {to}")]
    Ready { from: ReadyState, to: ReadyState },
    #[error("address {address:?} is inconsistent with state {state}")]
    Address {
        state: AdapterState,
        address: Option<String>,
    },
}

/// Legal adapter state moves. Re-entering the current state is allowed and
/// is a no-op for observers.
pub fn adapter_transition(
    from: AdapterState,
    to: AdapterState,
    reason: &'static str,
) -> Result<StateTransition, TransitionError> {
    use AdapterState::*;

    let legal = from == to
        || matches!(
            (from, to),
            (Loading, NotFound)
                | (Loading, Disconnect)
                | (Loading, Connected)
                | (Disconnect, Connected)
                | (Connected, Disconnect)
        );
    if legal {
        Ok(StateTransition { from, to, reason })
    } else {
        Err(TransitionError::Adapter { from, to, reason })
    }
}

/// `Loading` settles once; settled values never change.
pub fn ready_transition(from: ReadyState, to: ReadyState) -> Result<ReadyState, TransitionError> {
    match (from, to) {
        (ReadyState::Loading, ReadyState::Found | ReadyState::NotFound) => Ok(to),
        (a, b) if a == b => Ok(to),
        _ => Err(TransitionError::Ready { from, to }),
    }
}

/// `Connected` carries a non-empty address; every other state carries none.
pub fn check_address(state: AdapterState, address: Option<&str>) -> Result<(), TransitionError> {
    let consistent = match state {
        AdapterState::Connected => address.is_some_and(|a| !a.is_empty()),
        _ => address.is_none(),
    };
    if consistent {
        Ok(())
    } else {
        Err(TransitionError::Address {
            state,
            address: address.map(str::to_owned),
        })
    }
}
