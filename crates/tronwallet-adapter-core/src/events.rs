use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::{AdapterState, ReadyState};
use crate::error::WalletError;
use crate::ports::MaybeSendSync;

#[derive(Debug, Clone)]
pub enum AdapterEvent {
    ReadyStateChanged(ReadyState),
    StateChanged(AdapterState),
    Connect(String),
    Disconnect,
    /// New address first, previous (empty when there was none) second.
    AccountsChanged { address: String, previous: String },
    ChainChanged { chain_id: String },
    Error(WalletError),
}

impl AdapterEvent {
    pub fn name(&self) -> EventName {
        match self {
            Self::ReadyStateChanged(_) => EventName::ReadyStateChanged,
            Self::StateChanged(_) => EventName::StateChanged,
            Self::Connect(_) => EventName::Connect,
            Self::Disconnect => EventName::Disconnect,
            Self::AccountsChanged { .. } => EventName::AccountsChanged,
            Self::ChainChanged { .. } => EventName::ChainChanged,
            Self::Error(_) => EventName::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventName {
    ReadyStateChanged,
    StateChanged,
    Connect,
    Disconnect,
    AccountsChanged,
    ChainChanged,
    Error,
}

impl EventName {
    pub const ALL: [EventName; 7] = [
        EventName::ReadyStateChanged,
        EventName::StateChanged,
        EventName::Connect,
        EventName::Disconnect,
        EventName::AccountsChanged,
        EventName::ChainChanged,
        EventName::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventName::ReadyStateChanged => "readyStateChanged",
            EventName::StateChanged => "stateChanged",
            EventName::Connect => "connect",
            EventName::Disconnect => "disconnect",
            EventName::AccountsChanged => "accountsChanged",
            EventName::ChainChanged => "chainChanged",
            EventName::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[cfg(not(target_arch = "wasm32"))]
type Listener = Arc<dyn Fn(&AdapterEvent) + Send + Sync>;
#[cfg(target_arch = "wasm32")]
type Listener = Arc<dyn Fn(&AdapterEvent)>;

/// Per-adapter publish/subscribe with synchronous, registration-ordered
/// dispatch. A panicking listener unwinds into whoever emitted.
#[derive(Default)]
pub struct EventChannel {
    next_id: AtomicU64,
    listeners: Mutex<BTreeMap<EventName, Vec<(ListenerId, Listener)>>>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&self, event: EventName, handler: F) -> ListenerId
    where
        F: Fn(&AdapterEvent) + MaybeSendSync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handler: Listener = Arc::new(handler);
        self.lock().entry(event).or_default().push((id, handler));
        id
    }

    /// Returns whether a registration was removed.
    pub fn off(&self, event: EventName, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let Some(list) = listeners.get_mut(&event) else {
            return false;
        };
        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        let removed = list.len() != before;
        if list.is_empty() {
            listeners.remove(&event);
        }
        removed
    }

    pub fn emit(&self, event: &AdapterEvent) {
        // Snapshot so listeners may call on/off while being dispatched.
        let snapshot: Vec<Listener> = self
            .lock()
            .get(&event.name())
            .map(|list| list.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn remove_all_listeners(&self) {
        self.lock().clear();
    }

    pub fn listener_count(&self, event: EventName) -> usize {
        self.lock().get(&event).map_or(0, Vec::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<EventName, Vec<(ListenerId, Listener)>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<(&'static str, usize)> = EventName::ALL
            .iter()
            .map(|name| (name.as_str(), self.listener_count(*name)))
            .filter(|(_, count)| *count > 0)
            .collect();
        f.debug_struct("EventChannel")
            .field("listeners", &counts)
            .finish()
    }
}
