#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use tronwallet_adapter_core::{
    Adapter, AdapterConfig, AdapterEvent, AdapterState, EventName, ReadyState, WalletDescriptor,
};
use tronwallet_adapters::{SandboxHost, SandboxWallet};

pub const ADDR1: &str = "TJRabPrwbZy45sbavfcjinPJC18kjpRTv8";
pub const ADDR2: &str = "TXLAQ63Xg1NAzckPwKHvzw7CSEmLMEqcdj";

/// Every adapter event, in emission order.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<AdapterEvent>>>,
}

impl EventLog {
    pub fn attach(adapter: &Adapter) -> Self {
        let log = Self::default();
        for name in EventName::ALL {
            let events = Arc::clone(&log.events);
            adapter.on(name, move |event| {
                events.lock().expect("event log lock").push(event.clone());
            });
        }
        log
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .expect("event log lock")
            .iter()
            .map(|e| e.name().as_str())
            .collect()
    }

    pub fn count(&self, name: EventName) -> usize {
        self.events
            .lock()
            .expect("event log lock")
            .iter()
            .filter(|e| e.name() == name)
            .count()
    }

    pub fn events(&self) -> Vec<AdapterEvent> {
        self.events.lock().expect("event log lock").clone()
    }

    pub fn states(&self) -> Vec<AdapterState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                AdapterEvent::StateChanged(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().expect("event log lock").clear();
    }
}

pub fn config(check_timeout_ms: u64) -> AdapterConfig {
    AdapterConfig::default().with_check_timeout_ms(check_timeout_ms)
}

pub struct Fixture {
    pub host: Arc<SandboxHost>,
    pub wallet: Arc<SandboxWallet>,
    pub adapter: Adapter,
    pub log: EventLog,
}

/// Desktop browser with `wallet` installed at the descriptor's first path.
pub fn installed(descriptor: WalletDescriptor, wallet: SandboxWallet) -> Fixture {
    installed_with(descriptor, wallet, AdapterConfig::default())
}

pub fn installed_with(
    descriptor: WalletDescriptor,
    wallet: SandboxWallet,
    config: AdapterConfig,
) -> Fixture {
    let host = Arc::new(SandboxHost::browser());
    let wallet = Arc::new(wallet);
    host.install(descriptor.injections[0].path, Arc::clone(&wallet));
    let adapter = Adapter::new(descriptor, host.clone(), config);
    let log = EventLog::attach(&adapter);
    Fixture {
        host,
        wallet,
        adapter,
        log,
    }
}

/// Installed, detected and connected to `ADDR1`.
pub async fn connected(descriptor: WalletDescriptor, wallet: SandboxWallet) -> Fixture {
    let fixture = installed(descriptor, wallet);
    assert_eq!(fixture.adapter.detect().await, ReadyState::Found);
    fixture.adapter.connect().await.expect("connect");
    assert_eq!(fixture.adapter.address().as_deref(), Some(ADDR1));
    fixture.log.clear();
    fixture
}

pub fn assert_invariant(adapter: &Adapter) {
    let connected = adapter.state() == AdapterState::Connected;
    let has_address = adapter.address().is_some_and(|a| !a.is_empty());
    assert_eq!(
        connected, has_address,
        "state {:?} with address {:?}",
        adapter.state(),
        adapter.address()
    );
}
