use std::sync::Arc;

use tronwallet_adapter_core::{Adapter, AdapterConfig, HostPort, WalletDescriptor};

use crate::wallets::{
    AB_WALLET, BACKPACK, BINANCE_WALLET, GATE_WALLET, GUARDA, NABOX_WALLET, ONEKEY,
    SAFEPAL_WALLET, TOMO_WALLET, TRUST,
};

const ALL: [WalletDescriptor; 10] = [
    TRUST,
    GATE_WALLET,
    AB_WALLET,
    NABOX_WALLET,
    ONEKEY,
    SAFEPAL_WALLET,
    TOMO_WALLET,
    GUARDA,
    BACKPACK,
    BINANCE_WALLET,
];

pub fn all() -> &'static [WalletDescriptor] {
    &ALL
}

/// Case-insensitive lookup by display name.
pub fn by_name(name: &str) -> Option<&'static WalletDescriptor> {
    ALL.iter()
        .find(|wallet| wallet.name().eq_ignore_ascii_case(name.trim()))
}

/// One adapter per known wallet, sharing `host` and `config`.
pub fn adapters(host: Arc<dyn HostPort>, config: AdapterConfig) -> Vec<Adapter> {
    ALL.iter()
        .map(|wallet| Adapter::new(*wallet, Arc::clone(&host), config))
        .collect()
}
