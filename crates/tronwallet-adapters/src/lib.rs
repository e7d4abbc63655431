pub mod registry;
pub mod wallets;

#[cfg(target_arch = "wasm32")]
pub mod browser;
#[cfg(not(target_arch = "wasm32"))]
pub mod native;
#[cfg(not(target_arch = "wasm32"))]
pub mod sandbox;

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserHost, BrowserProvider};
#[cfg(not(target_arch = "wasm32"))]
pub use native::NativeHost;
#[cfg(not(target_arch = "wasm32"))]
pub use sandbox::{SandboxHost, SandboxWallet, WalletStyle};
pub use wallets::{
    AB_WALLET, BACKPACK, BINANCE_WALLET, GATE_WALLET, GUARDA, NABOX_WALLET, ONEKEY,
    SAFEPAL_WALLET, TOMO_WALLET, TRUST,
};
