//! In-memory host and wallet for tests and the demo binary.
//!
//! Time is simulated: a detector sleep yields once and then moves a shared
//! clock forward by one tick instead of waiting. Sleeps that overlap land on
//! the same tick, so adapters polling side by side see one clock. A wallet
//! can be installed so it only becomes visible after a given number of ticks.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use tronwallet_adapter_core::{
    EventSurface, HostPort, HostTask, InjectedProvider, NetworkType, ProviderError, ProviderEvent,
    ProviderEventSink, SubscriptionId,
};

pub const DESKTOP_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";
pub const MOBILE_USER_AGENT: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";
pub const DEFAULT_HREF: &str = "https://dapp.example/swap?pair=TRX-USDT";

struct Installed {
    wallet: Arc<SandboxWallet>,
    visible_after_ticks: u64,
}

struct Announced {
    name: String,
    rdns: String,
    wallet: Arc<SandboxWallet>,
}

struct HostState {
    browser: bool,
    mobile: bool,
    user_agent: String,
    href: String,
    globals: BTreeMap<String, Installed>,
    announced: Vec<Announced>,
    ticks: u64,
    navigations: Vec<String>,
    opened_windows: Vec<String>,
}

pub struct SandboxHost {
    state: Mutex<HostState>,
}

impl SandboxHost {
    fn with(browser: bool, mobile: bool, user_agent: &str) -> Self {
        Self {
            state: Mutex::new(HostState {
                browser,
                mobile,
                user_agent: user_agent.to_owned(),
                href: DEFAULT_HREF.to_owned(),
                globals: BTreeMap::new(),
                announced: Vec::new(),
                ticks: 0,
                navigations: Vec::new(),
                opened_windows: Vec::new(),
            }),
        }
    }

    /// Desktop browser.
    pub fn browser() -> Self {
        Self::with(true, false, DESKTOP_USER_AGENT)
    }

    pub fn mobile(user_agent: &str) -> Self {
        Self::with(true, true, user_agent)
    }

    /// No browser at all, e.g. server-side rendering.
    pub fn headless() -> Self {
        Self::with(false, false, "")
    }

    pub fn with_href(self, href: &str) -> Self {
        self.lock().href = href.to_owned();
        self
    }

    pub fn install(&self, path: &str, wallet: Arc<SandboxWallet>) {
        self.install_after_ticks(path, wallet, 0);
    }

    /// Make `wallet` visible at `path` once `ticks` detector sleeps passed.
    pub fn install_after_ticks(&self, path: &str, wallet: Arc<SandboxWallet>, ticks: u64) {
        self.lock().globals.insert(
            path.to_owned(),
            Installed {
                wallet,
                visible_after_ticks: ticks,
            },
        );
    }

    pub fn uninstall(&self, path: &str) {
        self.lock().globals.remove(path);
    }

    /// Answer TIP-6963 requests with `wallet` under `name` and `rdns`.
    pub fn announce(&self, name: &str, rdns: &str, wallet: Arc<SandboxWallet>) {
        self.lock().announced.push(Announced {
            name: name.to_owned(),
            rdns: rdns.to_owned(),
            wallet,
        });
    }

    pub fn ticks(&self) -> u64 {
        self.lock().ticks
    }

    pub fn navigations(&self) -> Vec<String> {
        self.lock().navigations.clone()
    }

    pub fn opened_windows(&self) -> Vec<String> {
        self.lock().opened_windows.clone()
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl HostPort for SandboxHost {
    fn is_browser(&self) -> bool {
        self.lock().browser
    }

    fn is_mobile(&self) -> bool {
        self.lock().mobile
    }

    fn user_agent(&self) -> String {
        self.lock().user_agent.clone()
    }

    fn location_href(&self) -> String {
        self.lock().href.clone()
    }

    fn navigate(&self, url: &str) {
        self.lock().navigations.push(url.to_owned());
    }

    fn open_window(&self, url: &str) {
        self.lock().opened_windows.push(url.to_owned());
    }

    fn lookup(&self, path: &str) -> Option<Arc<dyn InjectedProvider>> {
        let state = self.lock();
        let installed = state.globals.get(path)?;
        if state.ticks < installed.visible_after_ticks {
            return None;
        }
        let wallet: Arc<dyn InjectedProvider> = installed.wallet.clone();
        Some(wallet)
    }

    fn announced(&self, name: &str, rdns: &str) -> Option<Arc<dyn InjectedProvider>> {
        let state = self.lock();
        let announced = state.announced.iter().find(|a| {
            a.name.eq_ignore_ascii_case(name) || a.rdns.eq_ignore_ascii_case(rdns)
        })?;
        let wallet: Arc<dyn InjectedProvider> = announced.wallet.clone();
        Some(wallet)
    }

    async fn sleep(&self, _duration: Duration) {
        let wake_at = self.lock().ticks + 1;
        tokio::task::yield_now().await;
        let mut state = self.lock();
        state.ticks = state.ticks.max(wake_at);
    }

    fn spawn(&self, task: HostTask) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(task);
            }
            Err(_) => tracing::warn!("no runtime; sandbox task dropped"),
        }
    }
}

/// Which request surface the sandbox wallet answers like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletStyle {
    /// `tron_requestAccounts` answers `{ code }`; the address lives on
    /// `tronWeb.defaultAddress`.
    TronLink,
    /// Every account request answers the account list.
    Tip1193,
}

struct WalletState {
    accounts: Vec<String>,
    switch_chain_method: bool,
    ready: bool,
    chain_id: String,
    markers: BTreeSet<String>,
    properties: BTreeMap<String, Value>,
    connect_response: Option<Value>,
    failures: BTreeMap<String, ProviderError>,
    calls: Vec<String>,
    next_subscription: u64,
    sinks: BTreeMap<u64, (EventSurface, ProviderEventSink)>,
}

/// Scriptable injected wallet.
pub struct SandboxWallet {
    style: WalletStyle,
    state: Mutex<WalletState>,
}

impl SandboxWallet {
    pub fn new(style: WalletStyle, accounts: &[&str]) -> Self {
        Self {
            style,
            state: Mutex::new(WalletState {
                accounts: accounts.iter().map(|a| (*a).to_owned()).collect(),
                switch_chain_method: false,
                ready: false,
                chain_id: NetworkType::NILE_CHAIN_ID.to_owned(),
                markers: BTreeSet::new(),
                properties: BTreeMap::new(),
                connect_response: None,
                failures: BTreeMap::new(),
                calls: Vec::new(),
                next_subscription: 0,
                sinks: BTreeMap::new(),
            }),
        }
    }

    pub fn tronlink(accounts: &[&str]) -> Self {
        Self::new(WalletStyle::TronLink, accounts)
    }

    pub fn tip1193(accounts: &[&str]) -> Self {
        Self::new(WalletStyle::Tip1193, accounts)
    }

    /// Start out already authorized for the page.
    pub fn authorized(self) -> Self {
        self.lock().ready = true;
        self
    }

    pub fn with_chain_id(self, chain_id: &str) -> Self {
        self.lock().chain_id = chain_id.to_owned();
        self
    }

    /// Expose `switchChain(chainId)` next to the request surface.
    pub fn with_switch_chain_method(self) -> Self {
        self.lock().switch_chain_method = true;
        self
    }

    /// Set a boolean marker property such as `isBackpack`.
    pub fn with_marker(self, marker: &str) -> Self {
        self.lock().markers.insert(marker.to_owned());
        self
    }

    pub fn with_property(self, path: &str, value: Value) -> Self {
        self.lock().properties.insert(path.to_owned(), value);
        self
    }

    /// Answer the next account request with `response` instead of approving.
    pub fn respond_to_connect(&self, response: Value) {
        self.lock().connect_response = Some(response);
    }

    /// Fail the next call of `method` (request method or call path).
    pub fn fail_next(&self, method: &str, error: ProviderError) {
        self.lock().failures.insert(method.to_owned(), error);
    }

    pub fn set_accounts(&self, accounts: &[&str]) {
        self.lock().accounts = accounts.iter().map(|a| (*a).to_owned()).collect();
    }

    pub fn set_ready(&self, ready: bool) {
        self.lock().ready = ready;
    }

    pub fn chain_id(&self) -> String {
        self.lock().chain_id.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.lock().calls.iter().filter(|c| *c == method).count()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().sinks.len()
    }

    /// Deliver `event` to every current subscriber.
    pub fn emit(&self, event: ProviderEvent) {
        let sinks: Vec<ProviderEventSink> = self
            .lock()
            .sinks
            .values()
            .map(|(_, sink)| Arc::clone(sink))
            .collect();
        for sink in sinks {
            sink(event.clone());
        }
    }

    /// The user switched to `address` inside the wallet.
    pub fn switch_account(&self, address: &str) {
        {
            let mut state = self.lock();
            state.accounts = vec![address.to_owned()];
            state.ready = true;
        }
        self.emit(ProviderEvent::AccountsChanged(vec![address.to_owned()]));
    }

    /// The user locked the wallet.
    pub fn lock_wallet(&self) {
        self.lock().ready = false;
        self.emit(ProviderEvent::AccountsChanged(Vec::new()));
    }

    /// Deterministic stand-in for a signature over `payload`.
    pub fn signature_for(&self, payload: &str) -> String {
        let signer = self.lock().accounts.first().cloned().unwrap_or_default();
        let digest = Sha256::digest(format!("{signer}:{payload}").as_bytes());
        format!("0x{digest:x}")
    }

    fn lock(&self) -> MutexGuard<'_, WalletState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, method: &str) -> Result<(), ProviderError> {
        let mut state = self.lock();
        state.calls.push(method.to_owned());
        match state.failures.remove(method) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn approve_connect(&self) -> Option<Value> {
        let mut state = self.lock();
        if let Some(response) = state.connect_response.take() {
            return Some(response);
        }
        state.ready = true;
        None
    }

    fn accounts_value(&self) -> Value {
        let state = self.lock();
        if state.ready {
            json!(state.accounts)
        } else {
            json!([])
        }
    }

    fn sign_transaction_value(&self, transaction: &Value, permission_id: Option<&Value>) -> Value {
        let signature = self.signature_for(&transaction.to_string());
        let mut signed = transaction.clone();
        if !signed.is_object() {
            signed = json!({ "raw": signed });
        }
        signed["signature"] = json!([signature]);
        if let Some(id) = permission_id {
            signed["permissionId"] = id.clone();
        }
        signed
    }

    fn node_host(&self) -> &'static str {
        match NetworkType::from_chain_id(&self.chain_id()) {
            NetworkType::Nile => "https://nile.trongrid.io",
            NetworkType::Shasta => "https://api.shasta.trongrid.io",
            _ => "https://api.trongrid.io",
        }
    }

    fn handle_request(&self, method: &str, params: Option<Value>) -> Result<Value, ProviderError> {
        let params = params.unwrap_or(Value::Null);
        match method {
            "tron_requestAccounts" | "eth_requestAccounts" => {
                if let Some(response) = self.approve_connect() {
                    return Ok(response);
                }
                if method == "tron_requestAccounts" && self.style == WalletStyle::TronLink {
                    Ok(json!({ "code": 200, "message": "The site is already in the whitelist" }))
                } else {
                    Ok(self.accounts_value())
                }
            }
            "tron_accounts" => Ok(self.accounts_value()),
            "tron_signMessage" => {
                let message = params.get("message").and_then(Value::as_str).unwrap_or_default();
                Ok(Value::String(self.signature_for(message)))
            }
            "tron_signTransaction" => {
                let transaction = params.get("transaction").cloned().unwrap_or(Value::Null);
                Ok(self.sign_transaction_value(&transaction, None))
            }
            "tron_switchChain" | "wallet_switchEthereumChain" => {
                let chain_id = params
                    .get("chainId")
                    .or_else(|| params.get(0).and_then(|p| p.get("chainId")))
                    .and_then(Value::as_str)
                    .ok_or_else(|| ProviderError::rpc(-32602, "missing chainId"))?;
                self.lock().chain_id = chain_id.to_owned();
                Ok(Value::Null)
            }
            "tron_chainId" => Ok(Value::String(self.chain_id())),
            other => Err(ProviderError::rpc(4200, format!("unsupported method {other}"))),
        }
    }
}

#[async_trait]
impl InjectedProvider for SandboxWallet {
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, ProviderError> {
        self.begin(method)?;
        self.handle_request(method, params)
    }

    async fn call(&self, path: &str, args: Vec<Value>) -> Result<Value, ProviderError> {
        self.begin(path)?;
        let first = args.first().cloned().unwrap_or(Value::Null);
        match path {
            "tronWeb.trx.signMessageV2" | "tronWeb.trx.signMessage" | "signMessageV2" => {
                let message = first.as_str().unwrap_or_default().to_owned();
                Ok(Value::String(self.signature_for(&message)))
            }
            "tronWeb.trx.sign" | "signTransaction" => Ok(self.sign_transaction_value(&first, None)),
            "tronWeb.trx.multiSign" => Ok(self.sign_transaction_value(&first, args.get(2))),
            "tronWeb.trx.getBlockByNumber" => {
                let chain_id = self.chain_id();
                let suffix = chain_id.trim_start_matches("0x");
                Ok(json!({
                    "blockID": format!("{}{suffix}", "0".repeat(64 - suffix.len().min(64))),
                    "block_header": { "raw_data": { "number": 0 } },
                }))
            }
            "getAccount" => {
                if let Some(response) = self.approve_connect() {
                    return Ok(response);
                }
                let address = self.lock().accounts.first().cloned().unwrap_or_default();
                Ok(json!({ "address": address }))
            }
            "getChainId" => Ok(Value::String(self.chain_id())),
            "switchChain" if self.lock().switch_chain_method => {
                let chain_id = first
                    .as_str()
                    .ok_or_else(|| ProviderError::rpc(-32602, "missing chainId"))?;
                self.lock().chain_id = chain_id.to_owned();
                Ok(Value::Null)
            }
            "disconnect" => {
                self.lock().ready = false;
                Ok(Value::Null)
            }
            "tron.request" => {
                let method = first.get("method").and_then(Value::as_str).unwrap_or_default();
                let params = first.get("params").cloned();
                self.handle_request(method, params)
            }
            other => Err(ProviderError::Unavailable(other.to_owned())),
        }
    }

    fn property(&self, path: &str) -> Option<Value> {
        let state = self.lock();
        if let Some(value) = state.properties.get(path) {
            return Some(value.clone());
        }
        if state.markers.contains(path) {
            return Some(Value::Bool(true));
        }
        match path {
            "ready" => Some(Value::Bool(state.ready)),
            "tronWeb.defaultAddress.base58" => Some(match state.accounts.first() {
                Some(address) if state.ready => Value::String(address.clone()),
                _ => Value::Bool(false),
            }),
            "tronWeb.fullNode.host" | "tronWeb.solidityNode.host" | "tronWeb.eventServer.host" => {
                drop(state);
                Some(Value::String(self.node_host().to_owned()))
            }
            _ => None,
        }
    }

    fn subscribe(
        &self,
        surface: EventSurface,
        sink: ProviderEventSink,
    ) -> Result<SubscriptionId, ProviderError> {
        if surface == EventSurface::None {
            return Err(ProviderError::Unavailable("event subscription".to_owned()));
        }
        let mut state = self.lock();
        state.next_subscription += 1;
        let id = state.next_subscription;
        state.sinks.insert(id, (surface, sink));
        Ok(SubscriptionId(id))
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().sinks.remove(&id.0);
    }
}
