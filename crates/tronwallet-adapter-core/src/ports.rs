use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// `Send + Sync` on native targets, nothing on `wasm32` where the host is
/// single-threaded and JS handles are `!Send`.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> MaybeSendSync for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSendSync {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSendSync for T {}

#[cfg(not(target_arch = "wasm32"))]
pub type ProviderEventSink = Arc<dyn Fn(ProviderEvent) + Send + Sync>;
#[cfg(target_arch = "wasm32")]
pub type ProviderEventSink = Arc<dyn Fn(ProviderEvent)>;

#[cfg(not(target_arch = "wasm32"))]
pub type HostTask = futures_util::future::BoxFuture<'static, ()>;
#[cfg(target_arch = "wasm32")]
pub type HostTask = futures_util::future::LocalBoxFuture<'static, ()>;

/// Failure shapes a wallet provider can produce.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("{message} (code {code})")]
    Rpc { code: i64, message: String },
    #[error("{0}")]
    Thrown(String),
    #[error("{}", opaque_message(.0))]
    Opaque(Value),
    #[error("provider does not expose {0}")]
    Unavailable(String),
}

impl ProviderError {
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Rpc { code, .. } => Some(*code),
            Self::Opaque(value) => value.get("code").and_then(Value::as_i64),
            _ => None,
        }
    }

    /// Human-readable text regardless of how the provider failed.
    pub fn message(&self) -> String {
        match self {
            Self::Rpc { message, .. } => message.clone(),
            Self::Thrown(message) => message.clone(),
            Self::Opaque(value) => opaque_message(value),
            Self::Unavailable(path) => format!("provider does not expose {path}"),
        }
    }
}

fn opaque_message(value: &Value) -> String {
    match value.get("message").and_then(Value::as_str) {
        Some(message) => message.to_owned(),
        None => value.to_string(),
    }
}

/// Notification from the wallet, already reduced from its native surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(String),
    Connect(Option<String>),
    Disconnect,
}

/// Where a wallet publishes its notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSurface {
    /// `provider.on(name, handler)` / `removeListener`.
    ProviderOn,
    /// Window `message` events carrying `{ action, data }`.
    WindowMessage,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// The wallet-owned object injected into the host.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait InjectedProvider: MaybeSendSync {
    /// `provider.request({ method, params })`.
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, ProviderError>;

    /// Positional call of a named method, e.g. `tronWeb.trx.signMessageV2`.
    async fn call(&self, path: &str, args: Vec<Value>) -> Result<Value, ProviderError>;

    fn property(&self, path: &str) -> Option<Value>;

    fn subscribe(
        &self,
        surface: EventSurface,
        sink: ProviderEventSink,
    ) -> Result<SubscriptionId, ProviderError>;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// The host environment the adapter runs in.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait HostPort: MaybeSendSync {
    fn is_browser(&self) -> bool;
    fn is_mobile(&self) -> bool;
    fn user_agent(&self) -> String;
    fn location_href(&self) -> String;
    /// Same-context redirect.
    fn navigate(&self, url: &str);
    /// New tab or window.
    fn open_window(&self, url: &str);
    /// Injected object at a dotted global path, if present.
    fn lookup(&self, path: &str) -> Option<Arc<dyn InjectedProvider>>;
    /// Provider that answered a TIP-6963 request with a matching name or
    /// rdns (case-insensitive).
    fn announced(&self, _name: &str, _rdns: &str) -> Option<Arc<dyn InjectedProvider>> {
        None
    }
    async fn sleep(&self, duration: Duration);
    fn spawn(&self, task: HostTask);
}
