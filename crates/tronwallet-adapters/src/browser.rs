//! Browser bindings: the page's `window` as host, injected objects reached
//! through `js_sys::Reflect`.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use tronwallet_adapter_core::{
    EventSurface, HostPort, HostTask, InjectedProvider, ProviderError, ProviderEvent,
    ProviderEventSink, SubscriptionId,
};

const MOBILE_MARKERS: [&str; 5] = ["android", "iphone", "ipad", "ipod", "mobile"];
const PROVIDER_EVENTS: [&str; 4] = ["accountsChanged", "chainChanged", "connect", "disconnect"];
const ANNOUNCE_EVENT: &str = "TIP6963:announceProvider";
const REQUEST_EVENT: &str = "TIP6963:requestProvider";

type JsListener = Closure<dyn FnMut(JsValue)>;

#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserHost;

#[async_trait(?Send)]
impl HostPort for BrowserHost {
    fn is_browser(&self) -> bool {
        web_sys::window().is_some()
    }

    fn is_mobile(&self) -> bool {
        let agent = self.user_agent().to_ascii_lowercase();
        MOBILE_MARKERS.iter().any(|marker| agent.contains(marker))
    }

    fn user_agent(&self) -> String {
        web_sys::window()
            .and_then(|w| w.navigator().user_agent().ok())
            .unwrap_or_default()
    }

    fn location_href(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().href().ok())
            .unwrap_or_default()
    }

    fn navigate(&self, url: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(err) = window.location().set_href(url) {
            tracing::warn!(?err, %url, "navigation failed");
        }
    }

    fn open_window(&self, url: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(err) = window.open_with_url_and_target(url, "_blank") {
            tracing::warn!(?err, %url, "window.open failed");
        }
    }

    fn lookup(&self, path: &str) -> Option<Arc<dyn InjectedProvider>> {
        let window = web_sys::window()?;
        resolve(&JsValue::from(window), path)?;
        Some(Arc::new(BrowserProvider::new(path)))
    }

    /// Dispatches a TIP-6963 request and keeps the first matching
    /// announcement. Wallets answer the request synchronously.
    fn announced(&self, name: &str, rdns: &str) -> Option<Arc<dyn InjectedProvider>> {
        let window = web_sys::window()?;
        let found: Rc<RefCell<Option<JsValue>>> = Rc::default();
        let listener = {
            let found = Rc::clone(&found);
            let (name, rdns) = (name.to_owned(), rdns.to_owned());
            JsListener::new(move |event: JsValue| {
                if found.borrow().is_some() {
                    return;
                }
                let matches = |key: &str, expected: &str| {
                    resolve(&event, key)
                        .and_then(|v| v.as_string())
                        .is_some_and(|v| v.eq_ignore_ascii_case(expected))
                };
                if matches("detail.info.name", &name) || matches("detail.info.rdns", &rdns) {
                    *found.borrow_mut() = resolve(&event, "detail.provider");
                }
            })
        };
        let callback = listener.as_ref().unchecked_ref();
        window
            .add_event_listener_with_callback(ANNOUNCE_EVENT, callback)
            .ok()?;
        let requested =
            web_sys::Event::new(REQUEST_EVENT).and_then(|event| window.dispatch_event(&event));
        if let Err(err) = requested {
            tracing::warn!(?err, "TIP-6963 request failed");
        }
        let _ = window.remove_event_listener_with_callback(ANNOUNCE_EVENT, callback);

        let provider = found.borrow_mut().take()?;
        tracing::debug!(%name, "provider found through TIP-6963");
        Some(Arc::new(BrowserProvider::from_object(name, provider)))
    }

    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }

    fn spawn(&self, task: HostTask) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

enum Subscription {
    Provider(Vec<(&'static str, JsListener)>),
    Window(JsListener),
}

/// Where the provider object lives.
#[derive(Clone)]
enum Root {
    /// Global path, re-resolved on every use so a wallet that replaces its
    /// object is still reached.
    Global(String),
    /// Object handed over in a TIP-6963 announcement.
    Announced(JsValue),
}

impl Root {
    fn object(&self) -> Option<JsValue> {
        match self {
            Root::Global(path) => web_sys::window().and_then(|w| resolve(&JsValue::from(w), path)),
            Root::Announced(object) => Some(object.clone()),
        }
    }
}

pub struct BrowserProvider {
    root: Root,
    label: String,
    next_id: Cell<u64>,
    subscriptions: RefCell<BTreeMap<u64, Subscription>>,
}

impl BrowserProvider {
    pub fn new(path: &str) -> Self {
        Self::with_root(Root::Global(path.to_owned()), path)
    }

    /// Provider object received from an announcement under `name`.
    pub fn from_object(name: &str, object: JsValue) -> Self {
        Self::with_root(Root::Announced(object), name)
    }

    fn with_root(root: Root, label: &str) -> Self {
        Self {
            root,
            label: label.to_owned(),
            next_id: Cell::new(0),
            subscriptions: RefCell::new(BTreeMap::new()),
        }
    }

    fn object(&self) -> Result<JsValue, ProviderError> {
        self.root
            .object()
            .ok_or_else(|| ProviderError::Unavailable(self.label.clone()))
    }

    async fn apply(&self, path: &str, args: &js_sys::Array) -> Result<Value, ProviderError> {
        let target = self.object()?;
        let (parent, name) = match path.rsplit_once('.') {
            Some((parent_path, name)) => (
                resolve(&target, parent_path)
                    .ok_or_else(|| ProviderError::Unavailable(path.to_owned()))?,
                name,
            ),
            None => (target, path),
        };
        let function = js_sys::Reflect::get(&parent, &JsValue::from_str(name))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
            .ok_or_else(|| ProviderError::Unavailable(path.to_owned()))?;

        let result = function.apply(&parent, args).map_err(js_error)?;
        let result = match result.dyn_into::<js_sys::Promise>() {
            Ok(promise) => wasm_bindgen_futures::JsFuture::from(promise)
                .await
                .map_err(js_error)?,
            Err(value) => value,
        };
        from_js(result)
    }

    fn subscribe_provider(&self, sink: ProviderEventSink) -> Result<Subscription, ProviderError> {
        let target = self.object()?;
        let on = method(&target, "on")?;
        let mut listeners = Vec::with_capacity(PROVIDER_EVENTS.len());
        for name in PROVIDER_EVENTS {
            let sink = Arc::clone(&sink);
            let listener = JsListener::new(move |value: JsValue| {
                if let Some(event) = provider_event(name, &value) {
                    sink(event);
                }
            });
            on.call2(&target, &JsValue::from_str(name), listener.as_ref().unchecked_ref())
                .map_err(js_error)?;
            listeners.push((name, listener));
        }
        Ok(Subscription::Provider(listeners))
    }

    fn subscribe_window(&self, sink: ProviderEventSink) -> Result<Subscription, ProviderError> {
        let window = web_sys::window()
            .ok_or_else(|| ProviderError::Unavailable("window".to_owned()))?;
        let root = self.root.clone();
        let listener = JsListener::new(move |value: JsValue| {
            let Ok(event) = value.dyn_into::<web_sys::MessageEvent>() else {
                return;
            };
            let Some(message) = resolve(&event.data(), "message") else {
                return;
            };
            let ready = root
                .object()
                .and_then(|object| resolve(&object, "ready"))
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            if let Some(event) = window_message_event(&message, ready) {
                sink(event);
            }
        });
        window
            .add_event_listener_with_callback("message", listener.as_ref().unchecked_ref())
            .map_err(js_error)?;
        Ok(Subscription::Window(listener))
    }
}

#[async_trait(?Send)]
impl InjectedProvider for BrowserProvider {
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, ProviderError> {
        let mut request = json!({ "method": method });
        if let Some(params) = params {
            request["params"] = params;
        }
        let args = js_sys::Array::of1(&to_js(&request)?);
        self.apply("request", &args).await
    }

    async fn call(&self, path: &str, args: Vec<Value>) -> Result<Value, ProviderError> {
        let array = js_sys::Array::new();
        for arg in &args {
            array.push(&to_js(arg)?);
        }
        self.apply(path, &array).await
    }

    fn property(&self, path: &str) -> Option<Value> {
        let value = resolve(&self.object().ok()?, path)?;
        from_js(value).ok()
    }

    fn subscribe(
        &self,
        surface: EventSurface,
        sink: ProviderEventSink,
    ) -> Result<SubscriptionId, ProviderError> {
        let subscription = match surface {
            EventSurface::ProviderOn => self.subscribe_provider(sink)?,
            EventSurface::WindowMessage => self.subscribe_window(sink)?,
            EventSurface::None => {
                return Err(ProviderError::Unavailable("event subscription".to_owned()))
            }
        };
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.subscriptions.borrow_mut().insert(id, subscription);
        Ok(SubscriptionId(id))
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let Some(subscription) = self.subscriptions.borrow_mut().remove(&id.0) else {
            return;
        };
        match subscription {
            Subscription::Provider(listeners) => {
                let Ok(target) = self.object() else {
                    return;
                };
                let Ok(remove) = method(&target, "removeListener") else {
                    tracing::debug!(provider = %self.label, "provider has no removeListener");
                    return;
                };
                for (name, listener) in listeners {
                    if let Err(err) =
                        remove.call2(&target, &JsValue::from_str(name), listener.as_ref().unchecked_ref())
                    {
                        tracing::warn!(?err, name, "removeListener failed");
                    }
                }
            }
            Subscription::Window(listener) => {
                if let Some(window) = web_sys::window() {
                    let _ = window.remove_event_listener_with_callback(
                        "message",
                        listener.as_ref().unchecked_ref(),
                    );
                }
            }
        }
    }
}

/// Walk a dotted path from `root`; `None` when any segment is missing.
fn resolve(root: &JsValue, path: &str) -> Option<JsValue> {
    path.split('.').try_fold(root.clone(), |object, key| {
        let next = js_sys::Reflect::get(&object, &JsValue::from_str(key)).ok()?;
        (!next.is_undefined() && !next.is_null()).then_some(next)
    })
}

fn method(target: &JsValue, name: &str) -> Result<js_sys::Function, ProviderError> {
    js_sys::Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
        .ok_or_else(|| ProviderError::Unavailable(name.to_owned()))
}

fn to_js(value: &Value) -> Result<JsValue, ProviderError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| ProviderError::Thrown(format!("failed to encode provider argument: {e}")))
}

fn from_js(value: JsValue) -> Result<Value, ProviderError> {
    if value.is_undefined() {
        return Ok(Value::Null);
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| ProviderError::Thrown(format!("failed to decode provider result: {e}")))
}

/// Fold a thrown JS value into one of the three provider failure shapes.
fn js_error(err: JsValue) -> ProviderError {
    if let Some(message) = err.as_string() {
        return ProviderError::Thrown(message);
    }
    let code = js_sys::Reflect::get(&err, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64());
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        let message = String::from(error.message());
        return match code {
            Some(code) => ProviderError::rpc(code as i64, message),
            None => ProviderError::Thrown(message),
        };
    }
    match serde_wasm_bindgen::from_value::<Value>(err.clone()) {
        Ok(value) => match (code, value.get("message").and_then(Value::as_str)) {
            (Some(code), Some(message)) => ProviderError::rpc(code as i64, message),
            _ => ProviderError::Opaque(value),
        },
        Err(_) => ProviderError::Thrown(format!("{err:?}")),
    }
}

fn provider_event(name: &str, value: &JsValue) -> Option<ProviderEvent> {
    match name {
        "accountsChanged" => {
            let accounts = if js_sys::Array::is_array(value) {
                js_sys::Array::from(value)
                    .iter()
                    .filter_map(|item| item.as_string())
                    .collect()
            } else {
                value.as_string().into_iter().collect()
            };
            Some(ProviderEvent::AccountsChanged(accounts))
        }
        "chainChanged" => value
            .as_string()
            .or_else(|| resolve(value, "chainId").and_then(|c| c.as_string()))
            .map(ProviderEvent::ChainChanged),
        "connect" => Some(ProviderEvent::Connect(None)),
        "disconnect" => Some(ProviderEvent::Disconnect),
        _ => None,
    }
}

/// TronLink-style `{ action, data }` window messages.
fn window_message_event(message: &JsValue, ready: bool) -> Option<ProviderEvent> {
    let action = resolve(message, "action")?.as_string()?;
    match action.as_str() {
        "accountsChanged" => {
            let address = resolve(message, "data.address").and_then(|a| a.as_string());
            let accounts = match address {
                Some(address) if ready && !address.is_empty() => vec![address],
                _ => Vec::new(),
            };
            Some(ProviderEvent::AccountsChanged(accounts))
        }
        "connect" => Some(ProviderEvent::Connect(None)),
        "disconnect" => Some(ProviderEvent::Disconnect),
        _ => None,
    }
}
