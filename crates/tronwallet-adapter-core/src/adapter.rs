use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::OnceCell;

use crate::config::AdapterConfig;
use crate::deeplink;
use crate::detector::ReadinessDetector;
use crate::domain::{
    AdapterIdentity, AdapterState, Network, ReadyState, SignedTransaction, Transaction,
};
use crate::error::WalletError;
use crate::events::{AdapterEvent, EventChannel, EventName, ListenerId};
use crate::normalizer::ProviderCalls;
use crate::ports::{
    EventSurface, HostPort, InjectedProvider, MaybeSendSync, ProviderEvent, ProviderEventSink,
    SubscriptionId,
};
use crate::state_machine::{adapter_transition, check_address, ready_transition, TransitionError};
use crate::wallet::{Located, WalletDescriptor};

struct Snapshot {
    ready_state: ReadyState,
    state: AdapterState,
    address: Option<String>,
    connecting: bool,
    located: Option<Located>,
    subscription: Option<(Arc<dyn InjectedProvider>, SubscriptionId)>,
    /// Bumped whenever provider listening stops; sinks from older
    /// generations are ignored.
    listen_generation: u64,
}

/// State and address as they were right before a commit.
#[derive(Debug)]
struct Previous {
    state: AdapterState,
    address: Option<String>,
}

struct AdapterInner {
    wallet: WalletDescriptor,
    config: AdapterConfig,
    host: Arc<dyn HostPort>,
    events: EventChannel,
    detection: OnceCell<ReadyState>,
    snapshot: Mutex<Snapshot>,
}

/// One wallet's connection lifecycle.
///
/// Cheap to clone; clones share state, listeners and the detection result.
#[derive(Clone)]
pub struct Adapter {
    inner: Arc<AdapterInner>,
}

impl Adapter {
    /// Starts wallet detection on the host right away. In a non-browser host
    /// the adapter is `NotFound` from the start and never polls.
    pub fn new(wallet: WalletDescriptor, host: Arc<dyn HostPort>, config: AdapterConfig) -> Self {
        let in_browser = host.is_browser();
        let located = if in_browser {
            wallet.locate(host.as_ref())
        } else {
            None
        };

        let (ready_state, state, detection) = if !in_browser {
            (
                ReadyState::NotFound,
                AdapterState::NotFound,
                OnceCell::new_with(Some(ReadyState::NotFound)),
            )
        } else if located.is_some() {
            (ReadyState::Found, AdapterState::Loading, OnceCell::new())
        } else {
            (ReadyState::Loading, AdapterState::Loading, OnceCell::new())
        };

        let adapter = Self {
            inner: Arc::new(AdapterInner {
                wallet,
                config,
                host,
                events: EventChannel::new(),
                detection,
                snapshot: Mutex::new(Snapshot {
                    ready_state,
                    state,
                    address: None,
                    connecting: false,
                    located,
                    subscription: None,
                    listen_generation: 0,
                }),
            }),
        };

        if in_browser {
            let task = adapter.clone();
            adapter.inner.host.spawn(Box::pin(async move {
                task.detect().await;
            }));
        }
        adapter
    }

    pub fn identity(&self) -> AdapterIdentity {
        self.inner.wallet.identity
    }

    pub fn name(&self) -> &'static str {
        self.inner.wallet.identity.name
    }

    pub fn url(&self) -> &'static str {
        self.inner.wallet.identity.url
    }

    pub fn icon(&self) -> &'static str {
        self.inner.wallet.identity.icon
    }

    pub fn wallet(&self) -> &WalletDescriptor {
        &self.inner.wallet
    }

    pub fn config(&self) -> AdapterConfig {
        self.inner.config
    }

    pub fn address(&self) -> Option<String> {
        self.lock().address.clone()
    }

    pub fn state(&self) -> AdapterState {
        self.lock().state
    }

    pub fn ready_state(&self) -> ReadyState {
        self.lock().ready_state
    }

    pub fn connecting(&self) -> bool {
        self.lock().connecting
    }

    pub fn connected(&self) -> bool {
        self.state() == AdapterState::Connected
    }

    pub fn on<F>(&self, event: EventName, handler: F) -> ListenerId
    where
        F: Fn(&AdapterEvent) + MaybeSendSync + 'static,
    {
        self.inner.events.on(event, handler)
    }

    pub fn off(&self, event: EventName, id: ListenerId) -> bool {
        self.inner.events.off(event, id)
    }

    pub fn remove_all_listeners(&self) {
        self.inner.events.remove_all_listeners();
    }

    pub fn events(&self) -> &EventChannel {
        &self.inner.events
    }

    /// Resolves once detection has settled. Concurrent callers share a single
    /// polling run; later callers get the cached outcome.
    pub async fn detect(&self) -> ReadyState {
        *self
            .inner
            .detection
            .get_or_init(|| self.run_detection())
            .await
    }

    pub async fn connect(&self) -> Result<(), WalletError> {
        let result = self.try_connect().await;
        self.report(result)
    }

    /// Stops provider listening, then tears the connection down locally.
    /// The wallet's own disconnect call, if any, is best-effort.
    pub async fn disconnect(&self) -> Result<(), WalletError> {
        self.stop_listening();
        if self.state() != AdapterState::Connected {
            return Ok(());
        }
        let provider = self.known_provider();
        match self.commit(None, AdapterState::Disconnect, "disconnect") {
            Ok(_) => {
                tracing::info!(wallet = self.name(), "wallet disconnected");
                self.emit(AdapterEvent::Disconnect);
            }
            Err(err) => tracing::warn!(wallet = self.name(), %err, "disconnect rejected"),
        }

        if let Some(provider) = provider {
            let calls = ProviderCalls::new(&self.inner.wallet, provider.as_ref());
            if let Err(err) = calls.disconnect().await {
                tracing::warn!(wallet = self.name(), %err, "wallet disconnect call failed");
            }
        }
        Ok(())
    }

    pub async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
        let result = async {
            let provider = self.connected_provider().await?;
            ProviderCalls::new(&self.inner.wallet, provider.as_ref())
                .sign_message(message)
                .await
        }
        .await;
        self.report(result)
    }

    pub async fn sign_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<SignedTransaction, WalletError> {
        let result = async {
            let provider = self.connected_provider().await?;
            ProviderCalls::new(&self.inner.wallet, provider.as_ref())
                .sign_transaction(transaction)
                .await
        }
        .await;
        self.report(result)
    }

    pub async fn multi_sign(
        &self,
        transaction: &Transaction,
        private_key: Option<&str>,
        permission_id: Option<u32>,
    ) -> Result<SignedTransaction, WalletError> {
        if self.inner.wallet.methods.multi_sign.is_none() {
            return self.report(Err(WalletError::not_implemented("multiSign")));
        }
        let result = async {
            let provider = self.connected_provider().await?;
            ProviderCalls::new(&self.inner.wallet, provider.as_ref())
                .multi_sign(transaction, private_key, permission_id)
                .await
        }
        .await;
        self.report(result)
    }

    pub async fn switch_chain(&self, chain_id: &str) -> Result<(), WalletError> {
        if self.inner.wallet.methods.switch_chain.is_none() {
            return self.report(Err(WalletError::not_implemented("switchChain")));
        }
        let result = async {
            let provider = self.connected_provider().await?;
            ProviderCalls::new(&self.inner.wallet, provider.as_ref())
                .switch_chain(chain_id)
                .await
        }
        .await;
        if result.is_ok() {
            self.emit(AdapterEvent::ChainChanged {
                chain_id: chain_id.to_owned(),
            });
        }
        self.report(result)
    }

    pub async fn network(&self) -> Result<Network, WalletError> {
        if self.inner.wallet.methods.network.is_none() {
            return self.report(Err(WalletError::not_implemented("network")));
        }
        let result = async {
            let provider = self.connected_provider().await?;
            ProviderCalls::new(&self.inner.wallet, provider.as_ref())
                .network()
                .await
        }
        .await;
        self.report(result)
    }

    async fn try_connect(&self) -> Result<(), WalletError> {
        self.check_deep_link()?;
        let Some(_guard) = ConnectingGuard::acquire(self) else {
            return Ok(());
        };

        if self.detect().await == ReadyState::NotFound {
            if self.inner.config.open_url_when_wallet_not_found && self.inner.host.is_browser() {
                self.inner.host.open_window(self.url());
            }
            return Err(WalletError::not_found());
        }
        if self.connected() {
            return Ok(());
        }
        let Located { provider, connect } =
            self.current_location().ok_or_else(WalletError::not_found)?;

        let address = ProviderCalls::new(&self.inner.wallet, provider.as_ref())
            .request_accounts(connect)
            .await?;
        let previous = self
            .commit(Some(address.clone()), AdapterState::Connected, "connect")
            .map_err(|err| WalletError::connection(err.to_string()))?;
        self.listen(&provider);

        tracing::info!(wallet = self.name(), %address, "wallet connected");
        if previous.state != AdapterState::Connected {
            self.emit(AdapterEvent::Connect(address));
        } else if previous.address.as_deref() != Some(address.as_str()) {
            self.emit(AdapterEvent::AccountsChanged {
                address,
                previous: previous.address.unwrap_or_default(),
            });
        }
        Ok(())
    }

    async fn run_detection(&self) -> ReadyState {
        let inner = &self.inner;
        let already_found = self.lock().ready_state == ReadyState::Found;
        let outcome = if already_found {
            ReadyState::Found
        } else {
            let host = inner.host.as_ref();
            ReadinessDetector::new(inner.config.check_timeout())
                .run(host, || inner.wallet.resolve(host).is_some())
                .await
                .outcome
        };

        self.settle_ready(outcome);
        match outcome {
            ReadyState::Found => self.resolve_initial_state().await,
            _ => {
                if let Err(err) = self.commit(None, AdapterState::NotFound, "wallet not detected") {
                    tracing::warn!(wallet = self.name(), %err, "could not mark wallet as missing");
                }
            }
        }
        outcome
    }

    fn settle_ready(&self, outcome: ReadyState) {
        let changed = {
            let mut snapshot = self.lock();
            match ready_transition(snapshot.ready_state, outcome) {
                Ok(next) => {
                    let changed = snapshot.ready_state != next;
                    snapshot.ready_state = next;
                    changed
                }
                Err(err) => {
                    tracing::warn!(wallet = self.name(), %err, "ready state rejected");
                    false
                }
            }
        };
        if changed {
            tracing::debug!(wallet = self.name(), %outcome, "ready state settled");
            self.emit(AdapterEvent::ReadyStateChanged(outcome));
        }
    }

    /// Connected when the wallet already authorized this page, otherwise
    /// Disconnect. Provider listening starts here either way.
    async fn resolve_initial_state(&self) {
        let Some(provider) = self.current_provider() else {
            if let Err(err) = self.commit(None, AdapterState::Disconnect, "provider vanished") {
                tracing::warn!(wallet = self.name(), %err, "initial state rejected");
            }
            return;
        };

        let authorized = match ProviderCalls::new(&self.inner.wallet, provider.as_ref())
            .authorized_address()
            .await
        {
            Ok(address) => address,
            Err(err) => {
                tracing::warn!(wallet = self.name(), %err, "authorization probe failed");
                None
            }
        };
        let state = if authorized.is_some() {
            AdapterState::Connected
        } else {
            AdapterState::Disconnect
        };

        let previous = match self.commit(authorized.clone(), state, "initial authorization") {
            Ok(previous) => previous,
            Err(err) => {
                tracing::warn!(wallet = self.name(), %err, "initial state rejected");
                return;
            }
        };
        self.listen(&provider);
        if let Some(address) = authorized {
            if previous.state != AdapterState::Connected {
                self.emit(AdapterEvent::Connect(address));
            }
        }
    }

    async fn connected_provider(&self) -> Result<Arc<dyn InjectedProvider>, WalletError> {
        self.check_deep_link()?;
        self.detect().await;
        let (state, provider) = {
            let snapshot = self.lock();
            (
                snapshot.state,
                snapshot.located.as_ref().map(|l| Arc::clone(&l.provider)),
            )
        };
        match (state, provider) {
            (AdapterState::Connected, Some(provider)) => Ok(provider),
            _ => Err(WalletError::disconnected()),
        }
    }

    fn known_provider(&self) -> Option<Arc<dyn InjectedProvider>> {
        self.lock()
            .located
            .as_ref()
            .map(|l| Arc::clone(&l.provider))
    }

    fn current_location(&self) -> Option<Located> {
        let known = self.lock().located.clone();
        if known.is_some() {
            return known;
        }
        let located = self.inner.wallet.locate(self.inner.host.as_ref())?;
        self.lock().located = Some(located.clone());
        Some(located)
    }

    fn current_provider(&self) -> Option<Arc<dyn InjectedProvider>> {
        self.current_location().map(|l| l.provider)
    }

    fn check_deep_link(&self) -> Result<(), WalletError> {
        if !self.inner.config.open_app_with_deeplink {
            return Ok(());
        }
        let Some(link) = self.inner.wallet.deep_link else {
            return Ok(());
        };
        let host = self.inner.host.as_ref();
        let present = self.inner.wallet.resolve(host).is_some();
        if deeplink::redirect_if_needed(&link, host, present) {
            Err(WalletError::not_found())
        } else {
            Ok(())
        }
    }

    fn listen(&self, provider: &Arc<dyn InjectedProvider>) {
        self.stop_listening();
        let surface = self.inner.wallet.events;
        if surface == EventSurface::None {
            return;
        }

        let generation = self.lock().listen_generation;
        let weak = Arc::downgrade(&self.inner);
        let sink: ProviderEventSink = Arc::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                Adapter { inner }.handle_provider_event(generation, event);
            }
        });

        match provider.subscribe(surface, sink) {
            Ok(id) => {
                let stale = {
                    let mut snapshot = self.lock();
                    if snapshot.listen_generation == generation {
                        snapshot.subscription = Some((Arc::clone(provider), id));
                        false
                    } else {
                        true
                    }
                };
                if stale {
                    provider.unsubscribe(id);
                }
            }
            Err(err) => {
                tracing::warn!(wallet = self.name(), %err, "could not subscribe to wallet events");
            }
        }
    }

    fn stop_listening(&self) {
        let subscription = {
            let mut snapshot = self.lock();
            snapshot.listen_generation += 1;
            snapshot.subscription.take()
        };
        if let Some((provider, id)) = subscription {
            provider.unsubscribe(id);
        }
    }

    fn handle_provider_event(&self, generation: u64, event: ProviderEvent) {
        tracing::debug!(wallet = self.name(), ?event, "wallet notification");
        match event {
            ProviderEvent::AccountsChanged(accounts) => {
                match accounts.into_iter().find(|a| !a.is_empty()) {
                    Some(address) => {
                        self.provider_connected(generation, address, "accounts changed")
                    }
                    None => self.provider_disconnected(generation, "accounts cleared"),
                }
            }
            ProviderEvent::ChainChanged(chain_id) => {
                if self.lock().listen_generation == generation {
                    self.emit(AdapterEvent::ChainChanged { chain_id });
                }
            }
            ProviderEvent::Connect(address) => {
                let address = address.filter(|a| !a.is_empty()).or_else(|| {
                    let provider = self.known_provider()?;
                    ProviderCalls::new(&self.inner.wallet, provider.as_ref()).snapshot_address()
                });
                match address {
                    Some(address) => self.provider_connected(generation, address, "wallet connect"),
                    None => tracing::debug!(wallet = self.name(), "connect without address"),
                }
            }
            ProviderEvent::Disconnect => self.provider_disconnected(generation, "wallet disconnect"),
        }
    }

    fn provider_connected(&self, generation: u64, address: String, reason: &'static str) {
        let Some(previous) =
            self.commit_for(generation, Some(address.clone()), AdapterState::Connected, reason)
        else {
            return;
        };
        if previous.address.as_deref() != Some(address.as_str()) {
            self.emit(AdapterEvent::AccountsChanged {
                address: address.clone(),
                previous: previous.address.unwrap_or_default(),
            });
        }
        if previous.state != AdapterState::Connected {
            self.emit(AdapterEvent::Connect(address));
        }
    }

    fn provider_disconnected(&self, generation: u64, reason: &'static str) {
        let Some(previous) = self.commit_for(generation, None, AdapterState::Disconnect, reason)
        else {
            return;
        };
        if previous.state == AdapterState::Connected {
            self.emit(AdapterEvent::Disconnect);
        }
    }

    /// Commit on behalf of a provider sink; `None` when the sink is stale or
    /// the move is illegal.
    fn commit_for(
        &self,
        generation: u64,
        address: Option<String>,
        state: AdapterState,
        reason: &'static str,
    ) -> Option<Previous> {
        if let Err(err) = check_address(state, address.as_deref()) {
            tracing::warn!(wallet = self.name(), %err, "wallet notification rejected");
            return None;
        }
        let applied = {
            let mut snapshot = self.lock();
            if snapshot.listen_generation == generation {
                Some(transition_locked(&mut snapshot, address, state, reason))
            } else {
                None
            }
        };
        match applied {
            Some(Ok((previous, changed))) => {
                self.announce(&previous, state, changed, reason);
                Some(previous)
            }
            Some(Err(err)) => {
                tracing::warn!(wallet = self.name(), %err, "wallet notification rejected");
                None
            }
            None => {
                tracing::debug!(wallet = self.name(), reason, "stale wallet notification ignored");
                None
            }
        }
    }

    /// Updates state and address together, then announces the state change.
    fn commit(
        &self,
        address: Option<String>,
        state: AdapterState,
        reason: &'static str,
    ) -> Result<Previous, TransitionError> {
        check_address(state, address.as_deref())?;
        let (previous, changed) = transition_locked(&mut self.lock(), address, state, reason)?;
        self.announce(&previous, state, changed, reason);
        Ok(previous)
    }

    fn announce(&self, previous: &Previous, state: AdapterState, changed: bool, reason: &str) {
        if changed {
            tracing::debug!(wallet = self.name(), from = %previous.state, to = %state, reason, "state changed");
            self.emit(AdapterEvent::StateChanged(state));
        }
    }

    fn report<T>(&self, result: Result<T, WalletError>) -> Result<T, WalletError> {
        if let Err(err) = &result {
            tracing::debug!(wallet = self.name(), %err, "operation failed");
            self.emit(AdapterEvent::Error(err.clone()));
        }
        result
    }

    fn emit(&self, event: AdapterEvent) {
        self.inner.events.emit(&event);
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.inner
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.lock();
        f.debug_struct("Adapter")
            .field("name", &self.name())
            .field("ready_state", &snapshot.ready_state)
            .field("state", &snapshot.state)
            .field("address", &snapshot.address)
            .field("connecting", &snapshot.connecting)
            .finish()
    }
}

fn transition_locked(
    snapshot: &mut Snapshot,
    address: Option<String>,
    state: AdapterState,
    reason: &'static str,
) -> Result<(Previous, bool), TransitionError> {
    let transition = adapter_transition(snapshot.state, state, reason)?;
    let previous = Previous {
        state: snapshot.state,
        address: std::mem::replace(&mut snapshot.address, address),
    };
    snapshot.state = state;
    Ok((previous, !transition.is_noop()))
}

/// Holds the `connecting` flag for the duration of one connect attempt.
struct ConnectingGuard {
    inner: Arc<AdapterInner>,
}

impl ConnectingGuard {
    fn acquire(adapter: &Adapter) -> Option<Self> {
        let mut snapshot = adapter.lock();
        if snapshot.connecting || snapshot.state == AdapterState::Connected {
            return None;
        }
        snapshot.connecting = true;
        Some(Self {
            inner: Arc::clone(&adapter.inner),
        })
    }
}

impl Drop for ConnectingGuard {
    fn drop(&mut self) {
        self.inner
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .connecting = false;
    }
}
