use std::sync::Arc;

use serde_json::Value;

use crate::deeplink::DeepLink;
use crate::domain::AdapterIdentity;
use crate::ports::{EventSurface, HostPort, InjectedProvider};

/// How an operation reaches the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    /// `provider.request({ method, params })` with object params.
    Request(&'static str),
    /// `provider.request({ method, params: [params] })`.
    RequestList(&'static str),
    /// `provider.<target>.request({ method, params })`.
    RequestAt {
        target: &'static str,
        method: &'static str,
    },
    /// Positional call of a named method, e.g. `tronWeb.trx.sign`.
    Method(&'static str),
    /// `provider.<path>(arg)` when the provider exposes it, otherwise
    /// `provider.request({ method, params })`.
    MethodOrRequest {
        path: &'static str,
        method: &'static str,
    },
}

impl Call {
    pub fn label(&self) -> &'static str {
        match self {
            Call::Request(m) | Call::RequestList(m) | Call::RequestAt { method: m, .. } => m,
            Call::Method(path) | Call::MethodOrRequest { path, .. } => path,
        }
    }
}

/// Where the connected address comes from once the account request succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSource {
    /// First entry of the returned account list.
    FirstAccount,
    /// Named field of the returned object.
    ResultField(&'static str),
    /// Property read on the provider after the call.
    Property(&'static str),
}

/// How to tell whether the dApp is already authorized at detection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationProbe {
    /// Boolean `ready` property, address read from `address`.
    ReadyFlag {
        ready: &'static str,
        address: &'static str,
    },
    /// Request returning the authorized account list.
    Request(&'static str),
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkQuery {
    /// Chain id from the genesis block id, node hosts from `tronWeb`.
    GenesisBlock,
    /// A call returning the chain id directly.
    ChainId(Call),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletMethods {
    pub connect: Call,
    pub address: AddressSource,
    pub authorized: AuthorizationProbe,
    pub sign_message: Option<Call>,
    pub sign_transaction: Option<Call>,
    pub multi_sign: Option<Call>,
    pub switch_chain: Option<Call>,
    pub network: Option<NetworkQuery>,
    pub disconnect: Option<Call>,
}

impl WalletMethods {
    /// Surface shared by TronLink-compatible injections.
    pub const TRONLINK: WalletMethods = WalletMethods {
        connect: Call::Request("tron_requestAccounts"),
        address: AddressSource::Property("tronWeb.defaultAddress.base58"),
        authorized: AuthorizationProbe::ReadyFlag {
            ready: "ready",
            address: "tronWeb.defaultAddress.base58",
        },
        sign_message: Some(Call::Method("tronWeb.trx.signMessageV2")),
        sign_transaction: Some(Call::Method("tronWeb.trx.sign")),
        multi_sign: Some(Call::Method("tronWeb.trx.multiSign")),
        switch_chain: None,
        network: Some(NetworkQuery::GenesisBlock),
        disconnect: None,
    };
}

/// Account request used in place of [`WalletMethods::connect`] for one
/// injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectCall {
    pub call: Call,
    pub address: AddressSource,
}

/// Candidate global path for the injected provider. With a marker, the
/// object only counts when `marker` reads `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Injection {
    pub path: &'static str,
    pub marker: Option<&'static str>,
    pub connect: Option<ConnectCall>,
}

impl Injection {
    pub const fn at(path: &'static str) -> Self {
        Self {
            path,
            marker: None,
            connect: None,
        }
    }

    pub const fn marked(path: &'static str, marker: &'static str) -> Self {
        Self {
            path,
            marker: Some(marker),
            connect: None,
        }
    }

    pub const fn connecting_with(mut self, call: Call, address: AddressSource) -> Self {
        self.connect = Some(ConnectCall { call, address });
        self
    }
}

/// TIP-6963 identity a wallet announces itself with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Announcement {
    pub name: &'static str,
    pub rdns: &'static str,
}

/// A provider found on the host, with the account request to use for it.
#[derive(Clone)]
pub struct Located {
    pub provider: Arc<dyn InjectedProvider>,
    pub connect: ConnectCall,
}

/// Everything that distinguishes one wallet from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletDescriptor {
    pub identity: AdapterIdentity,
    pub injections: &'static [Injection],
    /// Announcement matched when no injection is present.
    pub announcement: Option<Announcement>,
    pub methods: WalletMethods,
    pub events: EventSurface,
    pub deep_link: Option<DeepLink>,
}

impl WalletDescriptor {
    pub fn name(&self) -> &'static str {
        self.identity.name
    }

    /// First injection present in `host`, then the announced provider.
    pub fn locate(&self, host: &dyn HostPort) -> Option<Located> {
        let default_connect = ConnectCall {
            call: self.methods.connect,
            address: self.methods.address,
        };
        let injected = self.injections.iter().find_map(|injection| {
            let provider = host.lookup(injection.path)?;
            match injection.marker {
                Some(marker) if provider.property(marker) != Some(Value::Bool(true)) => None,
                _ => Some(Located {
                    provider,
                    connect: injection.connect.unwrap_or(default_connect),
                }),
            }
        });
        injected.or_else(|| {
            let announcement = self.announcement?;
            let provider = host.announced(announcement.name, announcement.rdns)?;
            Some(Located {
                provider,
                connect: default_connect,
            })
        })
    }

    pub fn resolve(&self, host: &dyn HostPort) -> Option<Arc<dyn InjectedProvider>> {
        self.locate(host).map(|located| located.provider)
    }
}
