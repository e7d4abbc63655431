pub mod adapter;
pub mod config;
pub mod deeplink;
pub mod detector;
pub mod domain;
pub mod error;
pub mod events;
pub mod normalizer;
pub mod ports;
pub mod state_machine;
pub mod wallet;

pub use adapter::Adapter;
pub use config::{AdapterConfig, ConfigError};
pub use deeplink::{redirect_if_needed, DeepLink};
pub use detector::{Detection, ReadinessDetector};
pub use domain::{
    AdapterIdentity, AdapterState, Network, NetworkType, ReadyState, SignedTransaction,
    Transaction,
};
pub use error::{ErrorKind, WalletError};
pub use events::{AdapterEvent, EventChannel, EventName, ListenerId};
pub use normalizer::ProviderCalls;
pub use ports::{
    EventSurface, HostPort, HostTask, InjectedProvider, MaybeSendSync, ProviderError,
    ProviderEvent, ProviderEventSink, SubscriptionId,
};
pub use state_machine::{
    adapter_transition, check_address, ready_transition, StateTransition, TransitionError,
};
pub use wallet::{
    AddressSource, Announcement, AuthorizationProbe, Call, ConnectCall, Injection, Located,
    NetworkQuery, WalletDescriptor, WalletMethods,
};
