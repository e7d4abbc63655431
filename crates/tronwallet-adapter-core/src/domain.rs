use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether the wallet's injected provider has been detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadyState {
    Loading,
    Found,
    NotFound,
}

impl ReadyState {
    pub fn is_settled(self) -> bool {
        !matches!(self, ReadyState::Loading)
    }
}

/// Connection lifecycle of one adapter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdapterState {
    Loading,
    NotFound,
    Disconnect,
    Connected,
}

impl fmt::Display for AdapterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdapterState::Loading => "Loading",
            AdapterState::NotFound => "NotFound",
            AdapterState::Disconnect => "Disconnect",
            AdapterState::Connected => "Connected",
        };
        f.write_str(name)
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReadyState::Loading => "Loading",
            ReadyState::Found => "Found",
            ReadyState::NotFound => "NotFound",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkType {
    Mainnet,
    Shasta,
    Nile,
    Unknown,
}

impl NetworkType {
    pub const MAINNET_CHAIN_ID: &'static str = "0x2b6653dc";
    pub const SHASTA_CHAIN_ID: &'static str = "0x94a9059e";
    pub const NILE_CHAIN_ID: &'static str = "0xcd8690dc";

    pub fn from_chain_id(chain_id: &str) -> Self {
        match chain_id.to_ascii_lowercase().as_str() {
            Self::MAINNET_CHAIN_ID => NetworkType::Mainnet,
            Self::SHASTA_CHAIN_ID => NetworkType::Shasta,
            Self::NILE_CHAIN_ID => NetworkType::Nile,
            _ => NetworkType::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub network_type: NetworkType,
    pub chain_id: String,
    pub full_node: String,
    pub solidity_node: String,
    pub event_server: String,
}

impl Network {
    pub fn from_chain_id(chain_id: impl Into<String>) -> Self {
        let chain_id = chain_id.into();
        Self {
            network_type: NetworkType::from_chain_id(&chain_id),
            chain_id,
            full_node: String::new(),
            solidity_node: String::new(),
            event_server: String::new(),
        }
    }
}

/// Unsigned transaction as built by the dApp's TRON SDK. Opaque to the adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction(pub Value);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignedTransaction(pub Value);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterIdentity {
    pub name: &'static str,
    pub url: &'static str,
    pub icon: &'static str,
}
