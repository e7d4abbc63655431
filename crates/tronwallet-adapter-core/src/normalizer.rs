use serde_json::{json, Value};

use crate::domain::{Network, NetworkType, SignedTransaction, Transaction};
use crate::error::{ErrorKind, WalletError};
use crate::ports::{InjectedProvider, ProviderError};
use crate::wallet::{
    AddressSource, AuthorizationProbe, Call, ConnectCall, NetworkQuery, WalletDescriptor,
};

pub const CONNECT_FAILED: &str = "Request connect error.";
pub const CONNECT_PENDING: &str =
    "The same DApp has already initiated a request to connect to the wallet, and the pop-up window has not been closed.";
pub const CONNECT_REJECTED: &str = "The user rejected connection.";
pub const NO_ACCOUNT: &str = "The wallet did not return an account.";

const CODE_PENDING: i64 = 4000;
const CODE_REJECTED: i64 = 4001;

/// Maps abstract wallet operations onto one wallet's request surface and
/// folds every failure into [`WalletError`].
pub struct ProviderCalls<'a> {
    wallet: &'a WalletDescriptor,
    provider: &'a dyn InjectedProvider,
}

impl<'a> ProviderCalls<'a> {
    pub fn new(wallet: &'a WalletDescriptor, provider: &'a dyn InjectedProvider) -> Self {
        Self { wallet, provider }
    }

    async fn invoke(
        &self,
        call: Call,
        params: Option<Value>,
        args: Vec<Value>,
    ) -> Result<Value, ProviderError> {
        tracing::debug!(wallet = self.wallet.name(), call = call.label(), "provider call");
        match call {
            Call::Request(method) => self.provider.request(method, params).await,
            Call::RequestList(method) => {
                let list = Value::Array(params.into_iter().collect());
                self.provider.request(method, Some(list)).await
            }
            Call::RequestAt { target, method } => {
                let mut request = json!({ "method": method });
                if let Some(params) = params {
                    request["params"] = params;
                }
                self.provider
                    .call(&format!("{target}.request"), vec![request])
                    .await
            }
            Call::Method(path) => self.provider.call(path, args).await,
            Call::MethodOrRequest { path, method } => {
                match self.provider.call(path, args).await {
                    Err(ProviderError::Unavailable(_)) => {
                        self.provider.request(method, params).await
                    }
                    other => other,
                }
            }
        }
    }

    fn read_string(&self, path: &str) -> Option<String> {
        self.provider
            .property(path)
            .and_then(|v| v.as_str().map(str::to_owned))
            .filter(|s| !s.is_empty())
    }

    /// Account request through `connect`, which may differ per injection.
    pub async fn request_accounts(&self, connect: ConnectCall) -> Result<String, WalletError> {
        let response = self
            .invoke(connect.call, None, Vec::new())
            .await
            .map_err(connect_error)?;
        check_connect_response(&response)?;

        let address = match connect.address {
            AddressSource::FirstAccount => first_account(&response),
            AddressSource::ResultField(field) => response
                .get(field)
                .and_then(Value::as_str)
                .map(str::to_owned),
            AddressSource::Property(path) => self.read_string(path),
        };
        address
            .filter(|a| !a.is_empty())
            .ok_or_else(|| WalletError::connection(NO_ACCOUNT))
    }

    /// Address the wallet already authorized for this page, if any.
    pub async fn authorized_address(&self) -> Result<Option<String>, ProviderError> {
        match self.wallet.methods.authorized {
            AuthorizationProbe::ReadyFlag { ready, address } => {
                if self.provider.property(ready) == Some(Value::Bool(true)) {
                    Ok(self.read_string(address))
                } else {
                    Ok(None)
                }
            }
            AuthorizationProbe::Request(method) => {
                let accounts = self.provider.request(method, None).await?;
                Ok(first_account(&accounts))
            }
            AuthorizationProbe::Never => Ok(None),
        }
    }

    /// Current address readable without a request.
    pub fn snapshot_address(&self) -> Option<String> {
        match (self.wallet.methods.address, self.wallet.methods.authorized) {
            (AddressSource::Property(path), _) => self.read_string(path),
            (_, AuthorizationProbe::ReadyFlag { address, .. }) => self.read_string(address),
            _ => None,
        }
    }

    pub async fn sign_message(&self, message: &str) -> Result<String, WalletError> {
        let call = self
            .wallet
            .methods
            .sign_message
            .ok_or_else(|| WalletError::not_implemented("signMessage"))?;
        let signature = self
            .invoke(
                call,
                Some(json!({ "message": message })),
                vec![Value::String(message.to_owned())],
            )
            .await
            .map_err(|e| WalletError::from_provider(ErrorKind::SignMessage, e))?;
        match signature {
            Value::String(s) => Ok(s),
            other => Err(WalletError::from_provider(
                ErrorKind::SignMessage,
                ProviderError::Opaque(json!({
                    "message": "wallet returned a non-string signature",
                    "result": other,
                })),
            )),
        }
    }

    pub async fn sign_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<SignedTransaction, WalletError> {
        let call = self
            .wallet
            .methods
            .sign_transaction
            .ok_or_else(|| WalletError::not_implemented("signTransaction"))?;
        self.invoke(
            call,
            Some(json!({ "transaction": transaction })),
            vec![transaction.0.clone()],
        )
        .await
        .map(SignedTransaction)
        .map_err(|e| WalletError::from_provider(ErrorKind::SignTransaction, e))
    }

    pub async fn multi_sign(
        &self,
        transaction: &Transaction,
        private_key: Option<&str>,
        permission_id: Option<u32>,
    ) -> Result<SignedTransaction, WalletError> {
        let call = self
            .wallet
            .methods
            .multi_sign
            .ok_or_else(|| WalletError::not_implemented("multiSign"))?;

        let mut args = vec![transaction.0.clone()];
        match (private_key, permission_id) {
            (Some(key), _) => args.push(Value::String(key.to_owned())),
            (None, Some(_)) => args.push(Value::Bool(false)),
            (None, None) => {}
        }
        if let Some(id) = permission_id {
            args.push(Value::from(id));
        }
        let params = json!({
            "transaction": transaction,
            "privateKey": private_key,
            "permissionId": permission_id,
        });

        self.invoke(call, Some(params), args)
            .await
            .map(SignedTransaction)
            .map_err(|e| WalletError::from_provider(ErrorKind::SignTransaction, e))
    }

    pub async fn switch_chain(&self, chain_id: &str) -> Result<(), WalletError> {
        let call = self
            .wallet
            .methods
            .switch_chain
            .ok_or_else(|| WalletError::not_implemented("switchChain"))?;
        self.invoke(
            call,
            Some(json!({ "chainId": chain_id })),
            vec![Value::String(chain_id.to_owned())],
        )
        .await
        .map(|_| ())
        .map_err(|e| WalletError::from_provider(ErrorKind::SwitchChain, e))
    }

    pub async fn network(&self) -> Result<Network, WalletError> {
        let query = self
            .wallet
            .methods
            .network
            .ok_or_else(|| WalletError::not_implemented("network"))?;
        let result = match query {
            NetworkQuery::GenesisBlock => self.genesis_network().await,
            NetworkQuery::ChainId(call) => self
                .invoke(call, None, Vec::new())
                .await
                .and_then(|raw| chain_id_string(&raw))
                .map(Network::from_chain_id),
        };
        result.map_err(|e| WalletError::from_provider(ErrorKind::GetNetwork, e))
    }

    async fn genesis_network(&self) -> Result<Network, ProviderError> {
        let block = self
            .provider
            .call("tronWeb.trx.getBlockByNumber", vec![Value::from(0)])
            .await?;
        let block_id = block
            .get("blockID")
            .and_then(Value::as_str)
            .filter(|id| id.len() >= 8 && id.is_ascii())
            .ok_or_else(|| ProviderError::Opaque(json!({ "message": "genesis block has no blockID" })))?;
        let chain_id = format!("0x{}", &block_id[block_id.len() - 8..]);
        let host = |path: &str| self.read_string(path).unwrap_or_default();
        Ok(Network {
            network_type: NetworkType::from_chain_id(&chain_id),
            chain_id,
            full_node: host("tronWeb.fullNode.host"),
            solidity_node: host("tronWeb.solidityNode.host"),
            event_server: host("tronWeb.eventServer.host"),
        })
    }

    /// `Ok(())` for wallets without a disconnect call.
    pub async fn disconnect(&self) -> Result<(), WalletError> {
        let Some(call) = self.wallet.methods.disconnect else {
            return Ok(());
        };
        self.invoke(call, None, Vec::new())
            .await
            .map(|_| ())
            .map_err(|e| WalletError::from_provider(ErrorKind::Disconnection, e))
    }
}

fn connect_error(err: ProviderError) -> WalletError {
    let message = match err.code() {
        Some(CODE_PENDING) => CONNECT_PENDING.to_owned(),
        Some(CODE_REJECTED) => CONNECT_REJECTED.to_owned(),
        _ => err.message(),
    };
    match WalletError::from_provider(ErrorKind::Connection, err) {
        WalletError::Connection { cause, .. } => WalletError::Connection { message, cause },
        other => other,
    }
}

fn check_connect_response(response: &Value) -> Result<(), WalletError> {
    let falsy = match response {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    };
    if falsy {
        return Err(WalletError::connection(CONNECT_FAILED));
    }
    match response.get("code").and_then(Value::as_i64) {
        Some(CODE_PENDING) => Err(WalletError::connection(CONNECT_PENDING)),
        Some(CODE_REJECTED) => Err(WalletError::connection(CONNECT_REJECTED)),
        _ => Ok(()),
    }
}

fn first_account(value: &Value) -> Option<String> {
    value
        .as_array()
        .and_then(|accounts| accounts.first())
        .and_then(Value::as_str)
        .filter(|a| !a.is_empty())
        .map(str::to_owned)
}

fn chain_id_string(raw: &Value) -> Result<String, ProviderError> {
    match raw {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        Value::Number(n) => n
            .as_u64()
            .map(|id| format!("0x{id:x}"))
            .ok_or_else(|| ProviderError::Opaque(json!({ "message": "invalid chain id", "chainId": raw }))),
        Value::Object(map) => map
            .get("chainId")
            .map(chain_id_string)
            .unwrap_or_else(|| Err(ProviderError::Opaque(raw.clone()))),
        other => Err(ProviderError::Opaque(
            json!({ "message": "invalid chain id", "chainId": other }),
        )),
    }
}
