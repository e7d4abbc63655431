//! Drives a few wallet adapters through a sandboxed page and logs every
//! adapter event.

use std::sync::Arc;

use eyre::{Result, WrapErr};
use serde_json::json;
use tronwallet_adapter_core::{Adapter, AdapterConfig, AdapterEvent, EventName, Transaction};
use tronwallet_adapters::{registry, NativeHost, SandboxHost, SandboxWallet, BACKPACK, TRUST};

const FIRST_ACCOUNT: &str = "TJRabPrwbZy45sbavfcjinPJC18kjpRTv8";
const SECOND_ACCOUNT: &str = "TXLAQ63Xg1NAzckPwKHvzw7CSEmLMEqcdj";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = AdapterConfig::from_env().wrap_err("invalid adapter configuration")?;
    tracing::info!(?config, "starting wallet walkthrough");

    trust_session(config).await?;
    backpack_session(config).await?;
    native_catalogue(config).await;
    Ok(())
}

fn log_events(adapter: &Adapter) {
    let wallet = adapter.name();
    for name in EventName::ALL {
        adapter.on(name, move |event| match event {
            AdapterEvent::Error(err) => tracing::warn!(wallet, %err, "adapter error"),
            other => tracing::info!(wallet, event = name.as_str(), ?other, "adapter event"),
        });
    }
}

async fn trust_session(config: AdapterConfig) -> Result<()> {
    let host = Arc::new(SandboxHost::browser());
    let wallet = Arc::new(SandboxWallet::tronlink(&[FIRST_ACCOUNT]));
    host.install("trustwallet.tronLink", Arc::clone(&wallet));

    let adapter = Adapter::new(TRUST, host, config);
    log_events(&adapter);

    adapter.detect().await;
    adapter.connect().await.wrap_err("trust connect")?;
    let signature = adapter
        .sign_message("hello from tronwallet-demo")
        .await
        .wrap_err("trust sign message")?;
    tracing::info!(%signature, "message signed");

    let transaction = Transaction(json!({
        "txID": "9f62a65d0616c749643c4e2620b7877efd0f04dd5b2b4cd14004570d39858d7e",
        "raw_data": { "contract": [{ "type": "TransferContract" }] },
    }));
    let signed = adapter
        .multi_sign(&transaction, None, Some(2))
        .await
        .wrap_err("trust multi sign")?;
    tracing::info!(signed = %signed.0, "transaction multi-signed");

    let network = adapter.network().await.wrap_err("trust network")?;
    tracing::info!(?network, "network resolved");

    wallet.switch_account(SECOND_ACCOUNT);
    wallet.lock_wallet();
    adapter.disconnect().await.wrap_err("trust disconnect")?;
    Ok(())
}

async fn backpack_session(config: AdapterConfig) -> Result<()> {
    let host = Arc::new(SandboxHost::browser());
    let wallet = Arc::new(SandboxWallet::tip1193(&[FIRST_ACCOUNT]).with_marker("isBackpack"));
    host.install("tron", Arc::clone(&wallet));

    let adapter = Adapter::new(BACKPACK, host, config);
    log_events(&adapter);

    adapter.connect().await.wrap_err("backpack connect")?;
    adapter
        .switch_chain("0x2b6653dc")
        .await
        .wrap_err("backpack switch chain")?;
    let network = adapter.network().await.wrap_err("backpack network")?;
    tracing::info!(?network, "network after switch");

    if let Err(err) = adapter.multi_sign(&Transaction(json!({})), None, None).await {
        tracing::info!(%err, "multiSign unavailable as expected");
    }
    adapter.disconnect().await.wrap_err("backpack disconnect")?;
    Ok(())
}

/// Outside a browser every wallet settles as not found without polling.
async fn native_catalogue(config: AdapterConfig) {
    for adapter in registry::adapters(Arc::new(NativeHost), config) {
        let ready = adapter.detect().await;
        tracing::info!(wallet = adapter.name(), url = adapter.url(), %ready, "native host");
    }
}
