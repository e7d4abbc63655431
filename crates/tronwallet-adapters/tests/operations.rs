mod common;

use common::{connected, installed, ADDR1};
use serde_json::json;
use tronwallet_adapter_core::{
    AdapterEvent, ErrorKind, EventName, NetworkType, ProviderError, Transaction,
};
use tronwallet_adapters::{
    SandboxWallet, BACKPACK, BINANCE_WALLET, GUARDA, TOMO_WALLET, TRUST,
};

fn transfer() -> Transaction {
    Transaction(json!({
        "txID": "9f62a65d0616c749643c4e2620b7877efd0f04dd5b2b4cd14004570d39858d7e",
        "raw_data": { "contract": [{ "type": "TransferContract" }] },
    }))
}

#[tokio::test]
async fn signing_requires_a_connection() {
    let fx = installed(TRUST, SandboxWallet::tronlink(&[ADDR1]));

    let err = fx.adapter.sign_message("hello").await.expect_err("not connected");
    assert_eq!(err.kind(), ErrorKind::Disconnected);
    assert_eq!(fx.wallet.call_count("tronWeb.trx.signMessageV2"), 0);
    match fx.log.events().last() {
        Some(AdapterEvent::Error(reported)) => assert_eq!(reported.kind(), ErrorKind::Disconnected),
        other => panic!("expected error event, got {other:?}"),
    }

    let err = fx
        .adapter
        .sign_transaction(&transfer())
        .await
        .expect_err("not connected");
    assert_eq!(err.kind(), ErrorKind::Disconnected);
}

#[tokio::test]
async fn sign_message_returns_the_wallet_signature() {
    let fx = connected(TRUST, SandboxWallet::tronlink(&[ADDR1])).await;
    let signature = fx.adapter.sign_message("hello").await.expect("sign");
    assert_eq!(signature, fx.wallet.signature_for("hello"));
    assert_eq!(fx.wallet.call_count("tronWeb.trx.signMessageV2"), 1);
    assert!(fx.log.names().is_empty());
}

#[tokio::test]
async fn request_style_signing_passes_named_params() {
    let fx = connected(BACKPACK, SandboxWallet::tip1193(&[ADDR1])).await;
    let signature = fx.adapter.sign_message("gm").await.expect("sign");
    assert_eq!(signature, fx.wallet.signature_for("gm"));

    let signed = fx.adapter.sign_transaction(&transfer()).await.expect("sign tx");
    assert_eq!(signed.0["txID"], transfer().0["txID"]);
    assert!(signed.0["signature"].is_array());
}

#[tokio::test]
async fn thrown_string_becomes_sign_error() {
    let fx = connected(TRUST, SandboxWallet::tronlink(&[ADDR1])).await;
    fx.wallet.fail_next(
        "tronWeb.trx.signMessageV2",
        ProviderError::Thrown("Confirmation declined by user".to_owned()),
    );
    let err = fx.adapter.sign_message("hello").await.expect_err("declined");
    assert_eq!(err.kind(), ErrorKind::SignMessage);
    assert_eq!(err.to_string(), "sign message error: Confirmation declined by user");
    assert_eq!(
        err.provider_cause(),
        Some(&ProviderError::Thrown("Confirmation declined by user".to_owned()))
    );
    assert_eq!(fx.log.count(EventName::Error), 1);
    assert!(fx.adapter.connected());
}

#[tokio::test]
async fn structured_failures_keep_code_and_message() {
    let fx = connected(BACKPACK, SandboxWallet::tip1193(&[ADDR1])).await;

    fx.wallet
        .fail_next("tron_signTransaction", ProviderError::rpc(4001, "User rejected"));
    let err = fx
        .adapter
        .sign_transaction(&transfer())
        .await
        .expect_err("rejected");
    assert_eq!(err.kind(), ErrorKind::SignTransaction);
    assert_eq!(err.to_string(), "sign transaction error: User rejected");
    assert_eq!(err.provider_cause().and_then(ProviderError::code), Some(4001));

    fx.wallet.fail_next(
        "tron_signMessage",
        ProviderError::Opaque(json!({ "message": "bad payload", "data": 7 })),
    );
    let err = fx.adapter.sign_message("gm").await.expect_err("opaque");
    assert_eq!(err.kind(), ErrorKind::SignMessage);
    assert_eq!(err.to_string(), "sign message error: bad payload");
}

#[tokio::test]
async fn multi_sign_forwards_permission_id() {
    let fx = connected(TRUST, SandboxWallet::tronlink(&[ADDR1])).await;
    let signed = fx
        .adapter
        .multi_sign(&transfer(), None, Some(2))
        .await
        .expect("multi sign");
    assert_eq!(signed.0["permissionId"], json!(2));
    assert_eq!(fx.wallet.call_count("tronWeb.trx.multiSign"), 1);
}

#[tokio::test]
async fn unsupported_operations_are_not_implemented() {
    let fx = installed(BACKPACK, SandboxWallet::tip1193(&[ADDR1]));
    let err = fx
        .adapter
        .multi_sign(&transfer(), None, None)
        .await
        .expect_err("backpack has no multiSign");
    assert_eq!(err.kind(), ErrorKind::NotImplemented);

    let fx = connected(TRUST, SandboxWallet::tronlink(&[ADDR1])).await;
    let err = fx
        .adapter
        .switch_chain(NetworkType::MAINNET_CHAIN_ID)
        .await
        .expect_err("trust cannot switch chains");
    assert_eq!(err.kind(), ErrorKind::NotImplemented);
    assert_eq!(fx.log.count(EventName::Error), 1);
    assert_eq!(fx.log.count(EventName::ChainChanged), 0);
}

#[tokio::test]
async fn switch_chain_updates_the_wallet() {
    let fx = connected(BACKPACK, SandboxWallet::tip1193(&[ADDR1])).await;
    fx.adapter
        .switch_chain(NetworkType::MAINNET_CHAIN_ID)
        .await
        .expect("switch");
    assert_eq!(fx.wallet.chain_id(), NetworkType::MAINNET_CHAIN_ID);
    match fx.log.events().as_slice() {
        [AdapterEvent::ChainChanged { chain_id }] => {
            assert_eq!(chain_id, NetworkType::MAINNET_CHAIN_ID)
        }
        other => panic!("unexpected events {other:?}"),
    }

    let network = fx.adapter.network().await.expect("network");
    assert_eq!(network.network_type, NetworkType::Mainnet);
    assert_eq!(network.chain_id, NetworkType::MAINNET_CHAIN_ID);
}

#[tokio::test]
async fn native_switch_chain_is_preferred() {
    let fx = connected(BACKPACK, SandboxWallet::tip1193(&[ADDR1]).with_switch_chain_method()).await;
    fx.adapter
        .switch_chain(NetworkType::SHASTA_CHAIN_ID)
        .await
        .expect("switch");
    assert_eq!(fx.wallet.chain_id(), NetworkType::SHASTA_CHAIN_ID);
    assert_eq!(fx.wallet.call_count("switchChain"), 1);
    assert_eq!(fx.wallet.call_count("tron_switchChain"), 0);
}

#[tokio::test]
async fn switch_chain_falls_back_to_the_request() {
    let fx = connected(BACKPACK, SandboxWallet::tip1193(&[ADDR1])).await;
    let before = fx.wallet.calls().len();
    fx.adapter
        .switch_chain(NetworkType::SHASTA_CHAIN_ID)
        .await
        .expect("switch");
    assert_eq!(
        fx.wallet.calls()[before..],
        ["switchChain".to_owned(), "tron_switchChain".to_owned()]
    );
    assert_eq!(fx.wallet.chain_id(), NetworkType::SHASTA_CHAIN_ID);
}

#[tokio::test]
async fn evm_style_switch_sends_a_param_list() {
    let fx = connected(TOMO_WALLET, SandboxWallet::tip1193(&[ADDR1])).await;
    fx.adapter
        .switch_chain(NetworkType::SHASTA_CHAIN_ID)
        .await
        .expect("switch");
    assert_eq!(fx.wallet.chain_id(), NetworkType::SHASTA_CHAIN_ID);
    assert_eq!(fx.wallet.call_count("wallet_switchEthereumChain"), 1);
}

#[tokio::test]
async fn failed_switch_emits_no_chain_change() {
    let fx = connected(BACKPACK, SandboxWallet::tip1193(&[ADDR1])).await;
    fx.wallet
        .fail_next("tron_switchChain", ProviderError::rpc(4902, "Unrecognized chain"));
    let err = fx
        .adapter
        .switch_chain("0x1234")
        .await
        .expect_err("unknown chain");
    assert_eq!(err.kind(), ErrorKind::SwitchChain);
    assert_eq!(fx.log.names(), vec!["error"]);
}

#[tokio::test]
async fn genesis_block_identifies_the_network() {
    let fx = connected(TRUST, SandboxWallet::tronlink(&[ADDR1])).await;
    let network = fx.adapter.network().await.expect("network");
    assert_eq!(network.network_type, NetworkType::Nile);
    assert_eq!(network.chain_id, NetworkType::NILE_CHAIN_ID);
    assert_eq!(network.full_node, "https://nile.trongrid.io");
    assert_eq!(network.event_server, "https://nile.trongrid.io");
}

#[tokio::test]
async fn genesis_network_reads_node_hosts_from_the_wallet() {
    let wallet = SandboxWallet::tronlink(&[ADDR1])
        .with_chain_id(NetworkType::MAINNET_CHAIN_ID)
        .with_property("tronWeb.fullNode.host", json!("https://node.example"));
    let fx = connected(TRUST, wallet).await;
    let network = fx.adapter.network().await.expect("network");
    assert_eq!(network.network_type, NetworkType::Mainnet);
    assert_eq!(network.full_node, "https://node.example");
    assert_eq!(network.event_server, "https://api.trongrid.io");
}

#[tokio::test]
async fn chain_id_network_follows_the_wallet() {
    let fx = connected(
        BACKPACK,
        SandboxWallet::tip1193(&[ADDR1]).with_chain_id(NetworkType::MAINNET_CHAIN_ID),
    )
    .await;
    let network = fx.adapter.network().await.expect("network");
    assert_eq!(network.network_type, NetworkType::Mainnet);
    assert_eq!(network.chain_id, NetworkType::MAINNET_CHAIN_ID);
    assert_eq!(fx.wallet.call_count("tron_chainId"), 1);
}

#[tokio::test]
async fn network_failure_is_reported() {
    let fx = connected(TRUST, SandboxWallet::tronlink(&[ADDR1])).await;
    fx.wallet.fail_next(
        "tronWeb.trx.getBlockByNumber",
        ProviderError::Thrown("node unreachable".to_owned()),
    );
    let err = fx.adapter.network().await.expect_err("node down");
    assert_eq!(err.kind(), ErrorKind::GetNetwork);
}

#[tokio::test]
async fn account_object_wallet_connects_and_signs() {
    let fx = connected(BINANCE_WALLET, SandboxWallet::tip1193(&[ADDR1])).await;
    assert_eq!(fx.wallet.call_count("getAccount"), 1);
    assert_eq!(fx.wallet.subscriber_count(), 0);

    let signature = fx.adapter.sign_message("hello").await.expect("sign");
    assert_eq!(signature, fx.wallet.signature_for("hello"));

    let network = fx.adapter.network().await.expect("network");
    assert_eq!(network.network_type, NetworkType::Nile);

    fx.adapter.disconnect().await.expect("disconnect");
    assert_eq!(fx.wallet.call_count("disconnect"), 1);
}

#[tokio::test]
async fn nested_request_wallet_connects() {
    let fx = connected(GUARDA, SandboxWallet::tip1193(&[ADDR1])).await;
    assert_eq!(fx.wallet.call_count("tron.request"), 1);
    let signature = fx.adapter.sign_message("hello").await.expect("sign");
    assert_eq!(signature, fx.wallet.signature_for("hello"));
    assert_eq!(fx.wallet.call_count("tronWeb.trx.signMessage"), 1);
}
