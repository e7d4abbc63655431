use std::error::Error as _;

use tronwallet_adapter_core::{ErrorKind, ProviderError, WalletError};

#[test]
fn provider_failure_is_the_error_source() {
    let err = WalletError::from_provider(ErrorKind::SignMessage, ProviderError::rpc(4001, "User rejected"));
    assert_eq!(err.kind(), ErrorKind::SignMessage);
    assert_eq!(err.to_string(), "sign message error: User rejected");

    let source = err.source().expect("provider cause exposed as source");
    assert_eq!(source.to_string(), "User rejected (code 4001)");
    assert_eq!(err.provider_cause(), Some(&ProviderError::rpc(4001, "User rejected")));
}

#[test]
fn local_failures_have_no_source() {
    assert!(WalletError::not_found().source().is_none());
    assert!(WalletError::disconnected().source().is_none());
    assert!(WalletError::not_implemented("multiSign").source().is_none());
    assert_eq!(WalletError::connection("busy").kind(), ErrorKind::Connection);
}
