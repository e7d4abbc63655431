use std::sync::Arc;

use thiserror::Error;

use crate::ports::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Connection,
    Disconnected,
    SignMessage,
    SignTransaction,
    SwitchChain,
    GetNetwork,
    Disconnection,
    NotImplemented,
}

/// Shared error taxonomy. Every variant keeps the provider failure it came
/// from, if any, as its `source()`.
#[derive(Debug, Clone, Error)]
pub enum WalletError {
    #[error("wallet not found: {message}")]
    NotFound {
        message: String,
        #[source]
        cause: Option<Arc<ProviderError>>,
    },
    #[error("wallet connection error: {message}")]
    Connection {
        message: String,
        #[source]
        cause: Option<Arc<ProviderError>>,
    },
    #[error("wallet disconnected: {message}")]
    Disconnected {
        message: String,
        #[source]
        cause: Option<Arc<ProviderError>>,
    },
    #[error("sign message error: {message}")]
    SignMessage {
        message: String,
        #[source]
        cause: Option<Arc<ProviderError>>,
    },
    #[error("sign transaction error: {message}")]
    SignTransaction {
        message: String,
        #[source]
        cause: Option<Arc<ProviderError>>,
    },
    #[error("switch chain error: {message}")]
    SwitchChain {
        message: String,
        #[source]
        cause: Option<Arc<ProviderError>>,
    },
    #[error("get network error: {message}")]
    GetNetwork {
        message: String,
        #[source]
        cause: Option<Arc<ProviderError>>,
    },
    #[error("wallet disconnection error: {message}")]
    Disconnection {
        message: String,
        #[source]
        cause: Option<Arc<ProviderError>>,
    },
    #[error("{operation} is not implemented by this wallet")]
    NotImplemented { operation: &'static str },
}

impl WalletError {
    pub fn not_found() -> Self {
        Self::NotFound {
            message: "the wallet is not installed or not reachable".to_owned(),
            cause: None,
        }
    }

    pub fn disconnected() -> Self {
        Self::Disconnected {
            message: "the wallet is not connected".to_owned(),
            cause: None,
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            cause: None,
        }
    }

    pub fn not_implemented(operation: &'static str) -> Self {
        Self::NotImplemented { operation }
    }

    /// Wrap a provider failure into `kind`, keeping it as the cause.
    pub fn from_provider(kind: ErrorKind, err: ProviderError) -> Self {
        let message = err.message();
        let cause = Some(Arc::new(err));
        match kind {
            ErrorKind::NotFound => Self::NotFound { message, cause },
            ErrorKind::Connection => Self::Connection { message, cause },
            ErrorKind::Disconnected => Self::Disconnected { message, cause },
            ErrorKind::SignMessage => Self::SignMessage { message, cause },
            ErrorKind::SignTransaction => Self::SignTransaction { message, cause },
            ErrorKind::SwitchChain => Self::SwitchChain { message, cause },
            ErrorKind::GetNetwork => Self::GetNetwork { message, cause },
            ErrorKind::Disconnection => Self::Disconnection { message, cause },
            ErrorKind::NotImplemented => Self::NotImplemented {
                operation: "provider call",
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Disconnected { .. } => ErrorKind::Disconnected,
            Self::SignMessage { .. } => ErrorKind::SignMessage,
            Self::SignTransaction { .. } => ErrorKind::SignTransaction,
            Self::SwitchChain { .. } => ErrorKind::SwitchChain,
            Self::GetNetwork { .. } => ErrorKind::GetNetwork,
            Self::Disconnection { .. } => ErrorKind::Disconnection,
            Self::NotImplemented { .. } => ErrorKind::NotImplemented,
        }
    }

    pub fn provider_cause(&self) -> Option<&ProviderError> {
        match self {
            Self::NotFound { cause, .. }
            | Self::Connection { cause, .. }
            | Self::Disconnected { cause, .. }
            | Self::SignMessage { cause, .. }
            | Self::SignTransaction { cause, .. }
            | Self::SwitchChain { cause, .. }
            | Self::GetNetwork { cause, .. }
            | Self::Disconnection { cause, .. } => cause.as_deref(),
            Self::NotImplemented { .. } => None,
        }
    }
}
