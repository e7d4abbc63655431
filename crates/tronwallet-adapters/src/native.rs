use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tronwallet_adapter_core::{HostPort, HostTask, InjectedProvider};

/// Host for native processes. There is no page and no injected wallet, so
/// every adapter built on it settles as `NotFound` without polling.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeHost;

#[async_trait]
impl HostPort for NativeHost {
    fn is_browser(&self) -> bool {
        false
    }

    fn is_mobile(&self) -> bool {
        false
    }

    fn user_agent(&self) -> String {
        String::new()
    }

    fn location_href(&self) -> String {
        String::new()
    }

    fn navigate(&self, url: &str) {
        tracing::info!(%url, "navigation requested outside a browser");
    }

    fn open_window(&self, url: &str) {
        tracing::info!(%url, "window requested outside a browser");
    }

    fn lookup(&self, _path: &str) -> Option<Arc<dyn InjectedProvider>> {
        None
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn spawn(&self, task: HostTask) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(task);
            }
            Err(err) => tracing::warn!(%err, "no tokio runtime; task dropped"),
        }
    }
}
