use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tronwallet_adapter_core::{HostPort, HostTask, InjectedProvider, ReadinessDetector, ReadyState};

#[derive(Default)]
struct TickHost {
    ticks: AtomicU64,
}

#[async_trait]
impl HostPort for TickHost {
    fn is_browser(&self) -> bool {
        true
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
    fn navigate(&self, _url: &str) {}
    fn open_window(&self, _url: &str) {}
    fn lookup(&self, _path: &str) -> Option<Arc<dyn InjectedProvider>> {
        None
    }
    async fn sleep(&self, duration: Duration) {
        assert_eq!(duration, ReadinessDetector::STEP);
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }
    fn spawn(&self, _task: HostTask) {}
}

async fn detect_after(timeout_ms: u64, available_after_ticks: u64) -> (ReadyState, u64, u64) {
    let host = TickHost::default();
    let detection = ReadinessDetector::new(Duration::from_millis(timeout_ms))
        .run(&host, || host.ticks.load(Ordering::SeqCst) >= available_after_ticks)
        .await;
    (detection.outcome, detection.attempts, host.ticks.load(Ordering::SeqCst))
}

#[tokio::test]
async fn present_provider_is_found_without_sleeping() {
    let (outcome, attempts, ticks) = detect_after(2_000, 0).await;
    assert_eq!(outcome, ReadyState::Found);
    assert_eq!(attempts, 1);
    assert_eq!(ticks, 0);
}

#[tokio::test]
async fn provider_arriving_after_budget_is_not_found() {
    let (outcome, attempts, ticks) = detect_after(300, 4).await;
    assert_eq!(outcome, ReadyState::NotFound);
    assert_eq!(attempts, 4);
    assert_eq!(ticks, 3);
}

#[tokio::test]
async fn provider_arriving_within_budget_is_found() {
    let (outcome, attempts, _) = detect_after(300, 2).await;
    assert_eq!(outcome, ReadyState::Found);
    assert_eq!(attempts, 3);
}

#[tokio::test]
async fn zero_timeout_probes_exactly_once() {
    let (outcome, attempts, ticks) = detect_after(0, 1).await;
    assert_eq!(outcome, ReadyState::NotFound);
    assert_eq!(attempts, 1);
    assert_eq!(ticks, 0);
}

#[test]
fn max_attempts_floors_the_budget() {
    assert_eq!(ReadinessDetector::new(Duration::from_millis(2_000)).max_attempts(), 20);
    assert_eq!(ReadinessDetector::new(Duration::from_millis(350)).max_attempts(), 3);
    assert_eq!(ReadinessDetector::new(Duration::ZERO).max_attempts(), 0);
}
