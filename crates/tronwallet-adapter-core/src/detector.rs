use std::time::Duration;

use crate::domain::ReadyState;
use crate::ports::HostPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub outcome: ReadyState,
    pub attempts: u64,
}

/// Bounded polling for an injected provider.
///
/// The probe runs once immediately and then once per `step` until it
/// succeeds or `attempts` exceeds `floor(timeout / step)`. A zero timeout
/// therefore probes exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessDetector {
    step: Duration,
    timeout: Duration,
}

impl ReadinessDetector {
    pub const STEP: Duration = Duration::from_millis(100);

    pub fn new(timeout: Duration) -> Self {
        Self {
            step: Self::STEP,
            timeout,
        }
    }

    pub fn max_attempts(&self) -> u64 {
        let step = self.step.as_millis().max(1);
        (self.timeout.as_millis() / step) as u64
    }

    pub async fn run<P>(&self, host: &dyn HostPort, mut probe: P) -> Detection
    where
        P: FnMut() -> bool,
    {
        let max_attempts = self.max_attempts();
        let mut attempts = 0u64;
        loop {
            attempts += 1;
            let found = probe();
            if found || attempts > max_attempts {
                let outcome = if found {
                    ReadyState::Found
                } else {
                    ReadyState::NotFound
                };
                tracing::debug!(attempts, max_attempts, %outcome, "wallet detection settled");
                return Detection { outcome, attempts };
            }
            host.sleep(self.step).await;
        }
    }
}
