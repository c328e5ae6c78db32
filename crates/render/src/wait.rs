//! Bounded condition polling.
//!
//! Every readiness check in the renderer (network idle, content mounted,
//! charts sized) is a [`wait_until`] call with its own timeout. A timeout is
//! a normal outcome, not an error; the caller decides whether it matters.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Result of a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready,
    TimedOut { elapsed: Duration },
}

impl WaitOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, WaitOutcome::Ready)
    }
}

/// Exponential backoff between probes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: f64,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(100),
            max_interval: Duration::from_millis(500),
            multiplier: 1.5,
        }
    }
}

impl PollPolicy {
    /// A policy that probes at a constant interval.
    pub fn fixed(interval: Duration) -> Self {
        Self { initial_interval: interval, max_interval: interval, multiplier: 1.0 }
    }

    pub fn next_interval(&self, current: Duration) -> Duration {
        let multiplier = if self.multiplier.is_finite() && self.multiplier >= 1.0 {
            self.multiplier
        } else {
            1.0
        };
        current.mul_f64(multiplier).min(self.max_interval)
    }
}

/// Polls `probe` until it reports `true` or `timeout` elapses.
///
/// A probe that is itself slow counts against the same budget. Probe errors
/// end the wait immediately and are returned as-is.
pub async fn wait_until<F, Fut, E>(
    timeout: Duration,
    policy: &PollPolicy,
    mut probe: F,
) -> Result<WaitOutcome, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let started = Instant::now();
    let deadline = started + timeout;
    let mut interval = policy.initial_interval;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(WaitOutcome::TimedOut { elapsed: started.elapsed() });
        }

        match tokio::time::timeout(remaining, probe()).await {
            Ok(Ok(true)) => return Ok(WaitOutcome::Ready),
            Ok(Ok(false)) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Ok(WaitOutcome::TimedOut { elapsed: started.elapsed() }),
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(WaitOutcome::TimedOut { elapsed: started.elapsed() });
        }
        tokio::time::sleep(interval.min(remaining)).await;
        interval = policy.next_interval(interval);
    }
}
