//! Bounded polling.
//!
//! `poll` probes until the probe yields a value or the attempt budget is
//! spent, pausing between attempts. How the pause happens is up to the
//! caller, so the same loop works with a real sleep and in tests.

use std::time::Duration;

/// Attempt budget and spacing for a polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(attempts: u32, interval_ms: u64) -> Self {
        Self {
            attempts,
            interval: Duration::from_millis(interval_ms),
        }
    }

    /// Upper bound on time spent waiting.
    #[must_use]
    pub fn ceiling(&self) -> Duration {
        self.interval * self.attempts.saturating_sub(1)
    }
}

/// How a polling loop waits between attempts.
pub trait Pause {
    fn pause(&self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPause;

impl Pause for ThreadPause {
    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Does not wait at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPause;

impl Pause for NoPause {
    fn pause(&self, _duration: Duration) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The probe succeeded on `attempt` (1-based).
    Ready { value: T, attempt: u32 },
    TimedOut { attempts: u32 },
}

/// Probe up to `policy.attempts` times, pausing `policy.interval` between
/// attempts (not after the last one).
pub fn poll<T>(
    policy: RetryPolicy,
    pause: &dyn Pause,
    mut probe: impl FnMut() -> Option<T>,
) -> PollOutcome<T> {
    for attempt in 1..=policy.attempts {
        if let Some(value) = probe() {
            return PollOutcome::Ready { value, attempt };
        }
        if attempt < policy.attempts {
            pause.pause(policy.interval);
        }
    }
    PollOutcome::TimedOut {
        attempts: policy.attempts,
    }
}
