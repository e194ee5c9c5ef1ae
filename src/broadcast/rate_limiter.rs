use std::time::Duration;
use tokio::time::Instant;

/// Result of a cooldown check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Denied { retry_after: Duration },
}

/// Cooldown and pacing policy
///
/// Pure arithmetic over timestamps. The cooldown window is inclusive at its
/// end: a broadcast exactly `cooldown` after the previous one is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiter {
    cooldown: Duration,
    pace: Duration,
}

impl RateLimiter {
    pub fn new(cooldown: Duration, pace: Duration) -> Self {
        Self { cooldown, pace }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Check whether a new broadcast may start at `now`
    pub fn admit(&self, last_broadcast_at: Option<Instant>, now: Instant) -> Admission {
        let Some(last) = last_broadcast_at else {
            return Admission::Allowed;
        };

        let ready_at = last + self.cooldown;
        if now >= ready_at {
            Admission::Allowed
        } else {
            Admission::Denied {
                retry_after: ready_at - now,
            }
        }
    }

    /// Delay to wait after chunk `chunk_index` before starting the next one
    pub fn pace(&self, _chunk_index: usize) -> Duration {
        self.pace
    }
}
