use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use super::rate_limiter::{Admission, RateLimiter};
use super::source::SourceKey;

/// Why a broadcast was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdmissionDenied {
    #[error("broadcast on cooldown, retry in {}s", whole_secs(.retry_after))]
    Cooldown { retry_after: Duration },
    #[error("a broadcast is already running for this channel")]
    AlreadyRunning,
}

fn whole_secs(duration: &Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

/// Per-source guard state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardState {
    pub in_broadcast: bool,
    pub last_broadcast_at: Option<Instant>,
}

#[derive(Debug)]
struct Inner {
    limiter: RateLimiter,
    states: Mutex<HashMap<SourceKey, GuardState>>,
}

/// Process-wide admission control for broadcasts
///
/// At most one broadcast runs per source key. Distinct keys never wait on
/// each other beyond the short map lock, which is never held across `.await`.
#[derive(Debug, Clone)]
pub struct GuardRegistry {
    inner: Arc<Inner>,
}

impl GuardRegistry {
    pub fn new(limiter: RateLimiter) -> Self {
        Self {
            inner: Arc::new(Inner {
                limiter,
                states: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.inner.limiter
    }

    fn states(&self) -> MutexGuard<'_, HashMap<SourceKey, GuardState>> {
        // Every critical section leaves the map consistent, so a poisoned lock is still usable
        self.inner
            .states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically check and claim the broadcast slot for `key`
    pub fn try_admit(&self, key: SourceKey) -> Result<BroadcastPermit, AdmissionDenied> {
        let now = Instant::now();
        let mut states = self.states();
        let state = states.entry(key).or_default();

        if state.in_broadcast {
            return Err(AdmissionDenied::AlreadyRunning);
        }

        if let Admission::Denied { retry_after } =
            self.inner.limiter.admit(state.last_broadcast_at, now)
        {
            return Err(AdmissionDenied::Cooldown { retry_after });
        }

        state.in_broadcast = true;
        debug!(source = %key, "Broadcast admitted");

        Ok(BroadcastPermit {
            registry: self.clone(),
            key,
        })
    }

    /// Current guard state for `key`
    pub fn state(&self, key: SourceKey) -> GuardState {
        self.states().get(&key).copied().unwrap_or_default()
    }

    fn release(&self, key: SourceKey) {
        let mut states = self.states();
        let state = states.entry(key).or_default();
        state.in_broadcast = false;
        state.last_broadcast_at = Some(Instant::now());
        debug!(source = %key, "Broadcast released");
    }
}

/// Exclusive right to broadcast for one source key
///
/// Dropping the permit releases the key and stamps the cooldown, on every
/// exit path of the coordinator.
#[derive(Debug)]
pub struct BroadcastPermit {
    registry: GuardRegistry,
    key: SourceKey,
}

impl Drop for BroadcastPermit {
    fn drop(&mut self) {
        self.registry.release(self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::model::id::{ChannelId, GuildId};

    fn key(channel: u64) -> SourceKey {
        SourceKey::new(GuildId::new(1), ChannelId::new(channel))
    }

    fn registry(cooldown_secs: u64) -> GuardRegistry {
        GuardRegistry::new(RateLimiter::new(
            Duration::from_secs(cooldown_secs),
            Duration::ZERO,
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_admission_denied_while_running() {
        let guard = registry(0);

        let permit = guard.try_admit(key(10)).unwrap();
        assert_eq!(
            guard.try_admit(key(10)).unwrap_err(),
            AdmissionDenied::AlreadyRunning
        );
        assert!(guard.state(key(10)).in_broadcast);

        drop(permit);
        assert!(!guard.state(key(10)).in_broadcast);
        assert!(guard.try_admit(key(10)).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_keys_do_not_block() {
        let guard = registry(300);

        let _a = guard.try_admit(key(10)).unwrap();
        let _b = guard.try_admit(key(11)).unwrap();

        assert!(guard.state(key(10)).in_broadcast);
        assert!(guard.state(key(11)).in_broadcast);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_after_release() {
        let guard = registry(10);
        drop(guard.try_admit(key(10)).unwrap());

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(matches!(
            guard.try_admit(key(10)),
            Err(AdmissionDenied::Cooldown { .. })
        ));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(guard.try_admit(key(10)).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_retry_after_is_reported() {
        let guard = registry(10);
        drop(guard.try_admit(key(10)).unwrap());

        tokio::time::advance(Duration::from_secs(3)).await;

        assert_eq!(
            guard.try_admit(key(10)).unwrap_err(),
            AdmissionDenied::Cooldown {
                retry_after: Duration::from_secs(7)
            }
        );
    }

    #[test]
    fn test_denial_messages() {
        let cooldown = AdmissionDenied::Cooldown {
            retry_after: Duration::from_millis(6_200),
        };
        assert_eq!(cooldown.to_string(), "broadcast on cooldown, retry in 7s");
        assert_eq!(
            AdmissionDenied::AlreadyRunning.to_string(),
            "a broadcast is already running for this channel"
        );
    }

    #[test]
    fn test_unknown_key_is_idle() {
        let guard = registry(10);
        assert_eq!(guard.state(key(99)), GuardState::default());
    }
}
