use dmcast::adapters::{DeliveryTransport, SendError};
use dmcast::broadcast::notification::Notification;
use serenity::async_trait;
use serenity::model::id::UserId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted failure for one recipient
#[derive(Debug, Clone)]
struct Failure {
    error: SendError,
    /// Number of attempts that fail before sends succeed (`None` = always)
    remaining: Option<usize>,
}

pub struct MockTransport {
    pub sent: Arc<Mutex<Vec<UserId>>>,
    attempts: Arc<Mutex<Vec<UserId>>>,
    failures: Mutex<HashMap<UserId, Failure>>,
    delay: Duration,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            attempts: Arc::new(Mutex::new(Vec::new())),
            failures: Mutex::new(HashMap::new()),
            delay: Duration::ZERO,
        }
    }

    /// Every send takes `delay` before completing
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new()
        }
    }

    /// Always fail sends to `user_id` with `error`
    pub fn fail(self, user_id: u64, error: SendError) -> Self {
        self.failures.lock().unwrap().insert(
            UserId::new(user_id),
            Failure {
                error,
                remaining: None,
            },
        );
        self
    }

    /// Fail the first `times` sends to `user_id`, then succeed
    pub fn fail_times(self, user_id: u64, error: SendError, times: usize) -> Self {
        self.failures.lock().unwrap().insert(
            UserId::new(user_id),
            Failure {
                error,
                remaining: Some(times),
            },
        );
        self
    }

    pub fn get_sent(&self) -> Vec<UserId> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

#[async_trait]
impl DeliveryTransport for MockTransport {
    async fn send(&self, recipient: UserId, _notification: &Notification) -> Result<(), SendError> {
        self.attempts.lock().unwrap().push(recipient);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let scripted = {
            let mut failures = self.failures.lock().unwrap();
            match failures.get_mut(&recipient) {
                Some(failure) => match failure.remaining {
                    None => Some(failure.error.clone()),
                    Some(0) => None,
                    Some(ref mut left) => {
                        *left -= 1;
                        Some(failure.error.clone())
                    }
                },
                None => None,
            }
        };

        if let Some(error) = scripted {
            return Err(error);
        }

        self.sent.lock().unwrap().push(recipient);
        Ok(())
    }
}
