use crate::adapters::{DeliveryTransport, SendError};
use futures::FutureExt as _;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::notification::Notification;
use super::outcome::{DeliveryOutcome, RejectReason};
use super::recipient::Recipient;

/// Performs one delivery attempt to one recipient
///
/// Every failure, including a panicking transport, is turned into a
/// `DeliveryOutcome`. Nothing escapes this boundary, so one recipient can
/// never abort the batch. The worker never retries on its own.
pub struct DeliveryWorker<T: DeliveryTransport> {
    transport: Arc<T>,
}

impl<T: DeliveryTransport> DeliveryWorker<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    pub async fn deliver(&self, recipient: &Recipient, notification: &Notification) -> DeliveryOutcome {
        let attempt = AssertUnwindSafe(self.transport.send(recipient.user_id, notification))
            .catch_unwind()
            .await;

        let result = match attempt {
            Ok(result) => result,
            Err(_) => {
                error!(
                    recipient = %recipient.user_id,
                    "Delivery transport panicked"
                );
                return DeliveryOutcome::Rejected(RejectReason::Permanent);
            }
        };

        match result {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(SendError::Forbidden) => {
                debug!(recipient = %recipient.user_id, "Recipient does not accept DMs");
                DeliveryOutcome::Rejected(RejectReason::Blocking)
            }
            Err(SendError::Unreachable(detail)) => {
                debug!(recipient = %recipient.user_id, %detail, "Recipient unreachable");
                DeliveryOutcome::Rejected(RejectReason::Unreachable)
            }
            Err(SendError::Transient(detail)) => {
                warn!(recipient = %recipient.user_id, %detail, "Transient delivery failure");
                DeliveryOutcome::Rejected(RejectReason::Transient)
            }
            Err(SendError::Other(detail)) => {
                error!(recipient = %recipient.user_id, %detail, "Delivery failed");
                DeliveryOutcome::Rejected(RejectReason::Permanent)
            }
        }
    }
}
