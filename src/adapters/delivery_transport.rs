use serenity::async_trait;
use serenity::model::id::UserId;
use thiserror::Error;

use crate::broadcast::notification::Notification;

/// Failure reported by the delivery transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// Recipient closed DMs or blocked the bot
    #[error("recipient does not accept direct messages")]
    Forbidden,
    /// Recipient cannot be addressed at all
    #[error("recipient unreachable: {0}")]
    Unreachable(String),
    /// Timeout, rate limit or server-side hiccup
    #[error("transient provider failure: {0}")]
    Transient(String),
    #[error("delivery failed: {0}")]
    Other(String),
}

/// Interface for sending a notification to one recipient
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    /// Send the rendered notification as a direct message
    ///
    /// # Arguments
    ///
    /// * `recipient` - The user to deliver to
    /// * `notification` - The rendered notification shared by the whole broadcast
    async fn send(&self, recipient: UserId, notification: &Notification) -> Result<(), SendError>;
}
