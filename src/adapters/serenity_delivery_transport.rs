use super::delivery_transport::{DeliveryTransport, SendError};
use crate::broadcast::notification::Notification;
use serenity::async_trait;
use serenity::builder::CreateMessage;
use serenity::http::HttpError;
use serenity::model::id::UserId;
use std::sync::Arc;

/// Discord JSON error: "Cannot send messages to this user"
const CANNOT_MESSAGE_USER: isize = 50007;
/// Discord JSON error: "Unknown user"
const UNKNOWN_USER: isize = 10013;
/// Discord JSON error: "Unknown channel"
const UNKNOWN_CHANNEL: isize = 10003;

/// Implementation for DM delivery via Serenity
pub struct SerenityDeliveryTransport {
    http: Arc<serenity::http::Http>,
}

impl SerenityDeliveryTransport {
    /// Create a new SerenityDeliveryTransport
    ///
    /// # Arguments
    ///
    /// * `http` - The serenity HTTP client
    pub fn new(http: Arc<serenity::http::Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl DeliveryTransport for SerenityDeliveryTransport {
    async fn send(&self, recipient: UserId, notification: &Notification) -> Result<(), SendError> {
        let dm_channel = recipient
            .create_dm_channel(&self.http)
            .await
            .map_err(|err| classify_error(&err))?;

        dm_channel
            .send_message(&self.http, CreateMessage::new().embed(notification.to_embed()))
            .await
            .map_err(|err| classify_error(&err))?;

        Ok(())
    }
}

/// Map a serenity error onto the transport taxonomy
pub fn classify_error(error: &serenity::Error) -> SendError {
    match error {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => classify_response(
            response.status_code.as_u16(),
            response.error.code,
            &response.error.message,
        ),
        // Connection reset, DNS failure, request timeout
        serenity::Error::Http(HttpError::Request(err)) => SendError::Transient(err.to_string()),
        serenity::Error::Io(err) => SendError::Transient(err.to_string()),
        other => SendError::Other(other.to_string()),
    }
}

/// Classify an unsuccessful Discord API response
pub fn classify_response(status: u16, code: isize, message: &str) -> SendError {
    match (status, code) {
        (_, CANNOT_MESSAGE_USER) | (403, _) => SendError::Forbidden,
        (_, UNKNOWN_USER) | (_, UNKNOWN_CHANNEL) | (404, _) => {
            SendError::Unreachable(format!("{} ({})", message, code))
        }
        (429, _) | (500..=599, _) => SendError::Transient(format!("HTTP {}: {}", status, message)),
        _ => SendError::Other(format!("HTTP {} code {}: {}", status, code, message)),
    }
}
