use crate::broadcast::channel_registry::ChannelRegistry;

use super::filterable_message::FilterableMessage;

/// Decides whether an inbound message starts a broadcast
///
/// A message qualifies only when all of these hold:
/// 1. it was sent in a guild
/// 2. its channel is a registered broadcast channel
/// 3. its author is a human (not a bot, webhook or system account)
/// 4. it is not a command invocation (does not start with the prefix)
#[derive(Debug, Clone)]
pub struct TriggerFilter {
    channels: ChannelRegistry,
    command_prefix: String,
}

impl TriggerFilter {
    pub fn new(channels: ChannelRegistry, command_prefix: impl Into<String>) -> Self {
        Self {
            channels,
            command_prefix: command_prefix.into(),
        }
    }

    pub fn channels(&self) -> &ChannelRegistry {
        &self.channels
    }

    pub fn should_broadcast<M: FilterableMessage>(&self, message: &M) -> bool {
        if message.guild_id().is_none() {
            return false;
        }

        if !self.channels.contains(message.channel_id()) {
            return false;
        }

        // Webhooks carry author.bot = true as well
        if message.webhook_id().is_some() || message.is_system() || message.is_bot() {
            return false;
        }

        let prefix = self.command_prefix.trim();
        prefix.is_empty() || !message.content().trim_start().starts_with(prefix)
    }
}
