use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, GuildId};

/// Trait for messages that can be checked as broadcast triggers
///
/// This abstraction allows testing without constructing serenity's Message type.
pub trait FilterableMessage {
    fn is_bot(&self) -> bool;
    fn is_system(&self) -> bool;
    fn webhook_id(&self) -> Option<u64>;
    fn guild_id(&self) -> Option<GuildId>;
    fn channel_id(&self) -> ChannelId;
    fn content(&self) -> &str;
}

impl FilterableMessage for Message {
    fn is_bot(&self) -> bool {
        self.author.bot
    }

    fn is_system(&self) -> bool {
        self.author.system
    }

    fn webhook_id(&self) -> Option<u64> {
        self.webhook_id.map(|id| id.get())
    }

    fn guild_id(&self) -> Option<GuildId> {
        self.guild_id
    }

    fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    fn content(&self) -> &str {
        &self.content
    }
}
