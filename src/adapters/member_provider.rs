use serenity::async_trait;
use serenity::model::id::GuildId;

use crate::broadcast::recipient::Recipient;

/// Interface for taking a guild membership snapshot
#[async_trait]
pub trait MemberProvider: Send + Sync {
    /// Return the current members of a guild
    ///
    /// The result is treated as an immutable snapshot for the broadcast that
    /// requested it. An error aborts that broadcast only.
    async fn members(&self, guild_id: GuildId) -> anyhow::Result<Vec<Recipient>>;
}
