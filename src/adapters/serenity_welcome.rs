use anyhow::Context as _;
use serenity::builder::{CreateEmbed, CreateEmbedFooter, CreateMessage};
use serenity::http::Http;
use serenity::model::channel::{ChannelType, GuildChannel};
use serenity::model::guild::Guild;
use serenity::model::id::{ChannelId, UserId};
use tracing::{debug, info};

const WELCOME_COLOR: u32 = 0x2E_CC_71;

/// Embed posted once when the bot joins a guild
pub fn welcome_embed() -> CreateEmbed {
    CreateEmbed::new()
        .title("👋 Thanks for adding me!")
        .description("I forward every message posted in a broadcast channel to all server members by DM.")
        .color(WELCOME_COLOR)
        .field(
            "🚀 Setup",
            "1. Ask the bot operator to add your broadcast channel\n2. Post a message in that channel\n3. I'll DM it to every member",
            false,
        )
        .field(
            "ℹ️ Good to know",
            "Bots and the author are skipped. Messages starting with the command prefix are never sent.",
            false,
        )
        .footer(CreateEmbedFooter::new("Progress and results are posted as a reply to each broadcast"))
}

/// First text channel (by position) the bot may post in
pub fn welcome_channel(guild: &Guild, bot_id: UserId) -> Option<ChannelId> {
    let bot = guild.members.get(&bot_id)?;

    let mut channels: Vec<&GuildChannel> = guild
        .channels
        .values()
        .filter(|channel| channel.kind == ChannelType::Text)
        .collect();
    channels.sort_by_key(|channel| (channel.position, channel.id));

    channels
        .into_iter()
        .find(|channel| guild.user_permissions_in(channel, bot).send_messages())
        .map(|channel| channel.id)
}

/// Post the welcome embed in a newly joined guild
///
/// Having no writable channel is not an error.
pub async fn send_welcome(http: &Http, guild: &Guild, bot_id: UserId) -> anyhow::Result<()> {
    let Some(channel_id) = welcome_channel(guild, bot_id) else {
        debug!(guild_id = %guild.id, "No writable text channel for welcome message");
        return Ok(());
    };

    channel_id
        .send_message(http, CreateMessage::new().embed(welcome_embed()))
        .await
        .context("Posting welcome message")?;

    info!(guild_id = %guild.id, channel_id = %channel_id, "Welcome message sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_embed_sections() {
        let json = serde_json::to_value(welcome_embed()).unwrap();

        assert_eq!(json["title"], "👋 Thanks for adding me!");
        let names: Vec<&str> = json["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|field| field["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["🚀 Setup", "ℹ️ Good to know"]);
        assert!(json["footer"]["text"].is_string());
    }
}
