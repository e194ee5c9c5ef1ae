use serde::Serialize;
use serenity::model::Timestamp;
use serenity::model::channel::Message;
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use url::Url;

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Key used to serialize and rate-limit broadcasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceKey {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
}

impl SourceKey {
    pub fn new(guild_id: GuildId, channel_id: ChannelId) -> Self {
        Self {
            guild_id,
            channel_id,
        }
    }
}

impl std::fmt::Display for SourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.guild_id, self.channel_id)
    }
}

/// File attached to a broadcast message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            url: url.into(),
        }
    }

    /// Check whether the attachment can be shown inline as an embed image
    ///
    /// The URL path decides first (CDN URLs carry query strings, so a plain
    /// suffix check on the raw URL is unreliable). Falls back to the filename.
    pub fn is_image(&self) -> bool {
        let from_url = Url::parse(&self.url).ok().and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(has_image_extension))
        });

        from_url.unwrap_or_else(|| has_image_extension(&self.filename))
    }
}

fn has_image_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Pre-built rich content carried by the source message
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RichContent {
    pub text: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Broadcast payload, resolved once when the source is captured
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Text { text: String },
    Rich(RichContent),
    WithAttachments {
        text: String,
        attachments: Vec<Attachment>,
    },
}

impl Payload {
    /// Resolve the payload variant from message parts
    ///
    /// Attachments win over embeds; embeds win over plain text.
    pub fn resolve(text: &str, attachments: Vec<Attachment>, rich: Option<RichContent>) -> Self {
        if !attachments.is_empty() {
            return Payload::WithAttachments {
                text: text.to_string(),
                attachments,
            };
        }

        match rich {
            Some(mut rich) => {
                rich.text = text.to_string();
                Payload::Rich(rich)
            }
            None => Payload::Text {
                text: text.to_string(),
            },
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Payload::Text { text } => text,
            Payload::Rich(rich) => &rich.text,
            Payload::WithAttachments { text, .. } => text,
        }
    }
}

/// Origin of a broadcast
///
/// Immutable once a broadcast starts.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastSource {
    pub key: SourceKey,
    pub guild_name: String,
    pub message_id: MessageId,
    pub author_id: UserId,
    pub author_name: String,
    pub author_avatar_url: Option<String>,
    pub timestamp: Timestamp,
    pub payload: Payload,
}

impl BroadcastSource {
    /// Capture a broadcast source from a guild message
    ///
    /// Returns `None` for direct messages (no guild).
    pub fn from_message(message: &Message, guild_name: impl Into<String>) -> Option<Self> {
        let guild_id = message.guild_id?;

        let attachments = message
            .attachments
            .iter()
            .map(|a| Attachment::new(a.filename.clone(), a.url.clone()))
            .collect();

        let rich = message.embeds.first().map(|embed| RichContent {
            text: String::new(),
            title: embed.title.clone(),
            description: embed.description.clone(),
            image_url: embed.image.as_ref().map(|image| image.url.clone()),
        });

        Some(Self {
            key: SourceKey::new(guild_id, message.channel_id),
            guild_name: guild_name.into(),
            message_id: message.id,
            author_id: message.author.id,
            author_name: message.author.display_name().to_string(),
            author_avatar_url: message.author.avatar_url(),
            timestamp: message.timestamp,
            payload: Payload::resolve(&message.content, attachments, rich),
        })
    }
}
