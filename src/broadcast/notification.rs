use serde::Serialize;
use serenity::builder::{CreateEmbed, CreateEmbedAuthor};
use serenity::model::Timestamp;

use super::discord_text::{truncate_description, truncate_field_value, truncate_name};
use super::source::{Attachment, BroadcastSource, Payload};

/// Maximum number of non-inline attachments listed as links
pub const MAX_ATTACHMENT_LINKS: usize = 5;

/// Embed color used for broadcast DMs (Discord blurple-ish blue)
pub const NOTIFICATION_COLOR: u32 = 0x34_98_DB;

/// Attachment rendered as a named link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedLink {
    pub name: String,
    pub url: String,
}

impl NamedLink {
    fn from_attachment(attachment: &Attachment) -> Self {
        Self {
            name: attachment.filename.clone(),
            url: attachment.url.clone(),
        }
    }

    fn markdown(&self) -> String {
        format!("[{}]({})", self.name, self.url)
    }
}

/// Recipient-facing notification derived from a broadcast source
///
/// Rendered once per broadcast and shared by every delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub author_name: String,
    pub author_icon_url: Option<String>,
    pub title: Option<String>,
    pub description: String,
    pub image_url: Option<String>,
    pub links: Vec<NamedLink>,
    /// Attachments left out of `links` because of `MAX_ATTACHMENT_LINKS`
    pub omitted_links: usize,
    pub timestamp: Timestamp,
}

impl Notification {
    /// Render the notification for a broadcast source
    ///
    /// At most one attachment is shown inline (the first image); the rest are
    /// listed as links, bounded by `MAX_ATTACHMENT_LINKS`.
    pub fn render(source: &BroadcastSource) -> Self {
        let author_name = truncate_name(&format!(
            "{} (from {})",
            source.author_name, source.guild_name
        ));

        let mut notification = Self {
            author_name,
            author_icon_url: source.author_avatar_url.clone(),
            title: None,
            description: String::new(),
            image_url: None,
            links: Vec::new(),
            omitted_links: 0,
            timestamp: source.timestamp,
        };

        match &source.payload {
            Payload::Text { text } => {
                notification.description = truncate_description(text);
            }
            Payload::Rich(rich) => {
                let parts: Vec<&str> = [Some(rich.text.as_str()), rich.description.as_deref()]
                    .into_iter()
                    .flatten()
                    .filter(|part| !part.is_empty())
                    .collect();

                notification.title = rich.title.as_deref().map(truncate_name);
                notification.description = truncate_description(&parts.join("\n\n"));
                notification.image_url = rich.image_url.clone();
            }
            Payload::WithAttachments { text, attachments } => {
                notification.description = truncate_description(text);

                let inline = attachments.iter().position(Attachment::is_image);
                notification.image_url = inline.map(|index| attachments[index].url.clone());

                let linked: Vec<NamedLink> = attachments
                    .iter()
                    .enumerate()
                    .filter(|(index, _)| Some(*index) != inline)
                    .map(|(_, attachment)| NamedLink::from_attachment(attachment))
                    .collect();

                notification.omitted_links = linked.len().saturating_sub(MAX_ATTACHMENT_LINKS);
                notification.links = linked.into_iter().take(MAX_ATTACHMENT_LINKS).collect();
            }
        }

        notification
    }

    /// Build the serenity embed sent to each recipient
    pub fn to_embed(&self) -> CreateEmbed {
        let mut author = CreateEmbedAuthor::new(self.author_name.clone());
        if let Some(icon) = &self.author_icon_url {
            author = author.icon_url(icon.clone());
        }

        let mut embed = CreateEmbed::new()
            .color(NOTIFICATION_COLOR)
            .author(author)
            .timestamp(self.timestamp);

        if !self.description.is_empty() {
            embed = embed.description(self.description.clone());
        }
        if let Some(title) = &self.title {
            embed = embed.title(title.clone());
        }
        if let Some(image) = &self.image_url {
            embed = embed.image(image.clone());
        }

        for link in &self.links {
            embed = embed.field("Attachment", truncate_field_value(&link.markdown()), false);
        }
        if self.omitted_links > 0 {
            embed = embed.field(
                "More attachments",
                format!("...and {} more", self.omitted_links),
                false,
            );
        }

        embed
    }
}
