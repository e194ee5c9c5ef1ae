use super::progress_sink::ProgressSink;
use crate::broadcast::discord_text::{truncate_content, truncate_field_value};
use crate::broadcast::guard::AdmissionDenied;
use crate::broadcast::state::{FinalSummary, ProgressSnapshot};
use anyhow::Context as _;
use serenity::async_trait;
use serenity::builder::{CreateEmbed, CreateEmbedFooter, CreateMessage, EditMessage};
use serenity::model::id::{ChannelId, MessageId};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

const SENDING_REACTION: char = '📡';
const DONE_REACTION: char = '✅';
const FAILED_REACTION: char = '❌';
const STOPPED_REACTION: char = '🛑';

const SUCCESS_COLOR: u32 = 0x2E_CC_71;
const FAILURE_COLOR: u32 = 0xE7_4C_3C;

/// How long transient notices stay in the channel
const NOTICE_TTL: Duration = Duration::from_secs(10);

/// Renders broadcast progress into the broadcast channel
///
/// One sink is created per trigger message. It reacts on the trigger, keeps a
/// single status message and edits it as chunks complete.
pub struct SerenityProgressSink {
    http: Arc<serenity::http::Http>,
    channel_id: ChannelId,
    trigger_id: MessageId,
    status_id: Mutex<Option<MessageId>>,
}

impl SerenityProgressSink {
    /// Create a sink bound to the message that triggered the broadcast
    pub fn new(http: Arc<serenity::http::Http>, channel_id: ChannelId, trigger_id: MessageId) -> Self {
        Self {
            http,
            channel_id,
            trigger_id,
            status_id: Mutex::new(None),
        }
    }

    fn status_id(&self) -> Option<MessageId> {
        *self.status_id.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Edit the status message, posting it first if it does not exist yet
    async fn upsert_status(&self, content: String, embed: Option<CreateEmbed>) -> anyhow::Result<()> {
        let content = truncate_content(&content);

        if let Some(status_id) = self.status_id() {
            let mut edit = EditMessage::new().content(content);
            if let Some(embed) = embed {
                edit = edit.embed(embed);
            }
            self.channel_id
                .edit_message(&self.http, status_id, edit)
                .await
                .context("Editing broadcast status message")?;
            return Ok(());
        }

        let mut create = CreateMessage::new()
            .content(content)
            .reference_message((self.channel_id, self.trigger_id));
        if let Some(embed) = embed {
            create = create.embed(embed);
        }
        let status = self
            .channel_id
            .send_message(&self.http, create)
            .await
            .context("Posting broadcast status message")?;

        *self.status_id.lock().unwrap_or_else(PoisonError::into_inner) = Some(status.id);
        Ok(())
    }

    /// Replace the in-progress reaction on the trigger message
    ///
    /// The result reaction is added even if the in-progress one cannot be removed.
    async fn swap_reaction(&self, reaction: char) -> anyhow::Result<()> {
        if let Err(err) = self
            .channel_id
            .delete_reaction(&self.http, self.trigger_id, None, SENDING_REACTION)
            .await
        {
            debug!(?err, "Failed to remove in-progress reaction");
        }
        self.channel_id
            .create_reaction(&self.http, self.trigger_id, reaction)
            .await
            .context("Adding result reaction")?;
        Ok(())
    }
}

#[async_trait]
impl ProgressSink for SerenityProgressSink {
    async fn denied(&self, reason: &AdmissionDenied) -> anyhow::Result<()> {
        let notice = self
            .channel_id
            .send_message(
                &self.http,
                CreateMessage::new()
                    .content(denied_text(reason))
                    .reference_message((self.channel_id, self.trigger_id)),
            )
            .await
            .context("Posting admission notice")?;

        // Transient notice: remove it after a while without blocking the caller
        let http = Arc::clone(&self.http);
        let channel_id = self.channel_id;
        tokio::spawn(async move {
            tokio::time::sleep(NOTICE_TTL).await;
            if let Err(err) = channel_id.delete_message(&http, notice.id).await {
                debug!(?err, "Failed to delete admission notice");
            }
        });

        Ok(())
    }

    async fn started(&self, total: usize) -> anyhow::Result<()> {
        self.channel_id
            .create_reaction(&self.http, self.trigger_id, SENDING_REACTION)
            .await
            .context("Adding in-progress reaction")?;
        self.upsert_status(started_text(total), None).await
    }

    async fn progress(&self, snapshot: &ProgressSnapshot) -> anyhow::Result<()> {
        self.upsert_status(progress_text(snapshot), None).await
    }

    async fn finished(&self, summary: &FinalSummary) -> anyhow::Result<()> {
        self.upsert_status(finished_text(summary), Some(summary_embed(summary)))
            .await?;
        self.swap_reaction(result_reaction(summary)).await
    }

    async fn failed(&self, error: &anyhow::Error) -> anyhow::Result<()> {
        debug!(?error, "Rendering broadcast failure");

        let embed = CreateEmbed::new()
            .title("❌ Broadcast Failed")
            .description("An error occurred while sending the broadcast.")
            .color(FAILURE_COLOR);
        self.channel_id
            .send_message(
                &self.http,
                CreateMessage::new()
                    .embed(embed)
                    .reference_message((self.channel_id, self.trigger_id)),
            )
            .await
            .context("Posting failure notice")?;

        // The in-progress reaction is only added once delivery starts
        self.channel_id
            .create_reaction(&self.http, self.trigger_id, FAILED_REACTION)
            .await
            .context("Adding failure reaction")?;
        Ok(())
    }
}

pub fn denied_text(reason: &AdmissionDenied) -> String {
    match reason {
        AdmissionDenied::Cooldown { .. } => format!("⏳ Slow down: {}.", reason),
        AdmissionDenied::AlreadyRunning => format!("⚠️ Not sent: {}.", reason),
    }
}

pub fn started_text(total: usize) -> String {
    match total {
        0 => "📭 No members to message.".to_string(),
        1 => "📤 Sending DM to 1 member...".to_string(),
        n => format!("📤 Sending DMs to {} members...", n),
    }
}

pub fn progress_text(snapshot: &ProgressSnapshot) -> String {
    format!(
        "⏳ Processed {}/{} members ({} delivered, {} failed)...",
        snapshot.processed, snapshot.total, snapshot.succeeded, snapshot.failed
    )
}

pub fn finished_text(summary: &FinalSummary) -> String {
    if summary.cancelled {
        "🛑 DM broadcast stopped before completion.".to_string()
    } else {
        "✅ DM broadcast completed!".to_string()
    }
}

/// Reaction left on the trigger message once a broadcast ends
pub fn result_reaction(summary: &FinalSummary) -> char {
    if summary.cancelled {
        STOPPED_REACTION
    } else {
        DONE_REACTION
    }
}

/// Build the result embed shown when a broadcast finishes
pub fn summary_embed(summary: &FinalSummary) -> CreateEmbed {
    let color = if summary.succeeded > 0 {
        SUCCESS_COLOR
    } else {
        FAILURE_COLOR
    };

    let mut embed = CreateEmbed::new()
        .title("DM Broadcast Results")
        .color(color)
        .field("Successful", summary.succeeded.to_string(), true)
        .field("Failed", summary.failed.to_string(), true)
        .field("Total", summary.total.to_string(), true);

    if summary.failed > 0 {
        if let Some(rate) = summary.success_rate() {
            embed = embed.field("Success Rate", format!("{:.1}%", rate), true);
        }
        embed = embed
            .field(
                "Failed Users",
                truncate_field_value(&summary.failed_lines().join("\n")),
                false,
            )
            .footer(CreateEmbedFooter::new(
                "Failed deliveries are usually due to disabled DMs",
            ));
    }

    embed
}
