use super::member_provider::MemberProvider;
use crate::broadcast::recipient::Recipient;
use anyhow::Context as _;
use serenity::async_trait;
use serenity::model::id::{GuildId, UserId};
use std::sync::Arc;
use tracing::debug;

/// Page size for the guild member list endpoint (Discord maximum)
const MEMBER_PAGE_SIZE: u64 = 1000;

/// Implementation for member snapshots via Serenity
///
/// Uses the gateway cache when it holds the complete member list, otherwise
/// pages through the REST API. With `refresh` set the cache is skipped.
pub struct SerenityMemberProvider {
    cache: Arc<serenity::cache::Cache>,
    http: Arc<serenity::http::Http>,
    refresh: bool,
}

impl SerenityMemberProvider {
    pub fn new(
        cache: Arc<serenity::cache::Cache>,
        http: Arc<serenity::http::Http>,
        refresh: bool,
    ) -> Self {
        Self {
            cache,
            http,
            refresh,
        }
    }

    fn cached_members(&self, guild_id: GuildId) -> Option<Vec<Recipient>> {
        // Guild references are dropped before any await point
        let guild = self.cache.guild(guild_id)?;

        if (guild.members.len() as u64) < guild.member_count {
            debug!(
                guild_id = %guild_id,
                cached = guild.members.len(),
                member_count = guild.member_count,
                "Cached member list incomplete"
            );
            return None;
        }

        Some(guild.members.values().map(Recipient::from).collect())
    }

    async fn fetch_members(&self, guild_id: GuildId) -> anyhow::Result<Vec<Recipient>> {
        let mut recipients = Vec::new();
        let mut after: Option<UserId> = None;

        loop {
            let page = guild_id
                .members(&self.http, Some(MEMBER_PAGE_SIZE), after)
                .await
                .with_context(|| format!("Fetching members of guild {}", guild_id))?;

            let page_len = page.len() as u64;
            after = page.last().map(|member| member.user.id);
            recipients.extend(page.iter().map(Recipient::from));

            if page_len < MEMBER_PAGE_SIZE {
                break;
            }
        }

        Ok(recipients)
    }
}

#[async_trait]
impl MemberProvider for SerenityMemberProvider {
    async fn members(&self, guild_id: GuildId) -> anyhow::Result<Vec<Recipient>> {
        let cached = if self.refresh {
            None
        } else {
            self.cached_members(guild_id)
        };

        let mut recipients = match cached {
            Some(cached) => cached,
            None => self.fetch_members(guild_id).await?,
        };

        // Cache iteration order is arbitrary
        recipients.sort_by_key(|recipient| recipient.user_id);

        debug!(
            guild_id = %guild_id,
            count = recipients.len(),
            refresh = self.refresh,
            "Member snapshot taken"
        );

        Ok(recipients)
    }
}
