use anyhow::anyhow;
use dmcast::adapters::MemberProvider;
use dmcast::broadcast::Recipient;
use serenity::async_trait;
use serenity::model::id::GuildId;
use std::sync::{Arc, Mutex};

pub struct MockMemberProvider {
    members: Result<Vec<Recipient>, String>,
    pub requests: Arc<Mutex<Vec<GuildId>>>,
}

impl MockMemberProvider {
    pub fn new(members: Vec<Recipient>) -> Self {
        Self {
            members: Ok(members),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// `count` human members with IDs starting at 1000
    pub fn humans(count: u64) -> Self {
        Self::new(
            (0..count)
                .map(|i| Recipient::new(1000 + i, format!("member{}", i)))
                .collect(),
        )
    }

    /// A provider whose snapshot always fails
    pub fn failing(reason: &str) -> Self {
        Self {
            members: Err(reason.to_string()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl MemberProvider for MockMemberProvider {
    async fn members(&self, guild_id: GuildId) -> anyhow::Result<Vec<Recipient>> {
        self.requests.lock().unwrap().push(guild_id);
        self.members.clone().map_err(|reason| anyhow!(reason))
    }
}
