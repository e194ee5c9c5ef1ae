use rstest::rstest;
use serenity::model::id::{ChannelId, GuildId};

use super::{FilterableMessage, TriggerFilter};
use crate::broadcast::channel_registry::ChannelRegistry;

const BROADCAST_CHANNEL: u64 = 100;

/// Mock message implementation for unit testing
#[derive(Debug)]
struct MockMessage {
    is_bot: bool,
    is_system: bool,
    webhook_id: Option<u64>,
    guild_id: Option<GuildId>,
    channel_id: ChannelId,
    content: String,
}

impl MockMessage {
    fn new(content: &str) -> Self {
        Self {
            is_bot: false,
            is_system: false,
            webhook_id: None,
            guild_id: Some(GuildId::new(1)),
            channel_id: ChannelId::new(BROADCAST_CHANNEL),
            content: content.to_string(),
        }
    }

    fn bot(mut self) -> Self {
        self.is_bot = true;
        self
    }

    fn system(mut self) -> Self {
        self.is_system = true;
        self
    }

    fn webhook(mut self, webhook_id: u64) -> Self {
        self.webhook_id = Some(webhook_id);
        self
    }

    fn direct(mut self) -> Self {
        self.guild_id = None;
        self
    }

    fn in_channel(mut self, channel_id: u64) -> Self {
        self.channel_id = ChannelId::new(channel_id);
        self
    }
}

impl FilterableMessage for MockMessage {
    fn is_bot(&self) -> bool {
        self.is_bot
    }

    fn is_system(&self) -> bool {
        self.is_system
    }

    fn webhook_id(&self) -> Option<u64> {
        self.webhook_id
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

fn filter(prefix: &str) -> TriggerFilter {
    TriggerFilter::new(ChannelRegistry::new([ChannelId::new(BROADCAST_CHANNEL)]), prefix)
}

#[rstest]
#[case::human_in_broadcast_channel(MockMessage::new("Hello all"), true)]
#[case::bot_author(MockMessage::new("beep").bot(), false)]
#[case::system_author(MockMessage::new("joined").system(), false)]
#[case::webhook(MockMessage::new("relay").bot().webhook(5), false)]
#[case::direct_message(MockMessage::new("psst").direct(), false)]
#[case::other_channel(MockMessage::new("chatter").in_channel(200), false)]
#[case::command(MockMessage::new("/info"), false)]
#[case::indented_command(MockMessage::new("  /info"), false)]
fn test_should_broadcast(#[case] message: MockMessage, #[case] expected: bool) {
    assert_eq!(filter("/").should_broadcast(&message), expected);
}

#[test]
fn test_empty_prefix_disables_command_check() {
    assert!(filter("").should_broadcast(&MockMessage::new("/not-a-command")));
}

#[test]
fn test_registration_changes_apply_immediately() {
    let filter = filter("/");
    let message = MockMessage::new("news").in_channel(300);

    assert!(!filter.should_broadcast(&message));
    filter.channels().register(ChannelId::new(300));
    assert!(filter.should_broadcast(&message));
}
