use serde::Serialize;
use serenity::model::guild::Member;
use serenity::model::id::UserId;

/// Addressable broadcast target
///
/// A read-only snapshot of a guild member taken when a broadcast starts.
/// Later membership changes never affect an in-flight broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub user_id: UserId,
    /// Human-readable tag used in failure listings (e.g. `name#0001` or `name`)
    pub tag: String,
    pub is_bot: bool,
    pub in_guild: bool,
}

impl Recipient {
    /// Create a human recipient that is a current guild member
    ///
    /// # Panics
    ///
    /// Panics if `user_id` is 0, which is never a valid Discord snowflake.
    pub fn new(user_id: u64, tag: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(user_id),
            tag: tag.into(),
            is_bot: false,
            in_guild: true,
        }
    }

    /// Mark this recipient as an automated account
    pub fn bot(mut self) -> Self {
        self.is_bot = true;
        self
    }

    /// Mark this recipient as no longer belonging to the guild
    pub fn departed(mut self) -> Self {
        self.in_guild = false;
        self
    }
}

impl From<&Member> for Recipient {
    fn from(member: &Member) -> Self {
        Self {
            user_id: member.user.id,
            tag: member.user.tag(),
            is_bot: member.user.bot || member.user.system,
            in_guild: true,
        }
    }
}
