use serenity::model::id::UserId;

use super::recipient::Recipient;

/// Derives the eligible recipient set from a raw membership snapshot
///
/// Automated accounts and accounts that already left the guild are always
/// dropped. The broadcast author is dropped when `exclude_author` is set.
/// Filtering is pure and order-preserving, so applying it twice yields the
/// same sequence as applying it once.
#[derive(Debug, Clone, Copy)]
pub struct RecipientFilter {
    exclude_author: bool,
}

impl RecipientFilter {
    pub fn new(exclude_author: bool) -> Self {
        Self { exclude_author }
    }

    pub fn excludes_author(&self) -> bool {
        self.exclude_author
    }

    /// Check whether a single member is eligible
    pub fn accepts(&self, recipient: &Recipient, author_id: UserId) -> bool {
        if recipient.is_bot || !recipient.in_guild {
            return false;
        }

        !(self.exclude_author && recipient.user_id == author_id)
    }

    /// Produce the eligible subsequence of `members`
    pub fn filter(&self, members: &[Recipient], author_id: UserId) -> Vec<Recipient> {
        members
            .iter()
            .filter(|recipient| self.accepts(recipient, author_id))
            .cloned()
            .collect()
    }
}

impl Default for RecipientFilter {
    fn default() -> Self {
        Self::new(true)
    }
}
