//! Discord text processing utilities
//!
//! Discord enforces length limits on everything the bot sends:
//! - Message content: 2000 characters
//! - Embed description: 4096 characters
//! - Embed field value: 1024 characters
//! - Embed title / author name / field name: 256 characters
//!
//! All functions count characters rather than bytes so multibyte text is
//! never split in the middle of a code point.

use tracing::warn;

pub const MAX_CONTENT_LEN: usize = 2000;
pub const MAX_DESCRIPTION_LEN: usize = 4096;
pub const MAX_FIELD_VALUE_LEN: usize = 1024;
pub const MAX_NAME_LEN: usize = 256;

/// Truncate text to `max_len` characters, ending with "..." when shortened
pub fn truncate(text: &str, max_len: usize) -> String {
    let char_count = text.chars().count();

    if char_count <= max_len {
        return text.to_string();
    }

    let keep = max_len.saturating_sub(3);
    let truncated: String = text.chars().take(keep).collect();
    let result = format!("{}...", truncated);

    warn!(
        original_len = char_count,
        truncated_len = result.chars().count(),
        max_len,
        "Text exceeds Discord limit, truncated"
    );

    result
}

/// Truncate message content to Discord's 2000 character limit
pub fn truncate_content(content: &str) -> String {
    truncate(content, MAX_CONTENT_LEN)
}

/// Truncate an embed description to Discord's 4096 character limit
pub fn truncate_description(description: &str) -> String {
    truncate(description, MAX_DESCRIPTION_LEN)
}

/// Truncate an embed field value to Discord's 1024 character limit
pub fn truncate_field_value(value: &str) -> String {
    truncate(value, MAX_FIELD_VALUE_LEN)
}

/// Truncate an embed name-like string (title, author, field name)
pub fn truncate_name(name: &str) -> String {
    truncate(name, MAX_NAME_LEN)
}
