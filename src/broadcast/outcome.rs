use serde::Serialize;

/// Why a delivery was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The recipient cannot be addressed (unknown user, no DM channel)
    Unreachable,
    /// The recipient blocks inbound DMs from the bot
    Blocking,
    /// Timeout, rate limit or provider hiccup; safe to retry later
    Transient,
    /// Anything else
    Permanent,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unreachable => "unreachable",
            Self::Blocking => "blocking",
            Self::Transient => "transient",
            Self::Permanent => "permanent",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal classification of one delivery attempt to one recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered,
    Rejected(RejectReason),
}

impl DeliveryOutcome {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Rejected(RejectReason::Transient))
    }
}
