pub mod channel_registry;
pub mod coordinator;
pub mod delivery;
pub mod discord_text;
pub mod guard;
pub mod notification;
pub mod outcome;
pub mod rate_limiter;
pub mod recipient;
pub mod recipient_filter;
pub mod shutdown;
pub mod source;
pub mod state;
pub mod trigger_filter;

// Re-exports for convenience
pub use channel_registry::ChannelRegistry;
pub use coordinator::{BatchCoordinator, BroadcastPolicy, BroadcastReport};
pub use guard::{AdmissionDenied, GuardRegistry, GuardState};
pub use outcome::{DeliveryOutcome, RejectReason};
pub use rate_limiter::RateLimiter;
pub use recipient::Recipient;
pub use recipient_filter::RecipientFilter;
pub use shutdown::{ShutdownSignal, ShutdownTrigger, shutdown_channel};
pub use source::{BroadcastSource, SourceKey};
pub use state::{FinalSummary, ProgressSnapshot};
