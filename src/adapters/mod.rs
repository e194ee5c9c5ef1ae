// Trait definitions
pub mod delivery_transport;
pub mod member_provider;
pub mod progress_sink;

// Implementations
pub mod serenity_delivery_transport;
pub mod serenity_member_provider;
pub mod serenity_progress_sink;
pub mod serenity_welcome;

// Re-exports for convenience
pub use delivery_transport::{DeliveryTransport, SendError};
pub use member_provider::MemberProvider;
pub use progress_sink::ProgressSink;
pub use serenity_delivery_transport::SerenityDeliveryTransport;
pub use serenity_member_provider::SerenityMemberProvider;
pub use serenity_progress_sink::SerenityProgressSink;
