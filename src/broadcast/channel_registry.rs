use serenity::model::id::ChannelId;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

/// Set of channels whose messages are broadcast
///
/// Seeded from configuration at startup. Cloning shares the same set, so a
/// command layer holding a clone can `register`/`unregister` channels at
/// runtime and the trigger filter sees the change on the next message.
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    channels: Arc<RwLock<HashSet<ChannelId>>>,
}

impl ChannelRegistry {
    pub fn new(channels: impl IntoIterator<Item = ChannelId>) -> Self {
        Self {
            channels: Arc::new(RwLock::new(channels.into_iter().collect())),
        }
    }

    /// Register a channel; returns `false` if it was already registered
    pub fn register(&self, channel_id: ChannelId) -> bool {
        self.channels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(channel_id)
    }

    /// Unregister a channel; returns `false` if it was not registered
    pub fn unregister(&self, channel_id: ChannelId) -> bool {
        self.channels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&channel_id)
    }

    pub fn contains(&self, channel_id: ChannelId) -> bool {
        self.channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&channel_id)
    }

    pub fn len(&self) -> usize {
        self.channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_unregister() {
        let registry = ChannelRegistry::default();
        let channel = ChannelId::new(42);

        assert!(!registry.contains(channel));
        assert!(registry.register(channel));
        assert!(!registry.register(channel), "second register is a no-op");
        assert!(registry.contains(channel));

        assert!(registry.unregister(channel));
        assert!(!registry.unregister(channel));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let registry = ChannelRegistry::new([ChannelId::new(1)]);
        let shared = registry.clone();

        shared.register(ChannelId::new(2));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(ChannelId::new(2)));
    }
}
