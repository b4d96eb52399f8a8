use crate::Core::registry::SlotRegistry;
use crate::Slot::table::MAX_CHANNELS_PER_SLOT;

/// Configures a [`SlotRegistry`].
pub struct RegistryBuilder {
    channel_limit: usize,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            channel_limit: MAX_CHANNELS_PER_SLOT, // 2^20 per slot
        }
    }
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of channels per slot. Values outside
    /// `1..=MAX_CHANNELS_PER_SLOT` are clamped into that range.
    pub fn with_channel_limit(mut self, limit: usize) -> Self {
        self.channel_limit = limit.clamp(1, MAX_CHANNELS_PER_SLOT);
        self
    }

    pub fn build(self) -> SlotRegistry {
        SlotRegistry::with_channel_limit(self.channel_limit)
    }
}
