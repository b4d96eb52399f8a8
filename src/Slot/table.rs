use std::collections::HashMap;
use std::sync::Arc;

use crossbeam_utils::CachePadded;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::Core::error::{SlotError, SlotResult};
use crate::Slot::message::Channel;

/// Maximum number of channels a single slot may hold (2^20).
pub const MAX_CHANNELS_PER_SLOT: usize = 1 << 20;

/// One device instance and its table of channels.
///
/// Channels are created on first selection and live as long as the slot.
pub struct Slot {
    minor: u32,
    channel_limit: usize,
    /// Padded so that slots opened back to back do not share a cache line
    /// between their table locks.
    channels: CachePadded<Mutex<HashMap<u32, Arc<Channel>>>>,
}

impl Slot {
    pub(crate) fn new(minor: u32, channel_limit: usize) -> Self {
        Self {
            minor,
            channel_limit,
            channels: CachePadded::new(Mutex::new(HashMap::new())),
        }
    }

    /// Instance identity of this slot.
    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn channel_limit(&self) -> usize {
        self.channel_limit
    }

    /// Number of channels created so far.
    pub fn channel_count(&self) -> usize {
        self.channels.lock().len()
    }

    /// Looks up a channel without creating it.
    pub fn channel(&self, channel_id: u32) -> Option<Arc<Channel>> {
        self.channels.lock().get(&channel_id).cloned()
    }

    /// Returns the channel with `channel_id`, creating it if absent.
    ///
    /// Existing channels are returned untouched. Lookup and insertion happen
    /// under one lock, so concurrent first selections of the same id all get
    /// the same channel.
    pub fn get_or_create_channel(&self, channel_id: u32) -> SlotResult<Arc<Channel>> {
        if channel_id == 0 {
            return Err(SlotError::InvalidChannelId);
        }

        let mut channels = self.channels.lock();
        if let Some(channel) = channels.get(&channel_id) {
            return Ok(Arc::clone(channel));
        }

        if channels.len() >= self.channel_limit {
            warn!(
                minor = self.minor,
                channel_id,
                limit = self.channel_limit,
                "channel limit reached"
            );
            return Err(SlotError::ChannelLimitExceeded {
                limit: self.channel_limit,
            });
        }

        if channels.try_reserve(1).is_err() {
            warn!(minor = self.minor, channel_id, "failed to allocate channel");
            return Err(SlotError::AllocationFailure);
        }

        let channel = Arc::new(Channel::new(channel_id));
        channels.insert(channel_id, Arc::clone(&channel));
        debug!(
            minor = self.minor,
            channel_id,
            count = channels.len(),
            "channel created"
        );
        Ok(channel)
    }

    /// Ids of all channels in this slot, in no particular order.
    pub fn channel_ids(&self) -> Vec<u32> {
        self.channels.lock().keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_id_is_rejected() {
        let slot = Slot::new(0, 8);
        assert_eq!(
            slot.get_or_create_channel(0).err(),
            Some(SlotError::InvalidChannelId)
        );
        assert_eq!(slot.channel_count(), 0);
    }

    #[test]
    fn lookup_is_idempotent() {
        let slot = Slot::new(0, 8);
        let first = slot.get_or_create_channel(42).unwrap();
        let second = slot.get_or_create_channel(42).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(slot.channel_count(), 1);
    }

    #[test]
    fn limit_refuses_new_ids_but_not_existing_ones() {
        let slot = Slot::new(4, 2);
        slot.get_or_create_channel(10).unwrap();
        slot.get_or_create_channel(20).unwrap();
        assert_eq!(
            slot.get_or_create_channel(30).err(),
            Some(SlotError::ChannelLimitExceeded { limit: 2 })
        );
        assert_eq!(slot.channel_count(), 2);
        assert!(slot.channel(30).is_none());
        assert!(slot.get_or_create_channel(10).is_ok());
    }
}
