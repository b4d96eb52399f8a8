use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::Core::error::{SlotError, SlotResult};
use crate::Slot::builder::RegistryBuilder;
use crate::Slot::session::Session;
use crate::Slot::table::{Slot, MAX_CHANNELS_PER_SLOT};

lazy_static! {
    static ref GLOBAL_REGISTRY: SlotRegistry = SlotRegistry::new();
}

/// The process-wide registry used by [`crate::open`] and the C ABI.
pub fn global() -> &'static SlotRegistry {
    &GLOBAL_REGISTRY
}

/// Maps instance identities (minor numbers) to slots.
///
/// Slots are created on first open and kept for the life of the registry.
pub struct SlotRegistry {
    slots: RwLock<HashMap<u32, Arc<Slot>>>,
    channel_limit: usize,
}

impl Default for SlotRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::with_channel_limit(MAX_CHANNELS_PER_SLOT)
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub(crate) fn with_channel_limit(channel_limit: usize) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            channel_limit,
        }
    }

    /// Channel cap applied to every slot of this registry.
    pub fn channel_limit(&self) -> usize {
        self.channel_limit
    }

    /// Returns the slot for `minor`, creating it if absent. Concurrent first
    /// opens of one minor all receive the same slot.
    pub fn get_or_create_slot(&self, minor: u32) -> SlotResult<Arc<Slot>> {
        if let Some(slot) = self.slots.read().get(&minor) {
            return Ok(Arc::clone(slot));
        }

        let mut slots = self.slots.write();
        // Another opener may have won the race between the two locks.
        if let Some(slot) = slots.get(&minor) {
            return Ok(Arc::clone(slot));
        }

        if slots.try_reserve(1).is_err() {
            warn!(minor, "failed to allocate slot");
            return Err(SlotError::AllocationFailure);
        }

        let slot = Arc::new(Slot::new(minor, self.channel_limit));
        slots.insert(minor, Arc::clone(&slot));
        debug!(minor, slots = slots.len(), "slot created");
        Ok(slot)
    }

    /// Looks up a slot without creating it.
    pub fn slot(&self, minor: u32) -> Option<Arc<Slot>> {
        self.slots.read().get(&minor).cloned()
    }

    /// Number of live slots.
    pub fn slot_count(&self) -> usize {
        self.slots.read().len()
    }

    /// Opens an unbound session on the slot for `minor`.
    pub fn open(&self, minor: u32) -> SlotResult<Session> {
        let slot = self.get_or_create_slot(minor)?;
        debug!(minor, "session opened");
        Ok(Session::new(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_minor_yields_same_slot() {
        let registry = SlotRegistry::new();
        let a = registry.get_or_create_slot(3).unwrap();
        let b = registry.get_or_create_slot(3).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.slot_count(), 1);

        let c = registry.get_or_create_slot(4).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.slot_count(), 2);
    }

    #[test]
    fn sessions_share_their_slot() {
        let registry = SlotRegistry::new();
        let first = registry.open(1).unwrap();
        let second = registry.open(1).unwrap();
        assert!(Arc::ptr_eq(first.slot(), second.slot()));
        assert!(first.channel().is_none());
    }

    #[test]
    fn closing_a_session_keeps_slot_and_channel() {
        let registry = SlotRegistry::new();
        let mut session = registry.open(2).unwrap();
        session.select_channel(11).unwrap();
        session.write(&b"persist"[..]).unwrap();
        session.close();

        let slot = registry.slot(2).expect("slot survives close");
        assert_eq!(slot.channel(11).map(|c| c.message_len()), Some(7));
    }
}
