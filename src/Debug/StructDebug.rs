use std::fmt;

use crate::Core::registry::SlotRegistry;
use crate::Slot::message::{Channel, MessageStore};
use crate::Slot::session::{Binding, Session};
use crate::Slot::table::Slot;

/// Debug function for MessageStore
///
/// Shows the length only; message bytes are caller data and stay out of logs.
pub fn debug_message_store(store: &MessageStore, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MessageStore")
        .field("len", &store.len())
        .finish_non_exhaustive()
}

/// Debug function for Channel
pub fn debug_channel(channel: &Channel, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Channel")
        .field("id", &channel.id())
        .field("message_len", &channel.message_len())
        .finish()
}

/// Debug function for Slot
///
/// Shows:
/// - Instance identity (minor)
/// - Channel count against the configured limit
pub fn debug_slot(slot: &Slot, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Slot")
        .field("minor", &slot.minor())
        .field("channel_count", &slot.channel_count())
        .field("channel_limit", &slot.channel_limit())
        .finish()
}

/// Debug function for SlotRegistry
pub fn debug_slot_registry(registry: &SlotRegistry, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SlotRegistry")
        .field("slots", &registry.slot_count())
        .field("channel_limit", &registry.channel_limit())
        .finish()
}

/// Debug function for Session
///
/// Prints the slot's minor and the bound channel id rather than the whole
/// slot, which may hold a million channels.
pub fn debug_session(session: &Session, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut s = f.debug_struct("Session");
    s.field("minor", &session.slot().minor());
    match session.binding() {
        Binding::Unbound => s.field("binding", &"Unbound"),
        Binding::Bound(channel) => s.field("binding", &format_args!("Bound({})", channel.id())),
    };
    s.finish()
}

impl fmt::Debug for MessageStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_message_store(self, f)
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_channel(self, f)
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_slot(self, f)
    }
}

impl fmt::Debug for SlotRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_slot_registry(self, f)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Unbound => f.write_str("Unbound"),
            Binding::Bound(channel) => f.debug_tuple("Bound").field(&channel.id()).finish(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_session(self, f)
    }
}
