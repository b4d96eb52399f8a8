use std::sync::Arc;

use tracing::{debug, trace};

use crate::Core::error::{SlotError, SlotResult};
use crate::Core::transport::{UserSink, UserSource, VecSink};
use crate::Slot::message::{Channel, MessageStore, MAX_MESSAGE_LEN};
use crate::Slot::table::Slot;

/// Which channel, if any, a session reads and writes.
#[derive(Clone, Default)]
pub enum Binding {
    /// Freshly opened; only `select_channel` succeeds.
    #[default]
    Unbound,
    Bound(Arc<Channel>),
}

/// Per-connection state created by `open`.
///
/// The session shares its slot with every other session of the same
/// instance. Dropping a session never removes a slot or channel.
pub struct Session {
    slot: Arc<Slot>,
    binding: Binding,
}

impl Session {
    pub(crate) fn new(slot: Arc<Slot>) -> Self {
        Self {
            slot,
            binding: Binding::Unbound,
        }
    }

    pub fn slot(&self) -> &Arc<Slot> {
        &self.slot
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// The bound channel, if one has been selected.
    pub fn channel(&self) -> Option<&Arc<Channel>> {
        match &self.binding {
            Binding::Unbound => None,
            Binding::Bound(channel) => Some(channel),
        }
    }

    fn bound(&self) -> SlotResult<&Arc<Channel>> {
        self.channel().ok_or(SlotError::ChannelNotSelected)
    }

    /// Binds the session to `channel_id` in its slot, creating the channel
    /// if needed. On failure the previous binding is kept.
    pub fn select_channel(&mut self, channel_id: u32) -> SlotResult<()> {
        let channel = self.slot.get_or_create_channel(channel_id)?;
        debug!(minor = self.slot.minor(), channel_id, "session bound");
        self.binding = Binding::Bound(channel);
        Ok(())
    }

    /// Replaces the bound channel's message with the bytes from `src`.
    ///
    /// Returns the number of bytes accepted. The bytes are staged before the
    /// channel is touched, so a failed copy leaves the old message in place.
    pub fn write<S: UserSource + ?Sized>(&self, src: &S) -> SlotResult<usize> {
        let channel = self.bound()?;
        let len = src.len();
        if len == 0 || len > MAX_MESSAGE_LEN {
            return Err(SlotError::InvalidMessageSize { len });
        }

        let mut staged = [0u8; MAX_MESSAGE_LEN];
        src.copy_to(&mut staged[..len])?;
        channel.replace(MessageStore::from_bytes(&staged[..len])?);

        trace!(minor = self.slot.minor(), channel_id = channel.id(), len, "write");
        Ok(len)
    }

    /// Copies the bound channel's message into `dst`, leaving it stored.
    ///
    /// Returns the number of bytes copied, which is always the full message.
    pub fn read<D: UserSink + ?Sized>(&self, dst: &mut D) -> SlotResult<usize> {
        let channel = self.bound()?;
        let message = channel.snapshot();
        if message.is_empty() {
            return Err(SlotError::NoMessageAvailable);
        }
        if dst.capacity() < message.len() {
            return Err(SlotError::DestinationTooSmall {
                capacity: dst.capacity(),
                needed: message.len(),
            });
        }

        dst.copy_from(message.as_bytes())?;

        trace!(
            minor = self.slot.minor(),
            channel_id = channel.id(),
            len = message.len(),
            "read"
        );
        Ok(message.len())
    }

    /// Reads the current message into a new vector, as if into a buffer of
    /// `capacity` bytes.
    pub fn read_to_vec(&self, capacity: usize) -> SlotResult<Vec<u8>> {
        let mut sink = VecSink::with_capacity(capacity);
        self.read(&mut sink)?;
        Ok(sink.into_inner())
    }

    /// Ends the session. Slot and channel are unaffected.
    pub fn close(self) {
        debug!(minor = self.slot.minor(), "session closed");
    }
}
