use parking_lot::RwLock;

use crate::Core::error::{SlotError, SlotResult};

/// Largest message a channel can hold, in bytes.
pub const MAX_MESSAGE_LEN: usize = 128;

/// The single message held by a channel.
///
/// `len == 0` means nothing has been written yet. Zero-length writes are
/// rejected, so the state is unreachable once a write has succeeded.
#[derive(Clone, Copy)]
pub struct MessageStore {
    bytes: [u8; MAX_MESSAGE_LEN],
    len: usize,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore {
    pub const fn new() -> Self {
        Self {
            bytes: [0; MAX_MESSAGE_LEN],
            len: 0,
        }
    }

    /// Builds a store holding `message`.
    pub fn from_bytes(message: &[u8]) -> SlotResult<Self> {
        if message.is_empty() || message.len() > MAX_MESSAGE_LEN {
            return Err(SlotError::InvalidMessageSize { len: message.len() });
        }
        let mut store = Self::new();
        store.bytes[..message.len()].copy_from_slice(message);
        store.len = message.len();
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// One addressable mailbox inside a slot.
///
/// Writers replace the whole store under the write lock; readers copy it out
/// under the read lock, so a reader sees either the old or the new message.
pub struct Channel {
    id: u32,
    store: RwLock<MessageStore>,
}

impl Channel {
    pub(crate) fn new(id: u32) -> Self {
        Self {
            id,
            store: RwLock::new(MessageStore::new()),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Replaces the stored message.
    pub(crate) fn replace(&self, message: MessageStore) {
        *self.store.write() = message;
    }

    /// Copy of the current message.
    pub(crate) fn snapshot(&self) -> MessageStore {
        *self.store.read()
    }

    /// Length of the current message; 0 if never written.
    pub fn message_len(&self) -> usize {
        self.store.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_channel_is_empty() {
        let channel = Channel::new(3);
        assert_eq!(channel.id(), 3);
        assert_eq!(channel.message_len(), 0);
        assert!(channel.snapshot().is_empty());
    }

    #[test]
    fn replace_discards_previous_message() {
        let channel = Channel::new(1);
        channel.replace(MessageStore::from_bytes(b"a longer first message").unwrap());
        channel.replace(MessageStore::from_bytes(b"short").unwrap());
        assert_eq!(channel.snapshot().as_bytes(), b"short");
    }

    #[test]
    fn store_rejects_bad_sizes() {
        assert_eq!(
            MessageStore::from_bytes(b"").err(),
            Some(SlotError::InvalidMessageSize { len: 0 })
        );
        assert!(MessageStore::from_bytes(&[7u8; MAX_MESSAGE_LEN + 1]).is_err());
        assert_eq!(
            MessageStore::from_bytes(&[7u8; MAX_MESSAGE_LEN]).unwrap().len(),
            MAX_MESSAGE_LEN
        );
    }
}
