//! Message slots: many independent single-message mailboxes.
//!
//! A *slot* stands for one device instance (keyed by its minor number) and
//! holds up to 2^20 *channels*. Each channel keeps only the last message
//! written to it, at most 128 bytes. A [`Session`] is opened on a slot,
//! selects a channel, then reads or writes that channel's message.
//!
//! ```
//! let registry = message_slot::SlotRegistry::new();
//! let mut session = registry.open(0)?;
//! session.select_channel(7)?;
//! session.write(&b"hello"[..])?;
//! assert_eq!(session.read_to_vec(128)?, b"hello");
//! # Ok::<(), message_slot::SlotError>(())
//! ```

// Module naming follows project convention (CamelCase top-level areas)
#[allow(non_snake_case)]
pub mod Core {
    pub mod error;
    pub mod registry;
    pub mod transport;
    pub use error::{SlotError, SlotResult};
    pub use registry::{global, SlotRegistry}; // re-export for stable path
}
#[allow(non_snake_case)]
pub mod Slot {
    pub mod builder;
    pub mod message;
    pub mod session;
    pub mod table;
    pub use builder::RegistryBuilder;
    pub use message::{Channel, MessageStore, MAX_MESSAGE_LEN};
    pub use session::{Binding, Session};
    pub use table::{Slot, MAX_CHANNELS_PER_SLOT};
}
#[allow(non_snake_case)]
pub mod Device;
#[allow(non_snake_case)]
pub mod Debug {
    pub mod StructDebug;
}
pub mod ffi;

pub use Core::{SlotError, SlotRegistry, SlotResult};
pub use Slot::{Session, MAX_CHANNELS_PER_SLOT, MAX_MESSAGE_LEN};

/// Opens a session on `minor` in the process-wide registry.
pub fn open(minor: u32) -> SlotResult<Session> {
    Core::registry::global().open(minor)
}
