pub mod client;
pub mod error;
pub mod layout;
pub mod server;
pub mod wire;

pub use client::DeviceClient;
pub use error::{DeviceError, DeviceResult};
pub use layout::MSG_SLOT_CHANNEL;
pub use server::{DeviceNode, DeviceServer};
