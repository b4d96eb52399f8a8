//! Error taxonomy for slot, channel and session operations.
//!
//! Every failure is local to the operation that reported it; none of them
//! leaves a slot, a channel or a session binding half-updated.

use thiserror::Error;

use crate::Slot::message::MAX_MESSAGE_LEN;

/// Errors returned by the message slot core.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    /// Channel id zero is reserved.
    #[error("invalid channel id 0")]
    InvalidChannelId,

    /// The slot already holds its maximum number of channels.
    #[error("channel limit of {limit} reached for this slot")]
    ChannelLimitExceeded { limit: usize },

    /// Backing storage could not be obtained for a new slot or channel.
    #[error("out of memory while creating slot or channel")]
    AllocationFailure,

    /// Read or write on a session that has not selected a channel.
    #[error("no channel selected")]
    ChannelNotSelected,

    /// Write of zero bytes or more than `MAX_MESSAGE_LEN` bytes.
    #[error("invalid message size {len} (expected 1..={})", MAX_MESSAGE_LEN)]
    InvalidMessageSize { len: usize },

    /// The bound channel has never been written.
    #[error("no message available on channel")]
    NoMessageAvailable,

    /// The caller's buffer cannot hold the stored message.
    ///
    /// Device responses carry only `needed`. An error decoded with
    /// `from_code` has `capacity` 0; `DeviceClient::read` puts back the
    /// capacity it asked for.
    #[error("destination holds {capacity} bytes, message is {needed}")]
    DestinationTooSmall { capacity: usize, needed: usize },

    /// The byte transport failed to complete a copy.
    #[error("bad address while copying message bytes")]
    CopyFault,
}

/// Result type for slot operations.
pub type SlotResult<T> = Result<T, SlotError>;

impl SlotError {
    /// The POSIX error number a character device reports for this failure.
    pub fn errno(&self) -> i32 {
        match self {
            SlotError::InvalidChannelId
            | SlotError::ChannelLimitExceeded { .. }
            | SlotError::ChannelNotSelected => libc::EINVAL,
            SlotError::AllocationFailure => libc::ENOMEM,
            SlotError::InvalidMessageSize { .. } => libc::EMSGSIZE,
            SlotError::NoMessageAvailable => libc::EWOULDBLOCK,
            SlotError::DestinationTooSmall { .. } => libc::ENOSPC,
            SlotError::CopyFault => libc::EFAULT,
        }
    }

    /// One-byte code carried in device responses. Zero means success and is
    /// never returned here.
    pub fn code(&self) -> u8 {
        match self {
            SlotError::InvalidChannelId => 1,
            SlotError::ChannelLimitExceeded { .. } => 2,
            SlotError::AllocationFailure => 3,
            SlotError::ChannelNotSelected => 4,
            SlotError::InvalidMessageSize { .. } => 5,
            SlotError::NoMessageAvailable => 6,
            SlotError::DestinationTooSmall { .. } => 7,
            SlotError::CopyFault => 8,
        }
    }

    /// Rebuilds an error from its wire code. `detail` is the response length
    /// field, which carries the size that was rejected where one applies.
    ///
    /// The wire has no room for a second size, so `DestinationTooSmall`
    /// comes back with `capacity` 0. Callers that know the capacity they
    /// requested fill it in themselves.
    pub fn from_code(code: u8, detail: u32) -> Option<Self> {
        let detail = detail as usize;
        Some(match code {
            1 => SlotError::InvalidChannelId,
            2 => SlotError::ChannelLimitExceeded { limit: detail },
            3 => SlotError::AllocationFailure,
            4 => SlotError::ChannelNotSelected,
            5 => SlotError::InvalidMessageSize { len: detail },
            6 => SlotError::NoMessageAvailable,
            7 => SlotError::DestinationTooSmall {
                capacity: 0,
                needed: detail,
            },
            8 => SlotError::CopyFault,
            _ => return None,
        })
    }

    /// Size detail sent alongside the wire code.
    pub fn detail(&self) -> u32 {
        match *self {
            SlotError::ChannelLimitExceeded { limit } => limit as u32,
            SlotError::InvalidMessageSize { len } => len.min(u32::MAX as usize) as u32,
            SlotError::DestinationTooSmall { needed, .. } => needed as u32,
            _ => 0,
        }
    }

    /// The matching `std::io::Error`, for callers that report OS-style
    /// diagnostics.
    pub fn to_io_error(&self) -> std::io::Error {
        std::io::Error::from_raw_os_error(self.errno())
    }
}
