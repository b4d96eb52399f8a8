use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::Core::error::SlotError;

/// Errors raised by the device daemon and its clients.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// The slot core refused the operation.
    #[error(transparent)]
    Slot(#[from] SlotError),

    /// Socket could not be created or bound.
    #[error("failed to set up device {path}: {source}")]
    SocketSetup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed frame.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Peer hung up mid-exchange.
    #[error("device closed the connection")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type DeviceResult<T> = Result<T, DeviceError>;

impl DeviceError {
    /// The condition line printed by the command-line clients: the failure
    /// followed by the matching OS error text where there is one.
    pub fn diagnostic(&self) -> String {
        match self {
            DeviceError::Slot(err) => format!("{err} ({})", err.to_io_error()),
            other => other.to_string(),
        }
    }
}
