use std::io::BufReader;
use std::os::unix::net::UnixStream;
use std::path::Path;

use tracing::debug;

use crate::Core::error::SlotError;
use crate::Device::error::{DeviceError, DeviceResult};
use crate::Device::layout::MAX_FRAME_PAYLOAD;
use crate::Device::wire::{read_response, write_request, Request};

/// A session on a device node served by `message_slotd`.
///
/// Connecting opens the session; dropping the client closes it.
pub struct DeviceClient {
    reader: BufReader<UnixStream>,
    writer: UnixStream,
    minor: u32,
}

impl DeviceClient {
    /// Opens the device file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> DeviceResult<Self> {
        let stream = UnixStream::connect(path.as_ref())?;
        let mut reader = BufReader::new(stream.try_clone()?);
        let (minor, _) = read_response(&mut reader, false)?;
        debug!(path = %path.as_ref().display(), minor, "device opened");
        Ok(Self {
            reader,
            writer: stream,
            minor,
        })
    }

    /// Minor number of the slot behind this device file.
    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn select_channel(&mut self, channel_id: u32) -> DeviceResult<()> {
        write_request(&mut self.writer, &Request::SetChannel(channel_id))?;
        read_response(&mut self.reader, false)?;
        Ok(())
    }

    /// Writes `message` to the selected channel; returns the bytes accepted.
    pub fn write(&mut self, message: &[u8]) -> DeviceResult<usize> {
        if message.len() > MAX_FRAME_PAYLOAD {
            return Err(SlotError::InvalidMessageSize { len: message.len() }.into());
        }
        write_request(&mut self.writer, &Request::Write(message.to_vec()))?;
        let (count, _) = read_response(&mut self.reader, false)?;
        Ok(count as usize)
    }

    /// Reads the selected channel's message into a buffer of `capacity`
    /// bytes.
    pub fn read(&mut self, capacity: usize) -> DeviceResult<Vec<u8>> {
        let capacity_arg = u32::try_from(capacity).unwrap_or(u32::MAX);
        write_request(&mut self.writer, &Request::Read { capacity: capacity_arg })?;
        match read_response(&mut self.reader, true) {
            Ok((_, message)) => Ok(message),
            Err(DeviceError::Slot(SlotError::DestinationTooSmall { needed, .. })) => {
                Err(SlotError::DestinationTooSmall { capacity, needed }.into())
            }
            Err(e) => Err(e),
        }
    }
}
