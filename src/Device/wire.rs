// Frame codec for the device socket. See `layout` for the header formats.

use std::io::{self, Read, Write};

use crate::Core::error::SlotError;
use crate::Device::error::{DeviceError, DeviceResult};
use crate::Device::layout::{
    RequestHeader, ResponseHeader, MAX_FRAME_PAYLOAD, OP_READ, OP_SET_CHANNEL, OP_WRITE,
    REQUEST_HEADER_LEN, RESPONSE_HEADER_LEN, STATUS_OK,
};

/// A decoded client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    SetChannel(u32),
    Write(Vec<u8>),
    Read { capacity: u32 },
}

/// Reads exactly `buf.len()` bytes. `Ok(false)` means the stream ended
/// cleanly before the first byte.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> DeviceResult<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => return Err(DeviceError::Closed),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

/// Reads the next request. Returns `Ok(None)` when the client has closed
/// the connection between requests.
pub fn read_request<R: Read>(reader: &mut R) -> DeviceResult<Option<Request>> {
    let mut raw = [0u8; REQUEST_HEADER_LEN];
    if !read_full(reader, &mut raw)? {
        return Ok(None);
    }
    let header = RequestHeader::from_bytes(raw);

    let request = match header.op {
        OP_SET_CHANNEL => Request::SetChannel(header.arg),
        OP_WRITE => {
            let len = header.arg as usize;
            if len > MAX_FRAME_PAYLOAD {
                return Err(DeviceError::Protocol(format!(
                    "write payload of {len} bytes exceeds frame limit {MAX_FRAME_PAYLOAD}"
                )));
            }
            let mut payload = vec![0u8; len];
            if len > 0 && !read_full(reader, &mut payload)? {
                return Err(DeviceError::Closed);
            }
            Request::Write(payload)
        }
        OP_READ => Request::Read {
            capacity: header.arg,
        },
        op => return Err(DeviceError::Protocol(format!("unknown op {op}"))),
    };
    Ok(Some(request))
}

pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> DeviceResult<()> {
    let (op, arg, payload): (u16, u32, &[u8]) = match request {
        Request::SetChannel(id) => (OP_SET_CHANNEL, *id, &[][..]),
        Request::Write(bytes) => {
            let len = u32::try_from(bytes.len())
                .map_err(|_| SlotError::InvalidMessageSize { len: bytes.len() })?;
            (OP_WRITE, len, bytes.as_slice())
        }
        Request::Read { capacity } => (OP_READ, *capacity, &[][..]),
    };

    let header = RequestHeader {
        op,
        reserved: 0,
        arg,
    };
    let mut frame = Vec::with_capacity(REQUEST_HEADER_LEN + payload.len());
    frame.extend_from_slice(&header.to_bytes());
    frame.extend_from_slice(payload);
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Encodes the outcome of one operation. On success `count` is the byte
/// count and `payload` (read only) follows the header.
pub fn write_response<W: Write>(
    writer: &mut W,
    outcome: Result<(u32, &[u8]), SlotError>,
) -> DeviceResult<()> {
    let (header, payload) = match outcome {
        Ok((count, payload)) => (
            ResponseHeader {
                status: STATUS_OK,
                reserved: [0; 3],
                len: count,
            },
            payload,
        ),
        Err(err) => (
            ResponseHeader {
                status: err.code(),
                reserved: [0; 3],
                len: err.detail(),
            },
            &[][..],
        ),
    };

    let mut frame = Vec::with_capacity(RESPONSE_HEADER_LEN + payload.len());
    frame.extend_from_slice(&header.to_bytes());
    frame.extend_from_slice(payload);
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Decodes one response. `with_payload` is set for reads, whose successful
/// responses carry the message bytes.
pub fn read_response<R: Read>(reader: &mut R, with_payload: bool) -> DeviceResult<(u32, Vec<u8>)> {
    let mut raw = [0u8; RESPONSE_HEADER_LEN];
    if !read_full(reader, &mut raw)? {
        return Err(DeviceError::Closed);
    }
    let header = ResponseHeader::from_bytes(raw);

    if header.status != STATUS_OK {
        let err = SlotError::from_code(header.status, header.len).ok_or_else(|| {
            DeviceError::Protocol(format!("unknown status {}", header.status))
        })?;
        return Err(err.into());
    }

    if !with_payload {
        return Ok((header.len, Vec::new()));
    }

    let len = header.len as usize;
    if len > MAX_FRAME_PAYLOAD {
        return Err(DeviceError::Protocol(format!(
            "read payload of {len} bytes exceeds frame limit"
        )));
    }
    let mut payload = vec![0u8; len];
    if len > 0 && !read_full(reader, &mut payload)? {
        return Err(DeviceError::Closed);
    }
    Ok((header.len, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn empty_stream_is_a_clean_close() {
        let mut empty = Cursor::new(Vec::new());
        assert!(matches!(read_request(&mut empty), Ok(None)));
    }

    #[test]
    fn truncated_payload_is_reported() {
        let mut buf = Vec::new();
        write_request(&mut buf, &Request::Write(b"hello".to_vec())).unwrap();
        buf.truncate(buf.len() - 2);
        assert!(matches!(
            read_request(&mut Cursor::new(buf)),
            Err(DeviceError::Closed)
        ));
    }

    #[test]
    fn oversized_frame_is_a_protocol_error() {
        let header = RequestHeader {
            op: OP_WRITE,
            reserved: 0,
            arg: (MAX_FRAME_PAYLOAD + 1) as u32,
        };
        let mut stream = Cursor::new(header.to_bytes().to_vec());
        assert!(matches!(
            read_request(&mut stream),
            Err(DeviceError::Protocol(_))
        ));
    }

    #[test]
    fn unknown_op_is_a_protocol_error() {
        let header = RequestHeader {
            op: 99,
            reserved: 0,
            arg: 0,
        };
        let mut stream = Cursor::new(header.to_bytes().to_vec());
        assert!(matches!(
            read_request(&mut stream),
            Err(DeviceError::Protocol(_))
        ));
    }

    #[test]
    fn error_response_carries_kind_and_detail() {
        let mut buf = Vec::new();
        write_response(&mut buf, Err(SlotError::InvalidMessageSize { len: 129 })).unwrap();
        match read_response(&mut Cursor::new(buf), false) {
            Err(DeviceError::Slot(err)) => {
                assert_eq!(err, SlotError::InvalidMessageSize { len: 129 })
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn read_response_returns_payload() {
        let mut buf = Vec::new();
        write_response(&mut buf, Ok((3, &b"abc"[..]))).unwrap();
        let (count, payload) = read_response(&mut Cursor::new(buf), true).unwrap();
        assert_eq!(count, 3);
        assert_eq!(payload, b"abc");
    }
}
