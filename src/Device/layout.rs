/// Major number of the message slot character device. Only used to derive the
/// control request code.
pub const MAJOR_NUM: u32 = 235;

const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;
const IOC_SIZEBITS: u32 = 14;
const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;
const IOC_WRITE: u32 = 1;

/// Linux `_IOW(ty, nr, size)`.
pub const fn ioc_w(ty: u32, nr: u32, size: usize) -> u32 {
    (IOC_WRITE << IOC_DIRSHIFT)
        | ((size as u32) << IOC_SIZESHIFT)
        | (ty << IOC_TYPESHIFT)
        | (nr << IOC_NRSHIFT)
}

/// Select-channel control request: `_IOW(MAJOR_NUM, 0, unsigned int)`.
pub const MSG_SLOT_CHANNEL: u32 = ioc_w(MAJOR_NUM, 0, std::mem::size_of::<libc::c_uint>());

/// Largest request payload the device will drain before dropping the
/// connection. Anything above `MAX_MESSAGE_LEN` but within this is answered
/// with an invalid-size error.
pub const MAX_FRAME_PAYLOAD: usize = 64 * 1024;

pub const OP_SET_CHANNEL: u16 = 1;
pub const OP_WRITE: u16 = 2;
pub const OP_READ: u16 = 3;

/// Status value for a successful response.
pub const STATUS_OK: u8 = 0;

/// Header preceding every request sent to a device.
///
/// All integers are little-endian on the wire.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    /// One of the `OP_*` constants.
    pub op: u16,

    /// Zero.
    pub reserved: u16,

    /// Channel id for `OP_SET_CHANNEL`, payload length for `OP_WRITE`,
    /// destination capacity for `OP_READ`.
    pub arg: u32,
}

/// Header preceding every response, including the one sent on open.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    /// `STATUS_OK` or a `SlotError` code.
    pub status: u8,

    pub reserved: [u8; 3],

    /// Byte count on success, error detail on failure. For a successful
    /// read this many payload bytes follow.
    pub len: u32,
}

pub const REQUEST_HEADER_LEN: usize = std::mem::size_of::<RequestHeader>();
pub const RESPONSE_HEADER_LEN: usize = std::mem::size_of::<ResponseHeader>();

impl RequestHeader {
    pub fn to_bytes(&self) -> [u8; REQUEST_HEADER_LEN] {
        let mut out = [0u8; REQUEST_HEADER_LEN];
        out[0..2].copy_from_slice(&self.op.to_le_bytes());
        out[2..4].copy_from_slice(&self.reserved.to_le_bytes());
        out[4..8].copy_from_slice(&self.arg.to_le_bytes());
        out
    }

    pub fn from_bytes(raw: [u8; REQUEST_HEADER_LEN]) -> Self {
        Self {
            op: u16::from_le_bytes([raw[0], raw[1]]),
            reserved: u16::from_le_bytes([raw[2], raw[3]]),
            arg: u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]),
        }
    }
}

impl ResponseHeader {
    pub fn to_bytes(&self) -> [u8; RESPONSE_HEADER_LEN] {
        let mut out = [0u8; RESPONSE_HEADER_LEN];
        out[0] = self.status;
        out[1..4].copy_from_slice(&self.reserved);
        out[4..8].copy_from_slice(&self.len.to_le_bytes());
        out
    }

    pub fn from_bytes(raw: [u8; RESPONSE_HEADER_LEN]) -> Self {
        Self {
            status: raw[0],
            reserved: [raw[1], raw[2], raw[3]],
            len: u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]),
        }
    }
}
