// Byte-copy boundary between a caller's buffer and the slot core.
// Callers hand the core a source (for writes) or a sink (for reads); the core
// never sees where the bytes actually live.

use crate::Core::error::{SlotError, SlotResult};

/// Bytes offered by a caller for a write.
pub trait UserSource {
    /// Number of bytes the caller wants to write.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy exactly `dst.len()` bytes (always `self.len()`) into `dst`.
    fn copy_to(&self, dst: &mut [u8]) -> SlotResult<()>;
}

/// Destination offered by a caller for a read.
pub trait UserSink {
    /// Number of bytes the caller can accept.
    fn capacity(&self) -> usize;

    /// Copy `src` into the destination. `src.len()` never exceeds
    /// `self.capacity()`.
    fn copy_from(&mut self, src: &[u8]) -> SlotResult<()>;
}

impl UserSource for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn copy_to(&self, dst: &mut [u8]) -> SlotResult<()> {
        if dst.len() != <[u8]>::len(self) {
            return Err(SlotError::CopyFault);
        }
        dst.copy_from_slice(self);
        Ok(())
    }
}

impl UserSource for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn copy_to(&self, dst: &mut [u8]) -> SlotResult<()> {
        self.as_slice().copy_to(dst)
    }
}

impl UserSink for [u8] {
    fn capacity(&self) -> usize {
        self.len()
    }

    fn copy_from(&mut self, src: &[u8]) -> SlotResult<()> {
        let dst = self.get_mut(..src.len()).ok_or(SlotError::CopyFault)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

/// A growable sink with a fixed logical capacity. Received bytes replace any
/// previous contents.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    buf: Vec<u8>,
    capacity: usize,
}

impl VecSink {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity.min(crate::Slot::message::MAX_MESSAGE_LEN)),
            capacity,
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl UserSink for VecSink {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn copy_from(&mut self, src: &[u8]) -> SlotResult<()> {
        if src.len() > self.capacity {
            return Err(SlotError::CopyFault);
        }
        self.buf.clear();
        self.buf.extend_from_slice(src);
        Ok(())
    }
}

/// A caller buffer described by a raw pointer and a length, as handed over
/// by C callers.
///
/// A null pointer is only valid together with a zero length; anything else
/// faults on copy.
#[derive(Debug, Clone, Copy)]
pub struct RawUserBuffer {
    ptr: *mut u8,
    len: usize,
}

impl RawUserBuffer {
    /// # Safety
    /// If `ptr` is non-null it must be valid for reads and writes of `len`
    /// bytes for as long as this value is used.
    pub unsafe fn new(ptr: *mut u8, len: usize) -> Self {
        Self { ptr, len }
    }

    /// # Safety
    /// Same as [`RawUserBuffer::new`], for reads only.
    pub unsafe fn new_const(ptr: *const u8, len: usize) -> Self {
        Self {
            ptr: ptr as *mut u8,
            len,
        }
    }
}

impl UserSource for RawUserBuffer {
    fn len(&self) -> usize {
        self.len
    }

    fn copy_to(&self, dst: &mut [u8]) -> SlotResult<()> {
        if dst.len() != self.len || (self.ptr.is_null() && self.len != 0) {
            return Err(SlotError::CopyFault);
        }
        if self.len != 0 {
            // Safety: non-null and valid for `len` bytes per the constructor contract.
            unsafe { std::ptr::copy_nonoverlapping(self.ptr, dst.as_mut_ptr(), self.len) };
        }
        Ok(())
    }
}

impl UserSink for RawUserBuffer {
    fn capacity(&self) -> usize {
        self.len
    }

    fn copy_from(&mut self, src: &[u8]) -> SlotResult<()> {
        if src.len() > self.len || (self.ptr.is_null() && !src.is_empty()) {
            return Err(SlotError::CopyFault);
        }
        if !src.is_empty() {
            // Safety: non-null and valid for `len >= src.len()` bytes per the constructor contract.
            unsafe { std::ptr::copy_nonoverlapping(src.as_ptr(), self.ptr, src.len()) };
        }
        Ok(())
    }
}
