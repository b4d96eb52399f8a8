use crate::Core::registry;
use crate::Core::transport::RawUserBuffer;
use crate::Device::layout::MSG_SLOT_CHANNEL;
use crate::Slot::session::Session;
use libc::{c_long, c_uint, c_ulong, ssize_t};

/// Handle to an open session (opaque pointer)
pub struct SessionHandle {
    inner: Session,
}

// -----------------------------------------------------------------------------
// File operations
// -----------------------------------------------------------------------------

/// Open a session on the slot for `minor` in the process-wide registry.
///
/// # Returns
/// * Pointer to `SessionHandle`, or NULL if the slot could not be created.
#[no_mangle]
pub extern "C" fn msgslot_open(minor: c_uint) -> *mut SessionHandle {
    match registry::global().open(minor) {
        Ok(session) => Box::into_raw(Box::new(SessionHandle { inner: session })),
        Err(e) => {
            tracing::warn!(minor, error = %e, "msgslot_open failed");
            std::ptr::null_mut()
        }
    }
}

/// Control request. Only `MSG_SLOT_CHANNEL` is understood; `param` is the
/// channel id.
///
/// # Returns
/// * 0 on success, negative errno otherwise.
///
/// # Safety
/// `handle` must be null or a pointer returned by `msgslot_open` that has
/// not yet been passed to `msgslot_close`.
#[no_mangle]
pub extern "C" fn msgslot_ioctl(handle: *mut SessionHandle, request: c_uint, param: c_ulong) -> c_long {
    if handle.is_null() {
        return -(libc::EBADF as c_long);
    }
    if request != MSG_SLOT_CHANNEL || param == 0 {
        return -(libc::EINVAL as c_long);
    }
    let Ok(channel_id) = u32::try_from(param) else {
        return -(libc::EINVAL as c_long);
    };

    let session = unsafe { &mut (*handle).inner };
    match session.select_channel(channel_id) {
        Ok(()) => 0,
        Err(e) => -(e.errno() as c_long),
    }
}

/// Write `len` bytes from `buf` to the selected channel.
///
/// # Returns
/// * Bytes written, or negative errno.
///
/// # Safety
/// `handle` must be null or a pointer returned by `msgslot_open` that has
/// not yet been passed to `msgslot_close`. `buf` must be null or valid for
/// reads of `len` bytes.
#[no_mangle]
pub extern "C" fn msgslot_write(handle: *mut SessionHandle, buf: *const u8, len: usize) -> ssize_t {
    if handle.is_null() {
        return -(libc::EBADF as ssize_t);
    }
    let session = unsafe { &(*handle).inner };
    // Safety: the caller promises `buf` is valid for `len` bytes; null is caught on copy.
    let src = unsafe { RawUserBuffer::new_const(buf, len) };
    match session.write(&src) {
        Ok(n) => n as ssize_t,
        Err(e) => -(e.errno() as ssize_t),
    }
}

/// Read the selected channel's message into `buf` of `cap` bytes.
///
/// # Returns
/// * Bytes read, or negative errno.
///
/// # Safety
/// `handle` must be null or a pointer returned by `msgslot_open` that has
/// not yet been passed to `msgslot_close`. `buf` must be null or valid for
/// writes of `cap` bytes.
#[no_mangle]
pub extern "C" fn msgslot_read(handle: *mut SessionHandle, buf: *mut u8, cap: usize) -> ssize_t {
    if handle.is_null() {
        return -(libc::EBADF as ssize_t);
    }
    let session = unsafe { &(*handle).inner };
    // Safety: the caller promises `buf` is valid for `cap` bytes; null is caught on copy.
    let mut dst = unsafe { RawUserBuffer::new(buf, cap) };
    match session.read(&mut dst) {
        Ok(n) => n as ssize_t,
        Err(e) => -(e.errno() as ssize_t),
    }
}

/// Free a session handle. The slot and its channels are kept.
///
/// # Safety
/// `handle` must be null or a pointer returned by `msgslot_open`, and must
/// not be used again afterwards.
#[no_mangle]
pub extern "C" fn msgslot_close(handle: *mut SessionHandle) {
    if !handle.is_null() {
        unsafe {
            let handle = Box::from_raw(handle);
            handle.inner.close();
        }
    }
}
