// Layout conformance tests for the device wire headers.
// Clients in other languages build these frames by hand, so sizes and field
// offsets are part of the protocol.
use memoffset::offset_of;
use message_slot::Device::layout::{
    RequestHeader, ResponseHeader, MSG_SLOT_CHANNEL, REQUEST_HEADER_LEN, RESPONSE_HEADER_LEN,
};
use std::mem::{align_of, size_of};

#[test]
fn test_request_header_layout() {
    let size = size_of::<RequestHeader>();
    let align = align_of::<RequestHeader>();
    let off_op = offset_of!(RequestHeader, op);
    let off_reserved = offset_of!(RequestHeader, reserved);
    let off_arg = offset_of!(RequestHeader, arg);

    println!(
        "RequestHeader => size: {size}, align: {align}, offsets: [op:{off_op}, reserved:{off_reserved}, arg:{off_arg}]"
    );

    assert_eq!(size, 8);
    assert_eq!(size, REQUEST_HEADER_LEN);
    assert_eq!(align, align_of::<u32>());
    assert_eq!(off_op, 0);
    assert_eq!(off_reserved, 2);
    assert_eq!(off_arg, 4);
}

#[test]
fn test_response_header_layout() {
    let size = size_of::<ResponseHeader>();
    let off_status = offset_of!(ResponseHeader, status);
    let off_reserved = offset_of!(ResponseHeader, reserved);
    let off_len = offset_of!(ResponseHeader, len);

    println!(
        "ResponseHeader => size: {size}, offsets: [status:{off_status}, reserved:{off_reserved}, len:{off_len}]"
    );

    assert_eq!(size, 8);
    assert_eq!(size, RESPONSE_HEADER_LEN);
    assert_eq!(off_status, 0);
    assert_eq!(off_reserved, 1);
    assert_eq!(off_len, 4);
}

#[test]
fn test_headers_encode_little_endian_in_field_order() {
    let request = RequestHeader {
        op: 0x0102,
        reserved: 0,
        arg: 0x0a0b_0c0d,
    };
    assert_eq!(request.to_bytes(), [0x02, 0x01, 0, 0, 0x0d, 0x0c, 0x0b, 0x0a]);
    assert_eq!(RequestHeader::from_bytes(request.to_bytes()), request);

    let response = ResponseHeader {
        status: 6,
        reserved: [0; 3],
        len: 300,
    };
    assert_eq!(response.to_bytes(), [6, 0, 0, 0, 0x2c, 0x01, 0, 0]);
}

#[test]
fn test_select_channel_request_code() {
    // _IOW(235, 0, unsigned int) on Linux.
    assert_eq!(MSG_SLOT_CHANNEL, 0x4004_EB00);
}
