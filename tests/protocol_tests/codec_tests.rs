//! Codec Tests
//!
//! Tests for request encoding, response header parsing and body slicing.

#[path = "../common/mod.rs"]
mod common;

use bytes::Bytes;
use memcsasl::protocol::{
    build_request, counter_extra, decode_response, encode_response, flags_from_extra, join_u64,
    parse_response_header, slice_body, split_u64, storage_extra, Opcode, RequestFrame,
    ResponseFrame, ResponseHeader, Status, HEADER_SIZE, REQUEST_MAGIC, RESPONSE_MAGIC,
};
use memcsasl::MemcError;

// =============================================================================
// Request Encoding Tests
// =============================================================================

#[test]
fn test_build_request_header_layout() {
    let frame = RequestFrame::new(Opcode::Set)
        .with_extra(storage_extra(0, 300))
        .with_key("foo")
        .with_value("bar");
    let bytes = build_request(&frame).unwrap();

    assert_eq!(bytes.len(), HEADER_SIZE + 8 + 3 + 3);
    assert_eq!(bytes[0], REQUEST_MAGIC);
    assert_eq!(bytes[1], 0x01);
    assert_eq!(&bytes[2..4], &[0x00, 0x03]); // key length
    assert_eq!(bytes[4], 8); // extras length
    assert_eq!(bytes[5], 0); // data type
    assert_eq!(&bytes[6..8], &[0, 0]); // reserved
    assert_eq!(&bytes[8..12], &14u32.to_be_bytes()); // body length
    assert_eq!(&bytes[12..24], &[0u8; 12]); // opaque + cas
    assert_eq!(&bytes[24..32], &[0, 0, 0, 0, 0, 0, 0x01, 0x2c]);
    assert_eq!(&bytes[32..35], b"foo");
    assert_eq!(&bytes[35..38], b"bar");
}

#[test]
fn test_build_request_without_body() {
    let bytes = build_request(&RequestFrame::new(Opcode::SaslListMechs)).unwrap();

    assert_eq!(bytes.len(), HEADER_SIZE);
    assert_eq!(bytes[1], 0x20);
    assert_eq!(&bytes[2..12], &[0u8; 10]);
}

#[test]
fn test_body_length_is_sum_of_sections() {
    let cases: Vec<(Vec<u8>, Vec<u8>, Vec<u8>)> = vec![
        (vec![], vec![], vec![]),
        (vec![1; 8], b"k".to_vec(), vec![]),
        (vec![], b"key".to_vec(), vec![7; 1000]),
        (vec![9; 20], vec![b'x'; 250], vec![0; 65_536]),
    ];

    for (extra, key, value) in cases {
        let frame = RequestFrame::new(Opcode::Set)
            .with_extra(extra.clone())
            .with_key(key.clone())
            .with_value(value.clone());
        let expected = extra.len() + key.len() + value.len();
        assert_eq!(frame.body_length(), expected);

        let bytes = build_request(&frame).unwrap();
        let encoded = u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        assert_eq!(encoded as usize, expected);
        assert_eq!(bytes.len(), HEADER_SIZE + expected);
    }
}

#[test]
fn test_reserved_fields_are_serialized() {
    let mut frame = RequestFrame::new(Opcode::Get).with_key("k");
    frame.data_type = 0x01;
    frame.status = 0xBEEF;
    frame.opaque = 0xDEADBEEF;
    frame.cas1 = 1;
    frame.cas2 = 2;
    let bytes = build_request(&frame).unwrap();

    assert_eq!(bytes[5], 0x01);
    assert_eq!(&bytes[6..8], &[0xBE, 0xEF]);
    assert_eq!(&bytes[12..16], &[0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(&bytes[16..20], &[0, 0, 0, 1]);
    assert_eq!(&bytes[20..24], &[0, 0, 0, 2]);
}

#[test]
fn test_key_too_long_rejected() {
    let frame = RequestFrame::new(Opcode::Get).with_key(vec![b'a'; 65_536]);
    assert!(matches!(build_request(&frame), Err(MemcError::InvalidArgument(_))));

    let frame = RequestFrame::new(Opcode::Get).with_key(vec![b'a'; 65_535]);
    assert!(build_request(&frame).is_ok());
}

// =============================================================================
// Response Header Tests
// =============================================================================

#[test]
fn test_parse_response_header() {
    let bytes: [u8; 24] = [
        0x81, 0x00, 0x00, 0x03, // magic, opcode, key length
        0x04, 0x00, 0x00, 0x01, // extras length, data type, status
        0x00, 0x00, 0x00, 0x0c, // body length
        0x11, 0x22, 0x33, 0x44, // opaque
        0x00, 0x00, 0x00, 0x05, // cas high
        0xff, 0xff, 0xff, 0xff, // cas low
    ];
    let header = parse_response_header(&bytes).unwrap();

    assert_eq!(header.magic, 0x81);
    assert_eq!(header.opcode, 0x00);
    assert_eq!(header.key_length, 3);
    assert_eq!(header.extra_length, 4);
    assert_eq!(header.status, 1);
    assert_eq!(header.body_length, 12);
    assert_eq!(header.opaque, 0x11223344);
    assert_eq!(header.cas1, 5);
    assert_eq!(header.cas2, u32::MAX);
}

#[test]
fn test_parse_short_header_is_malformed() {
    let result = parse_response_header(&[0x81; 23]);
    assert!(matches!(result, Err(MemcError::MalformedHeader(23))));

    let result = parse_response_header(&[]);
    assert!(matches!(result, Err(MemcError::MalformedHeader(0))));
}

// =============================================================================
// Body Slicing Tests
// =============================================================================

#[test]
fn test_slice_body_sections() {
    let body = Bytes::from_static(b"\x00\x00\x00\x10keyvalue");
    let (extra, key, value) = slice_body(body, 4, 3).unwrap();

    assert_eq!(&extra[..], b"\x00\x00\x00\x10");
    assert_eq!(&key[..], b"key");
    assert_eq!(&value[..], b"value");
    assert_eq!(flags_from_extra(&extra), Some(16));
}

#[test]
fn test_slice_body_value_only() {
    let (extra, key, value) = slice_body(Bytes::from_static(b"hello"), 0, 0).unwrap();

    assert!(extra.is_empty());
    assert!(key.is_empty());
    assert_eq!(&value[..], b"hello");
    assert_eq!(flags_from_extra(&extra), None);
}

#[test]
fn test_slice_body_too_short() {
    let result = slice_body(Bytes::from_static(b"abc"), 4, 0);
    assert!(matches!(result, Err(MemcError::Protocol(_))));
}

#[test]
fn test_flags_need_four_bytes() {
    assert_eq!(flags_from_extra(&[0, 0, 16]), None);
    assert_eq!(flags_from_extra(&[0, 0, 0, 1]), Some(1));
    assert_eq!(flags_from_extra(&[0, 0, 0, 17, 0xff]), Some(17));
}

#[test]
fn test_set_request_echo_roundtrip() {
    let key = b"user:42".to_vec();
    let value: Vec<u8> = (0..=255).collect();
    let frame = RequestFrame::new(Opcode::Set)
        .with_extra(storage_extra(0, 3600))
        .with_key(key.clone())
        .with_value(value.clone());
    let bytes = build_request(&frame).unwrap();

    // A server echoing the frame back: same layout, different magic
    let mut echo = bytes.to_vec();
    echo[0] = 0x81;
    let decoded = decode_response(&echo).unwrap();

    assert_eq!(&decoded.key[..], &key[..]);
    assert_eq!(&decoded.body[..], &value[..]);
    assert_eq!(decoded.flags(), Some(0));
    assert_eq!(&decoded.extra[4..], &3600u32.to_be_bytes());
}

fn response_frame(extra: Vec<u8>, key: Vec<u8>, body: Vec<u8>) -> ResponseFrame {
    ResponseFrame {
        header: ResponseHeader {
            magic: RESPONSE_MAGIC,
            opcode: Opcode::Get as u8,
            key_length: 0,
            extra_length: 0,
            data_type: 0,
            status: 0,
            body_length: 0,
            opaque: 0,
            cas1: 0,
            cas2: 0,
        },
        extra: Bytes::from(extra),
        key: Bytes::from(key),
        body: Bytes::from(body),
    }
}

#[test]
fn test_encode_response_extras_too_long() {
    let frame = response_frame(vec![0u8; 300], Vec::new(), vec![b'v']);
    assert!(matches!(encode_response(&frame), Err(MemcError::InvalidArgument(_))));
}

#[test]
fn test_encode_response_key_too_long() {
    let frame = response_frame(Vec::new(), vec![b'k'; u16::MAX as usize + 1], Vec::new());
    assert!(matches!(encode_response(&frame), Err(MemcError::InvalidArgument(_))));
}

#[test]
fn test_encode_response_at_section_limits() {
    let frame = response_frame(vec![7u8; 255], b"key".to_vec(), b"value".to_vec());
    let bytes = encode_response(&frame).unwrap();
    let decoded = decode_response(&bytes).unwrap();

    assert_eq!(decoded.header.extra_length, 255);
    assert_eq!(decoded.header.body_length, 255 + 3 + 5);
    assert_eq!(decoded.extra.len(), 255);
    assert_eq!(&decoded.key[..], b"key");
    assert_eq!(&decoded.body[..], b"value");
}

#[test]
fn test_decode_incomplete_response() {
    let mut bytes = common::response(0x00, 0, &[], &[], b"value");
    bytes.truncate(bytes.len() - 1);
    assert!(matches!(decode_response(&bytes), Err(MemcError::Protocol(_))));
}

// =============================================================================
// Extras Layout Tests
// =============================================================================

#[test]
fn test_storage_extra_layout() {
    assert_eq!(storage_extra(16, 0), [0, 0, 0, 16, 0, 0, 0, 0]);
    assert_eq!(storage_extra(0, 0x01020304), [0, 0, 0, 0, 1, 2, 3, 4]);
}

#[test]
fn test_counter_extra_layout() {
    let extra = counter_extra(5, 0, 0);
    assert_eq!(
        extra,
        [0, 0, 0, 0, 0, 0, 0, 5, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    );

    let extra = counter_extra(u64::MAX, 1 << 32, 7);
    assert_eq!(&extra[0..8], &[0xff; 8]);
    assert_eq!(&extra[8..16], &[0, 0, 0, 1, 0, 0, 0, 0]);
    assert_eq!(&extra[16..20], &[0, 0, 0, 7]);
}

#[test]
fn test_split_join_u64() {
    let values = [
        0u64,
        1,
        u32::MAX as u64,
        u32::MAX as u64 + 1,
        0x0123_4567_89ab_cdef,
        u64::MAX - 1,
        u64::MAX,
    ];

    for n in values {
        let (upper, lower) = split_u64(n);
        assert_eq!(upper as u64, n >> 32);
        assert_eq!(lower as u64, n & 0xFFFF_FFFF);
        assert_eq!(join_u64(upper, lower), n);
    }
}

// =============================================================================
// Opcode / Status Tests
// =============================================================================

#[test]
fn test_opcode_values() {
    let opcodes = [
        (Opcode::Get, 0x00),
        (Opcode::Set, 0x01),
        (Opcode::Add, 0x02),
        (Opcode::Replace, 0x03),
        (Opcode::Delete, 0x04),
        (Opcode::Increment, 0x05),
        (Opcode::Decrement, 0x06),
        (Opcode::SaslListMechs, 0x20),
        (Opcode::SaslAuth, 0x21),
    ];

    for (opcode, byte) in opcodes {
        assert_eq!(opcode as u8, byte);
        assert_eq!(Opcode::from_u8(byte), Some(opcode));
    }
    assert_eq!(Opcode::from_u8(0x07), None);
}

#[test]
fn test_status_describe() {
    assert_eq!(Status::from_u16(0x0001), Some(Status::KeyNotFound));
    assert_eq!(Status::from_u16(0x0020), Some(Status::AuthError));
    assert!(Status::NoError.is_success());
    assert_eq!(Status::describe(0x0002), "Key exists");
    assert_eq!(Status::describe(0x7777), "Unknown status");
}
