//! Protocol codec
//!
//! Pure encoding and decoding of binary protocol frames. No I/O happens here.
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────────────────────┬─────────┬───────┬─────────────────┐
//! │   Header (24 bytes)      │ Extras  │  Key  │      Value      │
//! └──────────────────────────┴─────────┴───────┴─────────────────┘
//! ```
//!
//! All multi-byte header integers are big-endian. The header's total body
//! length is always `extras + key + value`.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{RequestFrame, ResponseFrame, ResponseHeader};
use crate::error::{MemcError, Result};

/// Magic byte for request frames
pub const REQUEST_MAGIC: u8 = 0x80;

/// Magic byte for response frames
pub const RESPONSE_MAGIC: u8 = 0x81;

/// Fixed header size for requests and responses
pub const HEADER_SIZE: usize = 24;

/// Flags value marking a compressed item
pub const COMPRESSED_FLAG: u32 = 16;

// =============================================================================
// Request Encoding
// =============================================================================

/// Encode a request frame to bytes
///
/// Format: header (24) + extra + key + value
pub fn build_request(frame: &RequestFrame) -> Result<Bytes> {
    let (key_len, extra_len, body_len) =
        section_lengths(frame.extra.len(), frame.key.len(), frame.value.len())?;

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + body_len as usize);
    buf.put_u8(REQUEST_MAGIC);
    buf.put_u8(frame.opcode);
    buf.put_u16(key_len);
    buf.put_u8(extra_len);
    buf.put_u8(frame.data_type);
    buf.put_u16(frame.status);
    buf.put_u32(body_len);
    buf.put_u32(frame.opaque);
    buf.put_u32(frame.cas1);
    buf.put_u32(frame.cas2);

    buf.put_slice(&frame.extra);
    buf.put_slice(&frame.key);
    buf.put_slice(&frame.value);

    Ok(buf.freeze())
}

// =============================================================================
// Response Decoding
// =============================================================================

/// Parse the fixed 24-byte response header
///
/// Bytes beyond the first 24 are ignored.
pub fn parse_response_header(bytes: &[u8]) -> Result<ResponseHeader> {
    if bytes.len() < HEADER_SIZE {
        return Err(MemcError::MalformedHeader(bytes.len()));
    }

    let mut buf = &bytes[..HEADER_SIZE];
    Ok(ResponseHeader {
        magic: buf.get_u8(),
        opcode: buf.get_u8(),
        key_length: buf.get_u16(),
        extra_length: buf.get_u8(),
        data_type: buf.get_u8(),
        status: buf.get_u16(),
        body_length: buf.get_u32(),
        opaque: buf.get_u32(),
        cas1: buf.get_u32(),
        cas2: buf.get_u32(),
    })
}

/// Split a response body into (extra, key, value)
///
/// extra = body[0..extra_len], key = body[extra_len..extra_len + key_len],
/// value = the remainder. Slicing shares the underlying buffer.
pub fn slice_body(
    body: Bytes,
    extra_length: u8,
    key_length: u16,
) -> Result<(Bytes, Bytes, Bytes)> {
    let extra_end = extra_length as usize;
    let key_end = extra_end + key_length as usize;

    if body.len() < key_end {
        return Err(MemcError::Protocol(format!(
            "Body too short: extras ({}) + key ({}) exceed body length {}",
            extra_length,
            key_length,
            body.len()
        )));
    }

    let extra = body.slice(..extra_end);
    let key = body.slice(extra_end..key_end);
    let value = body.slice(key_end..);
    Ok((extra, key, value))
}

/// Assemble a response frame from a parsed header and its body
pub fn frame_from_parts(header: ResponseHeader, body: Bytes) -> Result<ResponseFrame> {
    if body.len() != header.body_length as usize {
        return Err(MemcError::Protocol(format!(
            "Body length mismatch: header says {}, got {}",
            header.body_length,
            body.len()
        )));
    }

    let (extra, key, body) = slice_body(body, header.extra_length, header.key_length)?;
    Ok(ResponseFrame {
        header,
        extra,
        key,
        body,
    })
}

/// Decode a complete response held in a single buffer
pub fn decode_response(bytes: &[u8]) -> Result<ResponseFrame> {
    let header = parse_response_header(bytes)?;

    let total_len = HEADER_SIZE + header.body_length as usize;
    if bytes.len() < total_len {
        return Err(MemcError::Protocol(format!(
            "Incomplete response body: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    frame_from_parts(header, Bytes::copy_from_slice(&bytes[HEADER_SIZE..total_len]))
}

/// Encode a response frame to bytes
///
/// Lengths in the written header are taken from the frame's sections, not
/// from `frame.header`. Used by mock servers and benches.
pub fn encode_response(frame: &ResponseFrame) -> Result<Bytes> {
    let (key_len, extra_len, body_len) =
        section_lengths(frame.extra.len(), frame.key.len(), frame.body.len())?;

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + body_len as usize);
    buf.put_u8(frame.header.magic);
    buf.put_u8(frame.header.opcode);
    buf.put_u16(key_len);
    buf.put_u8(extra_len);
    buf.put_u8(frame.header.data_type);
    buf.put_u16(frame.header.status);
    buf.put_u32(body_len);
    buf.put_u32(frame.header.opaque);
    buf.put_u32(frame.header.cas1);
    buf.put_u32(frame.header.cas2);
    buf.put_slice(&frame.extra);
    buf.put_slice(&frame.key);
    buf.put_slice(&frame.body);
    Ok(buf.freeze())
}

/// Narrow section sizes to their header widths: (key u16, extras u8, body u32)
fn section_lengths(extra: usize, key: usize, value: usize) -> Result<(u16, u8, u32)> {
    let key_len = u16::try_from(key).map_err(|_| {
        MemcError::InvalidArgument(format!("key length {} exceeds {}", key, u16::MAX))
    })?;
    let extra_len = u8::try_from(extra).map_err(|_| {
        MemcError::InvalidArgument(format!("extras length {} exceeds {}", extra, u8::MAX))
    })?;
    let body = extra + key + value;
    let body_len = u32::try_from(body)
        .map_err(|_| MemcError::InvalidArgument(format!("body length {} exceeds u32", body)))?;
    Ok((key_len, extra_len, body_len))
}

// =============================================================================
// Extras Layouts
// =============================================================================

/// Reinterpret extras as a big-endian u32 flags value
pub fn flags_from_extra(extra: &[u8]) -> Option<u32> {
    if extra.len() < 4 {
        return None;
    }
    Some(u32::from_be_bytes([extra[0], extra[1], extra[2], extra[3]]))
}

/// Extras for add/set/replace: flags (4) + expiration (4)
pub fn storage_extra(flags: u32, expiration: u32) -> [u8; 8] {
    let mut extra = [0u8; 8];
    extra[..4].copy_from_slice(&flags.to_be_bytes());
    extra[4..].copy_from_slice(&expiration.to_be_bytes());
    extra
}

/// Extras for increment/decrement: delta (8) + initial (8) + expiration (4)
///
/// Each 64-bit quantity is written as two 32-bit big-endian halves.
pub fn counter_extra(delta: u64, initial: u64, expiration: u32) -> [u8; 20] {
    let (delta_hi, delta_lo) = split_u64(delta);
    let (initial_hi, initial_lo) = split_u64(initial);

    let mut extra = [0u8; 20];
    extra[0..4].copy_from_slice(&delta_hi.to_be_bytes());
    extra[4..8].copy_from_slice(&delta_lo.to_be_bytes());
    extra[8..12].copy_from_slice(&initial_hi.to_be_bytes());
    extra[12..16].copy_from_slice(&initial_lo.to_be_bytes());
    extra[16..20].copy_from_slice(&expiration.to_be_bytes());
    extra
}

/// Split a u64 into (upper, lower) 32-bit halves
pub fn split_u64(value: u64) -> (u32, u32) {
    ((value >> 32) as u32, (value & 0xFFFF_FFFF) as u32)
}

/// Inverse of [`split_u64`]
pub fn join_u64(upper: u32, lower: u32) -> u64 {
    ((upper as u64) << 32) | lower as u64
}
