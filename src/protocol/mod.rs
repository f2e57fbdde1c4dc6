//! Protocol Module
//!
//! Framing for the memcached binary protocol.
//!
//! ## Frame Format
//!
//! ### Request Header (24 bytes)
//! ```text
//! ┌────────┬────────┬──────────┬──────────┬──────────┬────────────┐
//! │Magic(1)│ Op (1) │ KeyLen(2)│ ExtLen(1)│ DType(1) │ Reserved(2)│
//! ├────────┴────────┴──────────┴──────────┴──────────┴────────────┤
//! │ BodyLen (4) │ Opaque (4) │ CAS high (4) │ CAS low (4)         │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//! followed by extras, key and value.
//!
//! Responses use the same layout with magic 0x81 and a status in place of
//! the reserved field.
//!
//! ### Opcodes
//! - 0x00: GET
//! - 0x01: SET
//! - 0x02: ADD
//! - 0x03: REPLACE
//! - 0x04: DELETE
//! - 0x05: INCREMENT
//! - 0x06: DECREMENT
//! - 0x20: SASL_LIST_MECHS
//! - 0x21: SASL_AUTH

mod command;
mod response;
mod codec;

pub use command::{Opcode, RequestFrame};
pub use response::{ResponseFrame, ResponseHeader, Status};
pub use codec::{
    build_request, counter_extra, decode_response, encode_response, flags_from_extra,
    frame_from_parts, join_u64, parse_response_header, slice_body, split_u64, storage_extra,
    COMPRESSED_FLAG, HEADER_SIZE, REQUEST_MAGIC, RESPONSE_MAGIC,
};
