//! Response definitions
//!
//! Represents headers and frames received from the server.

use bytes::Bytes;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Status {
    NoError = 0x0000,
    KeyNotFound = 0x0001,
    KeyExists = 0x0002,
    ValueTooLarge = 0x0003,
    InvalidArguments = 0x0004,
    ItemNotStored = 0x0005,
    NonNumericValue = 0x0006,
    WrongVbucket = 0x0007,
    AuthError = 0x0020,
    AuthContinue = 0x0021,
    UnknownCommand = 0x0081,
    OutOfMemory = 0x0082,
    NotSupported = 0x0083,
    InternalError = 0x0084,
    Busy = 0x0085,
    TempFailure = 0x0086,
}

impl Status {
    /// Try to convert a u16 to a status
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0000 => Some(Status::NoError),
            0x0001 => Some(Status::KeyNotFound),
            0x0002 => Some(Status::KeyExists),
            0x0003 => Some(Status::ValueTooLarge),
            0x0004 => Some(Status::InvalidArguments),
            0x0005 => Some(Status::ItemNotStored),
            0x0006 => Some(Status::NonNumericValue),
            0x0007 => Some(Status::WrongVbucket),
            0x0020 => Some(Status::AuthError),
            0x0021 => Some(Status::AuthContinue),
            0x0081 => Some(Status::UnknownCommand),
            0x0082 => Some(Status::OutOfMemory),
            0x0083 => Some(Status::NotSupported),
            0x0084 => Some(Status::InternalError),
            0x0085 => Some(Status::Busy),
            0x0086 => Some(Status::TempFailure),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        *self == Status::NoError
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::NoError => "No error",
            Status::KeyNotFound => "Key not found",
            Status::KeyExists => "Key exists",
            Status::ValueTooLarge => "Value too large",
            Status::InvalidArguments => "Invalid arguments",
            Status::ItemNotStored => "Item not stored",
            Status::NonNumericValue => "Incr/Decr on non-numeric value",
            Status::WrongVbucket => "Wrong vbucket",
            Status::AuthError => "Authentication error",
            Status::AuthContinue => "Authentication continue",
            Status::UnknownCommand => "Unknown command",
            Status::OutOfMemory => "Out of memory",
            Status::NotSupported => "Not supported",
            Status::InternalError => "Internal error",
            Status::Busy => "Busy",
            Status::TempFailure => "Temporary failure",
        }
    }

    /// Describe a raw status code, including ones this client has no name for
    pub fn describe(code: u16) -> &'static str {
        Status::from_u16(code)
            .map(|s| s.as_str())
            .unwrap_or("Unknown status")
    }
}

/// Fixed 24-byte response header
///
/// ```text
///  0| Magic         | Opcode        | Key length                    |
///  4| Extras length | Data type     | Status                        |
///  8| Total body length                                             |
/// 12| Opaque                                                        |
/// 16| CAS (high)                                                    |
/// 20| CAS (low)                                                     |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub magic: u8,
    pub opcode: u8,
    pub key_length: u16,
    pub extra_length: u8,
    pub data_type: u8,
    pub status: u16,
    pub body_length: u32,
    pub opaque: u32,
    pub cas1: u32,
    pub cas2: u32,
}

/// A complete response: header plus the sliced body sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    pub header: ResponseHeader,

    /// Raw extras bytes
    pub extra: Bytes,

    pub key: Bytes,

    /// Value (or error message when status is nonzero)
    pub body: Bytes,
}

impl ResponseFrame {
    /// Raw status code
    pub fn status(&self) -> u16 {
        self.header.status
    }

    pub fn is_success(&self) -> bool {
        self.header.status == Status::NoError as u16
    }

    /// Extras reinterpreted as a big-endian u32 flags value
    ///
    /// `None` when the response carried fewer than 4 bytes of extras.
    pub fn flags(&self) -> Option<u32> {
        super::codec::flags_from_extra(&self.extra)
    }

    /// Body as text, replacing invalid UTF-8
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
