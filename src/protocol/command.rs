//! Command definitions
//!
//! Opcodes and the request frame sent to the server.

/// Binary protocol opcodes used by this client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Get = 0x00,
    Set = 0x01,
    Add = 0x02,
    Replace = 0x03,
    Delete = 0x04,
    Increment = 0x05,
    Decrement = 0x06,
    SaslListMechs = 0x20,
    SaslAuth = 0x21,
}

impl Opcode {
    /// Try to convert a byte to an opcode
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Opcode::Get),
            0x01 => Some(Opcode::Set),
            0x02 => Some(Opcode::Add),
            0x03 => Some(Opcode::Replace),
            0x04 => Some(Opcode::Delete),
            0x05 => Some(Opcode::Increment),
            0x06 => Some(Opcode::Decrement),
            0x20 => Some(Opcode::SaslListMechs),
            0x21 => Some(Opcode::SaslAuth),
            _ => None,
        }
    }

    /// Short lowercase name, used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            Opcode::Get => "get",
            Opcode::Set => "set",
            Opcode::Add => "add",
            Opcode::Replace => "replace",
            Opcode::Delete => "delete",
            Opcode::Increment => "increment",
            Opcode::Decrement => "decrement",
            Opcode::SaslListMechs => "sasl_list_mechs",
            Opcode::SaslAuth => "sasl_auth",
        }
    }
}

/// A request frame
///
/// Lengths are not stored: key length, extras length and total body length
/// are derived from `extra`, `key` and `value` when the frame is encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFrame {
    /// Raw command byte
    pub opcode: u8,

    /// Data type (reserved, 0)
    pub data_type: u8,

    /// Status / vbucket field (reserved, 0 for requests)
    pub status: u16,

    /// Correlation value echoed by the server
    pub opaque: u32,

    /// High half of the CAS token
    pub cas1: u32,

    /// Low half of the CAS token
    pub cas2: u32,

    /// Command-specific extras
    pub extra: Vec<u8>,

    pub key: Vec<u8>,

    pub value: Vec<u8>,
}

impl RequestFrame {
    /// Create an empty frame for the given opcode
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode: opcode as u8,
            ..Self::default()
        }
    }

    pub fn with_extra(mut self, extra: impl Into<Vec<u8>>) -> Self {
        self.extra = extra.into();
        self
    }

    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.value = value.into();
        self
    }

    /// Total body length: extras + key + value
    pub fn body_length(&self) -> usize {
        self.extra.len() + self.key.len() + self.value.len()
    }
}
