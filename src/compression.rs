//! Value compression
//!
//! Values stored with flags == 16 are zlib streams. The client only calls
//! into a [`Compressor`]; the algorithm lives behind it.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{MemcError, Result};

/// Compress/decompress capability used for flagged values
pub trait Compressor: Send {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// zlib (RFC 1950) compressor
#[derive(Debug, Clone, Copy)]
pub struct ZlibCompressor {
    level: Compression,
}

impl ZlibCompressor {
    /// Create a compressor at the given level (0-9)
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }
}

impl Default for ZlibCompressor {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl Compressor for ZlibCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2 + 16), self.level);
        encoder
            .write_all(data)
            .map_err(|e| MemcError::Compression(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| MemcError::Compression(e.to_string()))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut out = Vec::with_capacity(data.len() * 2);
        decoder
            .read_to_end(&mut out)
            .map_err(|e| MemcError::Compression(e.to_string()))?;
        Ok(out)
    }
}
