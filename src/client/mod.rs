//! Client Module
//!
//! The public command layer. Every data operation is one request frame,
//! one blocking response, and a branch on the response status.
//!
//! ## Result Tiers
//! - Data operations report protocol misses as `false` / `None`
//! - Transport faults, bad arguments and SASL failures are `Err`
//!
//! ## States
//! ```text
//!   Disconnected ──connect()──▶ Connected
//!        ▲                          │
//!        └──close() / fatal error───┘
//! ```
//! Commands issued while disconnected fail with `NotConnected` without
//! touching the network.

mod shared;

use std::io::{Read, Write};
use std::net::TcpStream;

use crate::auth;
use crate::compression::{Compressor, ZlibCompressor};
use crate::config::{ClientConfig, ClientOption};
use crate::error::{MemcError, Result};
use crate::network::Connection;
use crate::protocol::{
    counter_extra, storage_extra, Opcode, RequestFrame, ResponseFrame, Status, COMPRESSED_FLAG,
};

pub use shared::SharedClient;

/// Connection state of a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Operands for increment/decrement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counter {
    /// Amount to add or subtract
    pub delta: u64,

    /// Value stored when the key does not exist yet
    pub initial: u64,

    /// Expiration for a newly created counter
    pub expiration: u32,
}

impl Counter {
    pub fn new(delta: u64) -> Self {
        Self {
            delta,
            ..Self::default()
        }
    }
}

/// memcached binary protocol client over a single connection
pub struct Client<S = TcpStream> {
    /// Client configuration (compression flag lives here)
    config: ClientConfig,

    /// Open connection, `None` while disconnected
    conn: Option<Connection<S>>,

    compressor: Box<dyn Compressor>,

    /// Status of the most recent data operation
    last_status: Option<u16>,
}

impl Client<TcpStream> {
    /// Create a disconnected client
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            conn: None,
            compressor: Box::new(ZlibCompressor::default()),
            last_status: None,
        }
    }

    /// Open a TCP connection to `host:port`
    ///
    /// Any previous connection is dropped first.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        self.close();
        self.conn = Some(Connection::open(host, port, &self.config)?);
        Ok(())
    }
}

impl<S: Read + Write> Client<S> {
    /// Create a connected client over an already-open stream
    pub fn from_stream(stream: S, config: ClientConfig) -> Self {
        let conn = Connection::from_stream(stream, "stream", config.max_body_size);
        Self {
            config,
            conn: Some(conn),
            compressor: Box::new(ZlibCompressor::default()),
            last_status: None,
        }
    }

    /// Replace the default zlib compressor
    pub fn with_compressor(mut self, compressor: impl Compressor + 'static) -> Self {
        self.compressor = Box::new(compressor);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Change a runtime option; affects subsequent calls only
    pub fn set_option(&mut self, option: ClientOption) {
        match option {
            ClientOption::Compression(enabled) => self.config.compression = enabled,
        }
    }

    pub fn state(&self) -> ConnectionState {
        if self.conn.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Drop the connection; later commands fail with `NotConnected`
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            tracing::debug!("Closing connection to {}", conn.peer_addr());
        }
    }

    /// Raw status of the most recent data operation
    ///
    /// Lets callers tell a miss (`KeyNotFound`) from a refusal
    /// (`KeyExists`, `ItemNotStored`) after a `false`/`None` result.
    pub fn last_status(&self) -> Option<u16> {
        self.last_status
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// List the server's SASL mechanisms
    pub fn list_mechanisms(&mut self) -> Result<Vec<String>> {
        self.with_connection(auth::list_mechanisms)
    }

    /// Authenticate with SASL PLAIN
    ///
    /// Fails with `AuthenticationFailed` on a nonzero status; the
    /// connection stays open so the caller may retry.
    pub fn authenticate_plain(&mut self, user: &str, password: &str) -> Result<()> {
        self.with_connection(|conn| auth::authenticate_plain(conn, user, password))
    }

    // =========================================================================
    // Data Operations
    // =========================================================================

    /// Fetch a value, decompressing it when stored with flags == 16
    pub fn get(&mut self, key: impl AsRef<[u8]>) -> Result<Option<Vec<u8>>> {
        let frame = RequestFrame::new(Opcode::Get).with_key(key.as_ref());
        let response = self.execute_unary_op(frame)?;
        if !response.is_success() {
            return Ok(None);
        }

        // Equality, not a bit test: only the bare value 16 marks compression
        if response.flags() == Some(COMPRESSED_FLAG) {
            return self.compressor.decompress(&response.body).map(Some);
        }
        Ok(Some(response.body.to_vec()))
    }

    /// Store a value unconditionally
    pub fn set(
        &mut self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        expiration: u32,
    ) -> Result<bool> {
        self.store(Opcode::Set, key.as_ref(), value.as_ref(), expiration)
    }

    /// Store a value only if the key does not exist
    pub fn add(
        &mut self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        expiration: u32,
    ) -> Result<bool> {
        self.store(Opcode::Add, key.as_ref(), value.as_ref(), expiration)
    }

    /// Store a value only if the key already exists
    pub fn replace(
        &mut self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        expiration: u32,
    ) -> Result<bool> {
        self.store(Opcode::Replace, key.as_ref(), value.as_ref(), expiration)
    }

    pub fn delete(&mut self, key: impl AsRef<[u8]>) -> Result<bool> {
        let frame = RequestFrame::new(Opcode::Delete).with_key(key.as_ref());
        Ok(self.execute_unary_op(frame)?.is_success())
    }

    /// Add `offset` to a counter (initial value 0, no expiration)
    ///
    /// `offset` must fit in a `u64`; anything else is `InvalidArgument`.
    pub fn increment<N: TryInto<u64>>(&mut self, key: impl AsRef<[u8]>, offset: N) -> Result<bool> {
        let counter = Counter::new(counter_operand(offset)?);
        Ok(self.counter(Opcode::Increment, key.as_ref(), counter)?.is_some())
    }

    /// Subtract `offset` from a counter (initial value 0, no expiration)
    pub fn decrement<N: TryInto<u64>>(&mut self, key: impl AsRef<[u8]>, offset: N) -> Result<bool> {
        let counter = Counter::new(counter_operand(offset)?);
        Ok(self.counter(Opcode::Decrement, key.as_ref(), counter)?.is_some())
    }

    /// Increment with explicit operands, returning the new value
    pub fn increment_with(
        &mut self,
        key: impl AsRef<[u8]>,
        counter: Counter,
    ) -> Result<Option<u64>> {
        self.counter(Opcode::Increment, key.as_ref(), counter)?
            .map(|response| counter_value(&response))
            .transpose()
    }

    /// Decrement with explicit operands, returning the new value
    pub fn decrement_with(
        &mut self,
        key: impl AsRef<[u8]>,
        counter: Counter,
    ) -> Result<Option<u64>> {
        self.counter(Opcode::Decrement, key.as_ref(), counter)?
            .map(|response| counter_value(&response))
            .transpose()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn store(&mut self, opcode: Opcode, key: &[u8], value: &[u8], expiration: u32) -> Result<bool> {
        let (flags, value) = if self.config.compression {
            (COMPRESSED_FLAG, self.compressor.compress(value)?)
        } else {
            (0, value.to_vec())
        };

        let frame = RequestFrame::new(opcode)
            .with_extra(storage_extra(flags, expiration))
            .with_key(key)
            .with_value(value);
        Ok(self.execute_unary_op(frame)?.is_success())
    }

    /// Send a counter request; `Some(response)` on success
    fn counter(
        &mut self,
        opcode: Opcode,
        key: &[u8],
        counter: Counter,
    ) -> Result<Option<ResponseFrame>> {
        let frame = RequestFrame::new(opcode)
            .with_extra(counter_extra(counter.delta, counter.initial, counter.expiration))
            .with_key(key);
        let response = self.execute_unary_op(frame)?;
        Ok(response.is_success().then_some(response))
    }

    /// One request, one response, status recorded
    fn execute_unary_op(&mut self, frame: RequestFrame) -> Result<ResponseFrame> {
        let opcode = frame.opcode;
        let response = self.with_connection(|conn| conn.round_trip(&frame))?;

        self.last_status = Some(response.status());
        if !response.is_success() {
            tracing::debug!(
                "{} returned status 0x{:04x} ({})",
                Opcode::from_u8(opcode).map(|op| op.name()).unwrap_or("unknown"),
                response.status(),
                Status::describe(response.status())
            );
        }
        Ok(response)
    }

    /// Run `f` on the open connection, dropping it on a fatal error
    fn with_connection<T>(&mut self, f: impl FnOnce(&mut Connection<S>) -> Result<T>) -> Result<T> {
        let conn = self.conn.as_mut().ok_or(MemcError::NotConnected)?;
        match f(&mut *conn) {
            Err(e) if e.is_fatal() => {
                tracing::warn!("Dropping connection to {}: {}", conn.peer_addr(), e);
                self.conn = None;
                Err(e)
            }
            other => other,
        }
    }
}

/// Convert a caller-supplied counter operand to u64
fn counter_operand<N: TryInto<u64>>(value: N) -> Result<u64> {
    value.try_into().map_err(|_| {
        MemcError::InvalidArgument(
            "counter offset must be a non-negative integer that fits in 64 bits".to_string(),
        )
    })
}

/// Decode the 8-byte big-endian counter value from a successful response
fn counter_value(response: &ResponseFrame) -> Result<u64> {
    let bytes: [u8; 8] = response.body.as_ref().try_into().map_err(|_| {
        MemcError::Protocol(format!(
            "Counter response body must be 8 bytes, got {}",
            response.body.len()
        ))
    })?;
    Ok(u64::from_be_bytes(bytes))
}
