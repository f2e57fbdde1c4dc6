//! Connection Transport
//!
//! One synchronous request/response cycle at a time over a byte stream.

use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::{Bytes, BytesMut};

use crate::config::ClientConfig;
use crate::error::{MemcError, Result};
use crate::protocol::{
    build_request, frame_from_parts, parse_response_header, RequestFrame, ResponseFrame,
    HEADER_SIZE, RESPONSE_MAGIC,
};

/// A single server connection
///
/// Generic over the stream so that anything implementing `Read + Write`
/// (a `TcpStream`, a TLS wrapper, an in-memory mock) can carry frames.
pub struct Connection<S = TcpStream> {
    /// Underlying byte stream
    stream: S,

    /// Peer address for logging
    peer_addr: String,

    /// Largest response body accepted
    max_body_size: u32,
}

impl Connection<TcpStream> {
    /// Open a TCP connection to `host:port`
    ///
    /// Applies the connect, read and write deadlines from `config`.
    pub fn open(host: &str, port: u16, config: &ClientConfig) -> Result<Self> {
        let stream = connect_any(host, port, config.connect_timeout())?;

        // Requests are small and latency bound; don't let Nagle batch them
        stream.set_nodelay(config.nodelay)?;

        // Fall back to the requested address if the socket can't report its peer
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| format!("{}:{}", host, port));

        let mut conn = Self::from_stream(stream, peer_addr, config.max_body_size);

        // Elapsed deadlines surface as WouldBlock/TimedOut, mapped to Timeout
        conn.set_timeouts(config.read_timeout(), config.write_timeout())?;

        tracing::debug!("Connected to {}", conn.peer_addr);
        Ok(conn)
    }

    /// Configure read/write deadlines (`None` blocks indefinitely)
    pub fn set_timeouts(&mut self, read: Option<Duration>, write: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(read)?;
        self.stream.set_write_timeout(write)?;
        Ok(())
    }
}

impl<S: Read + Write> Connection<S> {
    /// Wrap an already-open stream
    pub fn from_stream(stream: S, peer_addr: impl Into<String>, max_body_size: u32) -> Self {
        Self {
            stream,
            peer_addr: peer_addr.into(),
            max_body_size,
        }
    }

    /// Encode and write a full request frame
    pub fn send_frame(&mut self, frame: &RequestFrame) -> Result<()> {
        let bytes = build_request(frame)?;
        tracing::trace!(
            "Sending opcode 0x{:02x} ({} bytes) to {}",
            frame.opcode,
            bytes.len(),
            self.peer_addr
        );

        self.stream
            .write_all(&bytes)
            .map_err(|e| MemcError::from_io(e, "write"))?;
        self.stream
            .flush()
            .map_err(|e| MemcError::from_io(e, "write"))?;
        Ok(())
    }

    /// Read one complete response frame
    ///
    /// Reads the 24-byte header, then accumulates exactly `body_length`
    /// bytes across as many reads as the stream needs.
    pub fn receive_frame(&mut self) -> Result<ResponseFrame> {
        let header_bytes = read_exactly(&mut self.stream, HEADER_SIZE)?;
        let header = parse_response_header(&header_bytes)?;

        if header.magic != RESPONSE_MAGIC {
            tracing::warn!(
                "Unexpected response magic 0x{:02x} from {}",
                header.magic,
                self.peer_addr
            );
        }

        // Refuse before allocating the body buffer
        if header.body_length > self.max_body_size {
            return Err(MemcError::Protocol(format!(
                "Response body too large: {} bytes (max {})",
                header.body_length, self.max_body_size
            )));
        }

        let body = if header.body_length > 0 {
            read_exactly(&mut self.stream, header.body_length as usize)?.freeze()
        } else {
            Bytes::new()
        };

        tracing::trace!(
            "Received opcode 0x{:02x} status 0x{:04x} ({} body bytes) from {}",
            header.opcode,
            header.status,
            header.body_length,
            self.peer_addr
        );

        frame_from_parts(header, body)
    }

    /// Send a request and wait for its response
    pub fn round_trip(&mut self, frame: &RequestFrame) -> Result<ResponseFrame> {
        self.send_frame(frame)?;
        self.receive_frame()
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// Try every resolved address in order, returning the first that connects
fn connect_any(host: &str, port: u16, timeout: Option<Duration>) -> Result<TcpStream> {
    let mut last_err = None;

    for addr in (host, port).to_socket_addrs()? {
        let attempt = match timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        };
        match attempt {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!("Connect to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    match last_err {
        Some(e) => Err(MemcError::from_io(e, "connect")),
        None => Err(MemcError::Config(format!(
            "{}:{} did not resolve to any address",
            host, port
        ))),
    }
}

/// Read exactly `len` bytes, looping over short reads
fn read_exactly<R: Read>(reader: &mut R, len: usize) -> Result<BytesMut> {
    let mut buf = BytesMut::zeroed(len);
    let mut filled = 0;

    while filled < len {
        match reader.read(&mut buf[filled..]) {
            // Peer closed before the frame was complete
            Ok(0) => {
                return Err(MemcError::ConnectionClosed {
                    expected: len,
                    received: filled,
                })
            }
            Ok(n) => filled += n,
            // Signal arrived mid-read, nothing consumed
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(MemcError::from_io(e, "read")),
        }
    }

    Ok(buf)
}
