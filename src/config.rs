//! Configuration for memcsasl
//!
//! Centralized client configuration with sensible defaults.

use std::time::Duration;

/// Main configuration for a memcsasl client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Value Configuration
    // -------------------------------------------------------------------------
    /// Compress values sent by add/set/replace and mark them with flags = 16
    pub compression: bool,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Connect timeout (milliseconds, 0 = block indefinitely)
    pub connect_timeout_ms: u64,

    /// Connection read timeout (milliseconds, 0 = block indefinitely)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = block indefinitely)
    pub write_timeout_ms: u64,

    /// Disable Nagle's algorithm on the socket
    pub nodelay: bool,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Largest response body accepted before the frame is rejected (in bytes)
    pub max_body_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            compression: false,
            connect_timeout_ms: 5000,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            nodelay: true,
            max_body_size: 32 * 1024 * 1024, // 32 MB
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub(crate) fn connect_timeout(&self) -> Option<Duration> {
        millis(self.connect_timeout_ms)
    }

    pub(crate) fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    pub(crate) fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }
}

fn millis(ms: u64) -> Option<Duration> {
    if ms > 0 {
        Some(Duration::from_millis(ms))
    } else {
        None
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Enable or disable value compression
    pub fn compression(mut self, enabled: bool) -> Self {
        self.config.compression = enabled;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set connect, read and write timeouts at once (in milliseconds)
    pub fn timeout_ms(self, ms: u64) -> Self {
        self.connect_timeout_ms(ms).read_timeout_ms(ms).write_timeout_ms(ms)
    }

    /// Enable or disable TCP_NODELAY
    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.config.nodelay = enabled;
        self
    }

    /// Set the maximum accepted response body size (in bytes)
    pub fn max_body_size(mut self, size: u32) -> Self {
        self.config.max_body_size = size;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Runtime-settable client option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientOption {
    /// Toggle compression for subsequent add/set/replace calls
    Compression(bool),
}
