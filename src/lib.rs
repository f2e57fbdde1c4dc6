//! # memcsasl
//!
//! A synchronous memcached binary protocol client with:
//! - SASL mechanism listing and PLAIN authentication
//! - get / set / add / replace / delete / increment / decrement
//! - Transparent zlib compression of values (flags == 16)
//! - One connection, one outstanding request
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Client                              │
//! │        (commands, status branching, compression)            │
//! └──────────────┬───────────────────────────────┬──────────────┘
//!                │                               │
//!                ▼                               ▼
//!        ┌──────────────┐                ┌──────────────┐
//!        │     Auth     │                │ Compression  │
//!        │ (SASL PLAIN) │                │    (zlib)    │
//!        └──────┬───────┘                └──────────────┘
//!               │
//! ┌─────────────▼───────────────────────────────────────────────┐
//! │                  Connection (transport)                     │
//! │        write frame ─▶ read 24-byte header ─▶ read body      │
//! └─────────────┬───────────────────────────────────────────────┘
//!               │
//!               ▼
//!        ┌──────────────┐
//!        │    Codec     │
//!        │ (pure bytes) │
//!        └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod compression;
pub mod auth;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{MemcError, Result};
pub use config::{ClientConfig, ClientOption};
pub use client::{Client, ConnectionState, Counter, SharedClient};
pub use compression::{Compressor, ZlibCompressor};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of memcsasl
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
