//! Network Module
//!
//! Byte-stream transport for the client.
//!
//! ## Model
//! - One connection per client, never pooled or shared
//! - Exactly one outstanding request: send, then block on the response
//! - Deadlines come from socket read/write timeouts

mod connection;

pub use connection::Connection;
