//! SASL Authentication
//!
//! Mechanism listing and PLAIN authentication over an open connection.
//! A nonzero status on SASL_AUTH is the one protocol status surfaced as an
//! error, carrying the server's message verbatim.

use std::io::{Read, Write};

use crate::error::{MemcError, Result};
use crate::network::Connection;
use crate::protocol::{Opcode, RequestFrame};

/// Mechanism name sent as the SASL_AUTH key
pub const PLAIN_MECHANISM: &str = "PLAIN";

/// Ask the server which SASL mechanisms it supports
///
/// The response body is a space-separated list; an empty body yields an
/// empty list.
pub fn list_mechanisms<S: Read + Write>(conn: &mut Connection<S>) -> Result<Vec<String>> {
    let response = conn.round_trip(&RequestFrame::new(Opcode::SaslListMechs))?;

    let mechanisms: Vec<String> = response
        .body_text()
        .split(' ')
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();

    tracing::debug!("Server offers SASL mechanisms {:?}", mechanisms);
    Ok(mechanisms)
}

/// Authenticate with SASL PLAIN
pub fn authenticate_plain<S: Read + Write>(
    conn: &mut Connection<S>,
    user: &str,
    password: &str,
) -> Result<()> {
    let frame = RequestFrame::new(Opcode::SaslAuth)
        .with_key(PLAIN_MECHANISM)
        .with_value(plain_payload(user, password));

    let response = conn.round_trip(&frame)?;
    if !response.is_success() {
        tracing::debug!(
            "SASL PLAIN rejected for user {:?}: status 0x{:04x}",
            user,
            response.status()
        );
        return Err(MemcError::AuthenticationFailed {
            status: response.status(),
            message: response.body_text(),
        });
    }

    tracing::debug!("Authenticated as {:?}", user);
    Ok(())
}

/// PLAIN message with an empty authzid: `\0user\0password`
pub fn plain_payload(user: &str, password: &str) -> Vec<u8> {
    let mut payload = Vec::with_capacity(2 + user.len() + password.len());
    payload.push(0);
    payload.extend_from_slice(user.as_bytes());
    payload.push(0);
    payload.extend_from_slice(password.as_bytes());
    payload
}
