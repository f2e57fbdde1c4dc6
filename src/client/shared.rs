//! Shared client handle
//!
//! A client is not safe to drive from several threads at once. This
//! handle serializes callers with a mutex held for the whole
//! send+receive cycle of each call, so responses can never interleave.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::{Client, Counter};
use crate::config::ClientOption;
use crate::error::Result;

/// Clonable, thread-safe handle to one client connection
pub struct SharedClient<S = TcpStream> {
    inner: Arc<Mutex<Client<S>>>,
}

impl<S> Clone for SharedClient<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Read + Write> SharedClient<S> {
    pub fn new(client: Client<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(client)),
        }
    }

    /// Lock the client for a sequence of calls (e.g. authenticate then get)
    pub fn lock(&self) -> MutexGuard<'_, Client<S>> {
        self.inner.lock()
    }

    pub fn set_option(&self, option: ClientOption) {
        self.inner.lock().set_option(option)
    }

    pub fn close(&self) {
        self.inner.lock().close()
    }

    pub fn list_mechanisms(&self) -> Result<Vec<String>> {
        self.inner.lock().list_mechanisms()
    }

    pub fn authenticate_plain(&self, user: &str, password: &str) -> Result<()> {
        self.inner.lock().authenticate_plain(user, password)
    }

    pub fn get(&self, key: impl AsRef<[u8]>) -> Result<Option<Vec<u8>>> {
        self.inner.lock().get(key)
    }

    pub fn set(
        &self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        expiration: u32,
    ) -> Result<bool> {
        self.inner.lock().set(key, value, expiration)
    }

    pub fn add(
        &self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        expiration: u32,
    ) -> Result<bool> {
        self.inner.lock().add(key, value, expiration)
    }

    pub fn replace(
        &self,
        key: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
        expiration: u32,
    ) -> Result<bool> {
        self.inner.lock().replace(key, value, expiration)
    }

    pub fn delete(&self, key: impl AsRef<[u8]>) -> Result<bool> {
        self.inner.lock().delete(key)
    }

    pub fn increment<N: TryInto<u64>>(&self, key: impl AsRef<[u8]>, offset: N) -> Result<bool> {
        self.inner.lock().increment(key, offset)
    }

    pub fn decrement<N: TryInto<u64>>(&self, key: impl AsRef<[u8]>, offset: N) -> Result<bool> {
        self.inner.lock().decrement(key, offset)
    }

    pub fn increment_with(&self, key: impl AsRef<[u8]>, counter: Counter) -> Result<Option<u64>> {
        self.inner.lock().increment_with(key, counter)
    }

    pub fn decrement_with(&self, key: impl AsRef<[u8]>, counter: Counter) -> Result<Option<u64>> {
        self.inner.lock().decrement_with(key, counter)
    }
}
