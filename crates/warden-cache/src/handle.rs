//! Exactly-once ownership of a cache client.

use std::fmt;
use std::sync::Mutex;

use warden_core::error::AppError;
use warden_core::result::AppResult;

/// Owns a cloneable cache client until it is released.
///
/// Acquisition and release go through the same mutex, so a release racing
/// with a first use either hands out the client before it is dropped or
/// fails the use. After release every [`ClientHandle::acquire`] fails.
pub struct ClientHandle<T> {
    /// Name used in error messages and logs.
    name: &'static str,
    /// The client, `None` once released.
    slot: Mutex<Option<T>>,
}

impl<T: Clone> ClientHandle<T> {
    /// Take ownership of `client`.
    pub fn new(name: &'static str, client: T) -> Self {
        Self {
            name,
            slot: Mutex::new(Some(client)),
        }
    }

    /// Clone the client for one operation.
    pub fn acquire(&self) -> AppResult<T> {
        let guard = self
            .slot
            .lock()
            .map_err(|_| AppError::cache(format!("{} client lock poisoned", self.name)))?;
        guard
            .as_ref()
            .cloned()
            .ok_or_else(|| AppError::cache(format!("{} client has been closed", self.name)))
    }

    /// Drop the owned client. Returns `false` if it was already released.
    pub fn release(&self) -> AppResult<bool> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|_| AppError::cache(format!("{} client lock poisoned", self.name)))?;
        Ok(guard.take().is_some())
    }
}

impl<T> fmt::Debug for ClientHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let released = self.slot.lock().map(|g| g.is_none()).unwrap_or(true);
        f.debug_struct("ClientHandle")
            .field("name", &self.name)
            .field("released", &released)
            .finish()
    }
}
