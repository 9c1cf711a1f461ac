//! Ownership and lifecycle of a single physical database handle.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use crate::errors::{Error, Result};
use crate::handle::DatabaseHandle;

/// Message carried by the error returned for operations after `close()`.
pub const CLOSED_MESSAGE: &str = "connector is closed";

/// Acquire a mutex, recovering the inner value if a previous holder panicked.
fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("connection mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Exclusive owner of one database handle.
///
/// Access to the handle is serialized, so handles that are not safe for
/// concurrent use (such as `rusqlite::Connection`) can be shared between
/// tasks. The handle is released by [`close`](Self::close), which may be
/// called any number of times.
pub struct ManagedConnection<H: DatabaseHandle> {
    handle: Mutex<Option<H>>,
}

impl<H: DatabaseHandle> ManagedConnection<H> {
    /// Take ownership of a live handle.
    pub fn new(handle: H) -> Self {
        ManagedConnection {
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Take ownership of a handle that may be absent.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` immediately if the handle is `None`.
    pub fn from_optional(handle: Option<H>) -> Result<Self> {
        handle
            .map(Self::new)
            .ok_or_else(|| Error::invalid_argument("Connection cannot be null"))
    }

    /// Whether the handle has been released.
    pub fn is_closed(&self) -> bool {
        acquire_lock(&self.handle).is_none()
    }

    /// Run `op` with exclusive access to the handle.
    ///
    /// # Errors
    ///
    /// Returns `Error::IllegalState` if the connection has been closed,
    /// otherwise whatever `op` returns.
    pub fn with_handle<R>(&self, op: impl FnOnce(&mut H) -> Result<R>) -> Result<R> {
        let mut guard = acquire_lock(&self.handle);
        let handle = guard
            .as_mut()
            .ok_or_else(|| Error::illegal_state(CLOSED_MESSAGE))?;
        op(handle)
    }

    /// Release the handle. Calling this on a closed connection does nothing.
    ///
    /// The handle is given up even when releasing it fails.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConnectorFailure`, with the driver error as its
    /// source, if the handle reports a failure while closing.
    pub fn close(&self) -> Result<()> {
        let Some(handle) = acquire_lock(&self.handle).take() else {
            return Ok(());
        };
        handle.close().map_err(|err| {
            tracing::warn!(error = %err, "failed to close database connection");
            Error::connector("Failed to close database connection", err)
        })
    }
}

impl<H: DatabaseHandle> fmt::Debug for ManagedConnection<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedConnection")
            .field("closed", &self.is_closed())
            .finish()
    }
}
