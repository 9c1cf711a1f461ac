//! Staged construction of a memory store.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::connection::ManagedConnection;
use crate::connector::{FromConnection, SqliteConnector};
use crate::errors::{Error, Result};

use super::store::MemoryStore;

/// Message of the `Error::IllegalState` returned by building without a connection.
pub const CONNECTION_NOT_SET: &str = "Connection must be set before building";

enum BuilderState<H> {
    Unconfigured,
    ConnectionSet(H),
}

/// Builder producing a [`MemoryStore`] backed by connector `C`.
///
/// A connection must be supplied before [`build`](Self::build). Building
/// consumes the builder, so each builder yields at most one store.
pub struct MemoryStoreBuilder<C: FromConnection> {
    state: BuilderState<C::Handle>,
    _connector: PhantomData<fn() -> C>,
}

/// Builder for SQLite-backed stores.
pub type SqliteMemoryStoreBuilder = MemoryStoreBuilder<SqliteConnector>;

impl<C: FromConnection> MemoryStoreBuilder<C> {
    pub fn new() -> Self {
        MemoryStoreBuilder {
            state: BuilderState::Unconfigured,
            _connector: PhantomData,
        }
    }

    /// Set the connection the store will own, replacing any previous one.
    pub fn with_connection(mut self, handle: C::Handle) -> Self {
        self.state = BuilderState::ConnectionSet(handle);
        self
    }

    /// Set a connection that may be absent.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` immediately if `handle` is `None`.
    pub fn with_optional_connection(self, handle: Option<C::Handle>) -> Result<Self> {
        match handle {
            Some(handle) => Ok(self.with_connection(handle)),
            None => Err(Error::invalid_argument("Connection cannot be null")),
        }
    }

    /// Whether a connection has been supplied.
    pub fn has_connection(&self) -> bool {
        matches!(self.state, BuilderState::ConnectionSet(_))
    }

    /// Build the store around a new connector bound to the connection.
    ///
    /// Performs no database I/O; call `create_table` on the store to
    /// bootstrap the schema.
    ///
    /// # Errors
    ///
    /// Returns `Error::IllegalState` with [`CONNECTION_NOT_SET`] if no
    /// connection was supplied.
    pub async fn build(self) -> Result<MemoryStore> {
        let BuilderState::ConnectionSet(handle) = self.state else {
            return Err(Error::illegal_state(CONNECTION_NOT_SET));
        };
        let connector = C::from_connection(ManagedConnection::new(handle));
        tracing::debug!(dialect = connector.dialect(), "built memory store");
        Ok(MemoryStore::new(Arc::new(connector)))
    }
}

impl<C: FromConnection> Default for MemoryStoreBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
