//! Physical database handles.
//!
//! A handle is acquired by the caller (see [`crate::config::open_sqlite`])
//! and handed over to a [`crate::connection::ManagedConnection`], which then
//! owns it exclusively until it is released.

/// A live database connection that can be released exactly once.
pub trait DatabaseHandle: Send + 'static {
    /// Driver error reported when releasing the handle fails.
    type CloseError: std::error::Error + Send + Sync + 'static;

    /// Release the handle.
    fn close(self) -> Result<(), Self::CloseError>;
}

impl DatabaseHandle for rusqlite::Connection {
    type CloseError = rusqlite::Error;

    fn close(self) -> Result<(), rusqlite::Error> {
        // rusqlite hands the connection back on failure; dropping it
        // finalizes whatever statements are still cached.
        rusqlite::Connection::close(self).map_err(|(_, err)| err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_connection_closes() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        assert!(DatabaseHandle::close(conn).is_ok());
    }
}
