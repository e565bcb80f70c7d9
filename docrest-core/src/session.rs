//! Scoped database sessions.
//!
//! Every resource operation runs inside [`with_db`]: a fresh connection is opened, the
//! configured database is resolved, the unit of work runs against it, and the connection
//! is closed again whether the work succeeded or failed. Connections are never reused
//! across calls.
//!
//! [`SessionFactory`] bundles a connector with the database name so callers carry one
//! value instead of threading both through every call.
//!
//! ```ignore
//! use docrest::session::SessionFactory;
//! use docrest::query::Filter;
//!
//! let sessions = SessionFactory::new(connector, "stable");
//! let pony = sessions
//!     .with_db(|db| async move { db.find_one("ponies", &Filter::new()).await })
//!     .await?;
//! ```

use std::future::Future;

use tracing::{debug, warn};

use crate::{
    backend::{StoreConnection, StoreConnector},
    error::DocumentStoreResult,
};

/// The database handle type produced by a connector's connections.
pub type DatabaseOf<C> = <<C as StoreConnector>::Connection as StoreConnection>::Database;

/// Runs `work` against the named database on a connection opened just for it.
///
/// The connection is closed on every exit path of `work`. If `work` fails its error is
/// returned and a failure to close is only logged; if `work` succeeds a failure to close
/// is returned instead of the value. If the returned future is dropped before it
/// completes (a timeout, a disconnected client, a panic in `work`), the connection is
/// released synchronously through [`StoreConnection::abandon`].
///
/// # Errors
///
/// Returns the connector's error if no connection can be opened, otherwise the error of
/// `work` or of closing the connection.
pub async fn with_db<C, F, Fut, T>(connector: &C, database: &str, work: F) -> DocumentStoreResult<T>
where
    C: StoreConnector,
    F: FnOnce(DatabaseOf<C>) -> Fut,
    Fut: Future<Output = DocumentStoreResult<T>>,
{
    let connection = connector.connect().await?;
    debug!(database, "opened connection");

    let db = connection.database(database);
    let mut guard = ConnectionGuard {
        connection: Some(connection),
        database,
    };

    let result = work(db).await;
    let closed = guard.close().await;
    debug!(database, ok = result.is_ok(), "closed connection");

    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_error)) => Err(close_error),
        (Err(error), Ok(())) => Err(error),
        (Err(error), Err(close_error)) => {
            warn!(database, error = %close_error, "failed to close connection after failed unit of work");
            Err(error)
        }
    }
}

/// Owns a session's connection until it is closed, abandoning it if dropped first.
struct ConnectionGuard<'a, C: StoreConnection> {
    connection: Option<C>,
    database: &'a str,
}

impl<C: StoreConnection> ConnectionGuard<'_, C> {
    async fn close(&mut self) -> DocumentStoreResult<()> {
        match self.connection.take() {
            Some(connection) => connection.close().await,
            None => Ok(()),
        }
    }
}

impl<C: StoreConnection> Drop for ConnectionGuard<'_, C> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            warn!(database = self.database, "session dropped before completion, abandoning connection");
            connection.abandon();
        }
    }
}

/// A connector bound to the database every session should use.
#[derive(Debug, Clone)]
pub struct SessionFactory<C: StoreConnector> {
    connector: C,
    database: String,
}

impl<C: StoreConnector> SessionFactory<C> {
    /// Creates a session factory for the named database.
    pub fn new(connector: C, database: impl Into<String>) -> Self {
        Self {
            connector,
            database: database.into(),
        }
    }

    /// Returns the name of the database sessions resolve.
    pub fn database_name(&self) -> &str {
        &self.database
    }

    /// Runs `work` in a fresh session. See [`with_db`].
    pub async fn with_db<F, Fut, T>(&self, work: F) -> DocumentStoreResult<T>
    where
        F: FnOnce(DatabaseOf<C>) -> Fut,
        Fut: Future<Output = DocumentStoreResult<T>>,
    {
        with_db(&self.connector, &self.database, work).await
    }
}
