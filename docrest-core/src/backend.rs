//! Storage engine abstraction for resource clients.
//!
//! This module defines the traits a document database must implement to back a resource
//! client. The contract is deliberately narrow: open a connection, resolve a database by
//! name, run one of four collection primitives, close the connection.
//!
//! # Traits
//!
//! - [`StoreConnector`]: opens fresh connections; one per resource operation
//! - [`StoreConnection`]: a live connection that resolves database handles and must be closed
//! - [`StoreDatabase`]: a database handle exposing the collection primitives
//! - [`StoreConnectorBuilder`]: factory trait for creating connector instances
//!
//! # Examples
//!
//! ```ignore
//! use docrest::backend::{StoreConnector, StoreConnection, StoreDatabase};
//! use docrest::query::Filter;
//! use bson::doc;
//!
//! let connection = connector.connect().await?;
//! let db = connection.database("stable");
//! let id = db.insert_one("ponies", doc! { "name": "Bolt" }).await?;
//! let pony = db.find_one("ponies", &Filter::by_id(id)).await?;
//! connection.close().await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Callers normally do not drive these traits by hand; [`crate::session::with_db`] wraps
//! the open/resolve/close cycle around a unit of work.

use async_trait::async_trait;
use bson::{Document, oid::ObjectId};
use std::fmt::Debug;

use crate::{
    error::DocumentStoreResult,
    query::{Filter, Query},
};

/// Opens connections to a storage engine.
///
/// A connector holds whatever is needed to reach the engine (a parsed connection string,
/// a handle to shared in-memory state) but never a live connection itself. Every call to
/// [`connect`](StoreConnector::connect) yields an independent connection.
#[async_trait]
pub trait StoreConnector: Send + Sync + Debug {
    type Connection: StoreConnection;

    /// Opens a new connection.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Connection`](crate::error::DocumentStoreError::Connection)
    /// if the engine cannot be reached.
    async fn connect(&self) -> DocumentStoreResult<Self::Connection>;
}

/// A live connection to a storage engine.
#[async_trait]
pub trait StoreConnection: Send + Sync + Debug {
    type Database: StoreDatabase;

    /// Resolves a handle to the named database on this connection.
    ///
    /// The handle is owned so it can be moved into a unit of work; it is only usable
    /// while the connection is open.
    fn database(&self, name: &str) -> Self::Database;

    /// Closes the connection, releasing everything it holds.
    async fn close(self) -> DocumentStoreResult<()>;

    /// Releases the connection without awaiting anything.
    ///
    /// Called when a session is dropped before it could [`close`](StoreConnection::close)
    /// the connection, e.g. because its future was cancelled. The default drops the
    /// connection and relies on the engine to release it on drop.
    fn abandon(self)
    where
        Self: Sized,
    {
    }
}

/// A handle to one database, exposing the collection primitives resource operations use.
///
/// Collections are addressed by name and come into existence on first insert.
#[async_trait]
pub trait StoreDatabase: Send + Sync + Debug {
    /// Returns the name this handle was resolved with.
    fn name(&self) -> &str;

    /// Returns the first document in `collection` matching `filter`, if any.
    ///
    /// No projection or sort is applied; "first" is the engine's natural order.
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> DocumentStoreResult<Option<Document>>;

    /// Returns the documents in `collection` matching the query filter, in natural order,
    /// capped at the query limit when one is set.
    async fn find(&self, collection: &str, query: Query) -> DocumentStoreResult<Vec<Document>>;

    /// Inserts a document and returns the identifier the engine assigned to it.
    ///
    /// If the document already carries an `_id` that value is kept and returned.
    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> DocumentStoreResult<ObjectId>;

    /// Overwrites the fields named in `set` on the first document matching `filter`.
    ///
    /// Fields absent from `set` are left untouched. Matching nothing is not an error.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> DocumentStoreResult<()>;
}

#[async_trait]
pub trait StoreConnectorBuilder {
    type Connector: StoreConnector;

    async fn build(self) -> DocumentStoreResult<Self::Connector>;
}
