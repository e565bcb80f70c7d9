//! In-memory storage engine implementation.
//!
//! This module provides a storage engine that keeps documents as BSON in ordered vectors
//! behind async-safe read-write locks. Connections are lightweight handles onto the shared
//! state; the store counts how many were opened and closed so callers can check that
//! every operation released its connection.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use mea::rwlock::RwLock;
use tracing::trace;

use docrest_core::{
    backend::{StoreConnection, StoreConnector, StoreConnectorBuilder, StoreDatabase},
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Filter, ID_FIELD, Query},
};

use crate::evaluator::DocumentEvaluator;

/// Documents of one collection, in insertion order.
type CollectionMap = Vec<Document>;
/// Collections of one database, by name.
type DatabaseMap = HashMap<String, CollectionMap>;
/// Databases, by name.
type StoreMap = HashMap<String, DatabaseMap>;

#[derive(Debug, Default)]
struct ConnectionStats {
    opened: AtomicUsize,
    closed: AtomicUsize,
    unavailable: AtomicBool,
}

/// Thread-safe in-memory storage engine.
///
/// `InMemoryStore` is cloneable and uses `Arc`-wrapped internal state; clones share the
/// same documents and connection statistics. Natural order is insertion order.
///
/// # Example
///
/// ```ignore
/// use docrest_memory::InMemoryStore;
/// use docrest::session::with_db;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// let id = with_db(&store, "stable", |db| async move {
///     db.insert_one("ponies", doc! { "name": "Bolt" }).await
/// })
/// .await?;
///
/// assert_eq!(store.open_connections(), 0);
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    store: Arc<RwLock<StoreMap>>,
    stats: Arc<ConnectionStats>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
            stats: Arc::new(ConnectionStats::default()),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Total number of connections ever opened on this store.
    pub fn connections_opened(&self) -> usize {
        self.stats.opened.load(Ordering::SeqCst)
    }

    /// Number of connections currently open (opened but not yet closed).
    pub fn open_connections(&self) -> usize {
        self.connections_opened() - self.stats.closed.load(Ordering::SeqCst)
    }

    /// Makes subsequent connection attempts fail (or succeed again), simulating an
    /// unreachable engine.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.stats.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of documents currently stored in a collection.
    pub async fn count(&self, database: &str, collection: &str) -> usize {
        self.store
            .read()
            .await
            .get(database)
            .and_then(|db| db.get(collection))
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl StoreConnector for InMemoryStore {
    type Connection = InMemoryConnection;

    async fn connect(&self) -> DocumentStoreResult<Self::Connection> {
        if self.stats.unavailable.load(Ordering::SeqCst) {
            return Err(DocumentStoreError::Connection(
                "in-memory store is unavailable".to_string(),
            ));
        }

        self.stats.opened.fetch_add(1, Ordering::SeqCst);

        Ok(InMemoryConnection { store: self.clone() })
    }
}

/// A connection onto an [`InMemoryStore`].
#[derive(Debug)]
pub struct InMemoryConnection {
    store: InMemoryStore,
}

#[async_trait]
impl StoreConnection for InMemoryConnection {
    type Database = InMemoryDatabase;

    fn database(&self, name: &str) -> Self::Database {
        InMemoryDatabase {
            store: Arc::clone(&self.store.store),
            name: name.to_string(),
        }
    }

    async fn close(self) -> DocumentStoreResult<()> {
        self.store.stats.closed.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }

    fn abandon(self) {
        self.store.stats.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// A handle to one database of an [`InMemoryStore`].
#[derive(Debug, Clone)]
pub struct InMemoryDatabase {
    store: Arc<RwLock<StoreMap>>,
    name: String,
}

impl InMemoryDatabase {
    /// Takes the `_id` of a document about to be inserted, assigning a fresh one if absent.
    fn assign_id(document: &mut Document) -> DocumentStoreResult<ObjectId> {
        match document.remove(ID_FIELD) {
            None => Ok(ObjectId::new()),
            Some(Bson::ObjectId(id)) => Ok(id),
            Some(other) => Err(DocumentStoreError::InvalidDocument(format!(
                "_id must be an ObjectId, got {:?}",
                other.element_type()
            ))),
        }
    }

    fn position(collection: &[Document], filter: &Filter) -> DocumentStoreResult<Option<usize>> {
        for (index, document) in collection.iter().enumerate() {
            if DocumentEvaluator::matches(document, filter)? {
                return Ok(Some(index));
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl StoreDatabase for InMemoryDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> DocumentStoreResult<Option<Document>> {
        let store = self.store.read().await;
        let documents = match store.get(&self.name).and_then(|db| db.get(collection)) {
            Some(documents) => documents,
            None => return Ok(None),
        };

        Ok(Self::position(documents, filter)?.map(|index| documents[index].clone()))
    }

    async fn find(&self, collection: &str, query: Query) -> DocumentStoreResult<Vec<Document>> {
        let store = self.store.read().await;
        let documents = match store.get(&self.name).and_then(|db| db.get(collection)) {
            Some(documents) => documents,
            None => return Ok(vec![]),
        };

        let mut found = Vec::new();
        let limit = query.limit.unwrap_or(usize::MAX);

        for document in documents {
            if found.len() >= limit {
                break;
            }
            if DocumentEvaluator::matches(document, &query.filter)? {
                found.push(document.clone());
            }
        }

        trace!(database = %self.name, collection, found = found.len(), "find");

        Ok(found)
    }

    async fn insert_one(
        &self,
        collection: &str,
        mut document: Document,
    ) -> DocumentStoreResult<ObjectId> {
        let id = Self::assign_id(&mut document)?;
        let mut store = self.store.write().await;
        let documents = store
            .entry(self.name.clone())
            .or_default()
            .entry(collection.to_string())
            .or_default();

        if Self::position(documents, &Filter::by_id(id))?.is_some() {
            return Err(DocumentStoreError::Backend(format!(
                "duplicate key {id} in collection {collection}"
            )));
        }

        // The identifier always leads the stored document.
        let mut stored = Document::new();
        stored.insert(ID_FIELD, id);
        for (key, value) in document {
            stored.insert(key, value);
        }
        documents.push(stored);

        Ok(id)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> DocumentStoreResult<()> {
        if set.contains_key(ID_FIELD) {
            return Err(DocumentStoreError::Backend(
                "the _id field is immutable".to_string(),
            ));
        }

        let mut store = self.store.write().await;
        let documents = match store.get_mut(&self.name).and_then(|db| db.get_mut(collection)) {
            Some(documents) => documents,
            None => return Ok(()),
        };

        if let Some(index) = Self::position(documents, filter)? {
            let target = &mut documents[index];
            for (key, value) in set {
                target.insert(key, value);
            }
        }

        Ok(())
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreConnectorBuilder for InMemoryStoreBuilder {
    type Connector = InMemoryStore;

    /// Builds and returns a new, empty [`InMemoryStore`]. Never fails.
    async fn build(self) -> DocumentStoreResult<Self::Connector> {
        Ok(InMemoryStore::new())
    }
}
