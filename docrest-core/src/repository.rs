//! Generic CRUD primitives over a configured collection.
//!
//! A [`ResourceRepository`] borrows a [`SessionFactory`] and a [`ResourceConfig`] and
//! implements the four resource operations for one record type. Each operation runs in
//! its own session (see [`crate::session`]), so no two operations ever share a
//! connection.
//!
//! Writes are followed by a re-read inside the same session: `create` returns the stored
//! document fetched by its new identifier and `update` returns the document fetched by the
//! update filter. The write and the re-read are two separate engine calls, so a concurrent
//! writer can land between them and the returned value may not be exactly what was written.

use std::marker::PhantomData;

use serde::Serialize;
use tracing::debug;

use crate::{
    backend::{StoreConnector, StoreDatabase},
    client::ResourceConfig,
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Filter, Query},
    resource::{Resource, from_document, to_document, to_json},
    session::{DatabaseOf, SessionFactory},
};

/// CRUD operations for resources of type `R` stored in the configured collection.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the borrowed session factory and configuration
/// * `C` - The storage connector
/// * `R` - The resource type
#[derive(Debug)]
pub struct ResourceRepository<'a, C: StoreConnector, R: Resource> {
    sessions: &'a SessionFactory<C>,
    config: &'a ResourceConfig,
    _marker: PhantomData<fn() -> R>,
}

impl<'a, C: StoreConnector, R: Resource> ResourceRepository<'a, C, R> {
    pub fn new(sessions: &'a SessionFactory<C>, config: &'a ResourceConfig) -> Self {
        Self {
            sessions,
            config,
            _marker: PhantomData,
        }
    }

    /// Returns the first resource matching `filter`, or `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`] if the engine call fails or the stored document
    /// does not deserialize into `R`.
    pub async fn get(&self, filter: Filter) -> DocumentStoreResult<Option<R>> {
        let collection = self.config.collection_name();
        debug!(collection, terms = filter.terms().len(), "get resource");

        self.sessions
            .with_db(|db| async move { Self::find_first(&db, collection, &filter).await })
            .await
    }

    /// Returns up to the configured limit of resources matching `filter`, in the engine's
    /// natural order.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`] if the engine call fails or any stored document
    /// does not deserialize into `R`.
    pub async fn list(&self, filter: Filter) -> DocumentStoreResult<Vec<R>> {
        let collection = self.config.collection_name();
        let query = Query::builder()
            .filter(filter)
            .limit(self.config.limit())
            .build();
        debug!(collection, limit = self.config.limit(), "list resources");

        self.sessions
            .with_db(|db| async move {
                db.find(collection, query)
                    .await?
                    .into_iter()
                    .map(from_document::<R>)
                    .collect::<DocumentStoreResult<Vec<R>>>()
            })
            .await
    }

    /// Validates and inserts a new resource, then returns it as stored.
    ///
    /// `input` may be an `R` or any other value serializing to the same shape (e.g. a raw
    /// JSON object received over the wire). It is validated against the full closed-world
    /// schema before anything is written.
    ///
    /// # Errors
    ///
    /// - [`DocumentStoreError::SchemaValidation`] with every violation if validation fails
    /// - [`DocumentStoreError::DocumentNotFound`] if the inserted document cannot be re-read
    /// - any engine or serialization error, unwrapped
    pub async fn create<I>(&self, input: &I) -> DocumentStoreResult<R>
    where
        I: Serialize + Sync + ?Sized,
    {
        let collection = self.config.collection_name();
        let schema = self.config.schema();
        let value = to_json(input)?;

        let validation = schema.validate(&value);
        if !validation.valid {
            debug!(collection, violations = validation.errors.len(), "rejected resource");
            return Err(DocumentStoreError::SchemaValidation(validation.errors));
        }

        let document = to_document(input)?;
        debug!(collection, "create resource");

        self.sessions
            .with_db(|db| async move {
                let id = db.insert_one(collection, document).await?;

                Self::find_first(&db, collection, &Filter::by_id(id))
                    .await?
                    .ok_or_else(|| DocumentStoreError::DocumentNotFound(collection.to_string()))
            })
            .await
    }

    /// Validates a partial resource, merges its fields into the first resource matching
    /// `filter`, then returns that resource as stored.
    ///
    /// Only the fields present in `partial` are overwritten. The partial is validated
    /// against the patch schema, which ignores top-level required fields but still rejects
    /// unknown attributes and malformed values.
    ///
    /// # Errors
    ///
    /// - [`DocumentStoreError::SchemaValidation`] with every violation if validation fails
    /// - [`DocumentStoreError::DocumentNotFound`] if no resource matches `filter` afterwards
    /// - any engine or serialization error, unwrapped
    pub async fn update<P>(&self, filter: Filter, partial: &P) -> DocumentStoreResult<R>
    where
        P: Serialize + Sync + ?Sized,
    {
        let collection = self.config.collection_name();
        let schema = self.config.schema();
        let value = to_json(partial)?;

        let validation = schema.validate_patch(&value);
        if !validation.valid {
            debug!(collection, violations = validation.errors.len(), "rejected patch");
            return Err(DocumentStoreError::SchemaValidation(validation.errors));
        }

        let set = to_document(partial)?;
        debug!(collection, fields = set.len(), "update resource");

        self.sessions
            .with_db(|db| async move {
                // An empty `$set` is an error for some engines and a no-op for all.
                if !set.is_empty() {
                    db.update_one(collection, &filter, set).await?;
                }

                Self::find_first(&db, collection, &filter)
                    .await?
                    .ok_or_else(|| DocumentStoreError::DocumentNotFound(collection.to_string()))
            })
            .await
    }

    async fn find_first(
        db: &DatabaseOf<C>,
        collection: &str,
        filter: &Filter,
    ) -> DocumentStoreResult<Option<R>> {
        db.find_one(collection, filter)
            .await?
            .map(from_document::<R>)
            .transpose()
    }
}
