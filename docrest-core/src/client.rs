//! Pre-configured resource clients.
//!
//! A [`ResourceConfig`] fixes the collection name, list limit and schema for one resource
//! type. A [`ResourceClient`] binds that configuration to a [`SessionFactory`] and exposes
//! exactly the four resource operations, so call sites never repeat the configuration.
//!
//! # Example
//!
//! ```ignore
//! use docrest::prelude::*;
//! use docrest::memory::InMemoryStore;
//! use serde_json::json;
//!
//! let config = ResourceConfig::new("ponies", 25, ResourceSchema::new(json!({
//!     "type": "object",
//!     "required": ["name"],
//!     "properties": { "name": { "type": "string" } },
//! }))?)?;
//!
//! let ponies = ResourceClient::<_, Pony>::new(
//!     SessionFactory::new(InMemoryStore::new(), "stable"),
//!     config,
//! );
//!
//! let bolt = ponies.create(&json!({ "name": "Bolt" })).await?;
//! let again = ponies.get(Filter::by_id(*bolt.id().unwrap())).await?;
//! ```

use std::{fmt, marker::PhantomData, sync::Arc};

use serde::Serialize;

use crate::{
    backend::StoreConnector,
    error::{DocumentStoreError, DocumentStoreResult},
    query::Filter,
    repository::ResourceRepository,
    resource::Resource,
    schema::ResourceSchema,
    session::SessionFactory,
};

/// Fixed configuration for one resource type.
#[derive(Debug)]
pub struct ResourceConfig {
    collection_name: String,
    limit: usize,
    schema: ResourceSchema,
}

impl ResourceConfig {
    /// Creates a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidConfig`] if the collection name is empty or the
    /// limit is zero.
    pub fn new(
        collection_name: impl Into<String>,
        limit: usize,
        schema: ResourceSchema,
    ) -> DocumentStoreResult<Self> {
        let collection_name = collection_name.into();

        if collection_name.is_empty() {
            return Err(DocumentStoreError::InvalidConfig(
                "collection name must not be empty".to_string(),
            ));
        }
        if limit == 0 {
            return Err(DocumentStoreError::InvalidConfig(format!(
                "limit for collection {collection_name} must be positive"
            )));
        }

        Ok(Self {
            collection_name,
            limit,
            schema,
        })
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Maximum number of resources a list returns.
    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }
}

/// A resource client bound to one configuration and one session factory.
///
/// Cloning is cheap; clones share the session factory and configuration.
pub struct ResourceClient<C: StoreConnector, R: Resource> {
    sessions: Arc<SessionFactory<C>>,
    config: Arc<ResourceConfig>,
    _marker: PhantomData<fn() -> R>,
}

impl<C: StoreConnector, R: Resource> ResourceClient<C, R> {
    pub fn new(sessions: SessionFactory<C>, config: ResourceConfig) -> Self {
        Self::from_shared(Arc::new(sessions), Arc::new(config))
    }

    /// Creates a client from an already shared session factory, e.g. one serving several
    /// resource types.
    pub fn from_shared(sessions: Arc<SessionFactory<C>>, config: Arc<ResourceConfig>) -> Self {
        Self {
            sessions,
            config,
            _marker: PhantomData,
        }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionFactory<C> {
        &self.sessions
    }

    fn repository(&self) -> ResourceRepository<'_, C, R> {
        ResourceRepository::new(&self.sessions, &self.config)
    }

    /// See [`ResourceRepository::get`].
    pub async fn get(&self, filter: Filter) -> DocumentStoreResult<Option<R>> {
        self.repository().get(filter).await
    }

    /// See [`ResourceRepository::list`].
    pub async fn list(&self, filter: Filter) -> DocumentStoreResult<Vec<R>> {
        self.repository().list(filter).await
    }

    /// See [`ResourceRepository::create`].
    pub async fn create<I>(&self, input: &I) -> DocumentStoreResult<R>
    where
        I: Serialize + Sync + ?Sized,
    {
        self.repository().create(input).await
    }

    /// See [`ResourceRepository::update`].
    pub async fn update<P>(&self, filter: Filter, partial: &P) -> DocumentStoreResult<R>
    where
        P: Serialize + Sync + ?Sized,
    {
        self.repository().update(filter, partial).await
    }
}

impl<C: StoreConnector, R: Resource> Clone for ResourceClient<C, R> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            config: Arc::clone(&self.config),
            _marker: PhantomData,
        }
    }
}

impl<C: StoreConnector, R: Resource> fmt::Debug for ResourceClient<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("database", &self.sessions.database_name())
            .field("collection", &self.config.collection_name())
            .field("limit", &self.config.limit())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> ResourceSchema {
        ResourceSchema::new(json!({ "type": "object" })).unwrap()
    }

    #[test]
    fn rejects_zero_limit() {
        assert!(matches!(
            ResourceConfig::new("ponies", 0, schema()),
            Err(DocumentStoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_empty_collection_name() {
        assert!(matches!(
            ResourceConfig::new("", 10, schema()),
            Err(DocumentStoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn exposes_configuration() {
        let config = ResourceConfig::new("ponies", 10, schema()).unwrap();

        assert_eq!(config.collection_name(), "ponies");
        assert_eq!(config.limit(), 10);
        assert_eq!(config.schema().schema(), &json!({ "type": "object" }));
    }
}
