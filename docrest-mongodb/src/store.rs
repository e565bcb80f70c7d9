use async_trait::async_trait;
use bson::{Bson, Document, doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection, Database as MongoDatabase,
    options::{ClientOptions, FindOptions},
};
use tracing::debug;

use docrest_core::{
    backend::{StoreConnection, StoreConnector, StoreConnectorBuilder, StoreDatabase},
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Filter, Query},
};

use crate::query::MongoFilterTranslator;

/// Opens one MongoDB client per connection from pre-parsed client options.
#[derive(Debug, Clone)]
pub struct MongoDbConnector {
    options: ClientOptions,
}

impl MongoDbConnector {
    pub fn new(options: ClientOptions) -> Self {
        Self { options }
    }

    pub fn builder(dsn: &str) -> MongoDbConnectorBuilder {
        MongoDbConnectorBuilder::new(dsn)
    }
}

#[async_trait]
impl StoreConnector for MongoDbConnector {
    type Connection = MongoDbConnection;

    async fn connect(&self) -> DocumentStoreResult<Self::Connection> {
        let client = Client::with_options(self.options.clone())
            .map_err(|e| DocumentStoreError::Connection(e.to_string()))?;

        // The driver connects lazily; a ping surfaces an unreachable server here rather
        // than on the first collection call.
        if let Err(e) = client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
        {
            client.shutdown().await;
            return Err(DocumentStoreError::Connection(e.to_string()));
        }

        debug!(hosts = ?self.options.hosts, "connected to mongodb");

        Ok(MongoDbConnection { client })
    }
}

#[derive(Debug)]
pub struct MongoDbConnection {
    client: Client,
}

#[async_trait]
impl StoreConnection for MongoDbConnection {
    type Database = MongoDbDatabase;

    fn database(&self, name: &str) -> Self::Database {
        MongoDbDatabase {
            database: self.client.database(name),
        }
    }

    async fn close(self) -> DocumentStoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MongoDbDatabase {
    database: MongoDatabase,
}

impl MongoDbDatabase {
    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.database.collection(collection_name)
    }

    fn translate(filter: &Filter) -> DocumentStoreResult<Document> {
        filter.accept(&mut MongoFilterTranslator)
    }

    /// The driver takes a signed limit and gives negative values a different meaning.
    fn find_options(limit: Option<usize>) -> DocumentStoreResult<FindOptions> {
        let mut options = FindOptions::default();

        if let Some(limit) = limit {
            options.limit = Some(i64::try_from(limit).map_err(|_| {
                DocumentStoreError::InvalidConfig(format!("limit {limit} exceeds the engine maximum"))
            })?);
        }

        Ok(options)
    }
}

#[async_trait]
impl StoreDatabase for MongoDbDatabase {
    fn name(&self) -> &str {
        self.database.name()
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> DocumentStoreResult<Option<Document>> {
        self.get_collection(collection)
            .find_one(Self::translate(filter)?)
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))
    }

    async fn find(&self, collection: &str, query: Query) -> DocumentStoreResult<Vec<Document>> {
        let options = Self::find_options(query.limit)?;

        self.get_collection(collection)
            .find(Self::translate(&query.filter)?)
            .with_options(options)
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> DocumentStoreResult<ObjectId> {
        let result = self
            .get_collection(collection)
            .insert_one(document)
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?;

        match result.inserted_id {
            Bson::ObjectId(id) => Ok(id),
            other => Err(DocumentStoreError::InvalidDocument(format!(
                "_id must be an ObjectId, got {:?}",
                other.element_type()
            ))),
        }
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> DocumentStoreResult<()> {
        self.get_collection(collection)
            .update_one(Self::translate(filter)?, doc! { "$set": set })
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?;

        Ok(())
    }
}

pub struct MongoDbConnectorBuilder {
    dsn: String,
}

impl MongoDbConnectorBuilder {
    pub fn new(dsn: &str) -> Self {
        Self { dsn: dsn.to_string() }
    }
}

#[async_trait]
impl StoreConnectorBuilder for MongoDbConnectorBuilder {
    type Connector = MongoDbConnector;

    async fn build(self) -> DocumentStoreResult<Self::Connector> {
        Ok(MongoDbConnector::new(
            ClientOptions::parse(&self.dsn)
                .await
                .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_limit_to_find_options() {
        assert_eq!(MongoDbDatabase::find_options(Some(25)).unwrap().limit, Some(25));
        assert_eq!(MongoDbDatabase::find_options(None).unwrap().limit, None);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn rejects_limit_beyond_signed_range() {
        assert!(matches!(
            MongoDbDatabase::find_options(Some(usize::MAX)),
            Err(DocumentStoreError::InvalidConfig(_))
        ));
    }
}
