//! Error types and result types for resource client operations.
//!
//! This module provides the error taxonomy shared by every layer of the resource client.
//! Use [`DocumentStoreResult<T>`] as the return type for fallible operations.
//!
//! Two families of failure exist: schema validation failures, which carry the full list
//! of [`Violation`]s and are always recoverable by fixing the input, and everything else
//! (connection, driver and serialization faults), which is propagated as-is.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

use crate::schema::Violation;

/// Represents all possible errors that can occur when interacting with a resource client.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// Serialization/deserialization error when converting between formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error while creating a connector (e.g. an unparsable connection string).
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// Error while opening or closing a connection.
    #[error("Connection error: {0}")]
    Connection(String),
    /// A write was applied but the re-read of the document in the given collection found nothing.
    #[error("Document not found in collection {0}")]
    DocumentNotFound(String),
    /// The value could not be turned into a storable document.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// The declarative schema could not be compiled.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    /// The resource configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// The resource failed schema validation. Carries every violation found.
    #[error("Validation error: {} violation(s)", .0.len())]
    SchemaValidation(Vec<Violation>),
    /// An error occurred in the underlying storage engine.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl DocumentStoreError {
    /// Returns the violations if this is a schema validation failure.
    pub fn violations(&self) -> Option<&[Violation]> {
        match self {
            DocumentStoreError::SchemaValidation(violations) => Some(violations),
            _ => None,
        }
    }
}

/// A specialized `Result` type for resource client operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}
