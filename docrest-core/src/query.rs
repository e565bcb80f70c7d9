//! Exact-field filters and limited queries.
//!
//! Resource lookups match documents by field equality only: a [`Filter`] is a conjunction
//! of `field == value` terms, and an empty filter matches every document. A [`Query`]
//! pairs a filter with an optional result limit.
//!
//! # Filter Construction
//!
//! ```ignore
//! use docrest::query::{Filter, Query};
//! use bson::oid::ObjectId;
//!
//! let by_name = Filter::new().eq("nickname", "Spark");
//! let by_id = Filter::by_id(ObjectId::new());
//!
//! let query = Query::builder()
//!     .filter(by_name)
//!     .limit(25)
//!     .build();
//! ```
//!
//! Backends consume filters through [`FilterVisitor`], so each engine can translate the
//! same filter into its own representation.

use bson::{Bson, oid::ObjectId};

use crate::error::DocumentStoreError;

/// Name of the field holding the storage-assigned identifier.
pub const ID_FIELD: &str = "_id";

/// A conjunction of exact field matches.
///
/// Terms are kept in insertion order. Adding a term for a field that is already present
/// replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    terms: Vec<(String, Bson)>,
}

impl Filter {
    /// Creates an empty filter that matches every document.
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Creates a filter matching the document with the given identifier.
    pub fn by_id(id: ObjectId) -> Self {
        Self::new().eq(ID_FIELD, id)
    }

    /// Adds an equality term on `field`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        let field = field.into();
        let value = value.into();

        match self.terms.iter_mut().find(|(name, _)| *name == field) {
            Some(term) => term.1 = value,
            None => self.terms.push((field, value)),
        }

        self
    }

    /// Returns the equality terms in insertion order.
    pub fn terms(&self) -> &[(String, Bson)] {
        &self.terms
    }

    /// Returns `true` if the filter has no terms and matches everything.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns the value a term requires for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&Bson> {
        self.terms
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Walks every term with the given visitor and folds the results.
    pub fn accept<V: FilterVisitor>(&self, visitor: &mut V) -> Result<V::Output, V::Error> {
        let mut outputs = Vec::with_capacity(self.terms.len());

        for (field, value) in &self.terms {
            outputs.push(visitor.visit_eq(field, value)?);
        }

        visitor.visit_all(outputs)
    }
}

/// Translates or evaluates a [`Filter`] term by term.
pub trait FilterVisitor {
    type Output;
    type Error: Into<DocumentStoreError>;

    /// Handles one `field == value` term.
    fn visit_eq(&mut self, field: &str, value: &Bson) -> Result<Self::Output, Self::Error>;

    /// Combines the per-term results into the result for the whole conjunction.
    fn visit_all(&mut self, terms: Vec<Self::Output>) -> Result<Self::Output, Self::Error>;
}

/// A filter with an optional cap on the number of returned documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Filter documents must match.
    pub filter: Filter,
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
}

impl Query {
    /// Creates a query matching every document with no limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new query builder for fluent construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a new query builder.
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    /// Sets the filter for this query.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.query.filter = filter;
        self
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Builds and returns the final query.
    pub fn build(self) -> Query {
        self.query
    }
}
