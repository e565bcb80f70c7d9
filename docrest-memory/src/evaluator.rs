//! Filter evaluation for in-memory document matching.
//!
//! This module provides the evaluation engine for exact-field filters, following the
//! equality rules of document databases: numbers compare by value across integer and
//! float types, a filter value matches an array field if any element equals it, dotted
//! field names reach into embedded documents, embedded documents are equal only with
//! the same fields in the same order, and a `null` filter value matches a missing field.

use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};

use docrest_core::{
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Filter, FilterVisitor},
};

/// Type-erased, comparable representation of BSON values.
///
/// Numeric types are normalized to f64 so that `1`, `1i64` and `1.0` compare equal.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    ObjectId(ObjectId),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    /// Embedded documents compare field by field, in field order.
    Map(Vec<(&'a str, Comparable<'a>)>),
    /// Values with no equality semantics here (binary, regex, code, ...). Never equal.
    Opaque,
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<Vec<_>>()
            ),
            _ => Comparable::Opaque,
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

/// Evaluates a [`Filter`] against one document.
pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn matches(document: &'a Document, filter: &Filter) -> DocumentStoreResult<bool> {
        filter.accept(&mut DocumentEvaluator::new(document))
    }

    /// Resolves a possibly dotted field name through embedded documents.
    fn lookup(&self, field: &str) -> Option<&'a Bson> {
        let mut segments = field.split('.');
        let mut current = self.document.get(segments.next()?)?;

        for segment in segments {
            current = current.as_document()?.get(segment)?;
        }

        Some(current)
    }
}

impl<'a> FilterVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = DocumentStoreError;

    fn visit_eq(&mut self, field: &str, value: &Bson) -> Result<Self::Output, Self::Error> {
        let expected = Comparable::from(value);

        Ok(match self.lookup(field) {
            None => expected == Comparable::Null,
            Some(found) => match Comparable::from(found) {
                Comparable::Array(items) if !matches!(expected, Comparable::Array(_)) => {
                    items.iter().any(|item| item == &expected)
                }
                found => found == expected,
            },
        })
    }

    fn visit_all(&mut self, terms: Vec<Self::Output>) -> Result<Self::Output, Self::Error> {
        Ok(terms.into_iter().all(|matched| matched))
    }
}
