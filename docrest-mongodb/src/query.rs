//! Filter translation from docrest filters to MongoDB query syntax.

use bson::{Bson, Document, doc};

use docrest_core::{error::DocumentStoreError, query::FilterVisitor};

/// Translates docrest filters into MongoDB query documents.
///
/// Every term becomes an explicit `$eq`, so filter values are never interpreted as
/// query operators.
pub struct MongoFilterTranslator;

impl FilterVisitor for MongoFilterTranslator {
    type Output = Document;
    type Error = DocumentStoreError;

    fn visit_eq(&mut self, field: &str, value: &Bson) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: { "$eq": value },
        })
    }

    fn visit_all(&mut self, terms: Vec<Self::Output>) -> Result<Self::Output, Self::Error> {
        // Filter terms never repeat a field, so the conjunction is a plain merge.
        let mut merged = Document::new();

        for term in terms {
            for (field, condition) in term {
                merged.insert(field, condition);
            }
        }

        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use docrest_core::query::Filter;

    #[test]
    fn empty_filter_matches_everything() {
        assert_eq!(Filter::new().accept(&mut MongoFilterTranslator).unwrap(), doc! {});
    }

    #[test]
    fn translates_terms_to_eq_conditions() {
        let id = ObjectId::new();
        let filter = Filter::by_id(id).eq("nickname", "Spark");

        assert_eq!(
            filter.accept(&mut MongoFilterTranslator).unwrap(),
            doc! {
                "_id": { "$eq": id },
                "nickname": { "$eq": "Spark" },
            }
        );
    }

    #[test]
    fn keeps_operator_like_values_literal() {
        let filter = Filter::new().eq("nickname", doc! { "$ne": "x" });

        assert_eq!(
            filter.accept(&mut MongoFilterTranslator).unwrap(),
            doc! { "nickname": { "$eq": { "$ne": "x" } } }
        );
    }
}
