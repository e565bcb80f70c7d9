//! Schema validation for resources.
//!
//! A [`ResourceSchema`] wraps a declarative JSON Schema and compiles it into two validators:
//!
//! - a **full** validator used when a resource is created, and
//! - a **patch** validator used when a partial resource is merged into a stored one.
//!
//! Both validators are closed-world: every object sub-schema that declares `properties`
//! rejects attributes it does not declare, unless the schema author set
//! `additionalProperties` explicitly. The patch validator is the full one with the
//! top-level `required` list removed, so a patch only has to be well-formed for the
//! fields it actually carries. Nested `required` lists still apply.
//!
//! # Example
//!
//! ```ignore
//! use docrest::schema::ResourceSchema;
//! use serde_json::json;
//!
//! let schema = ResourceSchema::new(json!({
//!     "type": "object",
//!     "required": ["name"],
//!     "properties": { "name": { "type": "string" } },
//! }))?;
//!
//! assert!(schema.is_valid(&json!({ "name": "Alice" })));
//! assert!(!schema.is_valid(&json!({ "name": "Alice", "age": 30 })));
//! assert!(schema.is_valid_patch(&json!({})));
//! ```

use std::fmt;

use jsonschema::{Draft, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// A single structural violation reported by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// JSON pointer to the offending location in the validated value (`""` for the root).
    pub path: String,
    /// Human readable description of the violation.
    pub message: String,
}

/// The outcome of validating a value against a [`ResourceSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the value satisfied the schema.
    pub valid: bool,
    /// Every violation found, in validator order. Empty iff `valid`.
    pub errors: Vec<Violation>,
}

/// Compiled closed-world validators for one resource type.
pub struct ResourceSchema {
    declared: Value,
    full: Validator,
    patch: Validator,
}

impl ResourceSchema {
    /// Keywords whose value is a single sub-schema.
    const SCHEMA_KEYWORDS: [&'static str; 7] = [
        "not",
        "additionalItems",
        "additionalProperties",
        "contains",
        "if",
        "then",
        "else",
    ];
    /// Keywords whose value is a list of sub-schemas.
    const SCHEMA_LIST_KEYWORDS: [&'static str; 3] = ["allOf", "anyOf", "oneOf"];
    /// Keywords whose value maps names to sub-schemas.
    const SCHEMA_MAP_KEYWORDS: [&'static str; 4] = [
        "properties",
        "patternProperties",
        "definitions",
        "$defs",
    ];

    /// Compiles the declarative schema into closed-world full and patch validators.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidSchema`] if either derived schema fails to compile.
    pub fn new(declared: Value) -> DocumentStoreResult<Self> {
        let mut closed = declared.clone();
        Self::close_world(&mut closed);

        let mut patch = closed.clone();
        if let Some(root) = patch.as_object_mut() {
            root.remove("required");
        }

        Ok(Self {
            full: Self::compile(&closed)?,
            patch: Self::compile(&patch)?,
            declared,
        })
    }

    /// Returns the schema as it was declared, before closing.
    pub fn schema(&self) -> &Value {
        &self.declared
    }

    /// Checks a complete resource against the schema.
    pub fn is_valid(&self, resource: &Value) -> bool {
        self.full.is_valid(resource)
    }

    /// Lists every violation of a complete resource against the schema.
    pub fn errors(&self, resource: &Value) -> Vec<Violation> {
        Self::collect(&self.full, resource)
    }

    /// Validates a complete resource, returning validity and violations together.
    pub fn validate(&self, resource: &Value) -> ValidationResult {
        let errors = self.errors(resource);

        ValidationResult {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Checks a partial resource against the schema, ignoring top-level required fields.
    pub fn is_valid_patch(&self, partial: &Value) -> bool {
        self.patch.is_valid(partial)
    }

    /// Lists every violation of a partial resource, ignoring top-level required fields.
    pub fn patch_errors(&self, partial: &Value) -> Vec<Violation> {
        Self::collect(&self.patch, partial)
    }

    /// Validates a partial resource, returning validity and violations together.
    pub fn validate_patch(&self, partial: &Value) -> ValidationResult {
        let errors = self.patch_errors(partial);

        ValidationResult {
            valid: errors.is_empty(),
            errors,
        }
    }

    fn compile(schema: &Value) -> DocumentStoreResult<Validator> {
        jsonschema::options()
            .with_draft(Draft::Draft7)
            .build(schema)
            .map_err(|e| DocumentStoreError::InvalidSchema(e.to_string()))
    }

    fn collect(validator: &Validator, instance: &Value) -> Vec<Violation> {
        validator
            .iter_errors(instance)
            .map(|error| Violation {
                path: error.instance_path.to_string(),
                message: error.to_string(),
            })
            .collect()
    }

    /// Recursively sets `additionalProperties: false` on every object sub-schema that
    /// declares `properties` and leaves `additionalProperties` unset.
    fn close_world(schema: &mut Value) {
        let Some(node) = schema.as_object_mut() else {
            return;
        };

        if node.contains_key("properties") && !node.contains_key("additionalProperties") {
            node.insert("additionalProperties".to_string(), Value::Bool(false));
        }

        for keyword in Self::SCHEMA_KEYWORDS {
            if let Some(sub) = node.get_mut(keyword) {
                Self::close_world(sub);
            }
        }

        for keyword in Self::SCHEMA_LIST_KEYWORDS {
            if let Some(Value::Array(subs)) = node.get_mut(keyword) {
                subs.iter_mut().for_each(Self::close_world);
            }
        }

        for keyword in Self::SCHEMA_MAP_KEYWORDS {
            if let Some(Value::Object(subs)) = node.get_mut(keyword) {
                subs.values_mut().for_each(Self::close_world);
            }
        }

        match node.get_mut("items") {
            Some(Value::Array(subs)) => subs.iter_mut().for_each(Self::close_world),
            Some(sub) => Self::close_world(sub),
            None => {}
        }
    }
}

impl fmt::Debug for ResourceSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceSchema")
            .field("declared", &self.declared)
            .finish_non_exhaustive()
    }
}
