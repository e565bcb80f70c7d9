//! The unicorn resource: record type, schema and static configuration.

use docrest::{
    bson::oid::ObjectId,
    client::ResourceConfig,
    error::DocumentStoreResult,
    resource::Resource,
    schema::ResourceSchema,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Collection unicorns are stored in.
pub const COLLECTION_NAME: &str = "unicorns";

/// Maximum number of unicorns a list returns.
pub const LIST_LIMIT: usize = 25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnicornColor {
    pub path_id: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unicorn {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub nickname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub phone_no: String,
    pub colors: Vec<UnicornColor>,
    pub equipment: String,
}

impl Resource for Unicorn {
    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }
}

/// A unicorn as it is sent over HTTP, with its identifier as a 24-character hex string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnicornResponse {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub nickname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub phone_no: String,
    pub colors: Vec<UnicornColor>,
    pub equipment: String,
}

impl From<Unicorn> for UnicornResponse {
    fn from(unicorn: Unicorn) -> Self {
        Self {
            id: unicorn.id.map(|id| id.to_hex()),
            nickname: unicorn.nickname,
            created_at: unicorn.created_at,
            phone_no: unicorn.phone_no,
            colors: unicorn.colors,
            equipment: unicorn.equipment,
        }
    }
}

/// The declared unicorn schema. Unknown attributes are rejected once it is compiled
/// into a [`ResourceSchema`].
pub fn unicorn_schema() -> Value {
    json!({
        "title": "Entry",
        "type": "object",
        "required": ["nickname", "phoneNo", "colors", "equipment"],
        "properties": {
            "createdAt": {
                "type": "string",
                "pattern": r"\d{4}-[01]\d-[0-3]\dT[0-2]\d:[0-5]\d:[0-5]\d\.\d+([+-][0-2]\d:[0-5]\d|Z)",
                "description": "must be an ISO date-time string",
            },
            "nickname": {
                "type": "string",
                "description": "must be a string and is required",
            },
            "phoneNo": {
                "type": "string",
                "description": "must be a string and is required",
            },
            "colors": {
                "type": "array",
                "description": "must be a array and is required",
                "items": {
                    "type": "object",
                    "required": ["pathId", "color"],
                    "properties": {
                        "pathId": {
                            "type": "string",
                            "description": "must be a string and is required",
                        },
                        "color": {
                            "type": "string",
                            "description": "must be a string and is required",
                        },
                    },
                },
            },
            "equipment": {
                "type": "string",
                "description": "must be a string and is required",
            },
        },
    })
}

/// Resource configuration for unicorns.
///
/// # Errors
///
/// Returns [`docrest::error::DocumentStoreError::InvalidSchema`] if the schema fails to
/// compile.
pub fn unicorn_config() -> DocumentStoreResult<ResourceConfig> {
    ResourceConfig::new(
        COLLECTION_NAME,
        LIST_LIMIT,
        ResourceSchema::new(unicorn_schema())?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spark() -> Value {
        json!({
            "nickname": "Spark",
            "phoneNo": "555-0100",
            "colors": [{ "pathId": "mane", "color": "pink" }],
            "equipment": "saddle",
            "createdAt": "2024-05-01T10:20:30.456Z",
        })
    }

    #[test]
    fn accepts_complete_unicorn() {
        let config = unicorn_config().unwrap();

        assert!(config.schema().is_valid(&spark()));
        assert_eq!(config.collection_name(), "unicorns");
        assert_eq!(config.limit(), 25);
    }

    #[test]
    fn rejects_malformed_timestamp() {
        let config = unicorn_config().unwrap();
        let mut unicorn = spark();
        unicorn["createdAt"] = json!("yesterday");

        let errors = config.schema().errors(&unicorn);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "/createdAt");
    }

    #[test]
    fn rejects_incomplete_colors() {
        let config = unicorn_config().unwrap();
        let mut unicorn = spark();
        unicorn["colors"] = json!([{ "pathId": "tail" }]);

        let errors = config.schema().errors(&unicorn);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "/colors/0");
        assert!(errors[0].message.contains("color"));
    }

    #[test]
    fn response_renders_identifier_as_hex() {
        let id = ObjectId::new();
        let mut unicorn: Unicorn = serde_json::from_value(spark()).unwrap();
        unicorn.id = Some(id);

        let body = serde_json::to_value(UnicornResponse::from(unicorn)).unwrap();

        assert_eq!(body["_id"], json!(id.to_hex()));
        assert_eq!(body["_id"].as_str().unwrap().len(), 24);
        assert_eq!(body["phoneNo"], json!("555-0100"));
    }

    #[test]
    fn serializes_with_wire_names() {
        let unicorn: Unicorn = serde_json::from_value(spark()).unwrap();

        assert_eq!(unicorn.phone_no, "555-0100");
        assert_eq!(unicorn.colors[0].path_id, "mane");
        assert_eq!(serde_json::to_value(&unicorn).unwrap(), spark());
    }
}
