use bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use docrest_core::{
    backend::StoreDatabase,
    client::{ResourceClient, ResourceConfig},
    error::{DocumentStoreError, DocumentStoreResult},
    query::Filter,
    resource::Resource,
    schema::ResourceSchema,
    session::{SessionFactory, with_db},
};
use docrest_memory::InMemoryStore;

const DATABASE: &str = "stable";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Pony {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    age: i32,
    equipment: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    colors: Vec<String>,
}

impl Resource for Pony {
    fn id(&self) -> Option<&ObjectId> {
        self.id.as_ref()
    }
}

fn pony_schema() -> ResourceSchema {
    ResourceSchema::new(json!({
        "title": "Pony",
        "type": "object",
        "required": ["name", "age", "equipment"],
        "properties": {
            "name": { "type": "string" },
            "age": { "type": "integer" },
            "equipment": { "type": "string" },
            "colors": { "type": "array", "items": { "type": "string" } },
        },
    }))
    .unwrap()
}

fn ponies(store: &InMemoryStore, limit: usize) -> ResourceClient<InMemoryStore, Pony> {
    ResourceClient::new(
        SessionFactory::new(store.clone(), DATABASE),
        ResourceConfig::new("ponies", limit, pony_schema()).unwrap(),
    )
}

fn bolt() -> serde_json::Value {
    json!({ "name": "Bolt", "age": 4, "equipment": "saddle" })
}

#[tokio::test]
async fn with_db_closes_connection_after_success() {
    let store = InMemoryStore::new();

    let id = with_db(&store, DATABASE, |db| async move {
        db.insert_one("ponies", doc! { "name": "Bolt" }).await
    })
    .await
    .unwrap();

    assert_eq!(store.connections_opened(), 1);
    assert_eq!(store.open_connections(), 0);

    let found = with_db(&store, DATABASE, |db| async move {
        db.find_one("ponies", &Filter::by_id(id)).await
    })
    .await
    .unwrap();

    assert_eq!(found.unwrap().get_str("name").unwrap(), "Bolt");
    assert_eq!(store.open_connections(), 0);
}

#[tokio::test]
async fn with_db_closes_connection_after_failure() {
    let store = InMemoryStore::new();

    let result: Result<(), _> = with_db(&store, DATABASE, |_db| async move {
        Err(DocumentStoreError::Backend("boom".to_string()))
    })
    .await;

    assert!(matches!(result, Err(DocumentStoreError::Backend(message)) if message == "boom"));
    assert_eq!(store.connections_opened(), 1);
    assert_eq!(store.open_connections(), 0);
}

#[tokio::test]
async fn with_db_propagates_connect_failure_without_running_work() {
    let store = InMemoryStore::new();
    store.set_unavailable(true);

    let mut ran = false;
    let result = with_db(&store, DATABASE, |_db| {
        ran = true;
        async move { Ok(()) }
    })
    .await;

    assert!(matches!(result, Err(DocumentStoreError::Connection(_))));
    assert!(!ran);
    assert_eq!(store.connections_opened(), 0);
}

#[tokio::test]
async fn with_db_releases_connection_when_cancelled() {
    let store = InMemoryStore::new();

    let result = timeout(
        Duration::from_millis(20),
        with_db(&store, DATABASE, |_db| async move {
            sleep(Duration::from_secs(5)).await;
            Ok(())
        }),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(store.connections_opened(), 1);
    assert_eq!(store.open_connections(), 0);
}

#[tokio::test]
async fn with_db_releases_connection_when_work_panics() {
    let store = InMemoryStore::new();
    let shared = store.clone();

    let joined = tokio::spawn(async move {
        let result: DocumentStoreResult<()> = with_db(&shared, DATABASE, |_db| async move {
            panic!("unit of work failed")
        })
        .await;
        result
    })
    .await;

    assert!(joined.unwrap_err().is_panic());
    assert_eq!(store.connections_opened(), 1);
    assert_eq!(store.open_connections(), 0);
}

#[tokio::test]
async fn create_returns_stored_resource_with_identifier() {
    let store = InMemoryStore::new();
    let client = ponies(&store, 25);

    let created = client.create(&bolt()).await.unwrap();

    assert!(created.id.is_some());
    assert_eq!(created.name, "Bolt");
    assert_eq!(store.count(DATABASE, "ponies").await, 1);
    assert_eq!(store.connections_opened(), 1);
    assert_eq!(store.open_connections(), 0);
}

#[tokio::test]
async fn create_accepts_typed_resources() {
    let store = InMemoryStore::new();
    let client = ponies(&store, 25);

    let pony = Pony {
        id: None,
        name: "Dash".to_string(),
        age: 2,
        equipment: "bridle".to_string(),
        colors: vec!["blue".to_string()],
    };
    let created = client.create(&pony).await.unwrap();

    assert_eq!(
        created,
        Pony {
            id: created.id,
            ..pony
        }
    );
}

#[tokio::test]
async fn get_after_create_returns_equal_resource() {
    let store = InMemoryStore::new();
    let client = ponies(&store, 25);

    let created = client.create(&bolt()).await.unwrap();
    let fetched = client
        .get(Filter::by_id(*created.id().unwrap()))
        .await
        .unwrap();

    assert_eq!(fetched, Some(created));
}

#[tokio::test]
async fn get_returns_none_when_nothing_matches() {
    let store = InMemoryStore::new();
    let client = ponies(&store, 25);

    client.create(&bolt()).await.unwrap();

    assert_eq!(client.get(Filter::by_id(ObjectId::new())).await.unwrap(), None);
    assert_eq!(
        client
            .get(Filter::new().eq("name", "Nobody"))
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn create_rejects_missing_required_fields_without_writing() {
    let store = InMemoryStore::new();
    let client = ponies(&store, 25);

    let error = client.create(&json!({ "name": "Bolt" })).await.unwrap_err();
    let violations = error.violations().unwrap();

    assert_eq!(violations.len(), 2);
    assert!(violations.iter().any(|v| v.message.contains("age")));
    assert!(violations.iter().any(|v| v.message.contains("equipment")));
    assert_eq!(store.count(DATABASE, "ponies").await, 0);
    assert_eq!(store.connections_opened(), 0);
}

#[tokio::test]
async fn create_rejects_unknown_attributes() {
    let store = InMemoryStore::new();
    let client = ponies(&store, 25);

    let mut input = bolt();
    input["wings"] = json!(true);

    let error = client.create(&input).await.unwrap_err();

    assert!(matches!(error, DocumentStoreError::SchemaValidation(_)));
    assert!(error.violations().unwrap()[0].message.contains("wings"));
    assert_eq!(store.count(DATABASE, "ponies").await, 0);
}

#[tokio::test]
async fn create_rejects_identifier_in_input() {
    let store = InMemoryStore::new();
    let client = ponies(&store, 25);

    let mut input = bolt();
    input["_id"] = json!("abc");

    assert!(matches!(
        client.create(&input).await,
        Err(DocumentStoreError::SchemaValidation(_))
    ));
}

#[tokio::test]
async fn list_is_capped_at_configured_limit() {
    let store = InMemoryStore::new();
    let client = ponies(&store, 25);

    for age in 0..30 {
        client
            .create(&json!({ "name": "Bolt", "age": age, "equipment": "saddle" }))
            .await
            .unwrap();
    }

    let listed = client.list(Filter::new()).await.unwrap();

    assert_eq!(listed.len(), 25);
    assert_eq!(
        listed.iter().map(|p| p.age).collect::<Vec<_>>(),
        (0..25).collect::<Vec<_>>()
    );
    assert_eq!(store.open_connections(), 0);
}

#[tokio::test]
async fn list_filters_by_exact_field_values() {
    let store = InMemoryStore::new();
    let client = ponies(&store, 25);

    client.create(&bolt()).await.unwrap();
    client
        .create(&json!({ "name": "Dash", "age": 2, "equipment": "bridle", "colors": ["blue", "white"] }))
        .await
        .unwrap();

    let bridled = client
        .list(Filter::new().eq("equipment", "bridle"))
        .await
        .unwrap();
    assert_eq!(bridled.len(), 1);
    assert_eq!(bridled[0].name, "Dash");

    let blue = client.list(Filter::new().eq("colors", "blue")).await.unwrap();
    assert_eq!(blue.len(), 1);

    assert!(client
        .list(Filter::new().eq("equipment", "horseshoe"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn list_on_empty_collection_is_empty() {
    let store = InMemoryStore::new();
    let client = ponies(&store, 25);

    assert!(client.list(Filter::new()).await.unwrap().is_empty());
    assert_eq!(store.connections_opened(), 1);
}

#[tokio::test]
async fn update_overwrites_only_given_fields() {
    let store = InMemoryStore::new();
    let client = ponies(&store, 25);

    let created = client.create(&bolt()).await.unwrap();
    let id = *created.id().unwrap();

    let updated = client
        .update(Filter::by_id(id), &json!({ "equipment": "new" }))
        .await
        .unwrap();

    assert_eq!(updated.equipment, "new");
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.age, created.age);
    assert_eq!(updated.id, created.id);
    assert_eq!(client.get(Filter::by_id(id)).await.unwrap(), Some(updated));
    assert_eq!(store.connections_opened(), 3);
    assert_eq!(store.open_connections(), 0);
}

#[tokio::test]
async fn update_validates_partial() {
    let store = InMemoryStore::new();
    let client = ponies(&store, 25);

    let created = client.create(&bolt()).await.unwrap();
    let filter = Filter::by_id(*created.id().unwrap());

    let error = client
        .update(filter.clone(), &json!({ "age": "old" }))
        .await
        .unwrap_err();
    assert_eq!(error.violations().unwrap()[0].path, "/age");

    assert!(matches!(
        client.update(filter.clone(), &json!({ "wings": 2 })).await,
        Err(DocumentStoreError::SchemaValidation(_))
    ));
    assert_eq!(client.get(filter).await.unwrap(), Some(created));
}

#[tokio::test]
async fn update_with_empty_partial_returns_current_resource() {
    let store = InMemoryStore::new();
    let client = ponies(&store, 25);

    let created = client.create(&bolt()).await.unwrap();
    let updated = client
        .update(Filter::by_id(*created.id().unwrap()), &json!({}))
        .await
        .unwrap();

    assert_eq!(updated, created);
}

#[tokio::test]
async fn update_without_match_is_not_found() {
    let store = InMemoryStore::new();
    let client = ponies(&store, 25);

    let result = client
        .update(Filter::by_id(ObjectId::new()), &json!({ "equipment": "new" }))
        .await;

    assert!(matches!(result, Err(DocumentStoreError::DocumentNotFound(collection)) if collection == "ponies"));
    assert_eq!(store.open_connections(), 0);
}

#[tokio::test]
async fn operations_fail_with_connection_error_when_store_unavailable() {
    let store = InMemoryStore::new();
    let client = ponies(&store, 25);
    store.set_unavailable(true);

    assert!(matches!(
        client.list(Filter::new()).await,
        Err(DocumentStoreError::Connection(_))
    ));
    assert!(matches!(
        client.create(&bolt()).await,
        Err(DocumentStoreError::Connection(_))
    ));

    store.set_unavailable(false);
    assert!(client.list(Filter::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn clients_share_one_store() {
    let store = InMemoryStore::new();
    let client = ponies(&store, 25);
    let other = client.clone();

    let created = client.create(&bolt()).await.unwrap();

    assert_eq!(
        other.get(Filter::by_id(*created.id().unwrap())).await.unwrap(),
        Some(created)
    );
    assert_eq!(other.config().collection_name(), "ponies");
}
