//! Items API Tests
//!
//! Drive the full router in-process:
//! - Create/get round-trips the payload plus the assigned id
//! - Validation failures are 422 and never reach the store
//! - Malformed ids are 422, unknown ids are 404 naming the id
//! - Updates only write supplied fields; empty updates write nothing
//! - Listing pages through insertion order with skip/limit

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use items_api::http_server::{HttpServer, HttpServerConfig};
use items_api::object_id::ObjectId;
use items_api::store::{DocumentCollection, MemoryCollection};
use serde_json::{json, Value};
use tower::ServiceExt;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (Router, Arc<MemoryCollection>) {
    let collection = Arc::new(MemoryCollection::new("test-collection"));
    let router = HttpServer::build_router(&HttpServerConfig::default(), collection.clone());
    (router, collection)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&v).unwrap())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn joes_item() -> Value {
    json!({
        "name": "joes Bloggs",
        "description": "This is joes item",
        "price": 10,
        "tax": 1.6
    })
}

async fn create(app: &Router, item: Value) -> String {
    let (status, body) = send(app, Method::POST, "/items", Some(item)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body["_id"].as_str().unwrap().to_string()
}

async fn fetch(app: &Router, id: &str) -> Value {
    let (status, body) = send(app, Method::GET, &format!("/items/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    body
}

// =============================================================================
// Create / Get
// =============================================================================

#[tokio::test]
async fn test_create_then_get_returns_payload_plus_id() {
    let (app, _) = setup();

    let id = create(&app, joes_item()).await;
    let parsed = ObjectId::parse(&id).unwrap();
    assert_eq!(parsed.to_string(), id);

    let mut expected = joes_item();
    expected["_id"] = json!(id);
    assert_eq!(fetch(&app, &id).await, expected);
}

#[tokio::test]
async fn test_create_return_item_false_returns_only_id() {
    let (app, _) = setup();

    let (status, body) = send(&app, Method::POST, "/items?return_item=False", Some(joes_item())).await;
    assert_eq!(status, StatusCode::CREATED);

    let id = body["_id"].as_str().unwrap();
    assert_eq!(body, json!({ "_id": id }));
}

#[tokio::test]
async fn test_create_return_item_true_returns_full_item() {
    let (app, collection) = setup();

    let (status, body) = send(&app, Method::POST, "/items/?return_item=True", Some(joes_item())).await;
    assert_eq!(status, StatusCode::CREATED);

    let mut expected = joes_item();
    expected["_id"] = body["_id"].clone();
    assert_eq!(body, expected);
    assert_eq!(collection.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_create_is_not_idempotent() {
    let (app, collection) = setup();

    let a = create(&app, joes_item()).await;
    let b = create(&app, joes_item()).await;
    assert_ne!(a, b);
    assert_eq!(collection.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_create_optional_fields_absent() {
    let (app, _) = setup();

    let id = create(&app, json!({"name": "bare", "price": 0})).await;
    assert_eq!(
        fetch(&app, &id).await,
        json!({"_id": id, "name": "bare", "description": null, "price": 0})
    );
}

#[tokio::test]
async fn test_create_with_missing_mandatory_fields() {
    let (app, collection) = setup();

    let cases = [
        (json!({"name": "joes Bloggs"}), vec!["price"]),
        (json!({"name": "joes Bloggs", "description": "descr"}), vec!["price"]),
        (json!({"name": "joes Bloggs", "description": "descr", "tax": 10.99}), vec!["price"]),
        (json!({"price": 3}), vec!["name"]),
        (json!({}), vec!["name", "price"]),
    ];

    for (payload, fields) in cases {
        let (status, body) = send(&app, Method::POST, "/items", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "payload {}", payload);

        let reported: Vec<_> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(reported, fields, "payload {}", payload);
    }

    assert_eq!(collection.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_rejects_malformed_bodies() {
    let (app, collection) = setup();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/items")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, Method::POST, "/items", Some(json!([1, 2, 3]))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, Method::POST, "/items", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(collection.count().await.unwrap(), 0);
}

// =============================================================================
// Price Range
// =============================================================================

#[tokio::test]
async fn test_price_out_of_range_never_reaches_store() {
    let (app, collection) = setup();

    for price in [-1, 11, 1000] {
        let mut item = joes_item();
        item["price"] = json!(price);
        let (status, body) = send(&app, Method::POST, "/items", Some(item)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["details"][0]["field"], "price");
    }
    assert_eq!(collection.count().await.unwrap(), 0);

    let id = create(&app, joes_item()).await;
    for price in [-1, 11] {
        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("/items/{}", id),
            Some(json!({"price": price, "name": "changed"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    let mut expected = joes_item();
    expected["_id"] = json!(id);
    assert_eq!(fetch(&app, &id).await, expected);
}

#[tokio::test]
async fn test_price_bounds_accepted() {
    let (app, _) = setup();

    for price in [0, 10] {
        let mut item = joes_item();
        item["price"] = json!(price);
        let id = create(&app, item).await;
        assert_eq!(fetch(&app, &id).await["price"], json!(price));
    }
}

// =============================================================================
// Identifiers
// =============================================================================

#[tokio::test]
async fn test_malformed_ids_are_unprocessable() {
    let (app, _) = setup();
    create(&app, joes_item()).await;

    let bad_ids = [
        "invalidid",
        "1111fa8fd3e0a099b5d3a81",
        "1111fa8fd3e0a099b5d3a8130",
        "1111fa8fd3e0a099b5d3a81z",
        "zzzzzzzzzzzzzzzzzzzzzzzz",
    ];

    for bad in bad_ids {
        let uri = format!("/items/{}", bad);

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "GET {}", bad);
        assert_eq!(body["details"][0]["field"], "item_id");

        let (status, _) = send(&app, Method::PUT, &uri, Some(joes_item())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "PUT {}", bad);

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "DELETE {}", bad);
    }
}

#[tokio::test]
async fn test_get_nonexistent_item() {
    let (app, _) = setup();
    let item_id = "1111fa8fd3e0a099b5d3a813";

    let (status, body) = send(&app, Method::GET, &format!("/items/{}", item_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        format!("Item with id: {} does not exist", item_id)
    );
}

#[tokio::test]
async fn test_uppercase_id_resolves_to_same_item() {
    let (app, _) = setup();
    let id = create(&app, joes_item()).await;

    let body = fetch(&app, &id.to_uppercase()).await;
    assert_eq!(body["_id"], json!(id));
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_nonexistent_item() {
    let (app, _) = setup();
    let item_id = "1111fa8fd3e0a099b5d3a813";

    let (status, body) = send(&app, Method::DELETE, &format!("/items/{}", item_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        format!("Item with id: {} does not exist", item_id)
    );
}

#[tokio::test]
async fn test_delete_twice_reports_not_found() {
    let (app, collection) = setup();
    let id = create(&app, joes_item()).await;
    let uri = format!("/items/{}", id);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("Item with id: {} deleted", id));
    assert_eq!(collection.count().await.unwrap(), 0);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], format!("Item with id: {} does not exist", id));

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_put_nonexistent_item() {
    let (app, _) = setup();
    let item_id = "1111fa8fd3e0a099b5d3a813";

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/items/{}", item_id),
        Some(joes_item()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        format!("Item with id: {} does not exist", item_id)
    );
}

#[tokio::test]
async fn test_put_with_valid_item_all_fields() {
    let (app, _) = setup();
    let id = create(&app, joes_item()).await;

    let mut update = joes_item();
    update["name"] = json!("updated name");
    update["price"] = json!(3);
    let (status, body) = send(&app, Method::PUT, &format!("/items/{}", id), Some(update.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("Item with id: {} updated", id));

    update["_id"] = json!(id);
    assert_eq!(fetch(&app, &id).await, update);
}

#[tokio::test]
async fn test_put_with_valid_item_selected_fields() {
    let (app, _) = setup();
    let id = create(&app, joes_item()).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/items/{}", id),
        Some(json!({"name": "updated name"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mut expected = joes_item();
    expected["name"] = json!("updated name");
    expected["_id"] = json!(id);
    assert_eq!(fetch(&app, &id).await, expected);
}

#[tokio::test]
async fn test_put_null_fields_are_not_written() {
    let (app, _) = setup();
    let id = create(&app, joes_item()).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/items/{}", id),
        Some(json!({"description": null, "tax": null, "price": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mut expected = joes_item();
    expected["price"] = json!(2);
    expected["_id"] = json!(id);
    assert_eq!(fetch(&app, &id).await, expected);
}

#[tokio::test]
async fn test_put_adds_tax_to_item_without_one() {
    let (app, _) = setup();
    let id = create(&app, json!({"name": "n", "price": 1})).await;

    let (status, _) = send(&app, Method::PUT, &format!("/items/{}", id), Some(json!({"tax": 0.5}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetch(&app, &id).await["tax"], json!(0.5));
}

#[tokio::test]
async fn test_empty_update_never_mutates() {
    let (app, _) = setup();
    let id = create(&app, joes_item()).await;
    let before = fetch(&app, &id).await;

    for payload in [json!({}), json!({"name": null, "description": null, "price": null, "tax": null})] {
        let (status, body) = send(&app, Method::PUT, &format!("/items/{}", id), Some(payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], format!("Item with id: {} unchanged", id));
    }

    assert_eq!(fetch(&app, &id).await, before);
}

#[tokio::test]
async fn test_empty_update_on_missing_item_is_not_found() {
    let (app, _) = setup();

    let (status, _) = send(
        &app,
        Method::PUT,
        "/items/1111fa8fd3e0a099b5d3a813",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_rejects_empty_name() {
    let (app, _) = setup();
    let id = create(&app, joes_item()).await;

    let (status, body) = send(&app, Method::PUT, &format!("/items/{}", id), Some(json!({"name": ""}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "name");
}

// =============================================================================
// Listing
// =============================================================================

async fn create_priced(app: &Router, count: i64) {
    for price in 0..count {
        let mut item = joes_item();
        item["price"] = json!(price);
        create(app, item).await;
    }
}

fn prices(body: &Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|item| item["price"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_get_all_with_skip_and_limit() {
    let (app, _) = setup();
    create_priced(&app, 10).await;

    let (status, body) = send(&app, Method::GET, "/items?limit=2&skip=4", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prices(&body), vec![4, 5]);
}

#[tokio::test]
async fn test_get_all_paging() {
    let (app, _) = setup();
    create_priced(&app, 10).await;

    for page in 0..5 {
        let uri = format!("/items/?skip={}&limit=2", page * 2);
        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(prices(&body), vec![page * 2, page * 2 + 1]);
    }
}

#[tokio::test]
async fn test_get_all_defaults() {
    let (app, _) = setup();

    let (status, body) = send(&app, Method::GET, "/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    create_priced(&app, 10).await;

    let (_, body) = send(&app, Method::GET, "/items", None).await;
    assert_eq!(prices(&body), vec![0, 1, 2, 3, 4]);

    let (_, body) = send(&app, Method::GET, "/items?limit=10&skip=8", None).await;
    assert_eq!(prices(&body), vec![8, 9]);

    let (_, body) = send(&app, Method::GET, "/items?skip=20", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_get_all_items_carry_ids() {
    let (app, _) = setup();
    let id = create(&app, joes_item()).await;

    let (_, body) = send(&app, Method::GET, "/items", None).await;
    assert_eq!(body[0]["_id"], json!(id));
}

#[tokio::test]
async fn test_get_all_rejects_bad_query() {
    let (app, _) = setup();

    for uri in ["/items?limit=abc", "/items?skip=-1", "/items?limit=1001"] {
        let (status, _) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
    }
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_and_hello_routes() {
    let (app, _) = setup();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, Method::GET, "/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Hello World!"}));
}
