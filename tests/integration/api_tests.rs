//! API integration tests
//!
//! Drive the public and admin routers in-process over the in-memory store.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use library_catalog::{
    api,
    repository::{memory::MemoryStore, Store},
    AppConfig, AppState,
};

struct TestApp {
    router: Router,
    admin: Router,
}

struct TestResponse {
    status: StatusCode,
    location: Option<String>,
    body: Value,
}

impl TestApp {
    /// Seeded catalog: 3 publishers, 4 categories, 5 authors, 6 linked books
    async fn seeded() -> Self {
        Self::with_store(MemoryStore::new(), true).await
    }

    /// No rows at all
    async fn empty() -> Self {
        Self::with_store(MemoryStore::empty(), false).await
    }

    async fn with_store(store: MemoryStore, seed: bool) -> Self {
        let store: Arc<dyn Store> = Arc::new(store);
        let state = AppState::new(AppConfig::default(), store);
        state.services.admin.initialize(seed).await.unwrap();
        Self {
            router: api::router(state.clone()),
            admin: api::admin_router(state),
        }
    }

    async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let request = json_request(method, uri, body.map(|json| json.to_string()));
        send(&self.router, request).await
    }

    async fn admin_request(&self, method: Method, uri: &str) -> TestResponse {
        send(&self.admin, json_request(method, uri, None)).await
    }

    /// Sends `raw` as-is with a JSON content type
    async fn request_raw(&self, method: Method, uri: &str, raw: &str) -> TestResponse {
        send(&self.router, json_request(method, uri, Some(raw.to_string()))).await
    }

    async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body)).await
    }

    async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }
}

fn json_request(method: Method, uri: &str, body: Option<String>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(text) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(text))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse { status, location, body }
}

fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::empty().await;

    let response = app.get("/api/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");

    let response = app.get("/api/ready").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ready");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::empty().await;

    let response = app.get("/api-docs/openapi.json").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["paths"]["/books"].is_object());
}

#[tokio::test]
async fn test_admin_routes_are_not_public() {
    let app = TestApp::seeded().await;

    let response = app.request(Method::POST, "/database/reset", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    let response = app.request(Method::POST, "/api/database/reset", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_status() {
    let app = TestApp::seeded().await;

    let response = app.admin_request(Method::GET, "/database/status").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["canConnect"], true);
    assert!(response.body["appliedMigrations"].is_array());
    assert!(response.body["pendingMigrations"].is_array());
    assert_eq!(
        response.body["totalAppliedMigrations"].as_u64().unwrap() as usize,
        response.body["appliedMigrations"].as_array().unwrap().len()
    );
}

#[tokio::test]
async fn test_admin_reset_restores_catalog() {
    let app = TestApp::seeded().await;

    let response = app.delete("/api/books/1").await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    let response = app.post("/api/publishers", json!({ "name": "Scratch Press" })).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app.admin_request(Method::POST, "/database/reset").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Database reset successfully");

    let response = app.get("/api/books/1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["authors"].as_array().unwrap().len(), 2);
    let response = app.get("/api/publishers").await;
    assert_eq!(response.body.as_array().unwrap().len(), 3);

    app.delete("/api/books/2").await;
    let response = app.admin_request(Method::POST, "/database/force-reset").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Database force reset successfully");
    let response = app.get("/api/books").await;
    assert_eq!(ids(&response.body), vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn test_seed_disabled_keeps_base_rows_unlinked() {
    let app = TestApp::with_store(MemoryStore::new(), false).await;

    let response = app.get("/api/books").await;
    assert_eq!(response.body.as_array().unwrap().len(), 6);
    let response = app.get("/api/books/1").await;
    assert_eq!(response.body["authors"], json!([]));
    assert_eq!(response.body["categories"], json!([]));
}

#[tokio::test]
async fn test_list_seeded_books() {
    let app = TestApp::seeded().await;

    let response = app.get("/api/books").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ids(&response.body), vec![1, 2, 3, 4, 5, 6]);

    let first = &response.body[0];
    assert_eq!(first["title"], "The Quiet Circuit");
    assert_eq!(first["publisherName"], "Northwind Press");
    assert_eq!(ids(&first["authors"]), vec![1, 3]);
    assert_eq!(ids(&first["categories"]), vec![2, 4]);
    assert_eq!(first["authors"][0]["firstName"], "Elena");
}

#[tokio::test]
async fn test_acme_scenario() {
    let app = TestApp::empty().await;

    let response = app.post("/api/publishers", json!({ "name": "Acme" })).await;
    assert_eq!(response.status, StatusCode::CREATED);
    let publisher_id = response.body["id"].as_i64().unwrap();
    assert_eq!(response.location.as_deref(), Some(format!("/api/publishers/{}", publisher_id).as_str()));

    let response = app
        .post(
            "/api/books",
            json!({
                "title": "X",
                "publicationYear": 2024,
                "numberOfCopies": 3,
                "publisherId": publisher_id,
                "authorIds": [],
                "categoryIds": []
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let book_id = response.body["id"].as_i64().unwrap();
    assert!(book_id > 0);
    assert_eq!(response.location, Some(format!("/api/books/{}", book_id)));
    assert_eq!(response.body["authors"], json!([]));
    assert_eq!(response.body["categories"], json!([]));

    let response = app.get("/api/books").await;
    let books = response.body.as_array().unwrap();
    let book = books.iter().find(|b| b["title"] == "X").unwrap();
    assert_eq!(book["publisherName"], "Acme");
    assert_eq!(book["numberOfCopies"], 3);
}

#[tokio::test]
async fn test_create_book_skips_unknown_ids() {
    let app = TestApp::seeded().await;

    let response = app
        .post(
            "/api/books",
            json!({
                "title": "Tide Tables",
                "publicationYear": 2019,
                "numberOfCopies": 5,
                "publisherId": 2,
                "authorIds": [2, 4, 999],
                "categoryIds": [3]
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.body["id"].as_i64().unwrap();

    let response = app.get(&format!("/api/books/{}", id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ids(&response.body["authors"]), vec![2, 4]);
    assert_eq!(ids(&response.body["categories"]), vec![3]);
    assert_eq!(response.body["publisherName"], "Harbor House");
}

#[tokio::test]
async fn test_create_book_validation_errors() {
    let app = TestApp::seeded().await;

    let response = app
        .post(
            "/api/books",
            json!({
                "title": "",
                "publicationYear": 0,
                "numberOfCopies": -2,
                "publisherId": 0
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let fields = &response.body["fields"];
    assert_eq!(fields["title"][0], "Title is required");
    assert_eq!(fields.as_object().unwrap().len(), 4);

    let response = app.get("/api/books").await;
    assert_eq!(response.body.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_malformed_bodies_are_bad_requests() {
    let app = TestApp::seeded().await;

    let response = app
        .post(
            "/api/books",
            json!({
                "publicationYear": 2001,
                "numberOfCopies": 1,
                "publisherId": 1
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["code"], 18);
    assert_eq!(response.body["error"], "BadValue");
    assert!(response.body["message"].as_str().unwrap().contains("title"));

    let response = app
        .put(
            "/api/authors/1",
            json!({ "firstName": "Elena", "lastName": "Marsh" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "BadValue");
    assert!(response.body["message"].as_str().unwrap().contains("id"));

    let response = app.request_raw(Method::POST, "/api/categories", "{\"name\": ").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "BadValue");

    let response = app.get("/api/books").await;
    assert_eq!(response.body.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_create_book_with_missing_publisher_fails() {
    let app = TestApp::seeded().await;

    let response = app
        .post(
            "/api/books",
            json!({
                "title": "Orphan",
                "publicationYear": 2000,
                "numberOfCopies": 1,
                "publisherId": 77
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["message"], "Internal server error");
}

#[tokio::test]
async fn test_update_book() {
    let app = TestApp::seeded().await;

    let response = app
        .put(
            "/api/books/2",
            json!({
                "id": 2,
                "title": "Echoes of Empire (2nd ed.)",
                "publicationYear": 2023,
                "numberOfCopies": 7,
                "publisherId": 3,
                "authorIds": [5],
                "categoryIds": []
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["title"], "Echoes of Empire (2nd ed.)");
    assert_eq!(response.body["publisherName"], "Lantern Books");
    assert_eq!(ids(&response.body["authors"]), vec![5]);
    assert_eq!(response.body["categories"], json!([]));

    let response = app.get("/api/books/2").await;
    assert_eq!(response.body["numberOfCopies"], 7);
}

#[tokio::test]
async fn test_update_id_mismatch() {
    let app = TestApp::seeded().await;

    let response = app.put("/api/categories/1", json!({ "id": 2, "name": "Novels" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "IdMismatch");

    let response = app.get("/api/categories/2").await;
    assert_eq!(response.body["name"], "Science");
}

#[tokio::test]
async fn test_update_missing_category_is_not_found() {
    let app = TestApp::seeded().await;

    let response = app.put("/api/categories/999", json!({ "id": 999, "name": "Y" })).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.get("/api/categories").await;
    assert_eq!(ids(&response.body), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_get_missing_entities() {
    let app = TestApp::seeded().await;

    for uri in ["/api/books/99", "/api/authors/99", "/api/categories/99", "/api/publishers/99"] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(response.body["error"], "NoSuchData");
    }
}

#[tokio::test]
async fn test_delete_author() {
    let app = TestApp::seeded().await;

    let response = app.delete("/api/authors/1").await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app.get("/api/authors/1").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.get("/api/books/1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ids(&response.body["authors"]), vec![3]);

    let response = app.delete("/api/authors/1").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_with_invalid_id() {
    let app = TestApp::seeded().await;

    let response = app.delete("/api/books/0").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["fields"]["id"][0], "Book ID must be greater than 0");
}

#[tokio::test]
async fn test_delete_referenced_publisher_fails() {
    let app = TestApp::seeded().await;

    let response = app.delete("/api/publishers/1").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);

    let response = app.get("/api/publishers/1").await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app.get("/api/books/1").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_author_lifecycle() {
    let app = TestApp::seeded().await;

    let response = app
        .post(
            "/api/authors",
            json!({
                "firstName": "Ada",
                "lastName": "Quill",
                "dateOfBirth": "1961-02-03"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.body["id"].as_i64().unwrap();
    assert_eq!(id, 6);
    assert_eq!(response.body["biography"], "");
    assert_eq!(response.location, Some("/api/authors/6".to_string()));

    let response = app
        .put(
            "/api/authors/6",
            json!({
                "id": 6,
                "firstName": "Ada",
                "lastName": "Quill-Marsh",
                "biography": "Poet.",
                "dateOfBirth": "1961-02-03"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["lastName"], "Quill-Marsh");

    let response = app.get("/api/authors/6/books").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_author_born_in_future_is_rejected() {
    let app = TestApp::seeded().await;

    let response = app
        .post(
            "/api/authors",
            json!({
                "firstName": "Not",
                "lastName": "Yet",
                "dateOfBirth": "2999-01-01"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let fields = response.body["fields"].as_object().unwrap();
    assert_eq!(fields.len(), 1);
    let messages = fields.values().next().unwrap();
    assert_eq!(messages[0], "Date of birth cannot be in the future");
}

#[tokio::test]
async fn test_relation_listings() {
    let app = TestApp::seeded().await;

    let response = app.get("/api/authors/3/books").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ids(&response.body), vec![1, 3, 6]);

    let response = app.get("/api/categories/4/books").await;
    assert_eq!(ids(&response.body), vec![1, 3, 6]);

    let response = app.get("/api/publishers/2/books").await;
    assert_eq!(ids(&response.body), vec![2, 5]);

    let response = app.get("/api/publishers/42/books").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_twice_is_stable() {
    let app = TestApp::seeded().await;

    let first = app.get("/api/authors").await;
    let second = app.get("/api/authors").await;
    assert_eq!(first.body, second.body);
    assert_eq!(ids(&first.body), vec![1, 2, 3, 4, 5]);
}
