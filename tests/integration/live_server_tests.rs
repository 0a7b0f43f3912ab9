//! Tests against a running server
//!
//! Start the server first, then run: cargo test --test live_server_tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";

async fn create_publisher(client: &Client, name: &str) -> Value {
    let response = client
        .post(format!("{}/publishers", BASE_URL))
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_ready_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_list_books() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let books = body.as_array().expect("Expected an array");
    for book in books {
        assert!(book["publisherName"].is_string());
        assert!(book["authors"].is_array());
    }
}

#[tokio::test]
#[ignore]
async fn test_book_lifecycle() {
    let client = Client::new();
    let publisher = create_publisher(&client, "Live Test Press").await;
    let publisher_id = publisher["id"].as_i64().expect("No publisher id");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "Live Test Book",
            "publicationYear": 2020,
            "numberOfCopies": 2,
            "publisherId": publisher_id,
            "authorIds": [],
            "categoryIds": []
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("No Location header");
    let book: Value = response.json().await.expect("Failed to parse response");
    let id = book["id"].as_i64().expect("No book id");
    assert_eq!(location, format!("/api/books/{}", id));
    assert_eq!(book["publisherName"], "Live Test Press");

    let response = client
        .put(format!("{}/books/{}", BASE_URL, id))
        .json(&json!({
            "id": id,
            "title": "Live Test Book, revised",
            "publicationYear": 2021,
            "numberOfCopies": 4,
            "publisherId": publisher_id,
            "authorIds": [],
            "categoryIds": []
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .delete(format!("{}/publishers/{}", BASE_URL, publisher_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore]
async fn test_update_missing_category() {
    let client = Client::new();

    let response = client
        .put(format!("{}/categories/999999", BASE_URL))
        .json(&json!({ "id": 999999, "name": "Y" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
