//! Repository and collection API integration tests.
//!
//! Run with: `cargo test -p mediastore-api --test namespaces_test`

mod helpers;

use helpers::auth::bearer;
use helpers::{api_path, setup_test_app};
use serde_json::{json, Value};

#[tokio::test]
async fn test_health_is_public() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path("/repositories/default"))
        .await;

    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_malformed_token_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path("/repositories/default"))
        .add_header("Authorization", "Bearer not-a-jwt")
        .await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_defaults_exist_after_startup() {
    let app = setup_test_app().await;
    let client = app.client();

    let repository = client
        .get(&api_path("/repositories/default"))
        .add_header("Authorization", bearer("alice"))
        .await;
    assert_eq!(repository.status_code(), 200);
    let repository: Value = repository.json();
    assert_eq!(repository["permission"], "public");

    let collection = client
        .get(&api_path("/collections/default"))
        .add_header("Authorization", bearer("alice"))
        .await;
    assert_eq!(collection.status_code(), 200);
    let collection: Value = collection.json();
    assert_eq!(collection["repository_id"], "default");
}

#[tokio::test]
async fn test_create_repository_generates_id() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/repositories"))
        .add_header("Authorization", bearer("alice"))
        .json(&json!({ "name": "photos" }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let id = body["repository_id"].as_str().unwrap();
    assert!(id.starts_with("di_"));
    assert_eq!(body["repository"]["name"], "photos");
    assert_eq!(body["repository"]["permission"], "public");
}

#[tokio::test]
async fn test_create_repository_twice_reports_success() {
    let app = setup_test_app().await;
    let client = app.client();

    for name in ["first", "second"] {
        let response = client
            .post(&api_path("/repositories"))
            .add_header("Authorization", bearer("alice"))
            .json(&json!({ "repository_id": "di_fixed123", "name": name }))
            .await;
        assert_eq!(response.status_code(), 200);
        let body: Value = response.json();
        assert_eq!(body["repository"]["name"], "first");
    }
}

#[tokio::test]
async fn test_create_collection_then_get() {
    let app = setup_test_app().await;
    let client = app.client();

    let created = client
        .post(&api_path("/collections"))
        .add_header("Authorization", bearer("alice"))
        .json(&json!({ "name": "avatars" }))
        .await;
    assert_eq!(created.status_code(), 200);
    let created: Value = created.json();
    let id = created["collection_id"].as_str().unwrap().to_string();
    assert!(id.starts_with("bi_"));

    let fetched = client
        .get(&api_path(&format!("/collections/{}", id)))
        .add_header("Authorization", bearer("alice"))
        .await;
    assert_eq!(fetched.status_code(), 200);
    let fetched: Value = fetched.json();
    assert_eq!(fetched["name"], "avatars");
    assert_eq!(fetched["repository_id"], "default");
}

#[tokio::test]
async fn test_unknown_collection_is_404_with_sub_code() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path("/collections/bi_missing1"))
        .add_header("Authorization", bearer("alice"))
        .await;

    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["code"], "COLLECTION_NOT_FOUND");
    assert_eq!(body["sub_code"], 30404);
}

#[tokio::test]
async fn test_invalid_json_is_400() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/repositories"))
        .add_header("Authorization", bearer("alice"))
        .add_header("Content-Type", "application/json")
        .text("{not json")
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_path_like_collection_id_is_400() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/collections"))
        .add_header("Authorization", bearer("alice"))
        .json(&json!({ "collection_id": "a/b" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(body["sub_code"], 400);
}
