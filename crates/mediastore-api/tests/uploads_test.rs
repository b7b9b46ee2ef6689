//! Upload protocol API integration tests.
//!
//! Run with: `cargo test -p mediastore-api --test uploads_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use helpers::auth::bearer;
use helpers::{api_path, setup_test_app};
use mediastore_services::RequestContext;
use serde_json::{json, Value};

async fn apply(client: &TestServer, body: Value) -> Value {
    let response = client
        .post(&api_path("/upload/apply"))
        .add_header("Authorization", bearer("alice"))
        .json(&body)
        .await;
    assert_eq!(response.status_code(), 200);
    response.json()
}

fn jpeg_apply() -> Value {
    json!({
        "file_name": "a.jpg",
        "content_length": 100,
        "content_type": "image/jpeg",
        "collection_id": "default"
    })
}

fn file_form(data: Vec<u8>) -> MultipartForm {
    let part = Part::bytes(data)
        .file_name("a.jpg")
        .mime_type("image/jpeg");
    MultipartForm::new().add_part("file", part)
}

/// Split a local signed URL into its path (with query) on the test server.
fn local_path(url: &str) -> String {
    url.strip_prefix("http://localhost:3000")
        .expect("signed URL should point at the local object route")
        .to_string()
}

#[tokio::test]
async fn test_apply_returns_versioned_fid_and_records_uploader() {
    let app = setup_test_app().await;

    let body = apply(app.client(), jpeg_apply()).await;

    let fid = body["fid"].as_str().unwrap();
    assert!(fid.starts_with("v1-"));
    assert_eq!(body["init_info"]["fid"], fid);
    assert_eq!(body["init_info"]["uploader"], "alice");
    assert_eq!(body["init_info"]["collection"]["collection_id"], "default");
}

#[tokio::test]
async fn test_apply_ignores_client_uploader() {
    let app = setup_test_app().await;
    let mut request = jpeg_apply();
    request["uploader"] = json!("mallory");

    let body = apply(app.client(), request).await;

    assert_eq!(body["init_info"]["uploader"], "alice");
}

#[tokio::test]
async fn test_apply_file_not_queryable_until_uploaded() {
    let app = setup_test_app().await;
    let body = apply(app.client(), jpeg_apply()).await;
    let fid = body["fid"].as_str().unwrap();

    let response = app
        .client()
        .get(&api_path(&format!("/files/{}/info", fid)))
        .add_header("Authorization", bearer("alice"))
        .await;

    assert_eq!(response.status_code(), 404);
    let error: Value = response.json();
    assert_eq!(error["sub_code"], 20404);
}

#[tokio::test]
async fn test_apply_missing_content_type_is_400() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/upload/apply"))
        .add_header("Authorization", bearer("alice"))
        .json(&json!({ "file_name": "a.jpg", "content_length": 100 }))
        .await;

    assert_eq!(response.status_code(), 400);
    let error: Value = response.json();
    assert_eq!(error["code"], "MISSING_FIELD");
}

#[tokio::test]
async fn test_apply_duplicate_fid_conflicts() {
    let app = setup_test_app().await;
    let mut request = jpeg_apply();
    request["fid"] = json!("client-chosen-fid");

    apply(app.client(), request.clone()).await;
    let second = app
        .client()
        .post(&api_path("/upload/apply"))
        .add_header("Authorization", bearer("alice"))
        .json(&request)
        .await;

    assert_eq!(second.status_code(), 409);
    let error: Value = second.json();
    assert_eq!(error["code"], "FILE_EXISTS");
    assert_eq!(error["sub_code"], 20001);
}

#[tokio::test]
async fn test_apply_path_like_fid_is_400() {
    let app = setup_test_app().await;
    let mut request = jpeg_apply();
    request["fid"] = json!("b/c");

    let response = app
        .client()
        .post(&api_path("/upload/apply"))
        .add_header("Authorization", bearer("alice"))
        .json(&request)
        .await;

    assert_eq!(response.status_code(), 400);
    let error: Value = response.json();
    assert_eq!(error["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_single_upload_then_read_back() {
    let app = setup_test_app().await;
    let client = app.client();
    let data: Vec<u8> = (0..100u8).collect();

    let applied = apply(client, jpeg_apply()).await;
    let fid = applied["fid"].as_str().unwrap().to_string();

    let uploaded = client
        .post(&api_path(&format!("/upload/single/{}?collection_id=default", fid)))
        .add_header("Authorization", bearer("alice"))
        .multipart(file_form(data.clone()))
        .await;
    assert_eq!(uploaded.status_code(), 200);
    let uploaded: Value = uploaded.json();
    assert_eq!(uploaded["fid"], fid.as_str());
    assert!(uploaded["file"]["created_ts"].as_i64().unwrap() > 0);
    assert_eq!(uploaded["file"]["collection"]["collection_id"], "default");

    let info = client
        .get(&api_path(&format!("/files/{}/info", fid)))
        .add_header("Authorization", bearer("alice"))
        .await;
    assert_eq!(info.status_code(), 200);
    let info: Value = info.json();
    assert_eq!(info["file_name"], "a.jpg");
    assert_eq!(info["content_type"], "image/jpeg");

    let signed = client
        .get(&api_path(&format!("/files/{}/url", fid)))
        .add_header("Authorization", bearer("alice"))
        .await;
    assert_eq!(signed.status_code(), 200);
    let signed: Value = signed.json();
    assert_eq!(signed["expires_in"], 900);

    let object = client
        .get(&local_path(signed["url"].as_str().unwrap()))
        .await;
    assert_eq!(object.status_code(), 200);
    assert_eq!(object.header("content-type"), "image/jpeg");
    assert_eq!(object.as_bytes().as_ref(), data.as_slice());
}

#[tokio::test]
async fn test_single_upload_defaults_to_default_collection() {
    let app = setup_test_app().await;
    let client = app.client();

    let applied = apply(client, jpeg_apply()).await;
    let fid = applied["fid"].as_str().unwrap().to_string();

    let uploaded = client
        .post(&api_path(&format!("/upload/single/{}", fid)))
        .add_header("Authorization", bearer("alice"))
        .multipart(file_form(vec![1u8; 100]))
        .await;

    assert_eq!(uploaded.status_code(), 200);
}

#[tokio::test]
async fn test_staging_released_after_upload() {
    let app = setup_test_app().await;
    let client = app.client();

    let applied = apply(client, jpeg_apply()).await;
    let fid = applied["fid"].as_str().unwrap().to_string();
    client
        .post(&api_path(&format!("/upload/single/{}", fid)))
        .add_header("Authorization", bearer("alice"))
        .multipart(file_form(vec![1u8; 100]))
        .await;

    // A second transfer finds no reservation.
    let again = client
        .post(&api_path(&format!("/upload/single/{}", fid)))
        .add_header("Authorization", bearer("alice"))
        .multipart(file_form(vec![2u8; 100]))
        .await;
    assert_eq!(again.status_code(), 404);
    let error: Value = again.json();
    assert_eq!(error["code"], "NO_STAGING_RECORD");

    let ctx = RequestContext::background();
    let record = app.state.uploads.query_file(&ctx, &fid).await.unwrap();
    assert_eq!(record.fid, fid);
}

#[tokio::test]
async fn test_single_upload_without_apply_writes_nothing() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/upload/single/v1-never-applied"))
        .add_header("Authorization", bearer("alice"))
        .multipart(file_form(vec![0u8; 10]))
        .await;

    assert_eq!(response.status_code(), 404);
    assert!(!app
        .state
        .storage
        .exists("default/default/v1-never-applied")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_single_upload_without_file_field_is_400() {
    let app = setup_test_app().await;
    let applied = apply(app.client(), jpeg_apply()).await;
    let fid = applied["fid"].as_str().unwrap().to_string();

    let form = MultipartForm::new().add_text("note", "no file here");
    let response = app
        .client()
        .post(&api_path(&format!("/upload/single/{}", fid)))
        .add_header("Authorization", bearer("alice"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_download_redirects_to_signed_url() {
    let app = setup_test_app().await;
    let client = app.client();

    let applied = apply(client, jpeg_apply()).await;
    let fid = applied["fid"].as_str().unwrap().to_string();
    client
        .post(&api_path(&format!("/upload/single/{}", fid)))
        .add_header("Authorization", bearer("alice"))
        .multipart(file_form(vec![9u8; 100]))
        .await;

    let response = client
        .get(&api_path(&format!("/files/{}", fid)))
        .add_header("Authorization", bearer("alice"))
        .await;

    assert_eq!(response.status_code(), 307);
    let location = response.header("location");
    let location = location.to_str().unwrap();
    assert!(location.starts_with(&format!("http://localhost:3000/objects/default/default/{}?", fid)));
}

#[tokio::test]
async fn test_tampered_signature_is_rejected() {
    let app = setup_test_app().await;
    let client = app.client();

    let applied = apply(client, jpeg_apply()).await;
    let fid = applied["fid"].as_str().unwrap().to_string();
    client
        .post(&api_path(&format!("/upload/single/{}", fid)))
        .add_header("Authorization", bearer("alice"))
        .multipart(file_form(vec![9u8; 100]))
        .await;

    let path = format!(
        "/objects/default/default/{}?expires={}&signature=AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
        fid,
        chrono::Utc::now().timestamp() + 600
    );
    let response = client.get(&path).await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_expired_signed_url_is_rejected() {
    let app = setup_test_app().await;
    let client = app.client();

    let applied = apply(client, jpeg_apply()).await;
    let fid = applied["fid"].as_str().unwrap().to_string();
    client
        .post(&api_path(&format!("/upload/single/{}", fid)))
        .add_header("Authorization", bearer("alice"))
        .multipart(file_form(vec![9u8; 100]))
        .await;

    let key = format!("default/default/{}", fid);
    let expires = (chrono::Utc::now().timestamp() - 10) as u64;
    let signer = app.state.url_signer.as_ref().unwrap();
    let signature = signer.signature(&key, expires).unwrap();

    let response = client
        .get(&format!("/objects/{}?expires={}&signature={}", key, expires, signature))
        .await;

    assert_eq!(response.status_code(), 401);
}
