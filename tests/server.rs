//! HTTP API tests, driving the router in-process with `oneshot`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use item_extractor::config::UploadConfig;
use item_extractor::models::{Collection, Item};
use item_extractor::server::{create_router, AppState};
use item_extractor::store::{InMemoryStorage, ItemStore};
use serde_json::Value;
use tower::ServiceExt; // for oneshot

const BOUNDARY: &str = "itx-test-boundary";

fn app_with(store: ItemStore) -> Router {
    create_router(AppState::new(store, UploadConfig::default()))
}

async fn seeded_store() -> ItemStore {
    let store = ItemStore::new(Arc::new(InMemoryStorage::new()));
    store
        .replace(
            Some("posts.pdf".to_string()),
            vec![
                Item::new(1, "first"),
                Item::new(2, "second"),
                Item::new(3, "third"),
            ],
        )
        .await
        .unwrap();
    store
}

fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/extract")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, file_name, content_type, data)))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn put_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_version() {
    let (status, json) = send(app_with(ItemStore::in_memory()), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn read_of_empty_store_returns_empty_collection() {
    let (status, json) = send(app_with(ItemStore::in_memory()), get("/api/items")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalItems"], 0);
    assert_eq!(json["items"], serde_json::json!([]));
}

#[tokio::test]
async fn upload_extracts_and_replaces_collection() {
    let store = seeded_store().await;
    let request = upload_request(
        "file",
        "tweets.txt",
        "text/plain",
        b"Header line\n1. Hello world\n2. Second item\nstill second\n3. Third",
    );
    let (status, json) = send(app_with(store.clone()), request).await;
    assert_eq!(status, StatusCode::OK, "body: {}", json);
    assert_eq!(json["success"], true);
    assert_eq!(json["sourceName"], "tweets.txt");
    assert_eq!(json["totalItems"], 3);
    assert_eq!(json["items"][1]["text"], "Second item still second");

    let stored = store.read().await.unwrap();
    assert_eq!(stored.source_name.as_deref(), Some("tweets.txt"));
    assert_eq!(stored.items[0], Item::new(1, "Hello world"));
}

#[tokio::test]
async fn upload_type_is_inferred_from_extension() {
    let request = upload_request("file", "notes.md", "application/octet-stream", b"4) four");
    let (status, json) = send(app_with(ItemStore::in_memory()), request).await;
    assert_eq!(status, StatusCode::OK, "body: {}", json);
    assert_eq!(json["items"][0]["id"], 4);
}

#[tokio::test]
async fn upload_without_numbered_items_is_rejected() {
    let store = seeded_store().await;
    let request = upload_request("file", "plain.txt", "text/plain", b"No numbers here at all.");
    let (status, json) = send(app_with(store.clone()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "no_items_found");
    assert_eq!(store.read().await.unwrap().total_items, 3);
}

#[tokio::test]
async fn upload_without_file_field_is_bad_request() {
    let request = upload_request("attachment", "a.txt", "text/plain", b"1. x");
    let (status, json) = send(app_with(ItemStore::in_memory()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "bad_request");
}

#[tokio::test]
async fn upload_of_unsupported_type_is_415() {
    let request = upload_request("file", "photo.png", "image/png", b"\x89PNG");
    let (status, json) = send(app_with(ItemStore::in_memory()), request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(json["error"]["code"], "unsupported_media_type");
}

#[tokio::test]
async fn upload_of_type_not_in_accept_list_is_415() {
    let upload = UploadConfig {
        accepted_types: vec!["application/pdf".to_string()],
        ..UploadConfig::default()
    };
    let app = create_router(AppState::new(ItemStore::in_memory(), upload));
    let request = upload_request("file", "a.txt", "text/plain", b"1. allowed text");
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn malformed_pdf_is_unprocessable() {
    let request = upload_request("file", "broken.pdf", "application/pdf", b"not a pdf");
    let (status, json) = send(app_with(ItemStore::in_memory()), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"]["code"], "extraction_failed");
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let upload = UploadConfig {
        max_bytes: 64,
        ..UploadConfig::default()
    };
    let app = create_router(AppState::new(ItemStore::in_memory(), upload));
    let data = "1. long item text ".repeat(50);
    let (status, _) = send(app, upload_request("file", "big.txt", "text/plain", data.as_bytes())).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn update_changes_text() {
    let store = seeded_store().await;
    let (status, json) = send(
        app_with(store.clone()),
        put_json("/api/items/2", r#"{"text": "edited"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "id": 2, "text": "edited" }));
    assert_eq!(store.read().await.unwrap().items[1].text, "edited");
}

#[tokio::test]
async fn update_with_empty_text_succeeds() {
    let store = seeded_store().await;
    let (status, json) = send(app_with(store.clone()), put_json("/api/items/1", r#"{"text": ""}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["text"], "");
    assert_eq!(store.read().await.unwrap().items[0].text, "");
}

#[tokio::test]
async fn update_without_text_is_bad_request() {
    let store = seeded_store().await;
    let (status, json) = send(app_with(store.clone()), put_json("/api/items/1", "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "bad_request");
    assert_eq!(store.read().await.unwrap().items[0].text, "first");
}

#[tokio::test]
async fn update_of_missing_item_is_404() {
    let store = seeded_store().await;
    let before = store.read().await.unwrap();
    let (status, json) = send(app_with(store.clone()), put_json("/api/items/99", r#"{"text": "x"}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
    assert_eq!(store.read().await.unwrap(), before);
}

#[tokio::test]
async fn update_with_non_numeric_id_is_bad_request() {
    let (status, _) = send(
        app_with(seeded_store().await),
        put_json("/api/items/abc", r#"{"text": "x"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_one_removes_item() {
    let store = seeded_store().await;
    let (status, json) = send(app_with(store.clone()), delete("/api/items/2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalItems"], 2);

    let (_, json) = send(app_with(store), get("/api/items")).await;
    let collection: Collection = serde_json::from_value(json).unwrap();
    let ids: Vec<u64> = collection.items.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn delete_of_missing_item_is_404() {
    let (status, json) = send(app_with(seeded_store().await), delete("/api/items/8")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["message"], "item not found: 8");
}

#[tokio::test]
async fn delete_all_empties_items_and_keeps_source() {
    let store = seeded_store().await;
    let (status, json) = send(app_with(store.clone()), delete("/api/items")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalItems"], 0);
    assert_eq!(json["items"], serde_json::json!([]));
    assert_eq!(json["sourceName"], "posts.pdf");
}

#[tokio::test]
async fn export_as_text() {
    let app = app_with(seeded_store().await);
    let response = app.oneshot(get("/api/items/export?format=txt")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"posts.txt\""
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"1. first\n\n2. second\n\n3. third");
}

#[tokio::test]
async fn export_with_unknown_format_is_bad_request() {
    let (status, _) = send(app_with(seeded_store().await), get("/api/items/export?format=csv")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
