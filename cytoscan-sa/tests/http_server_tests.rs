//! HTTP server & routing integration tests
//!
//! Drives the full router with in-memory state: in-memory SQLite pool,
//! temp-dir media store, and hand-built multipart bodies.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use cytoscan_common::events::EventBus;
use cytoscan_sa::storage::MediaStore;
use cytoscan_sa::{build_router, AppState};

/// Create test app state with in-memory database and temp media root
///
/// The TempDir must stay alive for the duration of the test.
async fn test_app_state() -> (AppState, tempfile::TempDir) {
    let db_pool = sqlx::SqlitePool::connect(":memory:").await.unwrap();
    cytoscan_sa::db::init_tables(&db_pool).await.unwrap();

    let media_dir = tempfile::tempdir().unwrap();
    let media = MediaStore::new(media_dir.path().join("media"));
    media.ensure_buckets().unwrap();

    let event_bus = EventBus::new(100);
    (AppState::new(db_pool, event_bus, media), media_dir)
}

const BOUNDARY: &str = "cytoscan-test-boundary";

/// Build a single-field multipart/form-data body
fn multipart_body(
    field: &str,
    filename: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    if let Some(content_type) = content_type {
        body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
    }
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Deterministic spread-byte payload that passes the content gate
fn noisy_payload(len: usize) -> Vec<u8> {
    (0..len as u32).map(|i| ((i * 37) % 256) as u8).collect()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let (state, _media_dir) = test_app_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "cytoscan-sa");
}

#[tokio::test]
async fn noisy_video_upload_persists_completed_result() {
    let (state, _media_dir) = test_app_state().await;
    let app = build_router(state);

    let body = multipart_body("video", "sample.mp4", Some("video/mp4"), &noisy_payload(65_536));
    let response = app
        .clone()
        .oneshot(multipart_request("/analyze", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["file_type"], "video");
    assert_eq!(body["data"]["analysis_status"], "completed");

    let count = body["data"]["sperm_count"].as_i64().unwrap();
    assert!((1..=500).contains(&count));

    // The record is queryable afterwards
    let response = app
        .oneshot(Request::builder().uri("/results").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["filename"], "sample.mp4");
}

#[tokio::test]
async fn constant_image_upload_yields_no_content_result() {
    let (state, _media_dir) = test_app_state().await;
    let app = build_router(state);

    let body = multipart_body("image", "blank.png", Some("image/png"), &[0u8; 65_536]);
    let response = app
        .oneshot(multipart_request("/analyze", body))
        .await
        .unwrap();

    // Boring content is a successful analysis, not a failure
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["analysis_status"], "no-content-detected");
    assert_eq!(body["data"]["sperm_count"], 0);
    assert_eq!(body["data"]["movement_pattern"]["static"], 100.0);
}

#[tokio::test]
async fn upload_without_media_field_is_rejected() {
    let (state, _media_dir) = test_app_state().await;
    let app = build_router(state);

    let body = multipart_body("document", "notes.txt", Some("text/plain"), b"hello");
    let response = app
        .oneshot(multipart_request("/analyze", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn audio_content_type_is_rejected_before_analysis() {
    let (state, _media_dir) = test_app_state().await;
    let app = build_router(state.clone());

    let body = multipart_body("video", "song.mp3", Some("audio/mpeg"), &noisy_payload(4096));
    let response = app
        .oneshot(multipart_request("/analyze", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "UNSUPPORTED_MEDIA");

    // No heuristic work ran: nothing was persisted
    let records = cytoscan_sa::db::results::query_recent(&state.db, 10)
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn results_export_as_csv_attachment() {
    let (state, _media_dir) = test_app_state().await;
    let app = build_router(state);

    let body = multipart_body("video", "sample.mp4", Some("video/mp4"), &noisy_payload(32_768));
    app.clone()
        .oneshot(multipart_request("/analyze", body))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/results?format=csv")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().contains("text/csv"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.starts_with("id,filename,media_type"));
    assert!(csv.contains("sample.mp4"));
}

#[tokio::test]
async fn stored_media_is_served_back_under_media() {
    let (state, _media_dir) = test_app_state().await;
    let app = build_router(state);

    let payload = noisy_payload(16_384);
    let body = multipart_body("video", "clip.mp4", Some("video/mp4"), &payload);
    let response = app
        .clone()
        .oneshot(multipart_request("/analyze", body))
        .await
        .unwrap();
    let body = json_body(response).await;
    let media_url = body["data"]["media_url"].as_str().unwrap().to_string();
    assert!(media_url.starts_with("/media/videos/"));

    let response = app
        .oneshot(Request::builder().uri(&media_url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), payload.as_slice());
}

#[tokio::test]
async fn deleting_a_result_removes_it() {
    let (state, _media_dir) = test_app_state().await;
    let app = build_router(state);

    let body = multipart_body("image", "scan.png", Some("image/png"), &noisy_payload(8192));
    let response = app
        .clone()
        .oneshot(multipart_request("/analyze", body))
        .await
        .unwrap();
    let body = json_body(response).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/results/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A second delete is a 404, not a silent success
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/results/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_an_unknown_result_is_not_found() {
    let (state, _media_dir) = test_app_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/results/00000000-0000-0000-0000-000000000000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn parameters_round_trip_through_the_api() {
    let (state, _media_dir) = test_app_state().await;
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/parameters").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["variance_threshold"], 150.0);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/parameters")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"variance_threshold": 200.0}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/parameters").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["variance_threshold"], 200.0);
}

#[tokio::test]
async fn invalid_parameter_update_is_rejected() {
    let (state, _media_dir) = test_app_state().await;
    let app = build_router(state);

    // floor above the ceiling must not persist
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/parameters")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"quality_floor": 99.0}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(Request::builder().uri("/parameters").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["quality_floor"], 60.0);
}
