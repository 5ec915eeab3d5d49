use std::sync::Arc;
use std::time::Duration;

use actix_web::{http::StatusCode, test, web, App};
use serde_json::Value;

use csv_depot::api::{download, healthcheck, home, list_files, upload};
use csv_depot::app_state::AppState;
use csv_depot::auth::AccessGuard;
use csv_depot::mirror::mock_mirror::MockMirror;
use csv_depot::retention::RetentionSweeper;
use csv_depot::store::mock_store::MockFileStore;

const BOUNDARY: &str = "----depot-test-boundary";

/// Build a multipart body with one file field, the way a browser would
fn multipart_body(file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .service(home)
                .service(healthcheck)
                .service(upload)
                .service(download)
                .service(list_files),
        )
        .await
    };
}

fn upload_request(file_name: &str, content: &[u8]) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/upload")
        .insert_header(("content-type", multipart_content_type()))
        .set_payload(multipart_body(file_name, content))
}

#[actix_web::test]
async fn test_home_and_healthcheck() {
    let app = init_app!(AppState::for_testing());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "CSV Upload API Running");

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/healthcheck").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_upload_list_download_roundtrip() {
    let mut state = AppState::for_testing();
    state.config.store.timestamp_names = false;
    let app = init_app!(state);

    let content = b"name,count\nalpha,1\nbeta,2\n";
    let resp = test::call_service(&app, upload_request("data.csv", content).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["filename"], "data.csv");
    assert_eq!(body["status"], "saved");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/files").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["files"], serde_json::json!(["data.csv"]));

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/download/data.csv").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/csv"
    );
    let bytes = test::read_body(resp).await;
    assert_eq!(&bytes[..], content);
}

#[actix_web::test]
async fn test_upload_with_timestamp_prefix() {
    let state = AppState::for_testing(); // timestamp_names defaults on
    let app = init_app!(state);

    let resp = test::call_service(&app, upload_request("data.csv", b"a,b\n").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let stored_name = body["filename"].as_str().unwrap();
    assert!(stored_name.ends_with("_data.csv"), "got {}", stored_name);
    assert_ne!(stored_name, "data.csv");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/files").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["files"][0], stored_name);
}

#[actix_web::test]
async fn test_upload_roundtrips_arbitrary_bytes() {
    let mut state = AppState::for_testing();
    state.config.store.timestamp_names = false;
    let app = init_app!(state);

    // Binary content independent of the extension check
    let content: Vec<u8> = (0u16..256).map(|b| b as u8).filter(|&b| b != b'-').collect();
    let resp = test::call_service(&app, upload_request("blob.csv", &content).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/download/blob.csv").to_request(),
    )
    .await;
    let bytes = test::read_body(resp).await;
    assert_eq!(&bytes[..], &content[..]);
}

#[actix_web::test]
async fn test_upload_rejects_non_csv() {
    let app = init_app!(AppState::for_testing());

    let resp = test::call_service(&app, upload_request("report.pdf", b"%PDF").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Only CSV files allowed");
}

#[actix_web::test]
async fn test_upload_rejects_empty_file() {
    let app = init_app!(AppState::for_testing());

    let resp = test::call_service(&app, upload_request("empty.csv", b"").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_download_missing_file_is_404() {
    let app = init_app!(AppState::for_testing());

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/download/missing.csv").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "File not found");
}

#[actix_web::test]
async fn test_sweep_runs_before_serving() {
    let store = Arc::new(MockFileStore::new());
    store.insert_aged("old.csv", b"stale", Duration::from_secs(120));
    let mut state = AppState::with_mock_store(store.clone());
    state.sweeper = Some(RetentionSweeper::new(60));
    let app = init_app!(state);

    // The over-age file is deleted before it could be served
    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/download/old.csv").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(!store.contains("old.csv"));
}

#[actix_web::test]
async fn test_list_after_sweep_is_empty() {
    let store = Arc::new(MockFileStore::new());
    store.insert_aged("a.csv", b"1", Duration::from_secs(10));
    store.insert_aged("b.csv", b"2", Duration::from_secs(10));
    let mut state = AppState::with_mock_store(store);
    state.sweeper = Some(RetentionSweeper::new(0));
    let app = init_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/files").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["files"], serde_json::json!([]));
}

#[actix_web::test]
async fn test_fresh_files_survive_sweep() {
    let store = Arc::new(MockFileStore::new());
    store.insert_aged("fresh.csv", b"1", Duration::from_secs(5));
    let mut state = AppState::with_mock_store(store);
    state.sweeper = Some(RetentionSweeper::new(3600));
    let app = init_app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/files").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["files"], serde_json::json!(["fresh.csv"]));
}

#[actix_web::test]
async fn test_unauthorized_request_short_circuits_before_sweep() {
    let store = Arc::new(MockFileStore::new());
    store.insert_aged("old.csv", b"stale", Duration::from_secs(120));
    let mut state = AppState::with_mock_store(store.clone());
    state.guard = Some(AccessGuard::new(Some("sekret".to_string())));
    state.sweeper = Some(RetentionSweeper::new(0));
    let app = init_app!(state);

    // No credential
    let resp = test::call_service(&app, test::TestRequest::get().uri("/files").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Wrong credential
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/files")
            .insert_header(("Authorization", "Bearer wrong"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // The guard fired before the sweep: the over-age file is untouched
    assert!(store.contains("old.csv"));

    // The right credential sweeps and serves
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/files")
            .insert_header(("Authorization", "Bearer sekret"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!store.contains("old.csv"));
}

#[actix_web::test]
async fn test_guard_without_secret_is_server_error() {
    let mut state = AppState::for_testing();
    state.guard = Some(AccessGuard::new(None));
    let app = init_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/files")
            .insert_header(("Authorization", "Bearer anything"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn test_mirrored_upload_reports_mirrored_status() {
    let store = Arc::new(MockFileStore::new());
    let mirror = Arc::new(MockMirror::new());
    let mut state = AppState::with_mock_store(store).with_mirror(mirror.clone());
    state.config.store.timestamp_names = false;
    let app = init_app!(state);

    let resp = test::call_service(&app, upload_request("data.csv", b"a,b\n1,2\n").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "mirrored");
    assert_eq!(mirror.mirrored_paths(), vec!["/data.csv"]);
    assert_eq!(mirror.bytes_for("/data.csv").unwrap(), b"a,b\n1,2\n");
}

#[actix_web::test]
async fn test_mirror_failure_keeps_local_file() {
    let store = Arc::new(MockFileStore::new());
    let mut state = AppState::with_mock_store(store.clone()).with_mirror(Arc::new(MockMirror::failing()));
    state.config.store.timestamp_names = false;
    let app = init_app!(state);

    let resp = test::call_service(&app, upload_request("data.csv", b"a,b\n").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = test::read_body_json(resp).await;
    assert!(
        body["detail"].as_str().unwrap().contains("insufficient_space"),
        "remote body should be surfaced, got {}",
        body["detail"]
    );

    // No rollback: the local write survives the failed mirror
    assert!(store.contains("data.csv"));
    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/download/data.csv").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}
