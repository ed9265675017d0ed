use super::*;
use crate::container::ContainerBuilder;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::time::Duration;
use tempfile::{TempDir, tempdir};
use tower::ServiceExt; // for oneshot

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn test_config(save_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.ingest.save_dir = save_dir.to_path_buf();
    config.server.request_log = false;
    config
}

fn test_router() -> (Router, TempDir) {
    let temp_dir = tempdir().unwrap();
    let config = Arc::new(test_config(temp_dir.path()));
    (create_router(AppState::new(config)), temp_dir)
}

fn sess1_body() -> Vec<u8> {
    gzip(
        &ContainerBuilder::new("Sess1")
            .file(0, "log.txt", b"hello")
            .file(1, "crash.dmp", &[0x01, 0x02, 0x03])
            .build(),
    )
}

fn upload(count: Option<&str>, session: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/crashreport")
        .header("User-Agent", "CrashReportClient/4.27");
    if let Some(count) = count {
        builder = builder.header("NumberOfFiles", count);
    }
    if let Some(session) = session {
        builder = builder.header("SteamName", session);
    }
    builder.body(Body::from(body)).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

// ---------------------------------------------------------------------------
// Upload endpoint
// ---------------------------------------------------------------------------

#[tokio::test]
async fn valid_upload_returns_bare_200_and_writes_files() {
    let (app, temp_dir) = test_router();

    let response = app
        .oneshot(upload(Some("2"), None, sess1_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONNECTION], "close");
    assert!(body_bytes(response).await.is_empty());

    let dir = temp_dir.path().join("Sess1");
    assert_eq!(std::fs::read(dir.join("log.txt")).unwrap(), b"hello");
    assert_eq!(std::fs::read(dir.join("crash.dmp")).unwrap(), vec![1, 2, 3]);
}

#[tokio::test]
async fn session_header_prefixes_directory() {
    let (app, temp_dir) = test_router();

    let response = app
        .oneshot(upload(Some("2"), Some("player"), sess1_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(temp_dir.path().join("player__Sess1/log.txt").is_file());
}

#[tokio::test]
async fn foreign_client_is_rejected_without_touching_disk() {
    let (app, temp_dir) = test_router();

    let request = Request::builder()
        .method("POST")
        .uri("/crashreport")
        .header("User-Agent", "Mozilla/5.0")
        .header("NumberOfFiles", "2")
        .body(Body::from(sess1_body()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.headers()[header::CONNECTION], "close");
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn missing_file_count_is_rejected_before_body_is_parsed() {
    let (app, temp_dir) = test_router();

    // Garbage body: would fail decompression if it were ever looked at.
    let response = app
        .oneshot(upload(None, None, b"not gzip".to_vec()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn zero_file_count_is_rejected() {
    let (app, temp_dir) = test_router();

    let response = app
        .oneshot(upload(Some("0"), None, sess1_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn non_numeric_file_count_is_rejected() {
    let (app, _temp_dir) = test_router();

    let response = app
        .oneshot(upload(Some("two"), None, sess1_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn truncated_report_fails_but_keeps_written_files() {
    let (app, temp_dir) = test_router();

    let response = app
        .oneshot(upload(Some("3"), None, sess1_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_bytes(response).await.is_empty());
    assert!(temp_dir.path().join("Sess1/log.txt").is_file());
    assert!(temp_dir.path().join("Sess1/crash.dmp").is_file());
}

#[tokio::test]
async fn corrupt_body_is_rejected() {
    let (app, _temp_dir) = test_router();

    let response = app
        .oneshot(upload(Some("1"), None, b"\x1f\x8b garbage".to_vec()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_on_upload_endpoint_is_not_allowed() {
    let (app, _temp_dir) = test_router();

    let request = Request::builder()
        .uri("/crashreport")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn body_over_limit_is_rejected() {
    let temp_dir = tempdir().unwrap();
    let mut config = test_config(temp_dir.path());
    config.server.max_body_bytes = 16;
    let app = create_router(AppState::new(Arc::new(config)));

    let response = app
        .oneshot(upload(Some("2"), None, sess1_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.headers()[header::CONNECTION], "close");
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn announced_length_over_limit_is_rejected_with_empty_body() {
    let temp_dir = tempdir().unwrap();
    let mut config = test_config(temp_dir.path());
    config.server.max_body_bytes = 16;
    let app = create_router(AppState::new(Arc::new(config)));

    let body = sess1_body();
    let mut request = upload(Some("2"), None, body.clone());
    request
        .headers_mut()
        .insert(header::CONTENT_LENGTH, body.len().into());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.headers()[header::CONNECTION], "close");
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn foreign_client_with_oversized_body_is_forbidden_not_too_large() {
    let temp_dir = tempdir().unwrap();
    let mut config = test_config(temp_dir.path());
    config.server.max_body_bytes = 16;
    let app = create_router(AppState::new(Arc::new(config)));

    let request = Request::builder()
        .method("POST")
        .uri("/crashreport")
        .header("User-Agent", "Mozilla/5.0")
        .header("NumberOfFiles", "2")
        .body(Body::from(sess1_body()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.headers()[header::CONNECTION], "close");
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn non_utf8_session_is_rejected_without_touching_disk() {
    let (app, temp_dir) = test_router();

    let mut request = upload(Some("2"), None, sess1_body());
    request.headers_mut().insert(
        "SteamName",
        axum::http::HeaderValue::from_bytes(b"J\xf6rg").unwrap(),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn custom_endpoint_is_routed() {
    let temp_dir = tempdir().unwrap();
    let mut config = test_config(temp_dir.path());
    config.server.endpoint = "/api/reports".into();
    let app = create_router(AppState::new(Arc::new(config)));

    let mut request = upload(Some("2"), None, sess1_body());
    *request.uri_mut() = "/api/reports".parse().unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Health and report browsing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _temp_dir) = test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body_str = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body_str.contains("ok"));
    assert!(body_str.contains(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn stored_reports_are_hidden_by_default() {
    let (app, temp_dir) = test_router();
    std::fs::create_dir(temp_dir.path().join("Sess1")).unwrap();
    std::fs::write(temp_dir.path().join("Sess1/log.txt"), b"hello").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/Sess1/log.txt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stored_reports_are_served_when_enabled() {
    let temp_dir = tempdir().unwrap();
    std::fs::create_dir(temp_dir.path().join("Sess1")).unwrap();
    std::fs::write(temp_dir.path().join("Sess1/log.txt"), b"hello").unwrap();
    let mut config = test_config(temp_dir.path());
    config.server.serve_reports = true;
    let app = create_router(AppState::new(Arc::new(config)));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/Sess1/log.txt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"hello");
}

// ---------------------------------------------------------------------------
// Server lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn serve_creates_save_dir_and_stops_on_shutdown() {
    let temp_dir = tempdir().unwrap();
    let save_dir = temp_dir.path().join("nested/reports");
    let config = Arc::new(test_config(&save_dir));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(serve(listener, config, async move {
        let _ = rx.await;
    }));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(save_dir.is_dir());

    tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not shut down")
        .unwrap()
        .unwrap();
}
