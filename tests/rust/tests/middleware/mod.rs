//! End-to-end tests for the axum capture middleware.
//!
//! Each test builds a throwaway router over its own log directory, drives
//! it with `tower::ServiceExt::oneshot`, collects the response body (which
//! completes the capture decorator and emits the exit line), then asserts
//! on the files the logger produced.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use tempfile::tempdir;
use tower::ServiceExt;

use splitlog::{new_logger_handle, Level, LoggerOptions};
use splitlog_axum::{capture, CaptureOptions, CaptureState};
use tests::read_log;

fn state_for(dir: &Path, options: CaptureOptions) -> CaptureState {
    let logger = new_logger_handle(LoggerOptions {
        output_dir: dir.to_path_buf(),
        min_level: Level::Debug,
        high_performance: true,
        file_prefix: "http".to_string(),
        ..LoggerOptions::default()
    })
    .unwrap();
    CaptureState::new(Arc::new(logger), options)
}

fn router_with(routes: Router, state: CaptureState) -> Router {
    routes.layer(middleware::from_fn_with_state(state, capture))
}

async fn drive(router: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&body).into_owned())
}

fn combined(dir: &Path) -> String {
    read_log(dir, "latest-combined-http-log")
}

fn errors(dir: &Path) -> String {
    read_log(dir, "latest-error-http-log")
}

#[tokio::test]
async fn post_body_is_previewed_and_restored_for_the_handler() {
    let dir = tempdir().unwrap();
    let router = router_with(
        Router::new().route("/echo", post(|body: String| async move { body })),
        state_for(dir.path(), CaptureOptions::default()),
    );

    let payload = "{\n  \"a\": 1,\n  \"b\": 2\n}";
    let request = Request::builder()
        .method(Method::POST)
        .uri("/echo")
        .body(Body::from(payload))
        .unwrap();
    let (status, echoed) = drive(router, request).await;

    // the handler saw the body untouched by the capture
    assert_eq!(status, StatusCode::OK);
    assert_eq!(echoed, payload);

    let log = combined(dir.path());
    assert!(log.contains("REQ -> "), "{log}");
    assert!(log.contains("POST /echo"), "{log}");
    // entry preview is the collapsed form
    assert!(log.contains("{\"a\": 1,\"b\": 2}"), "{log}");
}

#[tokio::test]
async fn query_parameters_are_serialized_or_marked_empty() {
    let dir = tempdir().unwrap();
    let router = router_with(
        Router::new().route("/things", get(|| async { "ok" })),
        state_for(dir.path(), CaptureOptions::default()),
    );

    let request = Request::builder()
        .uri("/things?k=1&z=3&k=2")
        .body(Body::empty())
        .unwrap();
    drive(router.clone(), request).await;

    let request = Request::builder()
        .uri("/things")
        .body(Body::empty())
        .unwrap();
    drive(router, request).await;

    let log = combined(dir.path());
    assert!(log.contains("| k=1,2&z=3 |"), "{log}");
    assert!(log.contains("| [EMPTY QUERY] |"), "{log}");
}

#[tokio::test]
async fn status_above_400_logs_the_exit_line_at_error() {
    let dir = tempdir().unwrap();
    let router = router_with(
        Router::new()
            .route("/ok", get(|| async { "fine" }))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route(
                "/locked",
                get(|| async { (StatusCode::UNAUTHORIZED, "denied") }),
            )
            .route("/bad", get(|| async { StatusCode::BAD_REQUEST })),
        state_for(dir.path(), CaptureOptions::default()),
    );

    for path in ["/ok", "/missing", "/locked", "/bad"] {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        drive(router.clone(), request).await;
    }

    let all = combined(dir.path());
    assert!(all.contains("| 200 |"), "{all}");
    assert!(all.contains("| 404 |"), "{all}");
    assert!(all.contains("| 401 |"), "{all}");
    assert!(all.contains("| 400 |"), "{all}");

    // the boundary is strictly greater than 400: 401 and 404 log at
    // error, 400 itself and 200 stay at info
    let errors = errors(dir.path());
    assert!(errors.contains("| 401 |"), "{errors}");
    assert!(errors.contains("| 404 |"), "{errors}");
    assert!(!errors.contains("| 400 |"), "{errors}");
    assert!(!errors.contains("| 200 |"), "{errors}");
}

#[tokio::test]
async fn ignored_extensions_suppress_the_response_preview() {
    let dir = tempdir().unwrap();
    let router = router_with(
        Router::new()
            .route("/logo.png", get(|| async { "PNGBYTES" }))
            .route("/report.qdata", get(|| async { "QDATABYTES" }))
            .route("/api/data", get(|| async { "VISIBLE" })),
        state_for(
            dir.path(),
            CaptureOptions {
                ignore_extensions: vec![".qdata".to_string()],
                ..CaptureOptions::default()
            },
        ),
    );

    for path in ["/logo.png", "/report.qdata", "/api/data"] {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        drive(router.clone(), request).await;
    }

    let log = combined(dir.path());
    assert!(!log.contains("PNGBYTES"), "{log}");
    assert!(!log.contains("QDATABYTES"), "{log}");
    assert!(log.contains("VISIBLE"), "{log}");
    // the exit lines themselves are still written
    assert!(log.contains("GET /logo.png"), "{log}");
}

#[tokio::test]
async fn response_preview_is_byte_bounded_with_ellipsis() {
    let dir = tempdir().unwrap();
    let router = router_with(
        Router::new()
            .route("/long", get(|| async { "abcdefghij" }))
            .route("/exact", get(|| async { "vwxyz" })),
        state_for(
            dir.path(),
            CaptureOptions {
                body_max_size: 5,
                ..CaptureOptions::default()
            },
        ),
    );

    let request = Request::builder().uri("/long").body(Body::empty()).unwrap();
    drive(router.clone(), request).await;
    let request = Request::builder().uri("/exact").body(Body::empty()).unwrap();
    drive(router, request).await;

    let log = combined(dir.path());
    assert!(log.contains("abcde..."), "{log}");
    assert!(!log.contains("abcdef"), "{log}");
    // exactly at the limit: shown whole, no ellipsis
    assert!(log.contains("vwxyz"), "{log}");
    assert!(!log.contains("vwxyz..."), "{log}");
}

#[tokio::test]
async fn request_preview_is_character_bounded() {
    let dir = tempdir().unwrap();
    let router = router_with(
        Router::new().route("/echo", post(|body: String| async move { body })),
        state_for(
            dir.path(),
            CaptureOptions {
                body_max_size: 3,
                ..CaptureOptions::default()
            },
        ),
    );

    let request = Request::builder()
        .method(Method::POST)
        .uri("/echo")
        .body(Body::from("ααααα"))
        .unwrap();
    drive(router, request).await;

    let log = combined(dir.path());
    assert!(log.contains("ααα..."), "{log}");
    assert!(!log.contains("αααα"), "{log}");
}

#[tokio::test]
async fn custom_hooks_extend_entry_and_exit_lines() {
    let dir = tempdir().unwrap();
    let options = CaptureOptions {
        custom_request: Some(Arc::new(|parts: &axum::http::request::Parts| {
            let value = parts
                .headers
                .get("x-tenant")
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default();
            format!("TENANT={value}")
        })),
        custom_response: Some(Arc::new(|parts: &axum::http::response::Parts| {
            format!("STATUS={}", parts.status.as_u16())
        })),
        ..CaptureOptions::default()
    };
    let router = router_with(
        Router::new().route("/hooked", get(|| async { "ok" })),
        state_for(dir.path(), options),
    );

    let request = Request::builder()
        .uri("/hooked")
        .header("x-tenant", "123")
        .body(Body::empty())
        .unwrap();
    drive(router, request).await;

    let log = combined(dir.path());
    assert!(log.contains("TENANT=123 |"), "{log}");
    assert!(log.contains("STATUS=200 |"), "{log}");
}

#[tokio::test]
async fn client_address_comes_from_the_forwarded_header() {
    let dir = tempdir().unwrap();
    let router = router_with(
        Router::new().route("/whoami", get(|| async { "ok" })),
        state_for(dir.path(), CaptureOptions::default()),
    );

    let request = Request::builder()
        .uri("/whoami")
        .header("x-forwarded-for", "9.8.7.6")
        .body(Body::empty())
        .unwrap();
    drive(router, request).await;

    let log = combined(dir.path());
    assert!(log.contains("9.8.7.6"), "{log}");
}
