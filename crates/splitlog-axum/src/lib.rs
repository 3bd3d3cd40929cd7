//! Request/response capture middleware for axum.
//!
//! Wraps the handler chain: logs one entry line per request (client,
//! method, path, query, optional custom extension, bounded body preview)
//! and one exit line per response (client, status, latency, bounded body
//! preview), routed through a [`splitlog::Logger`]. Responses with a
//! status code above 400 log at error severity, everything else at info.
//!
//! ```ignore
//! use axum::{middleware, routing::post, Router};
//! use splitlog_axum::{capture, CaptureOptions, CaptureState};
//!
//! let state = CaptureState::new(logger, CaptureOptions::default());
//! let app: Router = Router::new()
//!     .route("/orders", post(create_order))
//!     .layer(middleware::from_fn_with_state(state, capture));
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::Method;
use http_body_util::BodyExt;
use url::form_urlencoded;

use splitlog::Logger;

mod capture;

use capture::{bounded_preview, CaptureBody, ExitLine};

/// Extensions whose responses never get a body preview, on top of whatever
/// the caller configures.
pub const DEFAULT_IGNORE_EXTENSIONS: &[&str] = &[
    ".js", ".css", ".html", ".png", ".jpg", ".jpeg", ".heic", ".gif", ".ico", ".mp3", ".mp4",
    ".mov", ".woff", ".ttf", ".webp", ".apng",
];

const DEFAULT_BODY_MAX_SIZE: usize = 500;
const EMPTY_QUERY: &str = "[EMPTY QUERY]";

/// Custom log output derived from the inbound request, e.g. a header.
pub type RequestHook = Arc<dyn Fn(&http::request::Parts) -> String + Send + Sync>;

/// Custom log output derived from the outbound response head.
pub type ResponseHook = Arc<dyn Fn(&http::response::Parts) -> String + Send + Sync>;

#[derive(Clone)]
pub struct CaptureOptions {
    /// Bound on captured bodies: characters for the request preview, bytes
    /// for the response preview.
    pub body_max_size: usize,
    /// Extra file extensions (with leading dot) excluded from response
    /// capture, merged with [`DEFAULT_IGNORE_EXTENSIONS`].
    pub ignore_extensions: Vec<String>,
    pub custom_request: Option<RequestHook>,
    pub custom_response: Option<ResponseHook>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            body_max_size: DEFAULT_BODY_MAX_SIZE,
            ignore_extensions: Vec::new(),
            custom_request: None,
            custom_response: None,
        }
    }
}

/// State handed to `middleware::from_fn_with_state`.
#[derive(Clone)]
pub struct CaptureState {
    logger: Arc<Logger>,
    options: Arc<CaptureOptions>,
}

impl CaptureState {
    pub fn new(logger: Arc<Logger>, options: CaptureOptions) -> Self {
        Self {
            logger,
            options: Arc::new(options),
        }
    }
}

/// The middleware itself.
pub async fn capture(
    State(state): State<CaptureState>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let (parts, body) = request.into_parts();
    let client = client_address(&parts);
    let method = parts.method.clone();
    let path = parts.uri.path().to_owned();
    let query = serialize_query(parts.uri.query());

    // Reading the request body consumes it; hand the handler a rebuilt one.
    let (body, body_preview) = if parts.method == Method::POST {
        match body.collect().await {
            Ok(collected) => {
                let bytes = collected.to_bytes();
                let preview = bounded_preview(&bytes, state.options.body_max_size);
                (Body::from(bytes), preview)
            }
            Err(err) => {
                state
                    .logger
                    .warn(&format!("read body in request {path} error: {err}"));
                (Body::empty(), String::new())
            }
        }
    } else {
        (body, String::new())
    };

    let request_ext = match &state.options.custom_request {
        Some(hook) => format!("{} |", hook(&parts)),
        None => String::new(),
    };

    state.logger.info(&format!(
        "REQ -> | {client:>15} | {method} {path} | {query} | {request_ext} {body_preview}"
    ));

    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let (resp_parts, resp_body) = response.into_parts();
    let response_ext = match &state.options.custom_response {
        Some(hook) => format!("{} |", hook(&resp_parts)),
        None => String::new(),
    };

    let preview_limit = if is_ignored_extension(&path, &state.options.ignore_extensions) {
        None
    } else {
        Some(state.options.body_max_size)
    };
    let exit = ExitLine {
        logger: state.logger.clone(),
        client,
        status: resp_parts.status,
        started,
        method,
        path,
        response_ext,
    };
    let body = Body::new(CaptureBody::new(resp_body, preview_limit, exit));
    Response::from_parts(resp_parts, body)
}

/// `key=v1,v2&key2=v3` with keys in first-seen order, or the empty-query
/// marker.
fn serialize_query(raw: Option<&str>) -> String {
    let mut keys: Vec<String> = Vec::new();
    let mut values: HashMap<String, Vec<String>> = HashMap::new();
    if let Some(raw) = raw {
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            let key = key.into_owned();
            if !values.contains_key(&key) {
                keys.push(key.clone());
            }
            values.entry(key).or_default().push(value.into_owned());
        }
    }
    if keys.is_empty() {
        return EMPTY_QUERY.to_owned();
    }
    keys.iter()
        .map(|key| format!("{key}={}", values[key].join(",")))
        .collect::<Vec<_>>()
        .join("&")
}

fn is_ignored_extension(path: &str, extra: &[String]) -> bool {
    let Some(ext) = Path::new(path).extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    let dotted = format!(".{ext}");
    DEFAULT_IGNORE_EXTENSIONS.contains(&dotted.as_str())
        || extra.iter().any(|candidate| *candidate == dotted)
}

/// Forwarded-for header first, then the connection's peer address.
fn client_address(parts: &http::request::Parts) -> String {
    if let Some(forwarded) = parts
        .headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_owned();
            }
        }
    }
    if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    "-".to_owned()
}
