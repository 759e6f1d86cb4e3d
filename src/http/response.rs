//! HTTP response building module
//!
//! Every response the service produces is JSON; this is the one place that
//! turns a status and a serializable body into a hyper response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

const INTERNAL_ERROR_BODY: &str = r#"{"error":"Internal Server Error"}"#;

/// Build a JSON response with the `Server` header and optional extra headers
pub fn build_json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
    server_name: &str,
    extra_headers: &[(&'static str, &'static str)],
) -> Response<Full<Bytes>> {
    let (status, json) = match serde_json::to_vec(body) {
        Ok(j) => (status, Bytes::from(j)),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(INTERNAL_ERROR_BODY.as_bytes()),
            )
        }
    };

    let mut builder = Response::builder()
        .status(status)
        .header("Content-Type", "application/json; charset=utf-8")
        .header("Content-Length", json.len())
        .header("Server", server_name);
    for (name, value) in extra_headers {
        builder = builder.header(*name, *value);
    }

    builder.body(Full::new(json)).unwrap_or_else(|e| {
        log_build_error(status, &e);
        let mut fallback = Response::new(Full::new(Bytes::from_static(
            INTERNAL_ERROR_BODY.as_bytes(),
        )));
        *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    })
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
