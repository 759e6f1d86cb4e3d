// API reply module
// Status, JSON body and extra headers, independent of hyper's body types

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::http;
use crate::logger;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: StatusCode,
    pub body: serde_json::Value,
    pub headers: Vec<(&'static str, &'static str)>,
}

impl ApiReply {
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self {
                status,
                body,
                headers: Vec::new(),
            },
            Err(e) => {
                logger::log_error(&format!("Failed to serialize response: {e}"));
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: serde_json::json!({ "error": "Internal Server Error" }),
                    headers: Vec::new(),
                }
            }
        }
    }

    pub fn ok<T: Serialize>(body: &T) -> Self {
        Self::json(StatusCode::OK, body)
    }

    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }

    pub fn into_response(self, server_name: &str) -> Response<Full<Bytes>> {
        http::build_json_response(self.status, &self.body, server_name, &self.headers)
    }
}
