// API module entry
// Request logging, body intake, dispatch and the error boundary

mod error;
mod handlers;
mod response;
mod types;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

use crate::config::AppState;
use crate::http::QueryParams;
use crate::logger::{self, RequestEvent};
use crate::routing::{self, Endpoint, RouteMatch};

pub use error::ApiError;
pub use response::ApiReply;

/// A request reduced to what the handlers need
#[derive(Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: QueryParams,
    pub body: Bytes,
}

/// Main entry point for HTTP request handling.
///
/// The request audit line is written before the body is read or any
/// handler runs.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);

    logger::log_request(&RequestEvent::new(
        method.as_str(),
        &path,
        query.as_deref(),
    ));

    let reply = match read_body(req, state.config.http.max_body_size).await {
        Ok(body) => {
            let request = ApiRequest {
                method,
                path,
                query: QueryParams::parse(query.as_deref()),
                body,
            };
            respond(&state, &request).await
        }
        Err(e) => e.into_reply("reading request body"),
    };

    Ok(reply.into_response(&state.config.http.server_name))
}

/// Route, run the handler and translate any failure
pub async fn respond(state: &AppState, request: &ApiRequest) -> ApiReply {
    let reply = match routing::match_route(&request.method, &request.path) {
        RouteMatch::Found(endpoint) => {
            let action = endpoint.action();
            dispatch(state, endpoint, request)
                .await
                .unwrap_or_else(|e| e.into_reply(action))
        }
        RouteMatch::MethodNotAllowed(allow) => {
            ApiError::MethodNotAllowed { allow }.into_reply("routing")
        }
        RouteMatch::NotFound => ApiError::RouteNotFound.into_reply("routing"),
    };

    logger::log_response(request.method.as_str(), &request.path, reply.status.as_u16());
    reply
}

async fn dispatch(
    state: &AppState,
    endpoint: Endpoint,
    request: &ApiRequest,
) -> Result<ApiReply, ApiError> {
    let users = state.users.as_ref();
    match endpoint {
        Endpoint::Health => Ok(handlers::health()),
        Endpoint::Arithmetic(op) => handlers::calculate(op, &request.query),
        Endpoint::CreateUser => handlers::create_user(users, &request.body).await,
        Endpoint::GetUser(id) => handlers::get_user(users, &id).await,
        Endpoint::UpdateUser(id) => handlers::update_user(users, &id, &request.body).await,
        Endpoint::DeleteUser(id) => handlers::delete_user(users, &id).await,
    }
}

/// Collect the body, refusing anything over `max_body_size`.
///
/// A declared `Content-Length` over the limit is refused before reading.
async fn read_body<B>(req: Request<B>, max_body_size: u64) -> Result<Bytes, ApiError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let declared = req
        .headers()
        .get(hyper::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|size| size > max_body_size) {
        return Err(ApiError::PayloadTooLarge);
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(ApiError::PayloadTooLarge),
        Err(e) => Err(ApiError::InvalidBody(format!("Failed to read request body: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::{InMemoryUserRepository, UnavailableUserRepository};
    use hyper::StatusCode;

    fn state() -> AppState {
        let config = Config::load_from("does-not-exist/config").unwrap();
        AppState::new(config, Arc::new(InMemoryUserRepository::new()))
    }

    fn get(path_and_query: &str) -> ApiRequest {
        request(Method::GET, path_and_query, "")
    }

    fn request(method: Method, path_and_query: &str, body: &str) -> ApiRequest {
        let (path, query) = match path_and_query.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path_and_query, None),
        };
        ApiRequest {
            method,
            path: path.to_string(),
            query: QueryParams::parse(query),
            body: Bytes::from(body.to_string()),
        }
    }

    #[tokio::test]
    async fn test_add_matches_float_addition() {
        let state = state();
        for (a, b) in [("0.1", "0.2"), ("-3", "3"), ("1e10", "2.5"), ("7", "-0.001")] {
            let reply = respond(&state, &get(&format!("/api/add?num1={a}&num2={b}"))).await;
            assert_eq!(reply.status, StatusCode::OK);
            let expected = a.parse::<f64>().unwrap() + b.parse::<f64>().unwrap();
            assert_eq!(reply.body["result"].as_f64().unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_divide() {
        let state = state();
        let reply = respond(&state, &get("/api/divide?num1=10&num2=0")).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["error"], "Division by zero is not allowed.");

        let reply = respond(&state, &get("/api/divide?num1=10&num2=2")).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["result"].as_f64(), Some(5.0));
    }

    #[tokio::test]
    async fn test_sqrt() {
        let state = state();
        let reply = respond(&state, &get("/api/sqrt?num=-4")).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            reply.body["error"],
            "Square root of a negative number is not allowed."
        );

        let reply = respond(&state, &get("/api/sqrt?num=16")).await;
        assert_eq!(reply.body["result"].as_f64(), Some(4.0));
    }

    #[tokio::test]
    async fn test_modulo() {
        let state = state();
        let reply = respond(&state, &get("/api/modulo?num1=7&num2=0")).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["error"], "Modulo by zero is not allowed.");

        let reply = respond(&state, &get("/api/modulo?num1=7&num2=2")).await;
        assert_eq!(reply.body["result"].as_f64(), Some(1.0));
    }

    #[tokio::test]
    async fn test_invalid_operands_on_every_binary_endpoint() {
        let state = state();
        for op in ["add", "subtract", "multiply", "divide", "exponent", "modulo"] {
            for query in ["num1=abc&num2=2", "num1=2&num2=abc", "num1=2", "num2=2", "", "num1=&num2=1"] {
                let reply = respond(&state, &get(&format!("/api/{op}?{query}"))).await;
                assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{op}?{query}");
                assert_eq!(
                    reply.body["error"], "Invalid parameters. Please provide valid numbers.",
                    "{op}?{query}"
                );
            }
        }
    }

    #[tokio::test]
    async fn test_invalid_sqrt_operand() {
        let state = state();
        for query in ["num=abc", "", "num=%20"] {
            let reply = respond(&state, &get(&format!("/api/sqrt?{query}"))).await;
            assert_eq!(reply.status, StatusCode::BAD_REQUEST);
            assert_eq!(
                reply.body["error"],
                "Invalid parameter. Please provide a valid number."
            );
        }
    }

    #[tokio::test]
    async fn test_health() {
        let reply = respond(&state(), &get("/health")).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["success"], true);
        assert_eq!(reply.body["message"], "It is working");
    }

    #[tokio::test]
    async fn test_unknown_route_and_method() {
        let state = state();
        let reply = respond(&state, &get("/api/power?num1=1&num2=2")).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.body["error"], "Not Found");

        let reply = respond(&state, &request(Method::POST, "/api/add", "")).await;
        assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(reply.headers, vec![("Allow", "GET")]);
    }

    #[tokio::test]
    async fn test_user_crud_through_router() {
        let state = state();
        let body = r#"{"name":"Grace","email":"grace@example.com","age":85}"#;

        let reply = respond(&state, &request(Method::POST, "/api/users", body)).await;
        assert_eq!(reply.status, StatusCode::OK);
        let id = reply.body["r"]
            .as_str()
            .and_then(|r| r.strip_prefix("User inserted with id: "))
            .unwrap()
            .to_string();

        let reply = respond(&state, &get(&format!("/api/users/{id}"))).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["name"], "Grace");
        assert_eq!(reply.body["email"], "grace@example.com");
        assert_eq!(reply.body["age"], 85);

        let path = format!("/api/users/{id}");
        let reply = respond(&state, &request(Method::DELETE, &path, "")).await;
        assert_eq!(reply.status, StatusCode::OK);

        let reply = respond(&state, &get(&path)).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.body["error"], "User not found");
    }

    #[tokio::test]
    async fn test_update_nonexistent_user() {
        let reply = respond(
            &state(),
            &request(
                Method::PUT,
                "/api/users/507f1f77bcf86cd799439011",
                r#"{"name":"Nobody","email":"n@example.com","age":1}"#,
            ),
        )
        .await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bad_body_and_bad_id() {
        let state = state();
        let reply = respond(&state, &request(Method::POST, "/api/users", "{not json")).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["error"], "Invalid request body");

        let reply = respond(&state, &get("/api/users/123")).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["error"], "Invalid user id");
    }

    #[tokio::test]
    async fn test_store_fault_is_generic_500() {
        let config = Config::load_from("does-not-exist/config").unwrap();
        let state = AppState::new(
            config,
            Arc::new(crate::store::UnavailableUserRepository::new("no client")),
        );
        let reply = respond(&state, &request(Method::POST, "/api/users", "{}")).await;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.body["error"], "Internal Server Error");
    }

    #[tokio::test]
    async fn test_user_values_are_not_type_checked() {
        let state = state();
        for body in [r#"{"age":"30"}"#, r#"{"age":36.5}"#, r#"{"name":42,"email":"x","age":1}"#] {
            let reply = respond(&state, &request(Method::POST, "/api/users", body)).await;
            assert_eq!(reply.status, StatusCode::OK, "{body}");
        }
    }

    #[tokio::test]
    async fn test_handle_request_writes_json_with_server_header() {
        let req = Request::builder()
            .uri("/api/divide?num1=10&num2=4")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = handle_request(req, Arc::new(state())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["server"], "calculator-service");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"result":2.5}"#);
    }

    #[tokio::test]
    async fn test_handle_request_rejects_oversized_body() {
        let mut state = state();
        state.config.http.max_body_size = 8;
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/users")
            .body(Full::new(Bytes::from_static(br#"{"name":"far too long"}"#)))
            .unwrap();
        let response = handle_request(req, Arc::new(state)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    // The only test that installs the global writer
    #[tokio::test]
    async fn test_request_is_logged_once_before_handling() {
        let dir = tempfile::tempdir().unwrap();
        let combined = dir.path().join("combined.log");

        let mut config = Config::load_from("does-not-exist/config").unwrap();
        config.logging.level = "info".to_string();
        config.logging.console = false;
        config.logging.error_log_file = None;
        config.logging.combined_log_file = Some(combined.to_string_lossy().into_owned());
        logger::init(&config).unwrap();

        let state = Arc::new(AppState::new(
            config,
            Arc::new(UnavailableUserRepository::new("audit-order-check")),
        ));
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/users?num1=7&num2=audit")
            .body(Full::new(Bytes::from_static(b"{}")))
            .unwrap();
        let response = handle_request(req, state).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let log = std::fs::read_to_string(&combined).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        let request_lines: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| {
                line.contains("POST /api/users?num1=7&num2=audit :::: users operation requested: 7 users audit")
            })
            .map(|(i, _)| i)
            .collect();
        let handler_line = lines
            .iter()
            .position(|line| line.contains("Error creating user: store unavailable: audit-order-check"))
            .unwrap();

        assert_eq!(request_lines.len(), 1, "{log}");
        assert!(request_lines[0] < handler_line, "{log}");
        assert!(lines[request_lines[0]].contains(r#""level":"info""#));
    }
}
