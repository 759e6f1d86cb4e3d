//! Route matching module
//!
//! Maps a method and path onto one of the service endpoints.

use hyper::Method;

use crate::arithmetic::Operation;

const USERS_PATH: &str = "/api/users";

/// A resolved endpoint with its path parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Health,
    Arithmetic(Operation),
    CreateUser,
    GetUser(String),
    UpdateUser(String),
    DeleteUser(String),
}

impl Endpoint {
    /// What the endpoint is doing, for server-side error lines
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Health => "checking health",
            Self::Arithmetic(_) => "computing result",
            Self::CreateUser => "creating user",
            Self::GetUser(_) => "fetching user",
            Self::UpdateUser(_) => "updating user",
            Self::DeleteUser(_) => "deleting user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    Found(Endpoint),
    /// Path exists but not for this method; carries the `Allow` header value
    MethodNotAllowed(&'static str),
    NotFound,
}

/// Resolve a request to an endpoint. A single trailing slash is ignored.
pub fn match_route(method: &Method, path: &str) -> RouteMatch {
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };

    if path == "/health" {
        return only_get(method, Endpoint::Health);
    }

    if path == USERS_PATH {
        return if method == Method::POST {
            RouteMatch::Found(Endpoint::CreateUser)
        } else {
            RouteMatch::MethodNotAllowed("POST")
        };
    }

    if let Some(id) = path
        .strip_prefix(USERS_PATH)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|id| !id.is_empty() && !id.contains('/'))
    {
        let id = id.to_string();
        return match *method {
            Method::GET => RouteMatch::Found(Endpoint::GetUser(id)),
            Method::PUT => RouteMatch::Found(Endpoint::UpdateUser(id)),
            Method::DELETE => RouteMatch::Found(Endpoint::DeleteUser(id)),
            _ => RouteMatch::MethodNotAllowed("GET, PUT, DELETE"),
        };
    }

    if let Some(op) = path.strip_prefix("/api/").and_then(Operation::from_name) {
        return only_get(method, Endpoint::Arithmetic(op));
    }

    RouteMatch::NotFound
}

fn only_get(method: &Method, endpoint: Endpoint) -> RouteMatch {
    if method == Method::GET {
        RouteMatch::Found(endpoint)
    } else {
        RouteMatch::MethodNotAllowed("GET")
    }
}
