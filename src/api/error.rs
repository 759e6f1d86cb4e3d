// API error module
// The single place where failures become status codes, bodies and log lines

use hyper::StatusCode;
use thiserror::Error;

use super::response::ApiReply;
use super::types::ErrorResponse;
use crate::arithmetic::{ArithmeticError, EvalError, OperandError, Operation};
use crate::logger;
use crate::store::StoreError;

/// Every way a request can fail. `Display` is the client-facing message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid parameters. Please provide valid numbers.")]
    InvalidOperands(#[source] OperandError),
    #[error("Invalid parameter. Please provide a valid number.")]
    InvalidOperand(#[source] OperandError),
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
    #[error("Invalid request body")]
    InvalidBody(String),
    #[error("Invalid user id")]
    InvalidId(String),
    #[error("User not found")]
    UserNotFound,
    #[error("Not Found")]
    RouteNotFound,
    #[error("Method Not Allowed")]
    MethodNotAllowed { allow: &'static str },
    #[error("Payload Too Large")]
    PayloadTooLarge,
    #[error("Internal Server Error")]
    Store(#[source] StoreError),
}

impl ApiError {
    /// Operand failures are worded per arity: `sqrt` takes a single operand
    pub fn from_eval(op: Operation, err: EvalError) -> Self {
        match err {
            EvalError::Operand(e) if op == Operation::Sqrt => Self::InvalidOperand(e),
            EvalError::Operand(e) => Self::InvalidOperands(e),
            EvalError::Arithmetic(e) => Self::Arithmetic(e),
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidOperands(_)
            | Self::InvalidOperand(_)
            | Self::Arithmetic(_)
            | Self::InvalidBody(_)
            | Self::InvalidId(_) => StatusCode::BAD_REQUEST,
            Self::UserNotFound | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log server-side detail and build the client reply.
    ///
    /// `action` describes what the handler was doing ("fetching user").
    pub fn into_reply(self, action: &str) -> ApiReply {
        match &self {
            Self::Store(source) => logger::log_error(&format!("Error {action}: {source}")),
            Self::InvalidBody(detail) => {
                logger::log_warning(&format!("Rejected body while {action}: {detail}"));
            }
            Self::InvalidId(id) => {
                logger::log_warning(&format!("Rejected id '{id}' while {action}"));
            }
            _ => {}
        }

        let mut reply = ApiReply::json(
            self.status(),
            &ErrorResponse {
                error: self.to_string(),
            },
        );
        if let Self::MethodNotAllowed { allow } = self {
            reply = reply.with_header("Allow", allow);
        }
        reply
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidId(id) => Self::InvalidId(id),
            other => Self::Store(other),
        }
    }
}
