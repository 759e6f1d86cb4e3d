// Endpoint handlers
// Each handler returns its reply or an ApiError; translation happens in the caller

use super::error::ApiError;
use super::response::ApiReply;
use super::types::{HealthResponse, InsertedResponse, MessageResponse, ResultResponse};
use crate::arithmetic::{self, Operation};
use crate::http::QueryParams;
use crate::store::{UserFields, UserRepository};

pub fn health() -> ApiReply {
    ApiReply::ok(&HealthResponse {
        success: true,
        message: "It is working",
    })
}

pub fn calculate(op: Operation, query: &QueryParams) -> Result<ApiReply, ApiError> {
    let result = arithmetic::evaluate(op, |name| query.get(name))
        .map_err(|e| ApiError::from_eval(op, e))?;
    Ok(ApiReply::ok(&ResultResponse { result }))
}

pub async fn create_user(users: &dyn UserRepository, body: &[u8]) -> Result<ApiReply, ApiError> {
    let fields = parse_user_body(body)?;
    let id = users.insert(fields).await?;
    Ok(ApiReply::ok(&InsertedResponse {
        r: format!("User inserted with id: {id}"),
    }))
}

pub async fn get_user(users: &dyn UserRepository, id: &str) -> Result<ApiReply, ApiError> {
    let record = users.find_by_id(id).await?.ok_or(ApiError::UserNotFound)?;
    Ok(ApiReply::ok(&record))
}

pub async fn update_user(
    users: &dyn UserRepository,
    id: &str,
    body: &[u8],
) -> Result<ApiReply, ApiError> {
    let fields = parse_user_body(body)?;
    // zero also covers "values already identical"
    if users.update_by_id(id, fields).await? == 0 {
        return Err(ApiError::UserNotFound);
    }
    Ok(ApiReply::ok(&MessageResponse {
        message: "User updated successfully",
    }))
}

pub async fn delete_user(users: &dyn UserRepository, id: &str) -> Result<ApiReply, ApiError> {
    if users.delete_by_id(id).await? == 0 {
        return Err(ApiError::UserNotFound);
    }
    Ok(ApiReply::ok(&MessageResponse {
        message: "User deleted successfully",
    }))
}

/// An empty body means "no fields"; anything else must be a JSON object.
/// Field values are not checked.
fn parse_user_body(body: &[u8]) -> Result<UserFields, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(UserFields::default());
    }
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    if !value.is_object() {
        return Err(ApiError::InvalidBody("expected a JSON object".to_string()));
    }
    serde_json::from_value(value).map_err(|e| ApiError::InvalidBody(e.to_string()))
}
