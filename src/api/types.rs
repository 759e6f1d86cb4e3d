// API response body types

use serde::{Serialize, Serializer};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Result of an arithmetic endpoint.
///
/// Integral values are written as JSON integers (`5`, not `5.0`);
/// non-finite values serialize as `null`.
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    #[serde(serialize_with = "serialize_number")]
    pub result: f64,
}

/// Largest magnitude below which every integral `f64` fits an `i64`
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

#[allow(clippy::cast_possible_truncation, clippy::trivially_copy_pass_by_ref)]
fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < I64_BOUND {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[derive(Debug, Serialize)]
pub struct InsertedResponse {
    pub r: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
