//! API error body
//!
//! Successful responses carry the resource itself; failures carry
//! `{ "code": <int>, "msg": <text> }`.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{StatusCode, request::Parts},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use utoipa::ToSchema;

use crate::prescription::PrescriptionError;
use crate::prescription::error::error_codes;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Non-zero error code
    #[schema(example = 1001)]
    pub code: i32,
    /// Human-readable description of the failed constraint or entity
    #[schema(example = "doctor not found")]
    pub msg: String,
}

impl ErrorResponse {
    pub fn new(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

impl From<PrescriptionError> for ErrorResponse {
    fn from(err: PrescriptionError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

/// Map a service error onto its HTTP status and error body
pub fn api_error(err: PrescriptionError) -> ApiError {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(error = %err, "Request failed");
    } else {
        tracing::info!(status = status.as_u16(), error = %err, "Request rejected");
    }
    (status, Json(ErrorResponse::from(err)))
}

fn invalid_parameter(msg: String) -> ApiError {
    tracing::info!(error = %msg, "Request rejected");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(error_codes::INVALID_PARAMETER, msg)),
    )
}

/// JSON body whose decode failures answer 400 with the error body
/// instead of axum's plain-text 415/422.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| invalid_parameter(format!("Invalid JSON: {}", e.body_text())))?;
        Ok(Self(value))
    }
}

/// Path parameters, rejected the same way as [`JsonBody`]
#[derive(Debug)]
pub struct PathParam<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| invalid_parameter(format!("Invalid path: {}", e.body_text())))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prescription::{EntityKind, StoreError, ValidationError};

    #[test]
    fn test_api_error_status_mapping() {
        let (status, Json(body)) = api_error(ValidationError::NoMedicaments.into());
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, 1001);

        let (status, Json(body)) = api_error(PrescriptionError::NotFound(EntityKind::Doctor));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.msg, "doctor not found");

        let (status, _) = api_error(StoreError::Unavailable("down".into()).into());
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_json_body_rejection_is_invalid_parameter() {
        let req = Request::builder()
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{ "code": "x" }"#))
            .unwrap();

        let (status, Json(body)) = JsonBody::<ErrorResponse>::from_request(req, &())
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, error_codes::INVALID_PARAMETER);
        assert!(body.msg.starts_with("Invalid JSON"), "{}", body.msg);
    }

    #[tokio::test]
    async fn test_json_body_without_content_type_is_invalid_parameter() {
        let req = Request::builder()
            .body(axum::body::Body::from(r#"{ "code": 1, "msg": "m" }"#))
            .unwrap();

        let (status, Json(body)) = JsonBody::<ErrorResponse>::from_request(req, &())
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, 1001);
    }

    #[test]
    fn test_error_body_shape() {
        let json = serde_json::to_value(ErrorResponse::new(4004, "patient not found")).unwrap();
        assert_eq!(json, serde_json::json!({ "code": 4004, "msg": "patient not found" }));
    }
}
