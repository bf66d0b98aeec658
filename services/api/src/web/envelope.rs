//! services/api/src/web/envelope.rs
//!
//! Every response body is an envelope: `{"success": true, ...data}` or
//! `{"success": false, "error", "code", "details"?}`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use interview_prep_core::error::ServiceError;
use interview_prep_core::ports::AiError;
use interview_prep_core::validation::ValidationErrors;
use serde::Serialize;
use uuid::Uuid;

/// The success envelope; `data` must serialize as a JSON object.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    success: bool,
    #[serde(flatten)]
    data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Response {
        Self::with_status(StatusCode::OK, data)
    }

    pub fn created(data: T) -> Response {
        Self::with_status(StatusCode::CREATED, data)
    }

    pub fn with_status(status: StatusCode, data: T) -> Response {
        (status, Json(Envelope { success: true, data })).into_response()
    }
}

/// A payload with nothing beyond `success`.
#[derive(Debug, Serialize)]
pub struct Done {}

pub type ApiResult = Result<Response, ApiFailure>;

//=========================================================================================
// Failures
//=========================================================================================

#[derive(Serialize)]
struct FailureBody<'a> {
    success: bool,
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a ValidationErrors>,
}

/// A `ServiceError` on its way out of a handler.
#[derive(Debug)]
pub struct ApiFailure(pub ServiceError);

impl From<ServiceError> for ApiFailure {
    fn from(error: ServiceError) -> Self {
        ApiFailure(error)
    }
}

impl From<ValidationErrors> for ApiFailure {
    fn from(errors: ValidationErrors) -> Self {
        ApiFailure(ServiceError::Validation(errors))
    }
}

const AI_UNAVAILABLE_MESSAGE: &str = "AI service temporarily unavailable";

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let error = &self.0;
        let mut details = None;
        let mut retry_after = None;

        let (status, code, message) = match error {
            ServiceError::Validation(errors) => {
                details = Some(errors);
                (
                    StatusCode::BAD_REQUEST,
                    error.code(),
                    "Validation failed".to_string(),
                )
            }
            ServiceError::Auth => (StatusCode::UNAUTHORIZED, error.code(), "Unauthorized".to_string()),
            // Rendered exactly like a missing entity so ids cannot be probed.
            ServiceError::Forbidden { entity, id } => {
                tracing::warn!(entity, %id, "Forbidden access rendered as not found");
                (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND_ERROR",
                    format!("{entity} not found"),
                )
            }
            ServiceError::NotFound { .. } => (StatusCode::NOT_FOUND, error.code(), error.to_string()),
            ServiceError::Conflict(message) => (StatusCode::CONFLICT, error.code(), message.clone()),
            ServiceError::RateLimited { retry_after_secs } => {
                retry_after = Some(*retry_after_secs);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    error.code(),
                    "Too many requests".to_string(),
                )
            }
            ServiceError::Ai(ai) => {
                tracing::error!(error = %ai, code = error.code(), "AI request failed");
                match ai {
                    AiError::MissingCredential | AiError::UnsupportedProvider(_) => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        error.code(),
                        AI_UNAVAILABLE_MESSAGE.to_string(),
                    ),
                    AiError::Vendor { .. } if ai.is_rate_limited() => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        error.code(),
                        "AI service is rate limited, please try again shortly".to_string(),
                    ),
                    AiError::Vendor { .. } => (
                        StatusCode::BAD_GATEWAY,
                        error.code(),
                        AI_UNAVAILABLE_MESSAGE.to_string(),
                    ),
                    AiError::Parse(_) => (
                        StatusCode::BAD_GATEWAY,
                        error.code(),
                        "AI service returned an unexpected response".to_string(),
                    ),
                    AiError::EmptyInput(_) => (StatusCode::BAD_REQUEST, error.code(), ai.to_string()),
                }
            }
            ServiceError::Store(port) => {
                tracing::error!(error = %port, "Store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error.code(),
                    "Internal server error".to_string(),
                )
            }
        };

        let body = FailureBody {
            success: false,
            error: message,
            code,
            details,
        };
        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

//=========================================================================================
// Extractor rejections as envelopes
//=========================================================================================

pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiFailure> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ValidationErrors::single("body", rejection.body_text()).into())
}

pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiFailure> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| ValidationErrors::single("query", rejection.body_text()).into())
}

pub fn path_param<T>(path: Result<Path<T>, PathRejection>, field: &str) -> Result<T, ApiFailure> {
    path.map(|Path(value)| value)
        .map_err(|_| ValidationErrors::single(field, format!("Invalid {field}")).into())
}

/// Parses one raw path segment so a bad value is reported under its own name.
pub fn parse_id(raw: &str, field: &str) -> Result<Uuid, ApiFailure> {
    Uuid::parse_str(raw)
        .map_err(|_| ValidationErrors::single(field, format!("Invalid {field}")).into())
}
