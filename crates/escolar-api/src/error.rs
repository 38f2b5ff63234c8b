//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use escolar_core::{AccessError, validate::ValidationErrors};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("{0}")]
  Validation(ValidationErrors),

  /// Never shown to the caller beyond `code`; the source is logged.
  #[error("internal error ({code}): {source}")]
  Internal {
    code:   &'static str,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

impl From<AccessError> for ApiError {
  fn from(e: AccessError) -> Self {
    match e {
      AccessError::Unauthenticated => Self::Unauthorized,
      AccessError::Forbidden(m) => Self::Forbidden(m.to_owned()),
      e @ AccessError::NotFound { .. } => Self::NotFound(e.to_string()),
      AccessError::Validation(errors) => Self::Validation(errors),
      AccessError::Persistence { code, source } => Self::Internal { code, source },
    }
  }
}

impl From<ValidationErrors> for ApiError {
  fn from(errors: ValidationErrors) -> Self { Self::Validation(errors) }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::Validation(ValidationErrors::single("body", rejection.body_text()))
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    Self::Validation(ValidationErrors::single("path", rejection.body_text()))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Unauthorized => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({
            "error": "unauthorized",
            "message": "a valid bearer token is required",
          })),
        )
          .into_response();
        res
          .headers_mut()
          .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        res
      }
      ApiError::Forbidden(m) => (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "forbidden", "message": m })),
      )
        .into_response(),
      ApiError::NotFound(m) => (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "not_found", "message": m })),
      )
        .into_response(),
      ApiError::Validation(errors) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "validation_failed", "errors": errors })),
      )
        .into_response(),
      ApiError::Internal { code, source } => {
        tracing::error!(code, error = %source, "request failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({
            "error": code,
            "message": "the operation could not be completed",
          })),
        )
          .into_response()
      }
    }
  }
}
