//! Error types for `escolar-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::validate::ValidationErrors;

/// Failures decoding domain values from their stored representation.
#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown {kind} value: {value:?}")]
  UnknownVariant { kind: &'static str, value: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The outcome taxonomy of every access-service operation.
///
/// Authorization and existence checks run before any mutation, so a
/// `Forbidden` or `NotFound` guarantees the store was left untouched.
#[derive(Debug, Error)]
pub enum AccessError {
  #[error("authentication required")]
  Unauthenticated,

  #[error("forbidden: {0}")]
  Forbidden(&'static str),

  #[error("{kind} {id} not found")]
  NotFound { kind: &'static str, id: Uuid },

  #[error("validation failed: {0}")]
  Validation(ValidationErrors),

  /// A storage failure. `code` is stable and safe to show to callers; the
  /// source carries the detail and is only ever logged.
  #[error("persistence failure ({code}): {source}")]
  Persistence {
    code:   &'static str,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

impl AccessError {
  pub fn event_not_found(id: Uuid) -> Self {
    Self::NotFound { kind: "event", id }
  }

  pub fn profile_not_found(id: Uuid) -> Self {
    Self::NotFound { kind: "profile", id }
  }

  /// Adapter for `map_err` on store futures.
  pub fn persistence<E>(code: &'static str) -> impl FnOnce(E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    move |e| Self::Persistence { code, source: Box::new(e) }
  }
}

impl From<ValidationErrors> for AccessError {
  fn from(errors: ValidationErrors) -> Self { Self::Validation(errors) }
}
