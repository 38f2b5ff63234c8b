//! Error type for `escolar-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] escolar_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored column could not be turned back into its domain type.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("username already taken: {0:?}")]
  UsernameTaken(String),

  #[error("identity not found: {0}")]
  IdentityNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
