//! Bearer-token authentication.
//!
//! Tokens are opaque random strings. Only their SHA-256 digest is stored, so
//! a leaked database does not yield usable credentials.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use escolar_core::{actor::Actor, store::SchoolStore};
use rand_core::{OsRng, RngCore as _};
use sha2::{Digest as _, Sha256};

use crate::{AppState, error::ApiError};

const TOKEN_BYTES: usize = 32;

/// The authenticated caller. Present in a handler means the request carried
/// a valid bearer token.
pub struct Authenticated(pub Actor);

/// Generate a fresh random token, hex-encoded.
pub fn generate_token() -> String {
  let mut bytes = [0u8; TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// The digest under which a token is stored.
pub fn token_digest(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let token = value
    .strip_prefix("Bearer ")
    .map(str::trim)
    .ok_or(ApiError::Unauthorized)?;

  if token.is_empty() {
    return Err(ApiError::Unauthorized);
  }
  Ok(token)
}

/// Resolve the request's bearer token to an [`Actor`].
pub async fn verify_bearer<S>(headers: &HeaderMap, store: &S) -> Result<Actor, ApiError>
where
  S: SchoolStore,
{
  let digest = token_digest(bearer_token(headers)?);
  store
    .resolve_token(digest)
    .await
    .map_err(|e| ApiError::Internal { code: "auth_failed", source: Box::new(e) })?
    .ok_or(ApiError::Unauthorized)
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: SchoolStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let actor = verify_bearer(&parts.headers, state.store.as_ref()).await?;
    tracing::debug!(username = %actor.username, role = ?actor.role, "authenticated");
    Ok(Authenticated(actor))
  }
}
