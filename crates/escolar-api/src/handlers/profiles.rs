//! `/profiles`: role-specific profile records.

use axum::{
  Json,
  extract::{Query, State},
};
use escolar_core::{
  access::profiles,
  actor::Role,
  profile::{Profile, ProfileAttributes},
  store::SchoolStore,
  validate::ValidationErrors,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::Authenticated,
  error::ApiError,
  extract::{JsonBody, PathParam},
};

#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
  pub role: Option<String>,
}

/// `GET /profiles?role=`. Administrators only.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
  Query(query): Query<ProfileQuery>,
) -> Result<Json<Vec<Profile>>, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
{
  let role = parse_role(query.role.as_deref())?;
  Ok(Json(profiles::list(state.store.as_ref(), &actor, role).await?))
}

/// `GET /profiles/me`
pub async fn own<S>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
) -> Result<Json<Profile>, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
{
  Ok(Json(profiles::own(state.store.as_ref(), &actor).await?))
}

/// `GET /profiles/{identity_id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
  PathParam(identity_id): PathParam<Uuid>,
) -> Result<Json<Profile>, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
{
  Ok(Json(profiles::get(state.store.as_ref(), &actor, identity_id).await?))
}

/// `PUT /profiles/{identity_id}`
pub async fn replace<S>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
  PathParam(identity_id): PathParam<Uuid>,
  JsonBody(attributes): JsonBody<ProfileAttributes>,
) -> Result<Json<Profile>, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
{
  let profile =
    profiles::update(state.store.as_ref(), &actor, identity_id, attributes).await?;
  Ok(Json(profile))
}

fn parse_role(raw: Option<&str>) -> Result<Role, ApiError> {
  let raw = raw
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .ok_or_else(|| ValidationErrors::single("role", "this field is required"))?;
  raw.parse().map_err(|_| {
    ValidationErrors::single("role", format!("{raw:?} is not a valid role")).into()
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_role_accepts_canonical_and_legacy_names() {
    assert_eq!(parse_role(Some("student")).unwrap(), Role::Student);
    assert_eq!(parse_role(Some("maestro")).unwrap(), Role::Teacher);
    assert!(matches!(parse_role(None), Err(ApiError::Validation(_))));
    assert!(matches!(parse_role(Some("janitor")), Err(ApiError::Validation(_))));
  }
}
