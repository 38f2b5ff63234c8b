//! Profile access: an owner or an administrator may read and replace a
//! profile; only administrators may list them.

use uuid::Uuid;

use crate::{
  AccessError,
  actor::{Actor, Role},
  policy::require_administrator,
  profile::{Profile, ProfileAttributes},
  store::SchoolStore,
  validate::ValidationErrors,
};

fn require_owner_or_administrator(
  actor: &Actor,
  identity_id: Uuid,
) -> Result<(), AccessError> {
  if actor.identity_id == identity_id {
    return Ok(());
  }
  require_administrator(actor, "only the owner or an administrator may access this profile")
}

pub async fn get<S: SchoolStore>(
  store: &S,
  actor: &Actor,
  identity_id: Uuid,
) -> Result<Profile, AccessError> {
  require_owner_or_administrator(actor, identity_id)?;
  store
    .get_profile(identity_id)
    .await
    .map_err(AccessError::persistence("get_profile_failed"))?
    .ok_or_else(|| AccessError::profile_not_found(identity_id))
}

/// The actor's own profile.
pub async fn own<S: SchoolStore>(
  store: &S,
  actor: &Actor,
) -> Result<Profile, AccessError> {
  get(store, actor, actor.identity_id).await
}

pub async fn list<S: SchoolStore>(
  store: &S,
  actor: &Actor,
  role: Role,
) -> Result<Vec<Profile>, AccessError> {
  require_administrator(actor, "only administrators may list profiles")?;
  store
    .list_profiles(role)
    .await
    .map_err(AccessError::persistence("list_profiles_failed"))
}

/// Replace the attributes of a profile. The attributes must be for the role
/// the profile already has.
pub async fn update<S: SchoolStore>(
  store: &S,
  actor: &Actor,
  identity_id: Uuid,
  attributes: ProfileAttributes,
) -> Result<Profile, AccessError> {
  require_owner_or_administrator(actor, identity_id)?;

  let current = store
    .get_profile(identity_id)
    .await
    .map_err(AccessError::persistence("get_profile_failed"))?
    .ok_or_else(|| AccessError::profile_not_found(identity_id))?;

  if current.role() != attributes.role() {
    return Err(
      ValidationErrors::single(
        "role",
        format!("this profile belongs to a {}", current.role()),
      )
      .into(),
    );
  }

  let profile = store
    .replace_profile(identity_id, attributes)
    .await
    .map_err(AccessError::persistence("update_profile_failed"))?
    .ok_or_else(|| AccessError::profile_not_found(identity_id))?;

  tracing::info!(
    identity_id = %identity_id,
    editor = %actor.username,
    role = %profile.role(),
    "profile updated"
  );
  Ok(profile)
}
