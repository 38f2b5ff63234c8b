//! Account provisioning behind the `add-user`, `issue-token` and
//! `remove-user` commands.

use escolar_core::{
  actor::{Identity, NewIdentity},
  store::SchoolStore,
};
use thiserror::Error;

use crate::auth::{generate_token, token_digest};

#[derive(Debug, Error)]
pub enum ProvisionError<E> {
  #[error("no identity named {0:?}")]
  UnknownUser(String),

  #[error(transparent)]
  Store(#[from] E),
}

type Result<T, S> = std::result::Result<T, ProvisionError<<S as SchoolStore>::Error>>;

/// Create an identity and, when it holds a role, its empty profile.
pub async fn add_user<S: SchoolStore>(store: &S, input: NewIdentity) -> Result<Identity, S> {
  let identity = store.add_identity(input).await?;
  tracing::info!(
    identity_id = %identity.identity_id,
    username = %identity.username,
    role = ?identity.role,
    "identity created"
  );
  Ok(identity)
}

/// Issue a fresh bearer token for `username`. The returned token is the
/// only copy; the store keeps its digest.
pub async fn issue_token<S: SchoolStore>(store: &S, username: &str) -> Result<String, S> {
  let identity = find(store, username).await?;
  let token = generate_token();
  store
    .store_token(identity.identity_id, token_digest(&token))
    .await?;
  tracing::info!(username = %identity.username, "token issued");
  Ok(token)
}

/// Delete `username` together with its profile, tokens and owned events.
/// Events naming it as responsible keep existing without one.
pub async fn remove_user<S: SchoolStore>(store: &S, username: &str) -> Result<Identity, S> {
  let identity = find(store, username).await?;
  if !store.delete_identity(identity.identity_id).await? {
    return Err(ProvisionError::UnknownUser(username.to_owned()));
  }
  tracing::info!(identity_id = %identity.identity_id, username, "identity removed");
  Ok(identity)
}

async fn find<S: SchoolStore>(store: &S, username: &str) -> Result<Identity, S> {
  store
    .find_identity(username.to_owned())
    .await?
    .ok_or_else(|| ProvisionError::UnknownUser(username.to_owned()))
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, NaiveTime};
  use escolar_core::{
    actor::Role,
    event::{Audience, Category, EventFields},
  };
  use escolar_store_sqlite::SqliteStore;

  use super::*;

  fn new_identity(username: &str, role: Option<Role>) -> NewIdentity {
    NewIdentity {
      username:   username.into(),
      first_name: "Ana".into(),
      last_name:  "López".into(),
      email:      format!("{username}@example.edu"),
      role,
    }
  }

  #[tokio::test]
  async fn issued_token_authenticates() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let identity = add_user(&store, new_identity("ana", Some(Role::Student))).await.unwrap();

    let token = issue_token(&store, "ana").await.unwrap();
    let actor = store.resolve_token(token_digest(&token)).await.unwrap().unwrap();
    assert_eq!(actor.identity_id, identity.identity_id);
    assert!(store.resolve_token(token).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn unknown_user_gets_no_token() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let err = issue_token(&store, "nadie").await.unwrap_err();
    assert!(matches!(err, ProvisionError::UnknownUser(u) if u == "nadie"));
  }

  #[tokio::test]
  async fn removing_a_user_revokes_access_and_owned_events() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let admin = add_user(&store, new_identity("admin", Some(Role::Administrator)))
      .await
      .unwrap();
    let token = issue_token(&store, "admin").await.unwrap();
    let event = store
      .insert_event(admin.identity_id, EventFields {
        name:           "Claustro".into(),
        category:       Category::Seminar,
        date:           NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
        start_time:     NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time:       NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        venue:          "Sala 2".into(),
        audience:       Audience::Teachers,
        program:        None,
        responsible_id: None,
        description:    "Reunión".into(),
        capacity:       0,
      })
      .await
      .unwrap()
      .unwrap();

    let removed = remove_user(&store, "admin").await.unwrap();
    assert_eq!(removed.identity_id, admin.identity_id);
    assert!(store.resolve_token(token_digest(&token)).await.unwrap().is_none());
    assert!(store.get_event(event.event_id).await.unwrap().is_none());

    let err = remove_user(&store, "admin").await.unwrap_err();
    assert!(matches!(err, ProvisionError::UnknownUser(_)));
  }
}
