//! The `SchoolStore` trait.
//!
//! Implemented by storage backends (e.g. `escolar-store-sqlite`). The access
//! services and the HTTP layer depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  actor::{Actor, Identity, NewIdentity, Role},
  event::{Event, EventFields},
  policy::Visibility,
  profile::{Profile, ProfileAttributes},
};

/// Why a store refused an event write. Both conditions are checked inside
/// the write's transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventConflict {
  /// The event to replace does not exist.
  EventMissing,
  /// The responsible identity named by the fields does not exist.
  ResponsibleMissing(Uuid),
}

/// Abstraction over an Escolar store backend.
///
/// Every event mutation (`insert_event`, `replace_event`, `delete_event`) is
/// atomic and scoped to a single record.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SchoolStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identities ────────────────────────────────────────────────────────

  /// Persist a new identity. When it holds a role, its empty profile is
  /// created in the same transaction.
  fn add_identity(
    &self,
    input: NewIdentity,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + '_;

  /// Look an identity up by its unique username.
  fn find_identity(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  /// Delete an identity, cascading to its profile, tokens and owned events.
  /// Returns `false` if it did not exist.
  fn delete_identity(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Bearer tokens ─────────────────────────────────────────────────────

  /// Record a token digest for an identity. Only digests are stored.
  fn store_token(
    &self,
    identity_id: Uuid,
    digest: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Resolve a token digest to the actor it authenticates.
  fn resolve_token(
    &self,
    digest: String,
  ) -> impl Future<Output = Result<Option<Actor>, Self::Error>> + Send + '_;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// The profile of an identity, if it holds a role.
  fn get_profile(
    &self,
    identity_id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// All profiles of one role, oldest first.
  fn list_profiles(
    &self,
    role: Role,
  ) -> impl Future<Output = Result<Vec<Profile>, Self::Error>> + Send + '_;

  /// Replace the attributes of an identity's profile and stamp
  /// `updated_at`. Returns `None` if the identity has no profile.
  fn replace_profile(
    &self,
    identity_id: Uuid,
    attributes: ProfileAttributes,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  /// Active events whose audience `visibility` permits, ordered by date,
  /// then start time, then creation time.
  fn list_active_events(
    &self,
    visibility: Visibility,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  /// Retrieve an event by UUID. Returns `None` if not found.
  fn get_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  /// Persist a new, active event owned by `owner_id`.
  fn insert_event(
    &self,
    owner_id: Uuid,
    fields: EventFields,
  ) -> impl Future<Output = Result<Result<Event, EventConflict>, Self::Error>>
  + Send
  + '_;

  /// Replace every caller-controlled field of an event in one transaction.
  fn replace_event(
    &self,
    id: Uuid,
    fields: EventFields,
  ) -> impl Future<Output = Result<Result<Event, EventConflict>, Self::Error>>
  + Send
  + '_;

  /// Permanently remove an event. Returns `false` if it did not exist.
  fn delete_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
