//! Event access: list, get, create, update, delete.

use uuid::Uuid;

use crate::{
  AccessError,
  actor::Actor,
  event::Event,
  policy::{require_administrator, visible_audiences},
  store::{EventConflict, SchoolStore},
  validate::{EventInput, Mode, ValidationErrors},
};

/// Active events the actor may see, ordered by date.
pub async fn list_active<S: SchoolStore>(
  store: &S,
  actor: &Actor,
) -> Result<Vec<Event>, AccessError> {
  let visibility = visible_audiences(actor.role);
  store
    .list_active_events(visibility)
    .await
    .map_err(AccessError::persistence("list_events_failed"))
}

/// A single event. Events outside the actor's visibility are reported as
/// missing.
pub async fn get<S: SchoolStore>(
  store: &S,
  actor: &Actor,
  id: Uuid,
) -> Result<Event, AccessError> {
  let visibility = visible_audiences(actor.role);
  store
    .get_event(id)
    .await
    .map_err(AccessError::persistence("get_event_failed"))?
    .filter(|e| visibility.permits(e.audience))
    .ok_or_else(|| AccessError::event_not_found(id))
}

/// Create an event owned by `actor`. Administrators only.
pub async fn create<S: SchoolStore>(
  store: &S,
  actor: &Actor,
  input: EventInput,
) -> Result<Event, AccessError> {
  require_administrator(actor, "only administrators may create events")?;

  let fields = input.validate(Mode::Create)?;

  let event = store
    .insert_event(actor.identity_id, fields)
    .await
    .map_err(AccessError::persistence("create_event_failed"))?
    .map_err(|conflict| rejected_write(conflict, None))?;

  tracing::info!(
    event_id = %event.event_id,
    owner = %actor.username,
    audience = %event.audience,
    "event created"
  );
  Ok(event)
}

/// Replace every field of an existing event. Administrators only.
///
/// The event id is read from the input's `id` key.
pub async fn update<S: SchoolStore>(
  store: &S,
  actor: &Actor,
  input: EventInput,
) -> Result<Event, AccessError> {
  require_administrator(actor, "only administrators may edit events")?;

  let id = input.event_id()?;
  if store
    .get_event(id)
    .await
    .map_err(AccessError::persistence("get_event_failed"))?
    .is_none()
  {
    return Err(AccessError::event_not_found(id));
  }

  let fields = input.validate(Mode::Replace)?;

  // The event may have been deleted since the existence check; the store
  // re-checks inside its transaction.
  let event = store
    .replace_event(id, fields)
    .await
    .map_err(AccessError::persistence("update_event_failed"))?
    .map_err(|conflict| rejected_write(conflict, Some(id)))?;

  tracing::info!(event_id = %id, editor = %actor.username, "event updated");
  Ok(event)
}

/// Permanently remove an event. Administrators only.
pub async fn delete<S: SchoolStore>(
  store: &S,
  actor: &Actor,
  id: Uuid,
) -> Result<(), AccessError> {
  require_administrator(actor, "only administrators may delete events")?;

  let removed = store
    .delete_event(id)
    .await
    .map_err(AccessError::persistence("delete_failed"))?;

  if !removed {
    return Err(AccessError::event_not_found(id));
  }

  tracing::info!(event_id = %id, deleted_by = %actor.username, "event deleted");
  Ok(())
}

fn rejected_write(conflict: EventConflict, id: Option<Uuid>) -> AccessError {
  match (conflict, id) {
    (EventConflict::ResponsibleMissing(responsible_id), _) => {
      ValidationErrors::single(
        "responsible",
        format!("no identity with id {responsible_id}"),
      )
      .into()
    }
    (EventConflict::EventMissing, Some(id)) => AccessError::event_not_found(id),
    (EventConflict::EventMissing, None) => AccessError::Persistence {
      code:   "create_event_failed",
      source: "store reported a missing event on insert".into(),
    },
  }
}
