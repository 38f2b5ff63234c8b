//! Access-service tests against a scripted in-memory store.

use std::sync::Mutex;

use chrono::{NaiveDate, NaiveTime, Utc};
use serde_json::json;
use uuid::Uuid;

use super::{events, profiles};
use crate::{
  AccessError,
  actor::{Actor, Identity, NewIdentity, Role},
  event::{Audience, Category, Event, EventFields},
  policy::Visibility,
  profile::{Profile, ProfileAttributes},
  store::{EventConflict, SchoolStore},
  validate::EventInput,
};

#[derive(Debug, thiserror::Error)]
#[error("database is locked")]
struct StoreDown;

/// A store that answers from fixed state. Every event write reports
/// `conflict` when set; `delete_event` fails when `down` is set.
#[derive(Default)]
struct ScriptedStore {
  event:    Option<Event>,
  conflict: Option<EventConflict>,
  down:     bool,
  deleted:  Mutex<Vec<Uuid>>,
}

impl ScriptedStore {
  fn write(&self, id: Uuid, fields: EventFields) -> Result<Event, EventConflict> {
    if let Some(conflict) = self.conflict {
      return Err(conflict);
    }
    let now = Utc::now();
    Ok(Event {
      event_id:       id,
      owner_id:       None,
      name:           fields.name,
      category:       fields.category,
      date:           fields.date,
      start_time:     fields.start_time,
      end_time:       fields.end_time,
      venue:          fields.venue,
      audience:       fields.audience,
      program:        fields.program,
      responsible_id: fields.responsible_id,
      description:    fields.description,
      capacity:       fields.capacity,
      active:         true,
      created_at:     now,
      updated_at:     now,
    })
  }
}

impl SchoolStore for ScriptedStore {
  type Error = StoreDown;

  async fn add_identity(&self, _input: NewIdentity) -> Result<Identity, StoreDown> {
    Err(StoreDown)
  }

  async fn find_identity(&self, _username: String) -> Result<Option<Identity>, StoreDown> {
    Ok(None)
  }

  async fn delete_identity(&self, _id: Uuid) -> Result<bool, StoreDown> { Ok(false) }

  async fn store_token(&self, _identity_id: Uuid, _digest: String) -> Result<(), StoreDown> {
    Ok(())
  }

  async fn resolve_token(&self, _digest: String) -> Result<Option<Actor>, StoreDown> {
    Ok(None)
  }

  async fn get_profile(&self, _identity_id: Uuid) -> Result<Option<Profile>, StoreDown> {
    Ok(None)
  }

  async fn list_profiles(&self, _role: Role) -> Result<Vec<Profile>, StoreDown> {
    Ok(Vec::new())
  }

  async fn replace_profile(
    &self,
    _identity_id: Uuid,
    _attributes: ProfileAttributes,
  ) -> Result<Option<Profile>, StoreDown> {
    Ok(None)
  }

  async fn list_active_events(&self, visibility: Visibility) -> Result<Vec<Event>, StoreDown> {
    Ok(
      self
        .event
        .iter()
        .filter(|e| visibility.permits(e.audience))
        .cloned()
        .collect(),
    )
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<Event>, StoreDown> {
    Ok(self.event.clone().filter(|e| e.event_id == id))
  }

  async fn insert_event(
    &self,
    _owner_id: Uuid,
    fields: EventFields,
  ) -> Result<Result<Event, EventConflict>, StoreDown> {
    Ok(self.write(Uuid::new_v4(), fields))
  }

  async fn replace_event(
    &self,
    id: Uuid,
    fields: EventFields,
  ) -> Result<Result<Event, EventConflict>, StoreDown> {
    Ok(self.write(id, fields))
  }

  async fn delete_event(&self, id: Uuid) -> Result<bool, StoreDown> {
    if self.down {
      return Err(StoreDown);
    }
    self.deleted.lock().unwrap().push(id);
    Ok(self.event.as_ref().is_some_and(|e| e.event_id == id))
  }
}

fn actor(role: Option<Role>) -> Actor {
  Actor { identity_id: Uuid::new_v4(), username: "someone".into(), role }
}

fn stored_event(audience: Audience) -> Event {
  let now = Utc::now();
  Event {
    event_id:       Uuid::new_v4(),
    owner_id:       None,
    name:           "Claustro".into(),
    category:       Category::Seminar,
    date:           NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
    start_time:     NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    end_time:       NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
    venue:          "Sala 2".into(),
    audience,
    program:        None,
    responsible_id: None,
    description:    "Reunión".into(),
    capacity:       0,
    active:         true,
    created_at:     now,
    updated_at:     now,
  }
}

fn input(extra: serde_json::Value) -> EventInput {
  let mut body = json!({
    "name": "IA Workshop",
    "category": "workshop",
    "date": "2025-05-01",
    "start_time": "10:00",
    "end_time": "12:00",
    "venue": "Lab 3",
    "audience": "students",
    "description": "Intro to AI",
    "capacity": 30,
    "responsible": null,
  });
  if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
    body.extend(extra.clone());
  }
  serde_json::from_value(body).unwrap()
}

// ── Delete ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_failure_is_typed_persistence_error() {
  let event = stored_event(Audience::Teachers);
  let id = event.event_id;
  let store = ScriptedStore { event: Some(event), down: true, ..Default::default() };

  let err = events::delete(&store, &actor(Some(Role::Administrator)), id)
    .await
    .unwrap_err();

  let AccessError::Persistence { code, source } = err else {
    panic!("expected a persistence error");
  };
  assert_eq!(code, "delete_failed");
  assert_eq!(source.to_string(), "database is locked");
}

#[tokio::test]
async fn delete_is_refused_before_touching_the_store() {
  let event = stored_event(Audience::Students);
  let id = event.event_id;
  let store = ScriptedStore { event: Some(event), ..Default::default() };

  let err = events::delete(&store, &actor(Some(Role::Teacher)), id).await.unwrap_err();
  assert!(matches!(err, AccessError::Forbidden(_)));
  assert!(store.deleted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn delete_of_unknown_event_is_not_found() {
  let store = ScriptedStore::default();
  let err = events::delete(&store, &actor(Some(Role::Administrator)), Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(err, AccessError::NotFound { kind: "event", .. }));
}

// ── Create / update conflicts ────────────────────────────────────────────────

#[tokio::test]
async fn vanished_responsible_is_a_field_error() {
  let responsible = Uuid::new_v4();
  let store = ScriptedStore {
    conflict: Some(EventConflict::ResponsibleMissing(responsible)),
    ..Default::default()
  };

  let err = events::create(
    &store,
    &actor(Some(Role::Administrator)),
    input(json!({ "responsible": responsible })),
  )
  .await
  .unwrap_err();

  let AccessError::Validation(errors) = err else {
    panic!("expected a validation error");
  };
  assert!(errors.field("responsible").is_some());
}

#[tokio::test]
async fn event_deleted_during_update_is_not_found() {
  let event = stored_event(Audience::Students);
  let id = event.event_id;
  let store = ScriptedStore {
    event: Some(event),
    conflict: Some(EventConflict::EventMissing),
    ..Default::default()
  };

  let err = events::update(&store, &actor(Some(Role::Administrator)), input(json!({ "id": id })))
    .await
    .unwrap_err();
  assert!(matches!(err, AccessError::NotFound { id: missing, .. } if missing == id));
}

#[tokio::test]
async fn update_drops_program_for_new_audience() {
  let event = stored_event(Audience::Students);
  let id = event.event_id;
  let store = ScriptedStore { event: Some(event), ..Default::default() };

  let updated = events::update(
    &store,
    &actor(Some(Role::Administrator)),
    input(json!({ "id": id, "audience": "teachers", "program": "icc" })),
  )
  .await
  .unwrap();
  assert_eq!(updated.audience, Audience::Teachers);
  assert_eq!(updated.program, None);
}

// ── Visibility ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn hidden_event_reads_as_missing() {
  let event = stored_event(Audience::Teachers);
  let id = event.event_id;
  let store = ScriptedStore { event: Some(event), ..Default::default() };

  let err = events::get(&store, &actor(Some(Role::Student)), id).await.unwrap_err();
  assert!(matches!(err, AccessError::NotFound { .. }));
  assert!(events::get(&store, &actor(Some(Role::Teacher)), id).await.is_ok());
  assert!(events::list_active(&store, &actor(None)).await.unwrap().is_empty());
}

#[tokio::test]
async fn profile_listing_needs_administrator() {
  let store = ScriptedStore::default();
  let err = profiles::list(&store, &actor(Some(Role::Student)), Role::Student)
    .await
    .unwrap_err();
  assert!(matches!(err, AccessError::Forbidden(_)));
}
