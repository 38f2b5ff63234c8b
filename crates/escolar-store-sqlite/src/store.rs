//! [`SqliteStore`] — the SQLite implementation of [`SchoolStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use escolar_core::{
  actor::{Actor, Identity, NewIdentity, Role},
  event::{Event, EventFields},
  policy::Visibility,
  profile::{Profile, ProfileAttributes},
  store::{EventConflict, SchoolStore},
};

use crate::{
  Error, Result,
  encode::{
    EVENT_COLUMNS, IDENTITY_COLUMNS, PROFILE_COLUMNS, RawActor, RawEvent,
    RawIdentity, RawProfile, encode_attributes, encode_date, encode_dt,
    encode_role, encode_time, encode_uuid, now,
  },
  schema::SCHEMA,
};

/// Whether `identity_id` names a stored identity. Runs on the caller's
/// connection or transaction.
fn identity_exists(conn: &rusqlite::Connection, identity_id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM identities WHERE identity_id = ?1",
        rusqlite::params![identity_id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Escolar store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Bound parameters for the caller-controlled event columns, in the order
/// `name, category, date, start_time, end_time, venue, audience, program,
/// responsible_id, description, capacity`.
struct EventParams {
  name:           String,
  category:       String,
  date:           String,
  start_time:     String,
  end_time:       String,
  venue:          String,
  audience:       String,
  program:        Option<String>,
  responsible_id: Option<String>,
  description:    String,
  capacity:       i64,
}

impl From<&EventFields> for EventParams {
  fn from(f: &EventFields) -> Self {
    Self {
      name:           f.name.clone(),
      category:       f.category.to_string(),
      date:           encode_date(f.date),
      start_time:     encode_time(f.start_time),
      end_time:       encode_time(f.end_time),
      venue:          f.venue.clone(),
      audience:       f.audience.to_string(),
      program:        f.program.map(|p| p.to_string()),
      responsible_id: f.responsible_id.map(encode_uuid),
      description:    f.description.clone(),
      capacity:       i64::from(f.capacity),
    }
  }
}

/// The conflict to report when the named responsible identity is gone.
fn responsible_conflict(
  conn: &rusqlite::Connection,
  p: &EventParams,
) -> rusqlite::Result<Option<EventConflict>> {
  let Some(responsible) = p.responsible_id.as_deref() else {
    return Ok(None);
  };
  if identity_exists(conn, responsible)? {
    return Ok(None);
  }
  Ok(
    Uuid::parse_str(responsible)
      .ok()
      .map(EventConflict::ResponsibleMissing),
  )
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SchoolStore impl ────────────────────────────────────────────────────────

impl SchoolStore for SqliteStore {
  type Error = Error;

  // ── Identities ────────────────────────────────────────────────────────────

  async fn add_identity(&self, input: NewIdentity) -> Result<Identity> {
    let identity = Identity {
      identity_id: Uuid::new_v4(),
      username:    input.username,
      first_name:  input.first_name,
      last_name:   input.last_name,
      email:       input.email,
      role:        input.role,
      created_at:  now(),
    };

    let id_str     = encode_uuid(identity.identity_id);
    let username   = identity.username.clone();
    let first_name = identity.first_name.clone();
    let last_name  = identity.last_name.clone();
    let email      = identity.email.clone();
    let role_str   = encode_role(identity.role);
    let at_str     = encode_dt(identity.created_at);
    let profile    = identity
      .role
      .map(|role| encode_attributes(&ProfileAttributes::empty(role)))
      .transpose()?;
    let profile_id = encode_uuid(Uuid::new_v4());

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let taken = tx
          .query_row(
            "SELECT 1 FROM identities WHERE username = ?1",
            rusqlite::params![username],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(false);
        }

        tx.execute(
          "INSERT INTO identities (
             identity_id, username, first_name, last_name, email, role, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str, username, first_name, last_name, email, role_str, at_str
          ],
        )?;

        if let (Some(role), Some(attributes)) = (role_str.as_deref(), profile) {
          tx.execute(
            "INSERT INTO profiles (profile_id, identity_id, role, attributes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![profile_id, id_str, role, attributes, at_str],
          )?;
        }

        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::UsernameTaken(identity.username));
    }
    Ok(identity)
  }

  async fn find_identity(&self, username: String) -> Result<Option<Identity>> {
    let sql = format!("SELECT {IDENTITY_COLUMNS} FROM identities WHERE username = ?1");

    let raw: Option<RawIdentity> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![username], RawIdentity::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawIdentity::into_identity).transpose()
  }

  async fn delete_identity(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let removed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM identities WHERE identity_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(n > 0)
      })
      .await?;
    Ok(removed)
  }

  // ── Bearer tokens ─────────────────────────────────────────────────────────

  async fn store_token(&self, identity_id: Uuid, digest: String) -> Result<()> {
    let id_str = encode_uuid(identity_id);
    let at_str = encode_dt(now());

    let stored = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !identity_exists(&tx, &id_str)? {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO tokens (digest, identity_id, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![digest, id_str, at_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !stored {
      return Err(Error::IdentityNotFound(identity_id));
    }
    Ok(())
  }

  async fn resolve_token(&self, digest: String) -> Result<Option<Actor>> {
    let raw: Option<RawActor> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT i.identity_id, i.username, i.role
               FROM tokens t
               JOIN identities i ON i.identity_id = t.identity_id
               WHERE t.digest = ?1",
              rusqlite::params![digest],
              |row| {
                Ok(RawActor {
                  identity_id: row.get(0)?,
                  username:    row.get(1)?,
                  role:        row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawActor::into_actor).transpose()
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn get_profile(&self, identity_id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(identity_id);
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE identity_id = ?1");

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawProfile::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn list_profiles(&self, role: Role) -> Result<Vec<Profile>> {
    let role_str = role.to_string();
    let sql = format!(
      "SELECT {PROFILE_COLUMNS} FROM profiles WHERE role = ?1
       ORDER BY created_at, rowid"
    );

    let raws: Vec<RawProfile> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![role_str], RawProfile::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  async fn replace_profile(
    &self,
    identity_id: Uuid,
    attributes:  ProfileAttributes,
  ) -> Result<Option<Profile>> {
    let id_str    = encode_uuid(identity_id);
    let role_str  = attributes.role().to_string();
    let attrs_str = encode_attributes(&attributes)?;
    let at_str    = encode_dt(now());
    let select    = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE identity_id = ?1");

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE profiles SET attributes = ?1, updated_at = ?2
           WHERE identity_id = ?3 AND role = ?4",
          rusqlite::params![attrs_str, at_str, id_str, role_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let raw = tx.query_row(&select, rusqlite::params![id_str], RawProfile::from_row)?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn list_active_events(&self, visibility: Visibility) -> Result<Vec<Event>> {
    let audiences: Option<Vec<String>> = match visibility {
      Visibility::All => None,
      Visibility::Only(allowed) => {
        if allowed.is_empty() {
          return Ok(Vec::new());
        }
        Some(allowed.iter().map(ToString::to_string).collect())
      }
    };

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let audience_clause = match &audiences {
          Some(list) => {
            let placeholders = vec!["?"; list.len()].join(", ");
            format!("AND audience IN ({placeholders})")
          }
          None => String::new(),
        };

        let sql = format!(
          "SELECT {EVENT_COLUMNS} FROM events
           WHERE active = 1 {audience_clause}
           ORDER BY date, start_time, created_at, rowid"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(audiences.iter().flatten()),
            RawEvent::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
    let id_str = encode_uuid(id);
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = ?1");

    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawEvent::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn insert_event(
    &self,
    owner_id: Uuid,
    fields: EventFields,
  ) -> Result<Result<Event, EventConflict>> {
    let fields = fields.normalized();
    let stamp = now();
    let event = Event {
      event_id:       Uuid::new_v4(),
      owner_id:       Some(owner_id),
      name:           fields.name.clone(),
      category:       fields.category,
      date:           fields.date,
      start_time:     fields.start_time,
      end_time:       fields.end_time,
      venue:          fields.venue.clone(),
      audience:       fields.audience,
      program:        fields.program,
      responsible_id: fields.responsible_id,
      description:    fields.description.clone(),
      capacity:       fields.capacity,
      active:         true,
      created_at:     stamp,
      updated_at:     stamp,
    };

    let p        = EventParams::from(&fields);
    let id_str   = encode_uuid(event.event_id);
    let owner    = encode_uuid(owner_id);
    let at_str   = encode_dt(stamp);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(conflict) = responsible_conflict(&tx, &p)? {
          return Ok(Err(conflict));
        }
        tx.execute(
          "INSERT INTO events (
             event_id, owner_id, name, category, date, start_time, end_time,
             venue, audience, program, responsible_id, description, capacity,
             active, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 1, ?14, ?14)",
          rusqlite::params![
            id_str,
            owner,
            p.name,
            p.category,
            p.date,
            p.start_time,
            p.end_time,
            p.venue,
            p.audience,
            p.program,
            p.responsible_id,
            p.description,
            p.capacity,
            at_str,
          ],
        )?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    Ok(outcome.map(|()| event))
  }

  async fn replace_event(
    &self,
    id: Uuid,
    fields: EventFields,
  ) -> Result<Result<Event, EventConflict>> {
    let p      = EventParams::from(&fields.normalized());
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());
    let select = format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = ?1");

    let raw: Result<RawEvent, EventConflict> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if let Some(conflict) = responsible_conflict(&tx, &p)? {
          return Ok(Err(conflict));
        }
        let changed = tx.execute(
          "UPDATE events SET
             name = ?2, category = ?3, date = ?4, start_time = ?5, end_time = ?6,
             venue = ?7, audience = ?8, program = ?9, responsible_id = ?10,
             description = ?11, capacity = ?12, updated_at = ?13
           WHERE event_id = ?1",
          rusqlite::params![
            id_str,
            p.name,
            p.category,
            p.date,
            p.start_time,
            p.end_time,
            p.venue,
            p.audience,
            p.program,
            p.responsible_id,
            p.description,
            p.capacity,
            at_str,
          ],
        )?;
        if changed == 0 {
          return Ok(Err(EventConflict::EventMissing));
        }
        let raw = tx.query_row(&select, rusqlite::params![id_str], RawEvent::from_row)?;
        tx.commit()?;
        Ok(Ok(raw))
      })
      .await?;

    match raw {
      Ok(raw) => raw.into_event().map(Ok),
      Err(conflict) => Ok(Err(conflict)),
    }
  }

  async fn delete_event(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "DELETE FROM events WHERE event_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;
    Ok(removed)
  }
}
