//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 with fixed microsecond precision so they sort
//! lexically. Calendar dates and wall-clock times use `%Y-%m-%d` and
//! `%H:%M:%S` (plus any fractional seconds). Enumerations are stored by their canonical name.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, SubsecRound as _, Utc};
use escolar_core::{
  actor::{Actor, Identity, Role},
  event::{Audience, Category, Event, Program},
  profile::{Profile, ProfileAttributes},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

/// The current time at the precision timestamps are stored with, so values
/// returned from writes compare equal to values read back later.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

/// `%H:%M:%S`, with a fractional part only when the time has one.
pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M:%S%.f").to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
    .map_err(|e| Error::Decode(format!("time {s:?}: {e}")))
}

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Parse a stored enum name. `kind` names the column for the error message.
pub fn decode_variant<T: FromStr>(kind: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| {
    Error::Core(escolar_core::Error::UnknownVariant {
      kind,
      value: s.to_owned(),
    })
  })
}

pub fn encode_role(role: Option<Role>) -> Option<String> {
  role.map(|r| r.to_string())
}

pub fn decode_role(s: Option<&str>) -> Result<Option<Role>> {
  s.map(|s| decode_variant("role", s)).transpose()
}

pub fn encode_attributes(attributes: &ProfileAttributes) -> Result<String> {
  Ok(serde_json::to_string(attributes)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every `SELECT` that produces a [`RawIdentity`].
pub const IDENTITY_COLUMNS: &str =
  "identity_id, username, first_name, last_name, email, role, created_at";

/// Raw strings read directly from an `identities` row.
pub struct RawIdentity {
  pub identity_id: String,
  pub username:    String,
  pub first_name:  String,
  pub last_name:   String,
  pub email:       String,
  pub role:        Option<String>,
  pub created_at:  String,
}

impl RawIdentity {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      identity_id: row.get(0)?,
      username:    row.get(1)?,
      first_name:  row.get(2)?,
      last_name:   row.get(3)?,
      email:       row.get(4)?,
      role:        row.get(5)?,
      created_at:  row.get(6)?,
    })
  }

  pub fn into_identity(self) -> Result<Identity> {
    Ok(Identity {
      identity_id: decode_uuid(&self.identity_id)?,
      username:    self.username,
      first_name:  self.first_name,
      last_name:   self.last_name,
      email:       self.email,
      role:        decode_role(self.role.as_deref())?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings for the identity behind a token.
pub struct RawActor {
  pub identity_id: String,
  pub username:    String,
  pub role:        Option<String>,
}

impl RawActor {
  pub fn into_actor(self) -> Result<Actor> {
    Ok(Actor {
      identity_id: decode_uuid(&self.identity_id)?,
      username:    self.username,
      role:        decode_role(self.role.as_deref())?,
    })
  }
}

pub const PROFILE_COLUMNS: &str =
  "profile_id, identity_id, attributes, created_at, updated_at";

/// Raw strings read directly from a `profiles` row.
pub struct RawProfile {
  pub profile_id:  String,
  pub identity_id: String,
  pub attributes:  String,
  pub created_at:  String,
  pub updated_at:  Option<String>,
}

impl RawProfile {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      profile_id:  row.get(0)?,
      identity_id: row.get(1)?,
      attributes:  row.get(2)?,
      created_at:  row.get(3)?,
      updated_at:  row.get(4)?,
    })
  }

  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      profile_id:  decode_uuid(&self.profile_id)?,
      identity_id: decode_uuid(&self.identity_id)?,
      attributes:  serde_json::from_str(&self.attributes)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  self.updated_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

pub const EVENT_COLUMNS: &str = "event_id, owner_id, name, category, date, \
  start_time, end_time, venue, audience, program, responsible_id, \
  description, capacity, active, created_at, updated_at";

/// Raw values read directly from an `events` row.
pub struct RawEvent {
  pub event_id:       String,
  pub owner_id:       Option<String>,
  pub name:           String,
  pub category:       String,
  pub date:           String,
  pub start_time:     String,
  pub end_time:       String,
  pub venue:          String,
  pub audience:       String,
  pub program:        Option<String>,
  pub responsible_id: Option<String>,
  pub description:    String,
  pub capacity:       i64,
  pub active:         bool,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawEvent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:       row.get(0)?,
      owner_id:       row.get(1)?,
      name:           row.get(2)?,
      category:       row.get(3)?,
      date:           row.get(4)?,
      start_time:     row.get(5)?,
      end_time:       row.get(6)?,
      venue:          row.get(7)?,
      audience:       row.get(8)?,
      program:        row.get(9)?,
      responsible_id: row.get(10)?,
      description:    row.get(11)?,
      capacity:       row.get(12)?,
      active:         row.get(13)?,
      created_at:     row.get(14)?,
      updated_at:     row.get(15)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    let capacity = u32::try_from(self.capacity)
      .map_err(|_| Error::Decode(format!("capacity {}", self.capacity)))?;

    Ok(Event {
      event_id:       decode_uuid(&self.event_id)?,
      owner_id:       self.owner_id.as_deref().map(decode_uuid).transpose()?,
      name:           self.name,
      category:       decode_variant::<Category>("category", &self.category)?,
      date:           decode_date(&self.date)?,
      start_time:     decode_time(&self.start_time)?,
      end_time:       decode_time(&self.end_time)?,
      venue:          self.venue,
      audience:       decode_variant::<Audience>("audience", &self.audience)?,
      program:        self
        .program
        .as_deref()
        .map(|p| decode_variant::<Program>("program", p))
        .transpose()?,
      responsible_id: self
        .responsible_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      description:    self.description,
      capacity,
      active:         self.active,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}
