//! Event input validation.
//!
//! Request bodies are accepted loosely (every key is an arbitrary JSON value)
//! so that a bad type is reported as a field error alongside every other
//! problem, rather than aborting deserialisation at the first mismatch.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum::IntoEnumIterator;
use uuid::Uuid;

use crate::event::{Audience, Category, EventFields, Program};

pub const NAME_MAX_CHARS: usize = 255;
pub const VENUE_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MAX_CHARS: usize = 300;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Field-level validation messages, keyed by input field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
  pub fn single(field: &str, message: impl Into<String>) -> Self {
    let mut errors = Self::default();
    errors.add(field, message);
    errors
  }

  pub fn add(&mut self, field: &str, message: impl Into<String>) {
    self.0.entry(field.to_owned()).or_default().push(message.into());
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Messages recorded for `field`, if any.
  pub fn field(&self, field: &str) -> Option<&[String]> {
    self.0.get(field).map(Vec::as_slice)
  }

  pub fn fields(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let fields: Vec<&str> = self.fields().collect();
    write!(f, "invalid fields: {}", fields.join(", "))
  }
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Which operation the input is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// `capacity` defaults to 0 and `responsible` to none.
  Create,
  /// Full replace: every key except `program` must be present.
  Replace,
}

/// Raw event input. `None` means the key was absent; `Some(Value::Null)`
/// means it was sent as `null`.
///
/// The legacy Spanish keys are accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventInput {
  #[serde(default, deserialize_with = "present")]
  pub id:          Option<Value>,
  #[serde(default, deserialize_with = "present", alias = "nombre_evento")]
  pub name:        Option<Value>,
  #[serde(default, deserialize_with = "present", alias = "tipo_evento")]
  pub category:    Option<Value>,
  #[serde(default, deserialize_with = "present", alias = "fecha_realizacion")]
  pub date:        Option<Value>,
  #[serde(
    default,
    deserialize_with = "present",
    alias = "start",
    alias = "hora_inicio"
  )]
  pub start_time:  Option<Value>,
  #[serde(
    default,
    deserialize_with = "present",
    alias = "end",
    alias = "hora_fin"
  )]
  pub end_time:    Option<Value>,
  #[serde(default, deserialize_with = "present", alias = "lugar")]
  pub venue:       Option<Value>,
  #[serde(default, deserialize_with = "present", alias = "publico_objetivo")]
  pub audience:    Option<Value>,
  #[serde(default, deserialize_with = "present", alias = "programa_educativo")]
  pub program:     Option<Value>,
  #[serde(default, deserialize_with = "present", alias = "responsable")]
  pub responsible: Option<Value>,
  #[serde(default, deserialize_with = "present", alias = "descripcion_breve")]
  pub description: Option<Value>,
  #[serde(default, deserialize_with = "present", alias = "cupo_maximo")]
  pub capacity:    Option<Value>,
}

/// Keep explicit `null`s distinguishable from absent keys.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
  D: Deserializer<'de>,
{
  Value::deserialize(deserializer).map(Some)
}

impl EventInput {
  /// The `id` key, required when replacing an event.
  pub fn event_id(&self) -> Result<Uuid, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    match self.id.clone() {
      None | Some(Value::Null) => {
        errors.add("id", "this field is required");
        Err(errors)
      }
      Some(v) => identifier(&mut errors, "id", v).ok_or(errors),
    }
  }

  /// Validate every field and produce normalised [`EventFields`], or the
  /// complete set of field errors.
  pub fn validate(self, mode: Mode) -> Result<EventFields, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = required(&mut errors, "name", self.name)
      .and_then(|v| text(&mut errors, "name", v, NAME_MAX_CHARS));
    let category = required(&mut errors, "category", self.category)
      .and_then(|v| choice::<Category>(&mut errors, "category", v));
    let date = required(&mut errors, "date", self.date)
      .and_then(|v| date(&mut errors, "date", v));
    let start_time = required(&mut errors, "start_time", self.start_time)
      .and_then(|v| time(&mut errors, "start_time", v));
    let end_time = required(&mut errors, "end_time", self.end_time)
      .and_then(|v| time(&mut errors, "end_time", v));
    let venue = required(&mut errors, "venue", self.venue)
      .and_then(|v| text(&mut errors, "venue", v, VENUE_MAX_CHARS));
    let audience = required(&mut errors, "audience", self.audience)
      .and_then(|v| choice::<Audience>(&mut errors, "audience", v));
    let description = required(&mut errors, "description", self.description)
      .and_then(|v| text(&mut errors, "description", v, DESCRIPTION_MAX_CHARS));

    let capacity = match (mode, self.capacity) {
      (Mode::Create, None) => Some(0),
      (Mode::Replace, None) => missing(&mut errors, "capacity"),
      (_, Some(v)) => capacity(&mut errors, "capacity", v),
    };

    let responsible_id = match (mode, self.responsible) {
      (Mode::Create, None) | (_, Some(Value::Null)) => Some(None),
      (Mode::Replace, None) => missing(&mut errors, "responsible"),
      (_, Some(v)) => identifier(&mut errors, "responsible", v).map(Some),
    };

    // A programme submitted for a non-student audience is discarded, not
    // rejected. An empty string means no programme.
    let program = match (audience, self.program) {
      (Some(Audience::Students), Some(v)) if !is_blank(&v) => {
        choice::<Program>(&mut errors, "program", v).map(Some)
      }
      _ => Some(None),
    };

    if let (Some(start), Some(end)) = (start_time, end_time)
      && end <= start
    {
      errors.add("end_time", "must be later than start_time");
    }

    let (
      Some(name),
      Some(category),
      Some(date),
      Some(start_time),
      Some(end_time),
      Some(venue),
      Some(audience),
      Some(program),
      Some(responsible_id),
      Some(description),
      Some(capacity),
    ) = (
      name,
      category,
      date,
      start_time,
      end_time,
      venue,
      audience,
      program,
      responsible_id,
      description,
      capacity,
    )
    else {
      return Err(errors);
    };

    if !errors.is_empty() {
      return Err(errors);
    }

    Ok(
      EventFields {
        name,
        category,
        date,
        start_time,
        end_time,
        venue,
        audience,
        program,
        responsible_id,
        description,
        capacity,
      }
      .normalized(),
    )
  }
}

// ─── Field parsers ───────────────────────────────────────────────────────────
//
// Each parser records its own error and returns `None` on failure.

fn is_blank(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::String(s) => s.trim().is_empty(),
    _ => false,
  }
}

fn missing<T>(errors: &mut ValidationErrors, field: &str) -> Option<T> {
  errors.add(field, "this field is required");
  None
}

fn required(
  errors: &mut ValidationErrors,
  field: &str,
  value: Option<Value>,
) -> Option<Value> {
  match value {
    None | Some(Value::Null) => missing(errors, field),
    Some(v) => Some(v),
  }
}

fn string(
  errors: &mut ValidationErrors,
  field: &str,
  value: Value,
) -> Option<String> {
  match value {
    Value::String(s) => Some(s),
    _ => {
      errors.add(field, "must be a string");
      None
    }
  }
}

fn text(
  errors: &mut ValidationErrors,
  field: &str,
  value: Value,
  max_chars: usize,
) -> Option<String> {
  let s = string(errors, field, value)?;
  let trimmed = s.trim();
  if trimmed.is_empty() {
    errors.add(field, "may not be blank");
    return None;
  }
  if trimmed.chars().count() > max_chars {
    errors.add(field, format!("must be at most {max_chars} characters"));
    return None;
  }
  Some(trimmed.to_owned())
}

fn choice<T>(errors: &mut ValidationErrors, field: &str, value: Value) -> Option<T>
where
  T: FromStr + IntoEnumIterator + fmt::Display,
{
  let s = string(errors, field, value)?;
  match s.parse::<T>() {
    Ok(v) => Some(v),
    Err(_) => {
      let expected: Vec<String> = T::iter().map(|v| v.to_string()).collect();
      errors.add(
        field,
        format!("{s:?} is not a valid choice; expected one of: {}", expected.join(", ")),
      );
      None
    }
  }
}

fn date(
  errors: &mut ValidationErrors,
  field: &str,
  value: Value,
) -> Option<NaiveDate> {
  let s = string(errors, field, value)?;
  match NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
    Ok(d) => Some(d),
    Err(_) => {
      errors.add(field, "must be a date formatted as YYYY-MM-DD");
      None
    }
  }
}

fn time(
  errors: &mut ValidationErrors,
  field: &str,
  value: Value,
) -> Option<NaiveTime> {
  let s = string(errors, field, value)?;
  let s = s.trim();
  match NaiveTime::parse_from_str(s, "%H:%M:%S")
    .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S%.f"))
    .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
  {
    Ok(t) => Some(t),
    Err(_) => {
      errors.add(field, "must be a time formatted as HH:MM or HH:MM:SS");
      None
    }
  }
}

fn capacity(
  errors: &mut ValidationErrors,
  field: &str,
  value: Value,
) -> Option<u32> {
  let parsed = match &value {
    Value::Number(n) => n.as_i64(),
    Value::String(s) => s.trim().parse::<i64>().ok(),
    _ => None,
  };
  match parsed {
    Some(n) if n < 0 => {
      errors.add(field, "must be zero or greater");
      None
    }
    Some(n) => match u32::try_from(n) {
      Ok(n) => Some(n),
      Err(_) => {
        errors.add(field, "is too large");
        None
      }
    },
    None => {
      errors.add(field, "must be an integer");
      None
    }
  }
}

fn identifier(errors: &mut ValidationErrors, field: &str, value: Value) -> Option<Uuid> {
  let s = string(errors, field, value)?;
  match Uuid::parse_str(s.trim()) {
    Ok(id) => Some(id),
    Err(_) => {
      errors.add(field, "must be a valid identifier");
      None
    }
  }
}
