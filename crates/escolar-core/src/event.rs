//! Academic events — the catalog the visibility policy guards.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

// ─── Enumerations ────────────────────────────────────────────────────────────

/// What kind of activity an event is.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  #[serde(alias = "conferencia")]
  #[strum(to_string = "conference", serialize = "conferencia")]
  Conference,
  #[serde(alias = "taller")]
  #[strum(to_string = "workshop", serialize = "taller")]
  Workshop,
  #[serde(alias = "seminario")]
  #[strum(to_string = "seminar", serialize = "seminario")]
  Seminar,
  #[serde(alias = "concurso")]
  #[strum(to_string = "contest", serialize = "concurso")]
  Contest,
}

/// Who an event is meant for. This is the tag the visibility policy filters
/// on.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
  #[serde(alias = "estudiantes")]
  #[strum(to_string = "students", serialize = "estudiantes")]
  Students,
  #[serde(alias = "profesores")]
  #[strum(to_string = "teachers", serialize = "profesores")]
  Teachers,
  #[serde(alias = "publico_general", alias = "general-public")]
  #[strum(
    to_string = "general_public",
    serialize = "publico_general",
    serialize = "general-public"
  )]
  GeneralPublic,
}

/// Academic programme an event is restricted to. Only meaningful for
/// [`Audience::Students`].
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Program {
  /// Computer science engineering.
  Icc,
  /// Computer science (licentiate).
  Lcc,
  /// Information technology engineering.
  Iti,
}

// ─── Fields ──────────────────────────────────────────────────────────────────

/// The caller-controlled attributes of an event, already validated.
///
/// Produced by [`crate::validate::EventInput::validate`]; create and update
/// both persist a complete `EventFields`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
  pub name:           String,
  pub category:       Category,
  pub date:           NaiveDate,
  pub start_time:     NaiveTime,
  pub end_time:       NaiveTime,
  pub venue:          String,
  pub audience:       Audience,
  pub program:        Option<Program>,
  pub responsible_id: Option<Uuid>,
  pub description:    String,
  pub capacity:       u32,
}

impl EventFields {
  /// Enforce the programme invariant: a programme only survives when the
  /// audience is students.
  pub fn normalized(mut self) -> Self {
    if self.audience != Audience::Students {
      self.program = None;
    }
    self
  }
}

// ─── Event ───────────────────────────────────────────────────────────────────

/// A persisted academic event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
  pub event_id:       Uuid,
  /// The administrator who created the event. Deleting that identity deletes
  /// the event.
  pub owner_id:       Option<Uuid>,
  pub name:           String,
  pub category:       Category,
  pub date:           NaiveDate,
  pub start_time:     NaiveTime,
  pub end_time:       NaiveTime,
  pub venue:          String,
  pub audience:       Audience,
  pub program:        Option<Program>,
  /// Set to null when the referenced identity is deleted.
  pub responsible_id: Option<Uuid>,
  pub description:    String,
  pub capacity:       u32,
  /// Soft-delete marker. Deletion is physical, so in practice every stored
  /// event is active.
  pub active:         bool,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fields(audience: Audience, program: Option<Program>) -> EventFields {
    EventFields {
      name: "IA Workshop".into(),
      category: Category::Workshop,
      date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
      start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
      end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
      venue: "Lab 3".into(),
      audience,
      program,
      responsible_id: None,
      description: "Intro to AI".into(),
      capacity: 30,
    }
  }

  #[test]
  fn normalized_clears_program_outside_students() {
    let f = fields(Audience::Teachers, Some(Program::Icc)).normalized();
    assert_eq!(f.program, None);
    let f = fields(Audience::GeneralPublic, Some(Program::Lcc)).normalized();
    assert_eq!(f.program, None);
  }

  #[test]
  fn normalized_keeps_program_for_students() {
    let f = fields(Audience::Students, Some(Program::Iti)).normalized();
    assert_eq!(f.program, Some(Program::Iti));
  }

  #[test]
  fn legacy_enum_values_parse() {
    assert_eq!("taller".parse::<Category>().unwrap(), Category::Workshop);
    assert_eq!("estudiantes".parse::<Audience>().unwrap(), Audience::Students);
    assert_eq!(
      "publico_general".parse::<Audience>().unwrap(),
      Audience::GeneralPublic
    );
    assert_eq!("icc".parse::<Program>().unwrap(), Program::Icc);
    assert_eq!(Audience::GeneralPublic.to_string(), "general_public");
  }
}
