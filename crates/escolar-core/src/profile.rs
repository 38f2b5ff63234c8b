//! Role profiles — the one-to-one extension of an identity holding a role.
//!
//! Every attribute is optional; a fresh profile is created empty alongside
//! its identity and filled in later by its owner or an administrator.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actor::Role;

// ─── Attributes ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminAttributes {
  pub admin_key:  Option<String>,
  pub phone:      Option<String>,
  /// Mexican taxpayer registry code.
  pub rfc:        Option<String>,
  pub age:        Option<u32>,
  pub occupation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentAttributes {
  pub enrollment_id: Option<String>,
  /// Mexican population registry code.
  pub curp:          Option<String>,
  pub rfc:           Option<String>,
  pub birth_date:    Option<NaiveDate>,
  pub age:           Option<u32>,
  pub phone:         Option<String>,
  pub occupation:    Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeacherAttributes {
  pub employee_id:   Option<String>,
  pub birth_date:    Option<NaiveDate>,
  pub phone:         Option<String>,
  pub rfc:           Option<String>,
  pub cubicle:       Option<String>,
  pub age:           Option<u32>,
  pub research_area: Option<String>,
  /// Subjects taught.
  pub subjects:      Vec<String>,
}

/// Role-specific attributes, tagged with the role they belong to. This is
/// the body accepted when replacing a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ProfileAttributes {
  Administrator(AdminAttributes),
  Student(StudentAttributes),
  Teacher(TeacherAttributes),
}

impl ProfileAttributes {
  /// Empty attributes for a freshly-assigned role.
  pub fn empty(role: Role) -> Self {
    match role {
      Role::Administrator => Self::Administrator(AdminAttributes::default()),
      Role::Student => Self::Student(StudentAttributes::default()),
      Role::Teacher => Self::Teacher(TeacherAttributes::default()),
    }
  }

  pub fn role(&self) -> Role {
    match self {
      Self::Administrator(_) => Role::Administrator,
      Self::Student(_) => Role::Student,
      Self::Teacher(_) => Role::Teacher,
    }
  }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// A persisted profile.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
  pub profile_id:  Uuid,
  pub identity_id: Uuid,
  #[serde(flatten)]
  pub attributes:  ProfileAttributes,
  pub created_at:  DateTime<Utc>,
  /// Unset until the first update.
  pub updated_at:  Option<DateTime<Utc>>,
}

impl Profile {
  pub fn role(&self) -> Role { self.attributes.role() }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn attributes_deserialize_by_role_tag() {
    let attrs: ProfileAttributes = serde_json::from_value(json!({
      "role": "teacher",
      "cubicle": "B-12",
      "subjects": ["Compilers", "Automata"],
    }))
    .unwrap();
    let ProfileAttributes::Teacher(t) = attrs else {
      panic!("expected teacher attributes");
    };
    assert_eq!(t.cubicle.as_deref(), Some("B-12"));
    assert_eq!(t.subjects.len(), 2);
    assert_eq!(t.age, None);
  }

  #[test]
  fn profile_serializes_flat_with_role() {
    let profile = Profile {
      profile_id:  Uuid::new_v4(),
      identity_id: Uuid::new_v4(),
      attributes:  ProfileAttributes::Student(StudentAttributes {
        enrollment_id: Some("201900123".into()),
        ..Default::default()
      }),
      created_at:  Utc::now(),
      updated_at:  None,
    };
    let v = serde_json::to_value(&profile).unwrap();
    assert_eq!(v["role"], "student");
    assert_eq!(v["enrollment_id"], "201900123");
    assert_eq!(profile.role(), Role::Student);
  }
}
