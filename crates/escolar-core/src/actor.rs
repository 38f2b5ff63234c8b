//! Identities, roles and the authenticated actor.
//!
//! Identities are accounts; each holds at most one [`Role`]. The role is
//! resolved once, at authentication time, and carried on the [`Actor`] into
//! every access-service call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// The role an identity holds. Spanish group names from the legacy system
/// are accepted on input.
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
pub enum Role {
  #[serde(alias = "administrador")]
  #[strum(to_string = "administrator", serialize = "administrador")]
  Administrator,
  #[serde(alias = "alumno")]
  #[strum(to_string = "student", serialize = "alumno")]
  Student,
  #[serde(alias = "maestro")]
  #[strum(to_string = "teacher", serialize = "maestro")]
  Teacher,
}

/// An account. Profiles and events reference identities; they never own
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
  pub identity_id: Uuid,
  pub username:    String,
  pub first_name:  String,
  pub last_name:   String,
  pub email:       String,
  pub role:        Option<Role>,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::SchoolStore::add_identity`].
#[derive(Debug, Clone)]
pub struct NewIdentity {
  pub username:   String,
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
  pub role:       Option<Role>,
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
  pub identity_id: Uuid,
  pub username:    String,
  pub role:        Option<Role>,
}

impl Actor {
  pub fn is_administrator(&self) -> bool {
    self.role == Some(Role::Administrator)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn role_parses_canonical_and_legacy_names() {
    assert_eq!("administrator".parse::<Role>().unwrap(), Role::Administrator);
    assert_eq!("administrador".parse::<Role>().unwrap(), Role::Administrator);
    assert_eq!("alumno".parse::<Role>().unwrap(), Role::Student);
    assert_eq!("maestro".parse::<Role>().unwrap(), Role::Teacher);
    assert!("janitor".parse::<Role>().is_err());
  }

  #[test]
  fn role_displays_canonical_name() {
    assert_eq!(Role::Administrator.to_string(), "administrator");
    assert_eq!(Role::Teacher.to_string(), "teacher");
  }
}
