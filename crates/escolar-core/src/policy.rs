//! Visibility policy and authorization checks.
//!
//! Both are pure functions of the actor's role; nothing here touches the
//! store.

use crate::{
  AccessError,
  actor::{Actor, Role},
  event::Audience,
};

/// The set of target audiences an actor may read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
  /// Every audience.
  All,
  /// Only the listed audiences.
  Only(Vec<Audience>),
}

impl Visibility {
  pub fn permits(&self, audience: Audience) -> bool {
    match self {
      Self::All => true,
      Self::Only(allowed) => allowed.contains(&audience),
    }
  }
}

/// Map a role to the audiences it may read.
///
/// An identity without a role is treated as a member of the general public.
pub fn visible_audiences(role: Option<Role>) -> Visibility {
  match role {
    Some(Role::Administrator) => Visibility::All,
    Some(Role::Student) => {
      Visibility::Only(vec![Audience::Students, Audience::GeneralPublic])
    }
    Some(Role::Teacher) => {
      Visibility::Only(vec![Audience::Teachers, Audience::GeneralPublic])
    }
    None => Visibility::Only(vec![Audience::GeneralPublic]),
  }
}

/// Fail with [`AccessError::Forbidden`] unless `actor` is an administrator.
///
/// `denial` is the caller-facing message.
pub fn require_administrator(
  actor: &Actor,
  denial: &'static str,
) -> Result<(), AccessError> {
  if actor.is_administrator() {
    Ok(())
  } else {
    tracing::warn!(
      username = %actor.username,
      role = ?actor.role,
      "{denial}"
    );
    Err(AccessError::Forbidden(denial))
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  fn actor(role: Option<Role>) -> Actor {
    Actor { identity_id: Uuid::new_v4(), username: "someone".into(), role }
  }

  #[test]
  fn student_sees_students_and_public() {
    let v = visible_audiences(Some(Role::Student));
    assert!(v.permits(Audience::Students));
    assert!(v.permits(Audience::GeneralPublic));
    assert!(!v.permits(Audience::Teachers));
  }

  #[test]
  fn teacher_sees_teachers_and_public() {
    let v = visible_audiences(Some(Role::Teacher));
    assert!(v.permits(Audience::Teachers));
    assert!(v.permits(Audience::GeneralPublic));
    assert!(!v.permits(Audience::Students));
  }

  #[test]
  fn administrator_sees_everything() {
    assert_eq!(visible_audiences(Some(Role::Administrator)), Visibility::All);
  }

  #[test]
  fn roleless_actor_sees_only_public() {
    let v = visible_audiences(None);
    assert!(v.permits(Audience::GeneralPublic));
    assert!(!v.permits(Audience::Students));
    assert!(!v.permits(Audience::Teachers));
  }

  #[test]
  fn only_administrators_pass_the_mutation_check() {
    assert!(require_administrator(&actor(Some(Role::Administrator)), "no").is_ok());
    for role in [Some(Role::Student), Some(Role::Teacher), None] {
      assert!(matches!(
        require_administrator(&actor(role), "no"),
        Err(AccessError::Forbidden("no"))
      ));
    }
  }
}
