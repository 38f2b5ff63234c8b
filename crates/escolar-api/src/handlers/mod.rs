//! Axum handlers, one module per resource.

pub mod events;
pub mod profiles;

use escolar_core::validate::ValidationErrors;
use uuid::Uuid;

use crate::error::ApiError;

/// Parse a required identifier taken from the query string.
fn required_id(field: &str, raw: Option<&str>) -> Result<Uuid, ApiError> {
  let raw = raw
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .ok_or_else(|| ValidationErrors::single(field, "this field is required"))?;
  Uuid::parse_str(raw)
    .map_err(|_| ValidationErrors::single(field, "must be a valid identifier").into())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn required_id_reports_missing_and_malformed() {
    let Err(ApiError::Validation(errors)) = required_id("id", None) else {
      panic!("expected a validation error");
    };
    assert_eq!(errors.field("id").unwrap(), ["this field is required"]);

    let Err(ApiError::Validation(errors)) = required_id("id", Some("42")) else {
      panic!("expected a validation error");
    };
    assert_eq!(errors.field("id").unwrap(), ["must be a valid identifier"]);

    let id = Uuid::new_v4();
    assert_eq!(required_id("id", Some(&id.to_string())).unwrap(), id);
  }
}
