//! `/events`: list, fetch, create, replace and delete.
//!
//! The event id travels in the query string for `GET` and `DELETE` and in
//! the body for `PUT`.

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use escolar_core::{access::events, store::SchoolStore, validate::EventInput};
use serde::Deserialize;
use serde_json::json;

use super::required_id;
use crate::{AppState, auth::Authenticated, error::ApiError, extract::JsonBody};

#[derive(Debug, Default, Deserialize)]
pub struct EventQuery {
  pub id: Option<String>,
}

/// `GET /events` lists active events; `GET /events?id=` fetches one.
pub async fn get<S>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
  Query(query): Query<EventQuery>,
) -> Result<Response, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
{
  let store = state.store.as_ref();
  match query.id.as_deref() {
    None => {
      let list = events::list_active(store, &actor).await?;
      Ok(Json(list).into_response())
    }
    Some(raw) => {
      let id = required_id("id", Some(raw))?;
      let event = events::get(store, &actor, id).await?;
      Ok(Json(event).into_response())
    }
  }
}

pub async fn create<S>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
  JsonBody(input): JsonBody<EventInput>,
) -> Result<Response, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
{
  let event = events::create(state.store.as_ref(), &actor, input).await?;
  Ok(
    (
      StatusCode::CREATED,
      Json(json!({ "created_event_id": event.event_id })),
    )
      .into_response(),
  )
}

pub async fn update<S>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
  JsonBody(input): JsonBody<EventInput>,
) -> Result<Response, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
{
  let event = events::update(state.store.as_ref(), &actor, input).await?;
  Ok(Json(json!({ "message": "event updated", "event": event })).into_response())
}

pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Authenticated(actor): Authenticated,
  Query(query): Query<EventQuery>,
) -> Result<Response, ApiError>
where
  S: SchoolStore + Clone + Send + Sync + 'static,
{
  let id = required_id("id", query.id.as_deref())?;
  events::delete(state.store.as_ref(), &actor, id).await?;
  Ok(Json(json!({ "details": "event deleted" })).into_response())
}
