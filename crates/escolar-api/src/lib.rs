//! HTTP layer for the Escolar events service.
//!
//! Exposes an axum [`Router`] backed by any [`SchoolStore`]. Every route
//! requires a bearer token; see [`auth`].

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod provision;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use escolar_core::store::SchoolStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{events, profiles};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ESCOLAR_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: SchoolStore> {
  pub store: Arc<S>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

pub fn router<S>(state: AppState<S>) -> Router
where
  S: SchoolStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route(
      "/events",
      get(events::get::<S>)
        .post(events::create::<S>)
        .put(events::update::<S>)
        .delete(events::delete::<S>),
    )
    .route("/profiles", get(profiles::list::<S>))
    .route("/profiles/me", get(profiles::own::<S>))
    .route(
      "/profiles/{identity_id}",
      get(profiles::get_one::<S>).put(profiles::replace::<S>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
