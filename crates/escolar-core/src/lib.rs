//! Core types and rules for the Escolar school-administration backend.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the domain model (identities, role profiles, academic events), the
//! visibility policy, input validation, and the access services that enforce
//! who may read or mutate what. Storage is reached through the
//! [`store::SchoolStore`] trait.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod actor;
pub mod error;
pub mod event;
pub mod policy;
pub mod profile;
pub mod store;
pub mod validate;

pub use error::{AccessError, Error, Result};
