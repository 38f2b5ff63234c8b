//! Access services — the authorization-aware operations behind every
//! endpoint.
//!
//! Each function takes the authenticated [`Actor`](crate::actor::Actor) and a
//! store, checks the actor's rights before touching the store, and returns an
//! [`AccessError`](crate::AccessError) drawn from a single taxonomy.

pub mod events;
pub mod profiles;

#[cfg(test)]
mod tests;
