//! JSON REST API for Rally.
//!
//! Exposes an axum [`Router`] backed by any
//! [`rally_core::store::RegistrationStore`]. TLS and transport concerns are
//! the caller's responsibility.

pub mod auth;
pub mod error;
pub mod events;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use rally_core::store::RegistrationStore;
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `RALLY_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("rally.db3") }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: RegistrationStore> {
  pub store: Arc<S>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the Rally API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RegistrationStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Auth
    .route("/api/auth/register", post(auth::register::<S>))
    .route("/api/auth/login", post(auth::login::<S>))
    .route("/api/auth/logout", post(auth::logout::<S>))
    .route("/api/auth/me", get(auth::me))
    // Events
    .route("/api/events", get(events::list::<S>).post(events::create::<S>))
    .route("/api/events/{id}", get(events::get_one::<S>))
    .route("/api/events/{id}/register", post(events::register::<S>))
    .route("/api/events/{id}/unregister", post(events::unregister::<S>))
    .route("/api/events/{id}/certificate", get(events::certificate::<S>))
    .with_state(state)
}
