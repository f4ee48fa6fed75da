//! The `RegistrationStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `rally-store-sqlite`).
//! The API layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  event::{Event, NewEvent},
  registration::RegistrationChange,
  user::{NewUser, UserCredentials, UserProfile},
};

/// Abstraction over the Rally backend.
///
/// Events are single documents: every write touches exactly one event row
/// and is atomic within that row, but nothing coordinates a write with the
/// read that planned it. Registration updates in particular overwrite
/// `participant_count` with a caller-computed value; the store applies the
/// write without re-checking capacity.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RegistrationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a new user profile. The store assigns `uid` and
  /// `created_at`. Fails if the email is already taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<UserProfile, Self::Error>> + Send + '_;

  /// Retrieve a profile by uid. Returns `None` if not found.
  fn get_user(
    &self,
    uid: Uuid,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + '_;

  /// Look up a profile and its password hash by email — the login path.
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<UserCredentials>, Self::Error>> + Send + 'a;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Persist a session for `uid` under `token_digest` (the SHA-256 of the
  /// bearer token; the token itself is never stored).
  fn create_session<'a>(
    &'a self,
    uid: Uuid,
    token_digest: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Resolve a token digest to the owning uid. Returns `None` for unknown
  /// or logged-out sessions.
  fn find_session<'a>(
    &'a self,
    token_digest: &'a str,
  ) -> impl Future<Output = Result<Option<Uuid>, Self::Error>> + Send + 'a;

  /// Delete a session — the logout path. Deleting an unknown digest is not
  /// an error.
  fn delete_session<'a>(
    &'a self,
    token_digest: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Events ────────────────────────────────────────────────────────────

  /// Create and persist a new event with no participants and a zero count.
  /// The store assigns `event_id` and `created_at`.
  fn create_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// Retrieve an event by id. Returns `None` if not found.
  fn get_event(
    &self,
    event_id: Uuid,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  /// List every event, unfiltered. There is no pagination and no
  /// per-organizer query.
  fn list_events(
    &self,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  /// Apply a planned registration write to one event row: union/remove the
  /// uid on `participants` and overwrite `participant_count` with the
  /// value the plan carries. No capacity check happens here.
  fn update_registration(
    &self,
    event_id: Uuid,
    change: RegistrationChange,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
