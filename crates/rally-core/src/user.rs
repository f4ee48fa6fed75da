//! User profiles and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a user is permitted to do: organizers create events, participants
/// register for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Organizer,
  Participant,
}

/// A user's profile. Created on signup, read on every authenticated
/// request, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
  pub uid:        Uuid,
  pub email:      String,
  pub role:       Role,
  pub created_at: DateTime<Utc>,
}

/// Input for [`RegistrationStore::create_user`](crate::store::RegistrationStore::create_user).
/// The password is hashed before it reaches the store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub password_hash: String,
  pub role:          Role,
}

/// A profile together with its stored password hash. Returned only by the
/// email lookup used for login; the hash never leaves the auth layer.
#[derive(Debug, Clone)]
pub struct UserCredentials {
  pub profile:       UserProfile,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}
