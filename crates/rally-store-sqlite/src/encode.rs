//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. The participants sequence
//! is stored as a compact JSON array of uuid strings. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use rally_core::{
  event::Event,
  user::{Role, UserProfile},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ─────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::Organizer => "organizer",
    Role::Participant => "participant",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "organizer" => Ok(Role::Organizer),
    "participant" => Ok(Role::Participant),
    other => Err(Error::UnknownRole(other.to_owned())),
  }
}

// ─── Participants ─────────────────────────────────────────────────────────────

pub fn encode_participants(participants: &[Uuid]) -> Result<String> {
  let strings: Vec<String> =
    participants.iter().copied().map(encode_uuid).collect();
  Ok(serde_json::to_string(&strings)?)
}

pub fn decode_participants(s: &str) -> Result<Vec<Uuid>> {
  let strings: Vec<String> = serde_json::from_str(s)?;
  strings.iter().map(|s| decode_uuid(s)).collect()
}

// ─── Row structs ──────────────────────────────────────────────────────────────

/// An `events` row as read from SQLite, before decoding.
pub struct RawEvent {
  pub event_id:          String,
  pub title:             String,
  pub description:       String,
  pub location:          String,
  pub date:              String,
  pub organizer_id:      String,
  pub capacity:          u32,
  pub participants:      String,
  pub participant_count: u32,
  pub created_at:        String,
}

impl RawEvent {
  pub fn decode(self) -> Result<Event> {
    Ok(Event {
      event_id:          decode_uuid(&self.event_id)?,
      title:             self.title,
      description:       self.description,
      location:          self.location,
      date:              decode_dt(&self.date)?,
      organizer_id:      decode_uuid(&self.organizer_id)?,
      capacity:          self.capacity,
      participants:      decode_participants(&self.participants)?,
      participant_count: self.participant_count,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}

/// A `users` row as read from SQLite, before decoding. The password hash is
/// carried separately by the caller when needed.
pub struct RawUser {
  pub user_id:    String,
  pub email:      String,
  pub role:       String,
  pub created_at: String,
}

impl RawUser {
  pub fn decode(self) -> Result<UserProfile> {
    Ok(UserProfile {
      uid:        decode_uuid(&self.user_id)?,
      email:      self.email,
      role:       decode_role(&self.role)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
