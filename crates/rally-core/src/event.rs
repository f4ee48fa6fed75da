//! Event — the single document type the service revolves around.
//!
//! `participant_count` is a redundant mirror of `participants.len()`,
//! maintained by every writer rather than derived on read. The store never
//! reconciles the two; writers compute both sides of each update from a
//! snapshot read at action time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scheduled event with a fixed registration capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  #[serde(rename = "id")]
  pub event_id:          Uuid,
  pub title:             String,
  pub description:       String,
  pub location:          String,
  pub date:              DateTime<Utc>,
  pub organizer_id:      Uuid,
  /// Maximum simultaneous registered participants. Set at creation,
  /// immutable thereafter.
  pub capacity:          u32,
  /// Registered user ids, in registration order.
  pub participants:      Vec<Uuid>,
  /// Mirror of `participants.len()`, overwritten (not incremented) by each
  /// registration write.
  pub participant_count: u32,
  pub created_at:        DateTime<Utc>,
}

impl Event {
  pub fn is_full(&self) -> bool { self.participant_count >= self.capacity }

  pub fn is_registered(&self, uid: Uuid) -> bool {
    self.participants.contains(&uid)
  }
}

/// Input for [`RegistrationStore::create_event`](crate::store::RegistrationStore::create_event).
///
/// New events always start with no participants and a zero count; the store
/// assigns `event_id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub title:        String,
  pub description:  String,
  pub location:     String,
  pub date:         DateTime<Utc>,
  pub organizer_id: Uuid,
  pub capacity:     u32,
}
