//! Registration state transitions.
//!
//! Per (user, event) pair there are exactly two states, `not_registered`
//! and `registered`, and two transitions between them. A transition is
//! planned against a snapshot of the event read at action time and applied
//! as a field-level write: a membership change plus an overwrite of the
//! `participant_count` mirror with a snapshot-derived value.
//!
//! There is no atomic guard between the snapshot read and the write. Two
//! callers planning against the same snapshot of an event at
//! capacity-minus-one both produce a valid plan, and both writes land —
//! the store accepts whatever count the plan carries. This is the known,
//! unresolved race of the design; closing it would require a store-side
//! atomic counter.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, event::Event};

/// Whether a given user is registered for a given event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
  NotRegistered,
  Registered,
}

impl Event {
  pub fn registration_state(&self, uid: Uuid) -> RegistrationState {
    if self.is_registered(uid) {
      RegistrationState::Registered
    } else {
      RegistrationState::NotRegistered
    }
  }
}

/// The membership half of a registration write.
///
/// `Add` is a set union (no duplicate is appended if the uid is already
/// present); `Remove` removes every occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipOp {
  Add(Uuid),
  Remove(Uuid),
}

/// A planned registration write: one membership change and the new value
/// for the `participant_count` mirror, both computed from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationChange {
  pub op:                MembershipOp,
  pub participant_count: u32,
}

/// Plan the `register` transition for `uid` against a snapshot of `event`.
///
/// Allowed only when the snapshot shows `uid` as not registered and the
/// event below capacity. No write is produced otherwise.
pub fn plan_register(event: &Event, uid: Uuid) -> Result<RegistrationChange> {
  match event.registration_state(uid) {
    RegistrationState::Registered => Err(Error::AlreadyRegistered(uid)),
    RegistrationState::NotRegistered if event.is_full() => {
      Err(Error::EventFull(event.event_id))
    }
    RegistrationState::NotRegistered => Ok(RegistrationChange {
      op:                MembershipOp::Add(uid),
      participant_count: event.participant_count + 1,
    }),
  }
}

/// Plan the `unregister` transition for `uid` against a snapshot of `event`.
///
/// Allowed only when the snapshot shows `uid` as registered. The decrement
/// saturates at zero so a drifted mirror cannot underflow.
pub fn plan_unregister(event: &Event, uid: Uuid) -> Result<RegistrationChange> {
  match event.registration_state(uid) {
    RegistrationState::NotRegistered => Err(Error::NotRegistered(uid)),
    RegistrationState::Registered => Ok(RegistrationChange {
      op:                MembershipOp::Remove(uid),
      participant_count: event.participant_count.saturating_sub(1),
    }),
  }
}

/// Apply `change` to an in-memory event, mirroring what the store does to
/// the persisted row. Used by handlers to update their local copy after a
/// successful write instead of re-reading.
pub fn apply_change(event: &mut Event, change: RegistrationChange) {
  match change.op {
    MembershipOp::Add(uid) => {
      if !event.participants.contains(&uid) {
        event.participants.push(uid);
      }
    }
    MembershipOp::Remove(uid) => {
      event.participants.retain(|p| *p != uid);
    }
  }
  event.participant_count = change.participant_count;
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn event(capacity: u32, participants: Vec<Uuid>) -> Event {
    let count = participants.len() as u32;
    Event {
      event_id:          Uuid::new_v4(),
      title:             "Rust Meetup".into(),
      description:       "Monthly meetup".into(),
      location:          "Room 101".into(),
      date:              Utc::now(),
      organizer_id:      Uuid::new_v4(),
      capacity,
      participants,
      participant_count: count,
      created_at:        Utc::now(),
    }
  }

  #[test]
  fn register_below_capacity_increments_count() {
    let e = event(3, vec![Uuid::new_v4()]);
    let uid = Uuid::new_v4();

    let change = plan_register(&e, uid).unwrap();
    assert_eq!(change.op, MembershipOp::Add(uid));
    assert_eq!(change.participant_count, 2);
  }

  #[test]
  fn register_when_full_is_rejected() {
    let uid = Uuid::new_v4();
    let e = event(1, vec![Uuid::new_v4()]);

    assert!(matches!(plan_register(&e, uid), Err(Error::EventFull(id)) if id == e.event_id));
  }

  #[test]
  fn register_twice_is_rejected() {
    let uid = Uuid::new_v4();
    let e = event(5, vec![uid]);

    assert!(matches!(
      plan_register(&e, uid),
      Err(Error::AlreadyRegistered(u)) if u == uid
    ));
  }

  #[test]
  fn unregister_decrements_count() {
    let uid = Uuid::new_v4();
    let e = event(5, vec![Uuid::new_v4(), uid]);

    let change = plan_unregister(&e, uid).unwrap();
    assert_eq!(change.op, MembershipOp::Remove(uid));
    assert_eq!(change.participant_count, 1);
  }

  #[test]
  fn unregister_when_not_registered_is_rejected() {
    let uid = Uuid::new_v4();
    let e = event(5, vec![Uuid::new_v4()]);

    assert!(matches!(
      plan_unregister(&e, uid),
      Err(Error::NotRegistered(u)) if u == uid
    ));
  }

  #[test]
  fn unregister_saturates_a_drifted_count() {
    let uid = Uuid::new_v4();
    let mut e = event(5, vec![uid]);
    // Mirror drifted below the membership size.
    e.participant_count = 0;

    let change = plan_unregister(&e, uid).unwrap();
    assert_eq!(change.participant_count, 0);
  }

  #[test]
  fn apply_add_is_idempotent_on_membership() {
    let uid = Uuid::new_v4();
    let mut e = event(5, vec![uid]);

    apply_change(&mut e, RegistrationChange {
      op:                MembershipOp::Add(uid),
      participant_count: 2,
    });

    // Union semantics: no duplicate appended, but the count overwrite
    // lands regardless.
    assert_eq!(e.participants, vec![uid]);
    assert_eq!(e.participant_count, 2);
  }

  #[test]
  fn two_plans_from_one_snapshot_both_succeed_at_capacity_minus_one() {
    let e = event(1, vec![]);
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    // Both callers read the same snapshot; neither plan observes the
    // other's write. Known, unresolved behavior of the design.
    let change_a = plan_register(&e, a).unwrap();
    let change_b = plan_register(&e, b).unwrap();
    assert_eq!(change_a.participant_count, 1);
    assert_eq!(change_b.participant_count, 1);
  }
}
