//! [`SqliteStore`] — the SQLite implementation of [`RegistrationStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use rally_core::{
  event::{Event, NewEvent},
  registration::{MembershipOp, RegistrationChange},
  store::RegistrationStore,
  user::{NewUser, UserCredentials, UserProfile},
};

use crate::{
  Error, Result,
  encode::{
    RawEvent, RawUser, encode_dt, encode_participants, encode_role,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rally registration store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

const EVENT_COLUMNS: &str = "event_id, title, description, location, date, \
                             organizer_id, capacity, participants, \
                             participant_count, created_at";

fn read_event_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvent> {
  Ok(RawEvent {
    event_id:          row.get(0)?,
    title:             row.get(1)?,
    description:       row.get(2)?,
    location:          row.get(3)?,
    date:              row.get(4)?,
    organizer_id:      row.get(5)?,
    capacity:          row.get(6)?,
    participants:      row.get(7)?,
    participant_count: row.get(8)?,
    created_at:        row.get(9)?,
  })
}

// ─── Trait impl ──────────────────────────────────────────────────────────────

impl RegistrationStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<UserProfile> {
    let profile = UserProfile {
      uid:        Uuid::new_v4(),
      email:      input.email.clone(),
      role:       input.role,
      created_at: Utc::now(),
    };

    let uid_str  = encode_uuid(profile.uid);
    let email    = input.email.clone();
    let hash     = input.password_hash;
    let role_str = encode_role(input.role).to_owned();
    let at_str   = encode_dt(profile.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let rows = conn.execute(
          "INSERT OR IGNORE INTO users (user_id, email, password_hash, role, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![uid_str, email, hash, role_str, at_str],
        )?;
        Ok(rows > 0)
      })
      .await?;

    if !inserted {
      return Err(Error::EmailTaken(input.email));
    }
    Ok(profile)
  }

  async fn get_user(&self, uid: Uuid) -> Result<Option<UserProfile>> {
    let uid_str = encode_uuid(uid);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, email, role, created_at FROM users WHERE user_id = ?1",
              rusqlite::params![uid_str],
              |row| {
                Ok(RawUser {
                  user_id:    row.get(0)?,
                  email:      row.get(1)?,
                  role:       row.get(2)?,
                  created_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::decode).transpose()
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
    let email = email.to_owned();

    let raw: Option<(RawUser, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, email, role, created_at, password_hash
               FROM users WHERE email = ?1",
              rusqlite::params![email],
              |row| {
                Ok((
                  RawUser {
                    user_id:    row.get(0)?,
                    email:      row.get(1)?,
                    role:       row.get(2)?,
                    created_at: row.get(3)?,
                  },
                  row.get(4)?,
                ))
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(raw, password_hash)| {
        Ok(UserCredentials { profile: raw.decode()?, password_hash })
      })
      .transpose()
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, uid: Uuid, token_digest: &str) -> Result<()> {
    let uid_str = encode_uuid(uid);
    let digest  = token_digest.to_owned();
    let at_str  = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_digest, user_id, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![digest, uid_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_session(&self, token_digest: &str) -> Result<Option<Uuid>> {
    let digest = token_digest.to_owned();

    let uid_str: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id FROM sessions WHERE token_digest = ?1",
              rusqlite::params![digest],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    uid_str.map(|s| Uuid::parse_str(&s)).transpose().map_err(Error::Uuid)
  }

  async fn delete_session(&self, token_digest: &str) -> Result<()> {
    let digest = token_digest.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM sessions WHERE token_digest = ?1",
          rusqlite::params![digest],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn create_event(&self, input: NewEvent) -> Result<Event> {
    let event = Event {
      event_id:          Uuid::new_v4(),
      title:             input.title,
      description:       input.description,
      location:          input.location,
      date:              input.date,
      organizer_id:      input.organizer_id,
      capacity:          input.capacity,
      participants:      Vec::new(),
      participant_count: 0,
      created_at:        Utc::now(),
    };

    let id_str           = encode_uuid(event.event_id);
    let title            = event.title.clone();
    let description      = event.description.clone();
    let location         = event.location.clone();
    let date_str         = encode_dt(event.date);
    let organizer_str    = encode_uuid(event.organizer_id);
    let capacity         = event.capacity;
    let participants_str = encode_participants(&event.participants)?;
    let created_str      = encode_dt(event.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events (
             event_id, title, description, location, date,
             organizer_id, capacity, participants, participant_count, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9)",
          rusqlite::params![
            id_str, title, description, location, date_str,
            organizer_str, capacity, participants_str, created_str
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>> {
    let id_str = encode_uuid(event_id);

    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = ?1"),
              rusqlite::params![id_str],
              read_event_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvent::decode).transpose()
  }

  async fn list_events(&self) -> Result<Vec<Event>> {
    let raws: Vec<RawEvent> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at"
        ))?;
        let rows = stmt.query_map([], read_event_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
      })
      .await?;

    raws.into_iter().map(RawEvent::decode).collect()
  }

  async fn update_registration(
    &self,
    event_id: Uuid,
    change: RegistrationChange,
  ) -> Result<()> {
    let id_str = encode_uuid(event_id);
    let count  = change.participant_count;
    let op     = change.op;

    // One call, one row: the membership union/removal and the count
    // overwrite land together, but no capacity or state check happens here.
    // The values were computed by the caller from its own snapshot.
    let found = self
      .conn
      .call(move |conn| {
        let participants_json: Option<String> = conn
          .query_row(
            "SELECT participants FROM events WHERE event_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?;

        let Some(participants_json) = participants_json else {
          return Ok(false);
        };

        let mut participants: Vec<String> =
          serde_json::from_str(&participants_json)
            .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;

        match op {
          MembershipOp::Add(uid) => {
            let uid_str = encode_uuid(uid);
            if !participants.contains(&uid_str) {
              participants.push(uid_str);
            }
          }
          MembershipOp::Remove(uid) => {
            let uid_str = encode_uuid(uid);
            participants.retain(|p| *p != uid_str);
          }
        }

        let updated = serde_json::to_string(&participants)
          .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;

        conn.execute(
          "UPDATE events SET participants = ?1, participant_count = ?2
           WHERE event_id = ?3",
          rusqlite::params![updated, count, id_str],
        )?;
        Ok(true)
      })
      .await?;

    if !found {
      return Err(Error::EventNotFound(event_id));
    }
    Ok(())
  }
}
