//! Handlers for `/api/events` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/events` | Auth-gated; unfiltered listing |
//! | `POST` | `/api/events` | Organizer only; 201 + stored event |
//! | `GET`  | `/api/events/:id` | 404 if not found |
//! | `POST` | `/api/events/:id/register` | Capacity-checked against a request-time snapshot |
//! | `POST` | `/api/events/:id/unregister` | 409 when not registered |
//! | `GET`  | `/api/events/:id/certificate` | PDF download; registered callers only |

use axum::{
  Json,
  extract::{Path, State},
  http::{HeaderValue, StatusCode, header},
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rally_certificate::Certificate;
use rally_core::{
  event::{Event, NewEvent},
  registration::{apply_change, plan_register, plan_unregister},
  store::RegistrationStore,
  user::Role,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /api/events`
pub async fn list<S>(
  CurrentUser(profile): CurrentUser,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Event>>, ApiError>
where
  S: RegistrationStore + Clone + Send + Sync + 'static,
{
  // Both roles currently receive the same unfiltered listing.
  let events = match profile.role {
    Role::Organizer => state.store.list_events().await,
    Role::Participant => state.store.list_events().await,
  }
  .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(events))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:       String,
  pub description: String,
  pub location:    String,
  pub date:        DateTime<Utc>,
  pub capacity:    u32,
}

/// `POST /api/events`
pub async fn create<S>(
  CurrentUser(profile): CurrentUser,
  State(state): State<AppState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistrationStore + Clone + Send + Sync + 'static,
{
  if profile.role != Role::Organizer {
    return Err(ApiError::Forbidden("only organizers can create events".into()));
  }
  if body.capacity == 0 {
    return Err(ApiError::BadRequest("capacity must be at least 1".into()));
  }

  let event = state
    .store
    .create_event(NewEvent {
      title:        body.title,
      description:  body.description,
      location:     body.location,
      date:         body.date,
      organizer_id: profile.uid,
      capacity:     body.capacity,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok((StatusCode::CREATED, Json(event)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

async fn fetch_event<S>(
  state: &AppState<S>,
  event_id: Uuid,
) -> Result<Event, ApiError>
where
  S: RegistrationStore + Clone + Send + Sync + 'static,
{
  state
    .store
    .get_event(event_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound("event not found".into()))
}

/// `GET /api/events/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Event>, ApiError>
where
  S: RegistrationStore + Clone + Send + Sync + 'static,
{
  Ok(Json(fetch_event(&state, id).await?))
}

// ─── Register / unregister ───────────────────────────────────────────────────

/// `POST /api/events/:id/register`
///
/// The capacity check and the count overwrite both use the snapshot read
/// here; nothing re-checks at write time. The response body is the
/// snapshot with the planned change applied locally, mirroring the write.
pub async fn register<S>(
  CurrentUser(profile): CurrentUser,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Event>, ApiError>
where
  S: RegistrationStore + Clone + Send + Sync + 'static,
{
  let mut event = fetch_event(&state, id).await?;

  if event.organizer_id == profile.uid {
    return Err(ApiError::Forbidden(
      "organizers cannot register for their own event".into(),
    ));
  }

  let change = plan_register(&event, profile.uid)
    .map_err(|e| ApiError::Conflict(e.to_string()))?;

  state
    .store
    .update_registration(event.event_id, change)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  apply_change(&mut event, change);
  Ok(Json(event))
}

/// `POST /api/events/:id/unregister`
pub async fn unregister<S>(
  CurrentUser(profile): CurrentUser,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Event>, ApiError>
where
  S: RegistrationStore + Clone + Send + Sync + 'static,
{
  let mut event = fetch_event(&state, id).await?;

  let change = plan_unregister(&event, profile.uid)
    .map_err(|e| ApiError::Conflict(e.to_string()))?;

  state
    .store
    .update_registration(event.event_id, change)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  apply_change(&mut event, change);
  Ok(Json(event))
}

// ─── Certificate ─────────────────────────────────────────────────────────────

/// `GET /api/events/:id/certificate`
///
/// Purely derived from already-loaded state; issues no store writes.
pub async fn certificate<S>(
  CurrentUser(profile): CurrentUser,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistrationStore + Clone + Send + Sync + 'static,
{
  let event = fetch_event(&state, id).await?;

  if !event.is_registered(profile.uid) {
    return Err(ApiError::Forbidden("not registered for this event".into()));
  }

  let cert = Certificate {
    participant_email: profile.email,
    event_title:       event.title,
    event_date:        event.date,
  };
  let bytes = cert.render()?;

  let disposition = format!(
    "attachment; filename=\"{}\"",
    cert.filename().replace(['"', '\\'], "_"),
  );
  let disposition = HeaderValue::from_str(&disposition).map_err(|_| {
    ApiError::BadRequest("event title cannot be used as a filename".into())
  })?;

  Ok((
    [
      (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
      (header::CONTENT_DISPOSITION, disposition),
    ],
    bytes,
  ))
}
