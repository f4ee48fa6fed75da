//! Signup, login, logout, and the bearer-token request extractor.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/auth/register` | Body: `{"email","password","role"}`; 201 + token |
//! | `POST` | `/api/auth/login` | Body: `{"email","password"}`; 200 + token |
//! | `POST` | `/api/auth/logout` | Bearer; 204 |
//! | `GET`  | `/api/auth/me` | Bearer; current profile |
//!
//! Passwords are stored as argon2 PHC strings. Session tokens are 32
//! random bytes, hex-encoded; only their SHA-256 digest is persisted, so a
//! leaked database cannot be replayed as live sessions.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{HeaderMap, StatusCode, header, request::Parts},
  response::IntoResponse,
};
use rand_core::{OsRng, RngCore};
use rally_core::{
  store::RegistrationStore,
  user::{NewUser, Role, UserProfile},
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AppState, error::ApiError};

// ─── Tokens ───────────────────────────────────────────────────────────────────

/// Generate a fresh opaque session token.
fn new_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// The digest under which a token is persisted.
pub fn token_digest(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// Extract the bearer token from the `Authorization` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .ok_or(ApiError::Unauthorized)
}

// ─── Passwords ────────────────────────────────────────────────────────────────

fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| ApiError::Hash(e.to_string()))?
      .to_string(),
  )
}

fn verify_password(hash: &str, password: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Extractor ────────────────────────────────────────────────────────────────

/// The authenticated caller, resolved from the bearer token. Present in a
/// handler signature means the request carried a live session.
pub struct CurrentUser(pub UserProfile);

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: RegistrationStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)?;

    let uid = state
      .store
      .find_session(&token_digest(token))
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
      .ok_or(ApiError::Unauthorized)?;

    let profile = state
      .store
      .get_user(uid)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
      .ok_or(ApiError::Unauthorized)?;

    Ok(CurrentUser(profile))
  }
}

// ─── Bodies ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub email:    String,
  pub password: String,
  pub role:     Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// Returned by signup and login: the bearer token plus the profile the
/// client keeps as its session context.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
  pub token:   String,
  pub profile: UserProfile,
}

async fn issue_session<S>(
  state: &AppState<S>,
  uid: uuid::Uuid,
) -> Result<String, ApiError>
where
  S: RegistrationStore + Clone + Send + Sync + 'static,
{
  let token = new_token();
  state
    .store
    .create_session(uid, &token_digest(&token))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(token)
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

/// `POST /api/auth/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistrationStore + Clone + Send + Sync + 'static,
{
  let taken = state
    .store
    .find_user_by_email(&body.email)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .is_some();
  if taken {
    return Err(ApiError::Conflict("email already registered".into()));
  }

  let profile = state
    .store
    .create_user(NewUser {
      email:         body.email,
      password_hash: hash_password(&body.password)?,
      role:          body.role,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let token = issue_session(&state, profile.uid).await?;
  Ok((StatusCode::CREATED, Json(SessionResponse { token, profile })))
}

/// `POST /api/auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<SessionResponse>, ApiError>
where
  S: RegistrationStore + Clone + Send + Sync + 'static,
{
  let creds = state
    .store
    .find_user_by_email(&body.email)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::Unauthorized)?;

  if !verify_password(&creds.password_hash, &body.password) {
    return Err(ApiError::Unauthorized);
  }

  let token = issue_session(&state, creds.profile.uid).await?;
  Ok(Json(SessionResponse { token, profile: creds.profile }))
}

/// `POST /api/auth/logout`
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<StatusCode, ApiError>
where
  S: RegistrationStore + Clone + Send + Sync + 'static,
{
  let token = bearer_token(&headers)?;

  if let Err(e) = state.store.delete_session(&token_digest(token)).await {
    tracing::error!("failed to end session: {e}");
    return Err(ApiError::Store(Box::new(e)));
  }
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/auth/me`
pub async fn me(user: CurrentUser) -> Json<UserProfile> { Json(user.0) }
