//! Error types for `rally-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("event not found: {0}")]
  EventNotFound(Uuid),

  #[error("user {0} is already registered")]
  AlreadyRegistered(Uuid),

  #[error("user {0} is not registered")]
  NotRegistered(Uuid),

  #[error("event {0} is full")]
  EventFull(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
