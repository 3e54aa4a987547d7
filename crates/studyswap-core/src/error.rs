//! Error types for `studyswap-core`.
//!
//! Everything except [`Error::Store`] is a recoverable, caller-facing
//! condition that the API layer translates into a structured client error.

use thiserror::Error;
use uuid::Uuid;

use crate::matching::MatchStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("match not found: {0}")]
  MatchNotFound(Uuid),

  #[error("notification not found: {0}")]
  NotificationNotFound(Uuid),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("study material not found: {0}")]
  MaterialNotFound(Uuid),

  #[error("user {user_id} is not allowed to {action}")]
  Forbidden {
    user_id: Uuid,
    action:  &'static str,
  },

  #[error("cannot {action} a match in status {status}")]
  InvalidTransition {
    status: MatchStatus,
    action: &'static str,
  },

  #[error("match {0} is past its expiry window")]
  Expired(Uuid),

  #[error("cannot request a match with yourself")]
  SelfMatch,

  #[error("user {user_id} does not own material {material_id}")]
  NotOwner {
    user_id:     Uuid,
    material_id: Uuid,
  },

  #[error("trust score {score} is below the participation threshold")]
  InsufficientTrust { score: i8 },

  #[error("user {partner_id} holds no approved material in this peer group")]
  NoMatchingMaterial { partner_id: Uuid },

  #[error("user {0} is not a participant in this match")]
  NotParticipant(Uuid),

  #[error("trust score {0} is outside the allowed range -5..=5")]
  TrustScoreOutOfRange(i8),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend failure from a store implementation.
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
